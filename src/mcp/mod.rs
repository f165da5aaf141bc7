//! MCP server implementation for kbrag.
//!
//! Exposes the knowledge engine as MCP tools for AI editors. The server is
//! long-lived, so `reload_knowledge` swaps in an edited knowledge file
//! without a restart.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::commands;
use crate::config::SearchConfig;
use crate::engine::KnowledgeEngine;

/// Parameters for `search_knowledge` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "The search query")]
    pub query: String,
    #[schemars(description = "Maximum number of results (default from config)")]
    pub limit: Option<i64>,
    #[schemars(description = "Minimum relevance score between 0.0 and 1.0")]
    pub min_relevance: Option<f32>,
}

/// Parameters for `get_context` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ContextParams {
    #[schemars(description = "The user message to retrieve context for")]
    pub query: String,
}

/// Parameters for `get_entry` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetParams {
    #[schemars(description = "Entry id (e.g., 'character_aris_thorne')")]
    pub id: String,
}

fn internal_error(message: String) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(message),
        data: None,
    }
}

/// MCP server exposing kbrag tools.
#[derive(Clone)]
pub struct KbragServer {
    engine: Arc<KnowledgeEngine>,
    settings: SearchConfig,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KbragServer {
    #[must_use]
    pub fn new(engine: Arc<KnowledgeEngine>, settings: SearchConfig) -> Self {
        Self {
            engine,
            settings,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Rank knowledge entries against a query")]
    async fn search_knowledge(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = commands::search(
            &self.engine,
            &self.settings,
            &params.query,
            params.limit,
            params.min_relevance,
        )
        .map_err(|e| internal_error(format!("Search failed: {e}")))?;

        if results.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(format!(
                "No matches found for '{}'",
                params.query
            ))]));
        }

        let mut output = String::new();
        for result in &results {
            let matched: Vec<&str> = result.matched_keywords.iter().map(String::as_str).collect();
            let _ = write!(
                output,
                "## {} ({:.2})\n**Category:** {}\n**Matched:** {}\n{}\n\n",
                result.entry_id,
                result.relevance_score,
                result.category.as_deref().unwrap_or("none"),
                matched.join(", "),
                result.content
            );
        }
        let _ = write!(output, "*{} result(s) found*", results.len());

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Get the knowledge context block to inject for a user message")]
    async fn get_context(
        &self,
        Parameters(params): Parameters<ContextParams>,
    ) -> Result<CallToolResult, McpError> {
        let context = commands::context(&self.engine, &params.query)
            .map_err(|e| internal_error(format!("Context retrieval failed: {e}")))?;

        Ok(CallToolResult::success(vec![Content::text(context)]))
    }

    #[tool(description = "Get one knowledge entry by id")]
    async fn get_entry(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let entry = commands::get(&self.engine, &params.id)
            .map_err(|e| internal_error(format!("Failed to get entry: {e}")))?;

        let category = entry.category.as_deref().unwrap_or("none");
        Ok(CallToolResult::success(vec![Content::text(format!(
            "## {}\n**Category:** {category}\n\n{}",
            entry.id, entry.content
        ))]))
    }

    #[tool(description = "List the distinct knowledge categories")]
    async fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let categories = self.engine.get_categories();
        let output = if categories.is_empty() {
            "No categories available.".to_string()
        } else {
            categories.join("\n")
        };

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Show knowledge base statistics")]
    async fn knowledge_stats(&self) -> Result<CallToolResult, McpError> {
        let stats = self.engine.get_stats();
        let output = serde_json::to_string_pretty(&stats)
            .map_err(|e| internal_error(format!("Failed to serialize stats: {e}")))?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Reload the knowledge file; the previous data stays active on failure")]
    async fn reload_knowledge(&self) -> Result<CallToolResult, McpError> {
        match self.engine.reload() {
            Ok(Some(count)) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Reloaded {count} entries"
            ))])),
            Ok(None) => Ok(CallToolResult::success(vec![Content::text(
                "Knowledge retrieval is disabled".to_string(),
            )])),
            Err(e) => Err(internal_error(format!("Reload failed: {e}"))),
        }
    }
}

#[tool_handler]
impl ServerHandler for KbragServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "kbrag retrieves facts from a keyword-indexed knowledge file. \
                Use get_context to fetch the block to inject before answering, \
                search_knowledge to inspect ranked matches, get_entry to read an entry, \
                and reload_knowledge after editing the file."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(engine: KnowledgeEngine, settings: SearchConfig) -> anyhow::Result<()> {
    let server = KbragServer::new(Arc::new(engine), settings);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::search::SearchOptions;

    const KNOWLEDGE: &str = r#"{
        "location_kepler_station": {
            "keywords": ["kepler", "station"],
            "content": "Kepler Station orbits the gas giant Vesper.",
            "category": "location"
        }
    }"#;

    fn server(dir: &TempDir) -> (KbragServer, std::path::PathBuf) {
        let path = dir.path().join("knowledge.json");
        fs::write(&path, KNOWLEDGE).unwrap();
        let engine = KnowledgeEngine::open(&path, true, SearchOptions::default()).unwrap();
        (KbragServer::new(Arc::new(engine), SearchConfig::default()), path)
    }

    #[tokio::test]
    async fn reload_knowledge_picks_up_edits() {
        let dir = TempDir::new().unwrap();
        let (server, path) = server(&dir);

        fs::write(
            &path,
            r#"{"ship_corvid": {"keywords": ["corvid"], "content": "A shuttle.", "category": "ship"}}"#,
        )
        .unwrap();

        assert!(server.reload_knowledge().await.is_ok());
        assert_eq!(server.engine.get_categories(), ["ship"]);
    }

    #[tokio::test]
    async fn malformed_reload_returns_error_and_keeps_stats() {
        let dir = TempDir::new().unwrap();
        let (server, path) = server(&dir);
        let before = server.engine.get_stats();

        fs::write(&path, "{ this is not json").unwrap();

        let err = server.reload_knowledge().await.unwrap_err();
        assert!(err.message.contains("Reload failed"));
        assert_eq!(server.engine.get_stats(), before);
        assert_eq!(server.engine.search("kepler station").len(), 1);
    }
}
