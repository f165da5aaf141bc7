//! kbrag - Keyword-ranked knowledge retrieval for prompt context injection.
//!
//! This library loads a small JSON knowledge file, ranks its entries against
//! a user message by keyword overlap, and renders the best matches into a
//! delimited block that can be injected into a language-model prompt.
//!
//! # Modules
//!
//! - [`store`] - Knowledge entries, validation, and snapshot reloads
//! - [`search`] - Keyword extraction, scoring, and ranked retrieval
//! - [`context`] - Prompt context rendering
//! - [`stats`] - Knowledge base statistics
//! - [`engine`] - Collaborator-facing facade with the retrieval switch
//! - [`commands`] - High-level operations shared by CLI and MCP server
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod search;
pub mod stats;
pub mod store;

#[cfg(feature = "mcp")]
pub mod mcp;
