//! CLI interface for kbrag.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for kbrag.
#[derive(Parser)]
#[command(name = "kbrag")]
#[command(author, version, about = "Keyword-ranked knowledge retrieval for prompt context", long_about = None)]
pub struct Cli {
    /// Knowledge file to use instead of the configured one.
    #[arg(short, long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Disable knowledge retrieval (queries return nothing).
    #[arg(long, global = true)]
    pub no_rag: bool,

    /// Log extracted tokens and match scores to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Rank knowledge entries against a query.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return (defaults to the [search] config).
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Minimum relevance score between 0.0 and 1.0.
        #[arg(short, long, allow_negative_numbers = true)]
        min_relevance: Option<f32>,
    },

    /// Print the context block that would be injected for a query.
    Context {
        /// The user message to retrieve context for.
        query: String,
    },

    /// List knowledge entries in file order.
    List {
        /// Only list entries in this category.
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one knowledge entry by id.
    Get {
        /// Entry id (e.g., "character_aris_thorne").
        id: String,
    },

    /// List the distinct categories in the knowledge file.
    Categories,

    /// Show knowledge base statistics.
    Stats,

    /// Validate the knowledge file.
    Check,

    /// Write a starter knowledge file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}
