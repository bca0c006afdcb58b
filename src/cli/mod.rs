//! CLI interface for locanote.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for locanote.
#[derive(Parser)]
#[command(name = "locanote")]
#[command(author, version, about = "Search a directory of markdown and text notes", long_about = None)]
pub struct Cli {
    /// Notes directory (overrides the config file and LOCANOTE_DIR).
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search notes for a query, best matches first.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Drop notes scoring below this relevance.
        #[arg(short, long)]
        min_relevance: Option<f64>,

        /// Include a summary of each matching note.
        #[arg(short, long)]
        content: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the summary card of a note by file name or relative path.
    Get {
        /// File name (e.g., "redis.md") or path relative to the notes directory.
        name: String,

        /// Print the card as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List all notes, most recently modified first.
    List {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show collection statistics, popular tags and recent notes.
    Stats {
        /// Print statistics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List notes carrying a tag in their front matter or as #tag in the body.
    Tag {
        /// Tag name without the leading '#'.
        tag: String,

        /// Print matching notes as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the MCP server for AI agents.
    #[cfg(feature = "mcp")]
    Serve,
}
