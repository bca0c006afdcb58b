//! MCP server implementation for locanote.
//!
//! Exposes note search, lookup, listing and statistics as MCP tools.

use std::borrow::Cow;
use std::fmt::Display;
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
use tracing::{error, info};

use crate::commands;
use crate::search::{NotesEngine, SearchOptions};

/// Parameters for `search_notes` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Search query - can be keywords, phrases, or concepts")]
    pub query: String,
    #[schemars(description = "Maximum number of results to return (default: 10)")]
    pub limit: Option<usize>,
    #[schemars(description = "Minimum relevance score for a note to be returned (default: 0.1)")]
    pub min_relevance: Option<f64>,
    #[schemars(description = "Include a short summary of each note (default: true)")]
    pub include_content: Option<bool>,
}

/// Parameters for `get_note_summary` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NoteParams {
    #[schemars(
        description = "Name of the note file (e.g., 'react-notes.md') or its path relative to the notes directory"
    )]
    pub filename: String,
}

/// Parameters for `get_notes_by_tag` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TagParams {
    #[schemars(description = "Tag name without the leading '#'")]
    pub tag: String,
}

fn internal_error(context: &str, e: impl Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(format!("{context}: {e}")),
        data: None,
    }
}

/// MCP server exposing locanote tools.
#[derive(Clone)]
pub struct NotesServer {
    engine: Arc<NotesEngine>,
    defaults: SearchOptions,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl NotesServer {
    #[must_use]
    pub fn new(engine: Arc<NotesEngine>, defaults: SearchOptions) -> Self {
        Self {
            engine,
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    /// Rescan the notes directory off the async runtime.
    async fn refresh(&self) -> Result<usize, McpError> {
        let engine = Arc::clone(&self.engine);
        let notes = tokio::task::spawn_blocking(move || engine.reload())
            .await
            .map_err(|e| internal_error("Reload task failed", e))?
            .map_err(|e| internal_error("Failed to load notes", e))?;
        Ok(notes.len())
    }

    #[tool(description = "Search through markdown notes for specific content, concepts, or topics")]
    async fn search_notes(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let options = SearchOptions {
            limit: params.limit.unwrap_or(self.defaults.limit),
            min_relevance: params.min_relevance.unwrap_or(self.defaults.min_relevance),
            include_content: params.include_content.unwrap_or(true),
        };

        let results = self.engine.search(&params.query, &options);
        Ok(CallToolResult::success(vec![Content::text(
            commands::render_search(&params.query, &results),
        )]))
    }

    #[tool(description = "Get detailed summary and content of a specific note by filename")]
    async fn get_note_summary(
        &self,
        Parameters(params): Parameters<NoteParams>,
    ) -> Result<CallToolResult, McpError> {
        self.refresh().await?;
        let lookup = self.engine.lookup(&params.filename);
        Ok(CallToolResult::success(vec![Content::text(
            commands::render_lookup(&params.filename, &lookup),
        )]))
    }

    #[tool(description = "List all available notes with basic information")]
    async fn list_all_notes(&self) -> Result<CallToolResult, McpError> {
        self.refresh().await?;
        let listing = commands::listing(&self.engine);
        Ok(CallToolResult::success(vec![Content::text(
            commands::render_listing(&listing),
        )]))
    }

    #[tool(description = "Get statistics about your notes collection")]
    async fn get_notes_stats(&self) -> Result<CallToolResult, McpError> {
        self.refresh().await?;
        let report = commands::stats_report(&self.engine);
        Ok(CallToolResult::success(vec![Content::text(
            commands::render_stats(&report),
        )]))
    }

    #[tool(description = "List notes carrying a tag in their front matter or as #tag in the body")]
    async fn get_notes_by_tag(
        &self,
        Parameters(params): Parameters<TagParams>,
    ) -> Result<CallToolResult, McpError> {
        let notes = self.engine.notes_by_tag(&params.tag);
        Ok(CallToolResult::success(vec![Content::text(
            commands::render_tag(&params.tag, &notes),
        )]))
    }

    #[tool(description = "Rescan the notes directory so searches see new and changed notes")]
    async fn reload_notes(&self) -> Result<CallToolResult, McpError> {
        let count = self.refresh().await?;
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Loaded {count} notes from {}",
            self.engine.root().display()
        ))]))
    }
}

#[tool_handler]
impl ServerHandler for NotesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "locanote searches a local directory of markdown and text notes. \
                Use search_notes to find notes, get_note_summary to read one, \
                list_all_notes to browse, get_notes_stats for an overview, \
                get_notes_by_tag to filter by tag, and reload_notes after notes change."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Load the notes and start the MCP server with stdio transport.
///
/// A failed initial load is logged and the server starts with no notes.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(engine: NotesEngine, defaults: SearchOptions) -> anyhow::Result<()> {
    let engine = Arc::new(engine);

    let loader = Arc::clone(&engine);
    match tokio::task::spawn_blocking(move || loader.reload()).await? {
        Ok(notes) => info!(notes = notes.len(), "initial load complete"),
        Err(e) => error!(error = %e, "initial load failed, starting with no notes"),
    }

    let server = NotesServer::new(engine, defaults);
    let service = server.serve(stdio()).await?;
    info!("MCP server running");
    service.waiting().await?;
    Ok(())
}
