//! Relevance search over loaded notes.

pub mod engine;
pub mod scorer;
pub mod summary;

use std::sync::Arc;

use serde::Serialize;

use crate::notes::Note;

pub use engine::{CollectionStats, NoteLookup, NotesEngine, TagCount};

/// Default number of search results to return.
pub const DEFAULT_LIMIT: usize = 10;

/// Default minimum relevance for a note to be returned.
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.1;

/// Options for filtering and limiting search results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Maximum number of results.
    pub limit: usize,
    /// Notes scoring below this are dropped.
    pub min_relevance: f64,
    /// Attach a body summary to every result.
    pub include_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            include_content: false,
        }
    }
}

/// A single scored match for a query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched note, shared with the snapshot it was found in.
    pub note: Arc<Note>,
    pub relevance: f64,
    /// Why the note matched, in the order the heuristics fired.
    pub matches: Vec<String>,
    /// Body summary, present only when content was requested.
    pub context: Option<String>,
}
