//! In-memory note collection and the queries run against it.
//!
//! The engine owns one immutable snapshot of the notes. A reload loads a
//! complete new collection first and only then swaps the snapshot, so a
//! failed load leaves the previous collection in place and readers never
//! see a partly loaded set. Snapshots handed out earlier stay valid.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::notes::{LoadPolicy, Note, NoteError, load_notes};
use crate::search::scorer::{FoldedNote, Query, score_folded};
use crate::search::summary::{DEFAULT_SUMMARY_LENGTH, summarize};
use crate::search::{SearchOptions, SearchResult};
use crate::storage::StorageBackend;

/// An immutable view of the loaded notes.
pub type Snapshot = Arc<[Arc<Note>]>;

/// Aggregate statistics over a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total_notes: usize,
    pub total_words: usize,
    /// Words per note, rounded to the nearest integer; zero when empty.
    pub avg_words: usize,
    /// Most recent modification time, `None` when empty.
    pub last_updated: Option<DateTime<Local>>,
}

impl CollectionStats {
    #[must_use]
    pub fn from_notes(notes: &[Arc<Note>]) -> Self {
        let total_notes = notes.len();
        let total_words: usize = notes.iter().map(|n| n.word_count()).sum();
        let avg_words = if total_notes == 0 {
            0
        } else {
            (total_words + total_notes / 2) / total_notes
        };

        Self {
            total_notes,
            total_words,
            avg_words,
            last_updated: notes.iter().map(|n| n.modified).max(),
        }
    }
}

/// How often a front-matter tag is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Outcome of looking a note up by file name or relative path.
#[derive(Debug, Clone)]
pub enum NoteLookup {
    Found(Arc<Note>),
    NotFound,
    /// Several notes share the file name; candidates sorted by path.
    Ambiguous(Vec<Arc<Note>>),
}

/// Search engine over a notes directory.
pub struct NotesEngine {
    storage: Box<dyn StorageBackend>,
    policy: LoadPolicy,
    notes: RwLock<Snapshot>,
}

impl NotesEngine {
    /// Create an engine with an empty collection. Call [`reload`](Self::reload) to load notes.
    #[must_use]
    pub fn new(storage: Box<dyn StorageBackend>, policy: LoadPolicy) -> Self {
        Self {
            storage,
            policy,
            notes: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Root of the notes directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.storage.root()
    }

    /// Rescan the notes directory and replace the held collection.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; the previous collection is kept.
    pub fn reload(&self) -> Result<Snapshot, NoteError> {
        let loaded = load_notes(self.storage.as_ref(), self.policy)?;
        let snapshot: Snapshot = loaded.into_iter().map(Arc::new).collect();

        *self.notes.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        info!(
            root = %self.root().display(),
            notes = snapshot.len(),
            "notes loaded"
        );

        Ok(snapshot)
    }

    /// The current snapshot.
    #[must_use]
    pub fn notes(&self) -> Snapshot {
        Arc::clone(&self.notes.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rank the held notes against `query`.
    #[must_use]
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        search_notes(&self.notes(), query, options)
    }

    #[must_use]
    pub fn stats(&self) -> CollectionStats {
        CollectionStats::from_notes(&self.notes())
    }

    /// Notes whose front matter lists `tag` or whose body contains `#tag`.
    #[must_use]
    pub fn notes_by_tag(&self, tag: &str) -> Vec<Arc<Note>> {
        self.notes()
            .iter()
            .filter(|n| n.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Find a note by relative path, or failing that by file name.
    #[must_use]
    pub fn lookup(&self, key: &str) -> NoteLookup {
        let notes = self.notes();

        if let Some(note) = notes.iter().find(|n| n.relative_path == Path::new(key)) {
            return NoteLookup::Found(Arc::clone(note));
        }

        let mut matches: Vec<Arc<Note>> = notes
            .iter()
            .filter(|n| n.file_name == key)
            .cloned()
            .collect();

        match matches.len() {
            0 => NoteLookup::NotFound,
            1 => NoteLookup::Found(matches.remove(0)),
            _ => {
                matches.sort_by(|a, b| a.path.cmp(&b.path));
                NoteLookup::Ambiguous(matches)
            }
        }
    }

    /// Notes ordered newest first, at most `limit`.
    #[must_use]
    pub fn recent_notes(&self, limit: usize) -> Vec<Arc<Note>> {
        let mut notes: Vec<Arc<Note>> = self.notes().to_vec();
        notes.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        notes.truncate(limit);
        notes
    }

    /// Most used front-matter tags, at most `limit`.
    #[must_use]
    pub fn popular_tags(&self, limit: usize) -> Vec<TagCount> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for note in self.notes().iter() {
            for tag in note.tags() {
                *counts.entry(tag).or_default() += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        tags.truncate(limit);
        tags
    }
}

/// Score every note, keep those at or above the minimum relevance and return
/// the best `limit`, highest relevance first.
///
/// Equal scores are ordered by file name, then by path.
#[must_use]
pub fn search_notes(notes: &[Arc<Note>], query: &str, options: &SearchOptions) -> Vec<SearchResult> {
    let query = Query::new(query);

    let mut results: Vec<SearchResult> = notes
        .iter()
        .filter_map(|note| {
            let score = score_folded(&query, &FoldedNote::new(note));
            (score.relevance >= options.min_relevance).then(|| SearchResult {
                note: Arc::clone(note),
                relevance: score.relevance,
                matches: score.matches,
                context: options
                    .include_content
                    .then(|| summarize(&note.content, DEFAULT_SUMMARY_LENGTH)),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.note.file_name.cmp(&b.note.file_name))
            .then_with(|| a.note.path.cmp(&b.note.path))
    });
    results.truncate(options.limit);
    results
}
