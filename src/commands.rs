//! Command implementations shared by CLI and MCP server.
//!
//! Each operation comes as a data-producing function (serialised for JSON
//! output) and a renderer producing the markdown text shown to people and
//! agents.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::Config;
use crate::notes::{Note, NoteSummary};
use crate::search::{CollectionStats, NoteLookup, NotesEngine, SearchResult, TagCount};
use crate::storage::local::LocalStorageBackend;

/// Number of tags shown in the statistics report.
pub const POPULAR_TAGS_LIMIT: usize = 10;

/// Number of notes shown under "Recent Notes".
pub const RECENT_NOTES_LIMIT: usize = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build an engine for the configured notes directory, or `dir` if given.
///
/// The engine starts empty; call `reload` to scan the directory.
///
/// # Errors
///
/// Returns an error if the notes directory does not exist or cannot be resolved.
pub fn open_engine(config: &Config, dir: Option<&Path>) -> anyhow::Result<NotesEngine> {
    let root = dir.map_or_else(|| config.notes_dir(), Path::to_path_buf);
    let root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Cannot access notes directory {}: {e}", root.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Notes path is not a directory: {}", root.display());
    }

    let storage = LocalStorageBackend::new(root).with_filter(config.scan_filter());
    Ok(NotesEngine::new(Box::new(storage), config.load_policy()))
}

/// Build an engine and load every note.
///
/// # Errors
///
/// Returns an error if the directory cannot be opened or any note fails to load.
pub fn load_engine(config: &Config, dir: Option<&Path>) -> anyhow::Result<NotesEngine> {
    let engine = open_engine(config, dir)?;
    engine.reload()?;
    Ok(engine)
}

fn format_date(date: &DateTime<Local>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Render search results as markdown.
#[must_use]
pub fn render_search(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No notes found matching \"{query}\"");
    }

    let mut output = format!("Found {} notes matching \"{query}\":\n\n", results.len());
    for (index, result) in results.iter().enumerate() {
        let note = &result.note;
        let _ = writeln!(output, "## {}. {}", index + 1, note.title);
        let _ = writeln!(output, "**File:** {}", note.relative_path.display());
        let _ = writeln!(output, "**Relevance:** {:.2}", result.relevance);
        if !result.matches.is_empty() {
            let _ = writeln!(output, "**Matches:** {}", result.matches.join(", "));
        }
        if let Some(context) = &result.context {
            let summary = if context.is_empty() {
                "No summary available"
            } else {
                context
            };
            let _ = writeln!(output, "**Summary:** {summary}");
        }
        let _ = writeln!(output, "**Last Modified:** {}", format_date(&note.modified));
        output.push_str("---\n");
    }

    output
}

/// Render a note's summary card as markdown.
#[must_use]
pub fn render_note(card: &NoteSummary) -> String {
    let tags = if card.tags.is_empty() {
        "None".to_string()
    } else {
        card.tags.join(", ")
    };

    let mut output = String::new();
    let _ = writeln!(output, "# {}\n", card.title);
    let _ = writeln!(output, "**File:** {}", card.relative_path.display());
    let _ = writeln!(output, "**Word Count:** {}", card.word_count);
    let _ = writeln!(output, "**Tags:** {tags}");
    let _ = writeln!(output, "**Created:** {}", card.created);
    let _ = writeln!(output, "**Last Modified:** {}", format_date(&card.last_modified));
    let _ = write!(output, "\n## Content Preview:\n{}", card.preview);
    output
}

/// Render the outcome of a lookup: a card, a not-found message or the candidates.
#[must_use]
pub fn render_lookup(key: &str, lookup: &NoteLookup) -> String {
    match lookup {
        NoteLookup::Found(note) => render_note(&NoteSummary::from_note(note)),
        NoteLookup::NotFound => format!("Note \"{key}\" not found."),
        NoteLookup::Ambiguous(notes) => {
            let mut output = format!("Several notes are named \"{key}\":\n");
            for note in notes {
                let _ = writeln!(output, "- {}", note.relative_path.display());
            }
            output.push_str("Use the relative path to pick one.");
            output
        }
    }
}

/// One line of the notes listing.
#[derive(Debug, Clone, Serialize)]
pub struct NoteEntry {
    pub file_name: String,
    pub relative_path: PathBuf,
    pub title: String,
    pub word_count: usize,
    pub last_modified: DateTime<Local>,
}

impl From<&Note> for NoteEntry {
    fn from(note: &Note) -> Self {
        Self {
            file_name: note.file_name.clone(),
            relative_path: note.relative_path.clone(),
            title: note.title.clone(),
            word_count: note.word_count(),
            last_modified: note.modified,
        }
    }
}

/// Every note with the collection statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub stats: CollectionStats,
    /// Most recently modified first.
    pub notes: Vec<NoteEntry>,
}

#[must_use]
pub fn listing(engine: &NotesEngine) -> Listing {
    Listing {
        stats: engine.stats(),
        notes: engine
            .recent_notes(usize::MAX)
            .iter()
            .map(|n| NoteEntry::from(n.as_ref()))
            .collect(),
    }
}

fn write_stats(output: &mut String, stats: &CollectionStats) {
    let last_updated = stats
        .last_updated
        .as_ref()
        .map_or_else(|| "Never".to_string(), format_date);
    let _ = writeln!(output, "**Total Notes:** {}", stats.total_notes);
    let _ = writeln!(output, "**Total Words:** {}", stats.total_words);
    let _ = writeln!(output, "**Average Words per Note:** {}", stats.avg_words);
    let _ = writeln!(output, "**Last Updated:** {last_updated}");
}

#[must_use]
pub fn render_listing(listing: &Listing) -> String {
    if listing.notes.is_empty() {
        return "No notes found in the directory.".to_string();
    }

    let mut output = String::from("# Notes Summary\n\n");
    write_stats(&mut output, &listing.stats);
    output.push_str("\n## All Notes:\n");
    for entry in &listing.notes {
        let _ = writeln!(
            output,
            "- {} ({} words, {})",
            entry.title,
            entry.word_count,
            format_date(&entry.last_modified)
        );
    }
    output
}

/// Collection statistics with tag usage and the newest notes.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: CollectionStats,
    pub popular_tags: Vec<TagCount>,
    pub recent_notes: Vec<NoteEntry>,
}

#[must_use]
pub fn stats_report(engine: &NotesEngine) -> StatsReport {
    StatsReport {
        stats: engine.stats(),
        popular_tags: engine.popular_tags(POPULAR_TAGS_LIMIT),
        recent_notes: engine
            .recent_notes(RECENT_NOTES_LIMIT)
            .iter()
            .map(|n| NoteEntry::from(n.as_ref()))
            .collect(),
    }
}

#[must_use]
pub fn render_stats(report: &StatsReport) -> String {
    let mut output = String::from("# Notes Statistics\n\n");
    write_stats(&mut output, &report.stats);

    let tags = if report.popular_tags.is_empty() {
        "No tags found".to_string()
    } else {
        report
            .popular_tags
            .iter()
            .map(|t| format!("{} ({})", t.tag, t.count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(output, "\n**Popular Tags:** {tags}");

    output.push_str("\n**Recent Notes:**\n");
    for entry in &report.recent_notes {
        let _ = writeln!(output, "- {} ({})", entry.title, format_date(&entry.last_modified));
    }
    output
}

#[must_use]
pub fn render_tag(tag: &str, notes: &[Arc<Note>]) -> String {
    if notes.is_empty() {
        return format!("No notes tagged \"{tag}\".");
    }

    let mut output = format!("# Notes tagged \"{tag}\"\n\n");
    for note in notes {
        let _ = writeln!(output, "- {} (`{}`)", note.title, note.relative_path.display());
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchOptions;
    use std::fs;
    use tempfile::TempDir;

    fn notes_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, text) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, text).unwrap();
        }
        dir
    }

    #[test]
    fn open_engine_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = open_engine(&Config::default(), Some(&missing)).err().unwrap();
        assert!(err.to_string().contains("Cannot access notes directory"));
    }

    #[test]
    fn open_engine_rejects_file() {
        let dir = notes_dir(&[("a.md", "x")]);
        let err = open_engine(&Config::default(), Some(&dir.path().join("a.md")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn render_search_lists_results() {
        let dir = notes_dir(&[("redis.md", "# Redis\nRedis is an in-memory database.")]);
        let engine = load_engine(&Config::default(), Some(dir.path())).unwrap();
        let options = SearchOptions {
            include_content: true,
            ..SearchOptions::default()
        };
        let text = render_search("redis", &engine.search("redis", &options));

        assert!(text.starts_with("Found 1 notes matching \"redis\""));
        assert!(text.contains("## 1. Redis"));
        assert!(text.contains("**File:** redis.md"));
        assert!(text.contains("**Summary:** # Redis"));
    }

    #[test]
    fn render_search_empty() {
        assert_eq!(render_search("x", &[]), "No notes found matching \"x\"");
    }

    #[test]
    fn render_lookup_variants() {
        let dir = notes_dir(&[("a/todo.md", "one"), ("b/todo.md", "two"), ("solo.md", "---\ntags: [x]\n---\nsolo")]);
        let engine = load_engine(&Config::default(), Some(dir.path())).unwrap();

        let found = render_lookup("solo.md", &engine.lookup("solo.md"));
        assert!(found.starts_with("# solo"));
        assert!(found.contains("**Tags:** x"));

        let missing = render_lookup("zzz.md", &engine.lookup("zzz.md"));
        assert_eq!(missing, "Note \"zzz.md\" not found.");

        let ambiguous = render_lookup("todo.md", &engine.lookup("todo.md"));
        assert!(ambiguous.contains("- a/todo.md"));
        assert!(ambiguous.contains("- b/todo.md"));
    }

    #[test]
    fn listing_and_stats_for_empty_directory() {
        let dir = notes_dir(&[]);
        let engine = load_engine(&Config::default(), Some(dir.path())).unwrap();

        assert_eq!(render_listing(&listing(&engine)), "No notes found in the directory.");

        let stats = render_stats(&stats_report(&engine));
        assert!(stats.contains("**Total Notes:** 0"));
        assert!(stats.contains("**Last Updated:** Never"));
        assert!(stats.contains("**Popular Tags:** No tags found"));
    }

    #[test]
    fn stats_report_counts_tags() {
        let dir = notes_dir(&[
            ("a.md", "---\ntags: [rust]\n---\none two"),
            ("b.md", "---\ntags: [rust, go]\n---\nthree"),
        ]);
        let engine = load_engine(&Config::default(), Some(dir.path())).unwrap();
        let report = stats_report(&engine);

        assert_eq!(report.stats.total_words, 3);
        assert_eq!(report.popular_tags[0], TagCount { tag: "rust".into(), count: 2 });
        assert_eq!(report.recent_notes.len(), 2);
        assert!(render_stats(&report).contains("rust (2), go (1)"));
    }

    #[test]
    fn render_tag_output() {
        assert_eq!(render_tag("go", &[]), "No notes tagged \"go\".");
    }
}
