//! Note loading and parsing.
//!
//! A [`Note`] is the parsed form of one file under the notes root: the body
//! with any front-matter header removed, the header itself as a mapping, a
//! derived title, and the file's size and modification time.

pub mod frontmatter;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::search::summary::{DEFAULT_SUMMARY_LENGTH, summarize};
use crate::storage::{NoteFile, StorageBackend, StorageError};

pub use frontmatter::FrontMatter;

/// Number of characters shown in a note card's content preview.
pub const PREVIEW_LENGTH: usize = 500;

#[allow(clippy::expect_used)]
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s+(.+)$").expect("heading pattern is valid"));

/// Errors that can occur when loading notes.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to parse front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What to do when a single file cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Fail the whole load on the first bad file.
    #[default]
    Strict,
    /// Log a warning and leave the file out of the collection.
    SkipInvalid,
}

/// One parsed note file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Path relative to the notes root (e.g., "rust/errors.md").
    pub relative_path: PathBuf,
    /// File name including extension (e.g., "errors.md").
    pub file_name: String,
    /// Front-matter `title`, else first-line heading, else file stem.
    pub title: String,
    /// Body text with the front-matter header removed.
    pub content: String,
    /// Parsed header, present only if the file had one.
    pub front_matter: Option<FrontMatter>,
    pub modified: DateTime<Local>,
    /// File size in bytes.
    pub size: u64,
}

impl Note {
    /// Parse a note from raw file contents.
    ///
    /// `root` is the notes root, used to compute the relative path.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::FrontMatter` if the header is not valid YAML.
    /// A header that is valid YAML but not a mapping (a rule-delimited
    /// paragraph, say) is kept as ordinary body text.
    pub fn parse(file: NoteFile, root: &Path) -> Result<Self, NoteError> {
        let (front_matter, content) = match frontmatter::split(&file.text) {
            Some((header, body)) => {
                let parsed = frontmatter::parse(header).map_err(|source| NoteError::FrontMatter {
                    path: file.path.clone(),
                    source,
                })?;
                match parsed {
                    Some(map) => (Some(map), body.to_string()),
                    None => {
                        debug!(path = %file.path.display(), "header is not a mapping, reading as body");
                        (None, file.text.clone())
                    }
                }
            }
            None => (None, file.text.clone()),
        };

        let file_name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let title = front_matter
            .as_ref()
            .and_then(frontmatter::title)
            .or_else(|| heading_title(&content))
            .unwrap_or_else(|| {
                file.path.file_stem().map_or_else(
                    || file_name.clone(),
                    |s| s.to_string_lossy().into_owned(),
                )
            });

        let relative_path = file
            .path
            .strip_prefix(root)
            .map_or_else(|_| PathBuf::from(&file_name), Path::to_path_buf);

        Ok(Self {
            relative_path,
            file_name,
            title,
            content,
            front_matter,
            modified: DateTime::from(file.modified),
            size: file.size,
            path: file.path,
        })
    }

    /// Tags declared in the front matter.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.front_matter
            .as_ref()
            .map(frontmatter::tags)
            .unwrap_or_default()
    }

    /// Returns true if the front matter lists `tag` or the body contains `#tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        if self.tags().iter().any(|t| t == tag) {
            return true;
        }
        let marker = format!("#{}", tag.to_lowercase());
        self.content.to_lowercase().contains(&marker)
    }

    /// Number of whitespace-separated words in the body.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Front-matter `date` if present, else the modification date.
    #[must_use]
    pub fn created(&self) -> String {
        self.front_matter
            .as_ref()
            .and_then(frontmatter::date)
            .unwrap_or_else(|| self.modified.format("%Y-%m-%d").to_string())
    }
}

fn heading_title(content: &str) -> Option<String> {
    let first_line = content.lines().next()?.trim_end();
    let caps = HEADING_RE.captures(first_line)?;
    let title = caps.get(1)?.as_str().trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Load every note under the backend's root.
///
/// Under [`LoadPolicy::Strict`] the first unreadable or unparseable file
/// fails the whole load. Enumeration failures are always fatal.
///
/// # Errors
///
/// Returns `NoteError::Storage` if the root cannot be scanned, or the first
/// per-file error under the strict policy.
pub fn load_notes(storage: &dyn StorageBackend, policy: LoadPolicy) -> Result<Vec<Note>, NoteError> {
    let root = storage.root();
    let paths = storage.list_notes()?;
    debug!(root = %root.display(), files = paths.len(), "scanning notes");

    let mut notes = Vec::with_capacity(paths.len());
    for path in paths {
        let loaded = storage
            .read_note(&path)
            .map_err(NoteError::from)
            .and_then(|file| Note::parse(file, root));

        match (loaded, policy) {
            (Ok(note), _) => notes.push(note),
            (Err(e), LoadPolicy::Strict) => return Err(e),
            (Err(e), LoadPolicy::SkipInvalid) => {
                warn!(path = %path.display(), error = %e, "skipping note");
            }
        }
    }

    Ok(notes)
}

/// Display card for a single note.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSummary {
    pub file_name: String,
    pub relative_path: PathBuf,
    pub title: String,
    pub word_count: usize,
    pub tags: Vec<String>,
    /// Front-matter `date`, else the modification date.
    pub created: String,
    pub last_modified: DateTime<Local>,
    /// Leading sentences of the first paragraph.
    pub summary: String,
    /// Start of the body, truncated with `...`.
    pub preview: String,
}

impl NoteSummary {
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        let mut preview: String = note.content.chars().take(PREVIEW_LENGTH).collect();
        if note.content.chars().count() > PREVIEW_LENGTH {
            preview.push_str("...");
        }

        Self {
            file_name: note.file_name.clone(),
            relative_path: note.relative_path.clone(),
            title: note.title.clone(),
            word_count: note.word_count(),
            tags: note.tags(),
            created: note.created(),
            last_modified: note.modified,
            summary: summarize(&note.content, DEFAULT_SUMMARY_LENGTH),
            preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn file(path: &str, text: &str) -> NoteFile {
        NoteFile {
            path: PathBuf::from(path),
            text: text.to_string(),
            size: text.len() as u64,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    fn parse(path: &str, text: &str) -> Note {
        Note::parse(file(path, text), Path::new("/notes")).unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn title_from_front_matter() {
            let note = parse("/notes/a.md", "---\ntitle: From Header\n---\n# Heading\nbody");
            assert_eq!(note.title, "From Header");
            assert_eq!(note.content, "# Heading\nbody");
        }

        #[test]
        fn title_from_heading() {
            let note = parse("/notes/a.md", "## Redis Notes  \r\nbody");
            assert_eq!(note.title, "Redis Notes");
        }

        #[test]
        fn heading_after_front_matter_without_title() {
            let note = parse("/notes/a.md", "---\ntags: [db]\n---\n# Caching\nbody");
            assert_eq!(note.title, "Caching");
        }

        #[test]
        fn title_from_file_stem() {
            let note = parse("/notes/redis.txt", "Redis is an in-memory database");
            assert_eq!(note.title, "redis");
            assert_eq!(note.file_name, "redis.txt");
        }

        #[test]
        fn hash_without_space_is_not_a_heading() {
            let note = parse("/notes/tagged.md", "#rust is fun");
            assert_eq!(note.title, "tagged");
        }

        #[test]
        fn no_front_matter_is_absent() {
            let note = parse("/notes/a.md", "plain");
            assert!(note.front_matter.is_none());
            assert_eq!(note.content, "plain");
        }

        #[test]
        fn empty_file() {
            let note = parse("/notes/empty.md", "");
            assert_eq!(note.content, "");
            assert_eq!(note.title, "empty");
            assert_eq!(note.word_count(), 0);
        }

        #[test]
        fn relative_path_under_root() {
            let note = parse("/notes/rust/errors.md", "x");
            assert_eq!(note.relative_path, PathBuf::from("rust/errors.md"));
        }

        #[test]
        fn invalid_yaml_fails() {
            let err = Note::parse(file("/notes/bad.md", "---\ntitle: [oops\n---\n"), Path::new("/notes"));
            assert!(matches!(err, Err(NoteError::FrontMatter { .. })));
        }

        #[test]
        fn non_mapping_header_is_body_text() {
            let text = "---\nJust a thought, set off by rules.\n---\nMore text";
            let note = parse("/notes/rules.md", text);
            assert!(note.front_matter.is_none());
            assert_eq!(note.content, text);
            assert_eq!(note.title, "rules");
            assert!(note.tags().is_empty());
        }

        #[test]
        fn list_header_is_body_text() {
            let note = parse("/notes/list.md", "---\n- a\n- b\n---\n");
            assert!(note.front_matter.is_none());
            assert!(note.content.starts_with("---\n- a"));
        }
    }

    mod tag_tests {
        use super::*;

        #[test]
        fn front_matter_tag() {
            let note = parse("/notes/a.md", "---\ntags: [go]\n---\nbody");
            assert!(note.has_tag("go"));
            assert!(!note.has_tag("rust"));
        }

        #[test]
        fn inline_hash_tag() {
            let note = parse("/notes/a.md", "Thoughts on #Rust today");
            assert!(note.has_tag("rust"));
            assert!(note.has_tag("Rust"));
        }

        #[test]
        fn front_matter_tags_are_exact() {
            let note = parse("/notes/a.md", "---\ntags: [golang]\n---\nbody");
            assert!(!note.has_tag("go"));
        }
    }

    mod summary_card_tests {
        use super::*;

        #[test]
        fn created_prefers_front_matter_date() {
            let note = parse("/notes/a.md", "---\ndate: 2023-05-01\n---\nbody");
            assert_eq!(note.created(), "2023-05-01");
        }

        #[test]
        fn preview_is_truncated() {
            let body = "word ".repeat(200);
            let note = parse("/notes/long.md", &body);
            let card = NoteSummary::from_note(&note);
            assert_eq!(card.preview.chars().count(), PREVIEW_LENGTH + 3);
            assert!(card.preview.ends_with("..."));
            assert_eq!(card.word_count, 200);
        }

        #[test]
        fn short_preview_is_untouched() {
            let note = parse("/notes/a.md", "---\ntags: [x, y]\n---\nShort body.");
            let card = NoteSummary::from_note(&note);
            assert_eq!(card.preview, "Short body.");
            assert_eq!(card.summary, "Short body.");
            assert_eq!(card.tags, vec!["x", "y"]);
        }
    }
}
