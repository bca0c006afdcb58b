//! Storage backend trait and implementations.
//!
//! The loader never touches the filesystem directly: it asks a storage
//! backend for the list of note files under a root and for the contents of
//! each one. This keeps the parsing and scoring code testable without a
//! real directory tree and leaves room for other backends.

pub mod local;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File extensions indexed when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "txt", "mdx"];

/// Directory names skipped during enumeration when nothing else is configured.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", "node_modules"];

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Notes directory not found: {0}")]
    NotFound(String),

    #[error("Failed to scan notes directory: {0}")]
    Walk(String),

    #[error("Failed to read: {0}")]
    ReadError(String),
}

/// Raw contents and filesystem metadata of one note file.
#[derive(Debug, Clone)]
pub struct NoteFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Full text, decoded as UTF-8 (invalid sequences replaced).
    pub text: String,
    /// Size of the file in bytes.
    pub size: u64,
    /// Last modification time reported by the filesystem.
    pub modified: SystemTime,
}

/// Which files a backend should report during enumeration.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Directory names pruned from the walk wherever they appear.
    pub exclude: Vec<String>,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ScanFilter {
    /// Returns true if the file name carries one of the indexed extensions.
    #[must_use]
    pub fn accepts_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }

    /// Returns true if a directory with this name must not be descended into.
    #[must_use]
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == name)
    }
}

/// Trait for note storage backends.
pub trait StorageBackend: Send + Sync {
    /// List every note file under the storage root, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the root does not exist and
    /// `StorageError::Walk` if enumeration fails part way.
    fn list_notes(&self) -> Result<Vec<PathBuf>, StorageError>;

    /// Read a note file's text together with its size and modification time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadError` if the file or its metadata cannot be read.
    fn read_note(&self, path: &Path) -> Result<NoteFile, StorageError>;

    /// Get the root path/identifier for this storage backend.
    fn root(&self) -> &Path;
}
