//! Local filesystem storage backend.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::storage::{NoteFile, ScanFilter, StorageBackend, StorageError};

/// Storage backend for a notes directory on the local filesystem.
pub struct LocalStorageBackend {
    root: PathBuf,
    filter: ScanFilter,
}

impl LocalStorageBackend {
    /// Create a new local storage backend rooted at the given path.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            filter: ScanFilter::default(),
        }
    }

    /// Replace the default extension and exclusion filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Broken links and link cycles below the root.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.depth() > 0
        && (err.loop_ancestor().is_some()
            || err
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound))
}

impl StorageBackend for LocalStorageBackend {
    fn list_notes(&self) -> Result<Vec<PathBuf>, StorageError> {
        if !self.root.is_dir() {
            return Err(StorageError::NotFound(self.root.display().to_string()));
        }

        // Symlinked notes and folders are followed; paths keep the link's location.
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.filter.excludes_dir(&entry.file_name().to_string_lossy())
            });

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_dangling_link(&e) => {
                    warn!(error = %e, "skipping unreachable link");
                    continue;
                }
                Err(e) => return Err(StorageError::Walk(e.to_string())),
            };
            if entry.file_type().is_file() && self.filter.accepts_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn read_note(&self, path: &Path) -> Result<NoteFile, StorageError> {
        let bytes = fs::read(path)
            .map_err(|e| StorageError::ReadError(format!("{}: {e}", path.display())))?;
        let metadata = fs::metadata(path)
            .map_err(|e| StorageError::ReadError(format!("{}: {e}", path.display())))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::ReadError(format!("{}: {e}", path.display())))?;

        Ok(NoteFile {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
            size: metadata.len(),
            modified,
        })
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
