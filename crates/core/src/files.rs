//! File store for uploaded and enriched CSV files.
//!
//! Stored files live flat under a single root directory with
//! uuid-suffixed names, so concurrent uploads of the same file never
//! collide. The store also owns download-path resolution and cleanup of
//! stale files; nothing else touches the directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::DEFAULT_MAX_FILE_SIZE_MB;

/// The only extension the store accepts.
const CSV_EXTENSION: &str = ".csv";

/// Errors for file-store operations.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    /// The name was empty or tried to escape the store directory.
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Unsupported extension for '{0}': expected .csv")]
    InvalidExtension(String),

    #[error("File too large: {size_bytes} bytes (limit {limit_bytes})")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file persisted by the store.
#[derive(Clone, Debug)]
pub struct StoredFile {
    /// Name within the store (uuid-suffixed).
    pub filename: String,
    /// Absolute or root-relative path on disk.
    pub path: PathBuf,
}

/// Flat on-disk store for uploads and enriched outputs.
pub struct FileStore {
    root: PathBuf,
    max_size_bytes: u64,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FileError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            max_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        })
    }

    /// Override the upload size cap.
    pub fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_bytes = max_size_mb * 1024 * 1024;
        self
    }

    /// Persist an uploaded CSV under a unique name.
    pub fn save_upload(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, FileError> {
        let stem = upload_stem(original_name)?;

        let size_bytes = bytes.len() as u64;
        if size_bytes > self.max_size_bytes {
            return Err(FileError::TooLarge {
                size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }

        let filename = format!("{}_{}{}", stem, Uuid::new_v4().simple(), CSV_EXTENSION);
        let path = self.root.join(&filename);
        fs::write(&path, bytes)?;

        info!("Stored upload '{}' as '{}'", original_name, filename);
        Ok(StoredFile { filename, path })
    }

    /// Output name for a stored upload: `<stem>_enriched.csv`.
    pub fn output_filename(stored_name: &str) -> String {
        let stem = stored_name
            .strip_suffix(CSV_EXTENSION)
            .unwrap_or(stored_name);
        format!("{}_enriched{}", stem, CSV_EXTENSION)
    }

    /// Create a file in the store for writing.
    pub fn create(&self, filename: &str) -> Result<fs::File, FileError> {
        let path = self.root.join(validate_name(filename)?);
        Ok(fs::File::create(path)?)
    }

    /// Resolve a stored filename to its on-disk path for download.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, FileError> {
        let path = self.root.join(validate_name(filename)?);
        if !path.is_file() {
            return Err(FileError::NotFound(filename.to_string()));
        }
        Ok(path)
    }

    /// Delete stored files older than `max_age`. Returns the count.
    pub fn cleanup_older_than(&self, max_age: Duration) -> Result<usize, FileError> {
        let now = SystemTime::now();
        let mut cleaned = 0;

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("Skipping '{}': {}", entry.path().display(), e);
                    continue;
                }
            };

            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > max_age {
                fs::remove_file(entry.path())?;
                debug!("Cleaned up stale file '{}'", entry.path().display());
                cleaned += 1;
            }
        }

        if cleaned > 0 {
            info!("Cleaned up {} stale stored files", cleaned);
        }
        Ok(cleaned)
    }
}

/// Extract and validate the stem of an uploaded file name.
fn upload_stem(original_name: &str) -> Result<String, FileError> {
    // Only the final path component counts; browsers may send full paths
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if base.is_empty() {
        return Err(FileError::InvalidName(original_name.to_string()));
    }

    let lower = base.to_ascii_lowercase();
    let stem = lower
        .strip_suffix(CSV_EXTENSION)
        .ok_or_else(|| FileError::InvalidExtension(original_name.to_string()))?;
    if stem.is_empty() {
        return Err(FileError::InvalidName(original_name.to_string()));
    }

    Ok(base[..stem.len()].to_string())
}

/// Reject names that could escape the store directory.
fn validate_name(filename: &str) -> Result<&str, FileError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(FileError::InvalidName(filename.to_string()));
    }
    Ok(filename)
}
