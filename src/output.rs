//! Output files for one collection: `<dir>/<prefix>_<NNNN>.jpg`.
//!
//! The sequence starts at 1 and only advances when a file is written, so a
//! collection's files are numbered without gaps in write order. The directory
//! is created on first write.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Filesystem errors while writing collection output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The collection directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An image file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Sequential JPEG writer for one collection.
#[derive(Debug)]
pub struct CollectionOutput {
    dir: PathBuf,
    prefix: String,
    written: u32,
    dir_ready: bool,
}

impl CollectionOutput {
    /// Creates a writer; nothing touches the disk until the first [`save`](Self::save).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: sanitize_component(&prefix.into()),
            written: 0,
            dir_ready: false,
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename prefix after sanitization.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of files written so far.
    #[must_use]
    pub fn written(&self) -> u32 {
        self.written
    }

    /// The path the next [`save`](Self::save) will write to.
    #[must_use]
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(file_name(&self.prefix, self.written + 1))
    }

    /// Writes one encoded JPEG under the next sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] when the directory cannot be created or the
    /// file cannot be written; the sequence does not advance in that case.
    pub async fn save(&mut self, jpeg: &[u8]) -> Result<PathBuf, OutputError> {
        if !self.dir_ready {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|source| OutputError::CreateDir {
                    path: self.dir.clone(),
                    source,
                })?;
            self.dir_ready = true;
        }

        let path = self.next_path();
        tokio::fs::write(&path, jpeg)
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
        self.written += 1;
        debug!(path = %path.display(), sequence = self.written, "image written");
        Ok(path)
    }
}

/// `<prefix>_<NNNN>.jpg`, sequence zero-padded to four digits.
#[must_use]
pub fn file_name(prefix: &str, sequence: u32) -> String {
    format!("{prefix}_{sequence:04}.jpg")
}

/// Reduces a collection name or prefix to a single safe path component:
/// anything other than alphanumerics, `-` and `_` becomes `_`.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_name_zero_padded() {
        assert_eq!(file_name("white", 1), "white_0001.jpg");
        assert_eq!(file_name("white", 42), "white_0042.jpg");
        assert_eq!(file_name("white", 12345), "white_12345.jpg");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("black_velvet"), "black_velvet");
        assert_eq!(sanitize_component("../pink white"), "___pink_white");
        assert_eq!(sanitize_component("  "), "image");
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_numbers_sequentially() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("standard");
        let mut output = CollectionOutput::new(&dir, "standard");
        assert!(!dir.exists(), "directory must not exist before first write");

        let first = output.save(b"one").await.unwrap();
        let second = output.save(b"two").await.unwrap();

        assert_eq!(first, dir.join("standard_0001.jpg"));
        assert_eq!(second, dir.join("standard_0002.jpg"));
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(output.written(), 2);
        assert_eq!(output.next_path(), dir.join("standard_0003.jpg"));
    }

    #[tokio::test]
    async fn test_save_failure_does_not_advance_sequence() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let mut output = CollectionOutput::new(blocker.join("nested"), "x");
        let result = output.save(b"data").await;

        assert!(matches!(result, Err(OutputError::CreateDir { .. })));
        assert_eq!(output.written(), 0);
    }
}
