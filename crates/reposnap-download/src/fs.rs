//! Local filesystem operations.
//!
//! Thin, fallible wrappers over `tokio::fs` so every failure carries the
//! operation and the path it happened on. Directory creation is idempotent;
//! siblings may arrive in any order, so an already-existing directory is
//! never an error.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A failed filesystem operation, tagged with what was attempted and where.
#[derive(Debug, Error)]
#[error("{op} failed for {path}: {source}")]
pub struct FsError {
    /// What was being attempted.
    pub op: &'static str,
    /// The path involved.
    pub path: PathBuf,
    /// Underlying error.
    #[source]
    pub source: std::io::Error,
}

impl FsError {
    fn new(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Create a directory and any missing parents. Safe to call on an existing
/// directory.
pub async fn ensure_dir(path: &Path) -> Result<(), FsError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| FsError::new("create directory", path, e))
}

/// Create an empty file, creating missing parent directories first.
pub async fn create_placeholder(path: &Path) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FsError::new("create file", path, e))?;
    }
    tokio::fs::File::create(path)
        .await
        .map(|_| ())
        .map_err(|e| FsError::new("create file", path, e))
}

/// Write full byte content to a file.
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), FsError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| FsError::new("write file", path, e))
}

/// Delete a file or directory (directories recursively).
pub async fn remove_path(path: &Path) -> Result<(), FsError> {
    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        // Already gone counts as removed.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::new("remove", path, e)),
    };

    let result = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    result.map_err(|e| FsError::new("remove", path, e))
}

/// Move a directory to a new location.
pub async fn rename_dir(from: &Path, to: &Path) -> Result<(), FsError> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| FsError::new("rename directory", from, e))
}

/// Recursively remove a directory.
pub async fn remove_dir_all(path: &Path) -> Result<(), FsError> {
    tokio::fs::remove_dir_all(path)
        .await
        .map_err(|e| FsError::new("remove directory", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).await.unwrap();
        ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn placeholder_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("x/y/z.txt");
        create_placeholder(&file).await.unwrap();
        assert!(file.is_file());
        assert_eq!(tokio::fs::read(&file).await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn write_file_replaces_placeholder_content() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f.bin");
        create_placeholder(&file).await.unwrap();
        write_file(&file, b"hello").await.unwrap();
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn remove_path_handles_files_dirs_and_missing() {
        let tmp = tempfile::tempdir().unwrap();

        let file = tmp.path().join("f");
        create_placeholder(&file).await.unwrap();
        remove_path(&file).await.unwrap();
        assert!(!file.exists());

        let dir = tmp.path().join("d/deep");
        ensure_dir(&dir).await.unwrap();
        remove_path(&tmp.path().join("d")).await.unwrap();
        assert!(!tmp.path().join("d").exists());

        // Missing is fine
        remove_path(&tmp.path().join("nope")).await.unwrap();
    }

    #[tokio::test]
    async fn rename_dir_moves_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let from = tmp.path().join("from");
        ensure_dir(&from.join("inner")).await.unwrap();
        let to = tmp.path().join("to");
        rename_dir(&from, &to).await.unwrap();
        assert!(to.join("inner").is_dir());
        assert!(!from.exists());
    }

    #[tokio::test]
    async fn errors_name_the_operation_and_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let err = remove_dir_all(&missing).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("remove directory"));
        assert!(msg.contains("missing"));
    }
}
