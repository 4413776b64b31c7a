//! Zip extraction adapter.
//!
//! Implements the `ArchiveExtractor` port with the `zip` crate. Extraction
//! is synchronous CPU/disk work, so it runs on the blocking pool.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use reposnap_core::{ArchiveExtractor, ExtractError, ExtractedArchive};

/// Extractor for the zip archives the hosting model serves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveExtractor for ZipExtractor {
    async fn extract(
        &self,
        archive: &Path,
        out_dir: &Path,
    ) -> Result<ExtractedArchive, ExtractError> {
        let archive = archive.to_path_buf();
        let out_dir = out_dir.to_path_buf();
        tokio::task::spawn_blocking(move || extract_blocking(&archive, &out_dir))
            .await
            .map_err(|e| ExtractError::InvalidArchive {
                path: PathBuf::new(),
                message: format!("extraction task failed: {e}"),
            })?
    }
}

fn extract_blocking(archive: &Path, out_dir: &Path) -> Result<ExtractedArchive, ExtractError> {
    let file = std::fs::File::open(archive).map_err(|e| ExtractError::InvalidArchive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ExtractError::InvalidArchive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    if zip.is_empty() {
        return Err(ExtractError::Empty {
            path: archive.to_path_buf(),
        });
    }

    // Archives from the supported hosting model place everything under one
    // top-level folder; its name is the first component of the first entry.
    let root_dir = {
        let first = zip.by_index(0).map_err(|e| ExtractError::InvalidArchive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;
        first
            .name()
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    };

    let mut files = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| ExtractError::InvalidArchive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.is_dir() {
            continue;
        }
        // enclosed_name rejects entries that would escape the output dir.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };

        let dest = out_dir.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExtractError::Io {
                entry: entry.name().to_string(),
                source: e,
            })?;
        }
        let mut out = std::fs::File::create(&dest).map_err(|e| ExtractError::Io {
            entry: entry.name().to_string(),
            source: e,
        })?;
        io::copy(&mut entry, &mut out).map_err(|e| ExtractError::Io {
            entry: entry.name().to_string(),
            source: e,
        })?;
        files.push(relative);
    }

    Ok(ExtractedArchive { root_dir, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build a zip shaped like a repository archive: one top-level folder
    /// containing the tree.
    fn repo_zip(dir: &Path, root: &str) -> PathBuf {
        let path = dir.join("archive.zip");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        writer.add_directory(format!("{root}/"), options).unwrap();
        writer
            .start_file(format!("{root}/README.md"), options)
            .unwrap();
        writer.write_all(b"# hello\n").unwrap();
        writer
            .add_directory(format!("{root}/src/"), options)
            .unwrap();
        writer
            .start_file(format!("{root}/src/main.rs"), options)
            .unwrap();
        writer.write_all(b"fn main() {}\n").unwrap();
        writer.finish().unwrap();
        path
    }

    #[tokio::test]
    async fn extracts_tree_and_reports_root() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = repo_zip(tmp.path(), "repo-main");
        let out = tmp.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let extracted = ZipExtractor::new().extract(&archive, &out).await.unwrap();

        assert_eq!(extracted.root_dir, "repo-main");
        assert_eq!(extracted.files.len(), 2);
        assert_eq!(
            std::fs::read(out.join("repo-main/README.md")).unwrap(),
            b"# hello\n"
        );
        assert_eq!(
            std::fs::read(out.join("repo-main/src/main.rs")).unwrap(),
            b"fn main() {}\n"
        );
    }

    #[tokio::test]
    async fn rejects_missing_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ZipExtractor::new()
            .extract(&tmp.path().join("absent.zip"), tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidArchive { .. }));
    }

    #[tokio::test]
    async fn rejects_empty_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.zip");
        let writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        writer.finish().unwrap();

        let err = ZipExtractor::new()
            .extract(&path, tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Empty { .. }));
    }
}
