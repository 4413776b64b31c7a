//! Archive extraction port.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// What an extraction produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArchive {
    /// Name of the single top-level directory the archive expanded into.
    ///
    /// Repository archives from the supported hosting model always package
    /// their contents under one such root, named `<repository>-<revision>`.
    pub root_dir: String,
    /// Every file written, relative to the output directory.
    pub files: Vec<PathBuf>,
}

/// Errors from archive extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The archive file could not be opened or is not a valid archive.
    #[error("cannot read archive {path}: {message}")]
    InvalidArchive {
        /// Path of the archive file.
        path: PathBuf,
        /// Why it was rejected.
        message: String,
    },

    /// The archive contained no entries, so no root directory exists.
    #[error("archive {path} is empty")]
    Empty {
        /// Path of the archive file.
        path: PathBuf,
    },

    /// Writing an extracted entry failed.
    #[error("failed extracting {entry}: {source}")]
    Io {
        /// The entry being written.
        entry: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Port for unpacking a downloaded archive.
///
/// The engine does not inspect archive internals beyond this contract: given
/// an archive file and an output directory, the implementation writes the
/// entries and reports the top-level directory they live under.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `archive` into `out_dir`.
    async fn extract(
        &self,
        archive: &Path,
        out_dir: &Path,
    ) -> Result<ExtractedArchive, ExtractError>;
}
