#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

mod engine;
mod extract;
mod fallback;
pub mod fs;
mod job;
mod walker;

pub use engine::Snapshotter;
pub use extract::ZipExtractor;
pub use fs::FsError;
pub use job::{FetchError, FetchOutcome};

pub use reposnap_core::{
    ArchiveExtractor, ChannelEmitter, EventEmitter, FetchEvent, NoopEmitter, RepoClient, RepoSpec,
};
