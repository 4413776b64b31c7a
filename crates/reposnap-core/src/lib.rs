#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod entry;
pub mod events;
pub mod ports;
pub mod repo;

// Re-export commonly used types for convenience
pub use entry::{EntryKind, TreeEntry};
pub use events::FetchEvent;
pub use ports::{
    ArchiveExtractor, ChannelEmitter, ClientError, EventEmitter, ExtractError, ExtractedArchive,
    NoopEmitter, RepoClient,
};
pub use repo::{DEFAULT_REF, InvalidRepoSpec, RepoSpec};
