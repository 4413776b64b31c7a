//! Port definitions.
//!
//! Traits the engine depends on, implemented by adapter crates (or by test
//! fakes). The engine never talks to reqwest, the zip crate, or a terminal
//! directly.

mod client;
mod emitter;
mod extractor;

pub use client::{ClientError, RepoClient};
pub use emitter::{ChannelEmitter, EventEmitter, NoopEmitter};
pub use extractor::{ArchiveExtractor, ExtractError, ExtractedArchive};
