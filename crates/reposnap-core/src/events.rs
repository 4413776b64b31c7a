//! Job notifications - a single discriminated union for everything a job
//! reports while it runs.
//!
//! Consumers subscribe through an [`crate::ports::EventEmitter`]; nothing is
//! delivered through return values once a job has started.

use serde::{Deserialize, Serialize};

/// Single discriminated union for all job notifications.
///
/// `Done` fires exactly once per job, via exactly one of the two completion
/// paths (full traversal or archive fallback).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    /// A directory was created locally.
    DirCreated {
        /// Repository-relative path of the directory.
        path: String,
    },

    /// A file was fetched and written locally.
    FileCreated {
        /// Repository-relative path of the file.
        path: String,
    },

    /// Incremental traversal was abandoned in favor of the archive download.
    FallbackStarted {
        /// The archive URL being downloaded.
        url: String,
    },

    /// A listing entry had an unrecognized kind.
    MalformedEntry {
        /// Repository-relative path of the entry.
        path: String,
        /// The kind string the listing reported.
        kind: String,
    },

    /// A recoverable failure; the job keeps going where the contract allows.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },

    /// Terminal notification.
    Done,
}

impl FetchEvent {
    /// Create a directory-created event.
    pub fn dir_created(path: impl Into<String>) -> Self {
        Self::DirCreated { path: path.into() }
    }

    /// Create a file-created event.
    pub fn file_created(path: impl Into<String>) -> Self {
        Self::FileCreated { path: path.into() }
    }

    /// Create a fallback-started event.
    pub fn fallback_started(url: impl Into<String>) -> Self {
        Self::FallbackStarted { url: url.into() }
    }

    /// Create a malformed-entry event.
    pub fn malformed_entry(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::MalformedEntry {
            path: path.into(),
            kind: kind.into(),
        }
    }

    /// Create an error event from anything displayable.
    pub fn error(cause: impl std::fmt::Display) -> Self {
        Self::Error {
            message: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = FetchEvent::dir_created("src/lib");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "dir_created");
        assert_eq!(json["path"], "src/lib");

        let json = serde_json::to_value(FetchEvent::Done).unwrap();
        assert_eq!(json["type"], "done");
    }

    #[test]
    fn round_trips_malformed_entry() {
        let event = FetchEvent::malformed_entry("weird", "symlink");
        let json = serde_json::to_string(&event).unwrap();
        let back: FetchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn error_event_from_display() {
        let event = FetchEvent::error(std::io::Error::other("disk gone"));
        assert!(matches!(
            event,
            FetchEvent::Error { message } if message.contains("disk gone")
        ));
    }
}
