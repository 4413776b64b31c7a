//! Listing entries.

/// Kind of a listing entry.
///
/// The listing API only defines `dir` and `file`; anything else is carried
/// verbatim so the malformed-entry notification can report what was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory, to be created locally and recursed into.
    Dir,
    /// A file, to be fetched and written locally.
    File,
    /// An unrecognized kind string.
    Other(String),
}

impl EntryKind {
    /// Map a wire-level `type` string to a kind.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "dir" => Self::Dir,
            "file" => Self::File,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single item returned by a listing call.
///
/// Transient: consumed immediately into either a recursive listing operation
/// or a raw-content fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path of the item.
    pub path: String,
    /// What the item is.
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Create an entry.
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_wire() {
        assert_eq!(EntryKind::from_wire("dir"), EntryKind::Dir);
        assert_eq!(EntryKind::from_wire("file"), EntryKind::File);
        assert_eq!(
            EntryKind::from_wire("symlink"),
            EntryKind::Other("symlink".to_string())
        );
    }
}
