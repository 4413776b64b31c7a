//! Wire types for the GitHub contents API.

use reposnap_core::{EntryKind, TreeEntry};
use serde::Deserialize;

/// One element of a contents-API listing response.
///
/// Only the fields the traversal needs are decoded; the API sends many more.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsEntry {
    /// Repository-relative path of the item.
    pub path: String,
    /// Raw kind string (`"dir"`, `"file"`, or something unexpected).
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<ContentsEntry> for TreeEntry {
    fn from(wire: ContentsEntry) -> Self {
        let kind = EntryKind::from_wire(&wire.kind);
        Self::new(wire.path, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_listing_response() {
        let json = r#"[
            {"path": "README.md", "type": "file", "sha": "abc", "size": 12},
            {"path": "src", "type": "dir"},
            {"path": "link", "type": "symlink"}
        ]"#;
        let entries: Vec<ContentsEntry> = serde_json::from_str(json).unwrap();
        let entries: Vec<TreeEntry> = entries.into_iter().map(Into::into).collect();

        assert_eq!(entries[0], TreeEntry::new("README.md", EntryKind::File));
        assert_eq!(entries[1], TreeEntry::new("src", EntryKind::Dir));
        assert_eq!(
            entries[2],
            TreeEntry::new("link", EntryKind::Other("symlink".to_string()))
        );
    }
}
