//! Data models for the documentation hierarchy.
//!
//! This module defines the core data structures:
//! - `RawItem` - One item of the nested listing produced by a directory scan
//! - `Entry` - One indexed node (a container or a document)
//! - `Position` - A 2D point, used for seed coordinates and routed edges

use serde::{Deserialize, Serialize};

/// 2D position/vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One item of a raw nested listing.
///
/// This is the shape the directory scanner hands to the indexer. Containers
/// carry their children in discovery order; leaves must not have children.
///
/// ```json
/// {"name": "docs", "isContainer": true, "children": [
///     {"name": "a.md", "isContainer": false}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    /// File or directory name (not a path)
    pub name: String,

    /// Whether this item may own children
    pub is_container: bool,

    /// Child items in discovery order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawItem>,
}

impl RawItem {
    /// Create a container item with the given children
    pub fn container(name: impl Into<String>, children: Vec<RawItem>) -> Self {
        Self {
            name: name.into(),
            is_container: true,
            children,
        }
    }

    /// Create a leaf item
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_container: false,
            children: Vec::new(),
        }
    }
}

/// One node of the indexed hierarchy.
///
/// Ids are root-relative paths using `/` separators. Container ids (and
/// labels) end with a trailing `/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique, stable identifier (e.g., "docs/sub/b.md")
    pub id: String,

    /// Display name; ends with "/" iff this is a container
    pub label: String,

    /// Enclosing container id, `None` only for the root
    pub parent_id: Option<String>,

    /// Whether this entry may own children
    pub is_container: bool,

    /// Placeholder coordinate for a node that has not been laid out yet
    #[serde(default)]
    pub position: Position,

    /// Child ids in discovery order
    #[serde(default)]
    pub children: Vec<String>,

    /// Nearest reachable document (containers only)
    #[serde(default)]
    pub first_document_id: Option<String>,
}

impl Entry {
    /// Whether this entry is the hierarchy root
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Last path segment of the id, without a container's trailing `/`
    pub fn file_name(&self) -> &str {
        let path = self.id.trim_end_matches('/');
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Whether this leaf counts as a document for the given extensions.
    ///
    /// The id's last segment decides, not the display label. Extensions are
    /// compared case-insensitively and without the leading dot.
    pub fn is_document(&self, extensions: &[String]) -> bool {
        if self.is_container {
            return false;
        }
        match self.file_name().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_entry(label: &str) -> Entry {
        Entry {
            id: format!("docs/{}", label),
            label: label.to_string(),
            parent_id: Some("docs/".to_string()),
            is_container: false,
            position: Position::default(),
            children: Vec::new(),
            first_document_id: None,
        }
    }

    #[test]
    fn test_is_document_matches_extension() {
        let md = vec!["md".to_string()];
        assert!(leaf_entry("a.md").is_document(&md));
        assert!(leaf_entry("README.MD").is_document(&md));
        assert!(!leaf_entry("image.png").is_document(&md));
        assert!(!leaf_entry("Makefile").is_document(&md));
        assert!(!leaf_entry(".md").is_document(&md));
    }

    #[test]
    fn test_is_document_ignores_label() {
        let md = vec!["md".to_string()];
        let mut entry = leaf_entry("a.md");
        entry.label = "a.txt".to_string();
        assert!(entry.is_document(&md));

        let mut entry = leaf_entry("logo.png");
        entry.label = "logo.md".to_string();
        assert!(!entry.is_document(&md));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(leaf_entry("a.md").file_name(), "a.md");
        let mut entry = leaf_entry("guide/");
        entry.is_container = true;
        assert_eq!(entry.file_name(), "guide");
    }

    #[test]
    fn test_container_is_never_document() {
        let mut entry = leaf_entry("notes.md/");
        entry.is_container = true;
        assert!(!entry.is_document(&["md".to_string()]));
    }

    #[test]
    fn test_raw_item_json_shape() {
        let json = r#"{"name":"docs","isContainer":true,"children":[{"name":"a.md","isContainer":false}]}"#;
        let item: RawItem = serde_json::from_str(json).unwrap();
        assert_eq!(
            item,
            RawItem::container("docs", vec![RawItem::leaf("a.md")])
        );
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_string(&leaf_entry("a.md")).unwrap();
        assert!(json.contains("\"parentId\":\"docs/\""));
        assert!(json.contains("\"isContainer\":false"));
        assert!(json.contains("\"firstDocumentId\":null"));
    }
}
