//! Hierarchy indexer.
//!
//! Turns a raw nested listing into a flat, id-addressable table of
//! [`Entry`] records plus the `ById` / `ByParent` lookups. The table is an
//! arena: entries live in one `Vec` in discovery order and every lookup is
//! an index into it, so the invariants below can be checked independently of
//! any in-memory nesting.
//!
//! Invariants of a constructed [`DocIndex`]:
//! - exactly one root (`parent_id == None`), and it is a container
//! - every other entry's parent exists and is a container
//! - every entry is reachable from the root
//! - `children` of a container lists exactly the entries naming it as
//!   parent, in discovery order
//! - `first_document_id` follows the direct-document-then-first-subcontainer
//!   rule
//!
//! Construction either succeeds completely or fails with a
//! [`ConstructionError`]; no partial index is ever returned.

pub mod scan;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{Entry, Position, RawItem};
use crate::{Error, Result};

/// Key used in `ByParent` for the root's (absent) parent.
pub const ROOT_PARENT_KEY: &str = "null";

/// Seed spacing between siblings, in layout units.
pub const SEED_SIBLING_SPACING: f64 = 250.0;

/// Seed spacing between depth levels, in layout units.
pub const SEED_DEPTH_SPACING: f64 = 120.0;

/// Malformed raw hierarchy. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("entry {id} references missing parent {parent}")]
    DanglingParent { id: String, parent: String },

    #[error("entry {id} has parent {parent}, which is not a container")]
    ParentNotContainer { id: String, parent: String },

    #[error("hierarchy has no root entry")]
    MissingRoot,

    #[error("hierarchy has more than one root: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("root entry must be a container: {0}")]
    RootNotContainer(String),

    #[error("leaf {0} cannot have children")]
    LeafWithChildren(String),

    #[error("item with an empty name under {0}")]
    EmptyName(String),

    #[error("entry {0} is not reachable from the root")]
    Unreachable(String),

    #[error("id {0:?} is reserved for the root's parent key")]
    ReservedId(String),

    #[error("invalid id {0:?}: ids use '/' separators and only container ids end with '/'")]
    InvalidId(String),

    #[error("entry {id} has label {label:?}; labels end with '/' exactly for containers")]
    LabelMismatch { id: String, label: String },
}

/// Options that shape index construction.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOptions {
    /// Leaf extensions (without the dot) that count as documents
    pub document_extensions: Vec<String>,
    /// Seed coordinate spacing between siblings
    pub sibling_spacing: f64,
    /// Seed coordinate spacing between depth levels
    pub depth_spacing: f64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            document_extensions: vec!["md".to_string()],
            sibling_spacing: SEED_SIBLING_SPACING,
            depth_spacing: SEED_DEPTH_SPACING,
        }
    }
}

impl IndexOptions {
    /// Replace the set of document extensions
    pub fn with_document_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }
}

/// Persisted form of an index.
///
/// `by_id` and `by_parent` are derived from `nodes`; they are written out for
/// consumers that want direct lookups, and rebuilt (not trusted) on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    pub nodes: Vec<Entry>,
    #[serde(default)]
    pub by_id: BTreeMap<String, Entry>,
    #[serde(default)]
    pub by_parent: BTreeMap<String, Vec<String>>,
}

/// Immutable index over a documentation hierarchy.
#[derive(Debug, Clone)]
pub struct DocIndex {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
    by_parent: BTreeMap<String, Vec<String>>,
    root: usize,
    options: IndexOptions,
}

/// Map a parent id to its `ByParent` key.
pub fn parent_key(parent_id: Option<&str>) -> &str {
    parent_id.unwrap_or(ROOT_PARENT_KEY)
}

/// Normalize a raw item name: platform separators become `/` and trailing
/// separators are dropped.
fn normalize_name(name: &str) -> String {
    let name = name.replace('\\', "/");
    let name = name.strip_prefix("./").unwrap_or(&name);
    name.trim_end_matches('/').to_string()
}

fn label_for(name: &str, is_container: bool) -> String {
    let last = name.rsplit('/').next().unwrap_or(name);
    if is_container {
        format!("{}/", last)
    } else {
        last.to_string()
    }
}

/// Per-entry checks on id and label form.
fn check_entry_shape(entry: &Entry) -> std::result::Result<(), ConstructionError> {
    if entry.id == ROOT_PARENT_KEY {
        return Err(ConstructionError::ReservedId(entry.id.clone()));
    }
    let path = entry.id.trim_end_matches('/');
    if path.is_empty()
        || entry.id.contains('\\')
        || entry.id.ends_with('/') != entry.is_container
        || path.split('/').any(str::is_empty)
    {
        return Err(ConstructionError::InvalidId(entry.id.clone()));
    }
    let name = entry.label.trim_end_matches('/');
    if name.is_empty() || name.contains('/') || entry.label.ends_with('/') != entry.is_container {
        return Err(ConstructionError::LabelMismatch {
            id: entry.id.clone(),
            label: entry.label.clone(),
        });
    }
    Ok(())
}

impl DocIndex {
    /// Build an index from a raw nested listing whose top item is the root.
    pub fn from_raw(root: &RawItem, options: IndexOptions) -> Result<Self> {
        let entries = flatten(root)?;
        Self::from_entries(entries, options)
    }

    /// Build an index from flat entries in discovery order.
    ///
    /// Only `id`, `label`, `parent_id` and `is_container` are read; the
    /// derived fields (`children`, `first_document_id`, `position`) are
    /// recomputed.
    pub fn from_entries(mut entries: Vec<Entry>, options: IndexOptions) -> Result<Self> {
        for entry in &entries {
            check_entry_shape(entry)?;
        }

        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.id.clone(), idx).is_some() {
                return Err(ConstructionError::DuplicateId(entry.id.clone()).into());
            }
        }

        let roots: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.parent_id.is_none())
            .map(|(idx, _)| idx)
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(ConstructionError::MissingRoot.into()),
            [only] => *only,
            many => {
                let ids = many.iter().map(|&i| entries[i].id.clone()).collect();
                return Err(ConstructionError::MultipleRoots(ids).into());
            }
        };
        if !entries[root].is_container {
            return Err(ConstructionError::RootNotContainer(entries[root].id.clone()).into());
        }

        // Group by parent, preserving discovery order within each group.
        let mut by_parent: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut child_indices: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(parent) = entry.parent_id.as_deref() {
                let parent_idx = *by_id.get(parent).ok_or_else(|| {
                    ConstructionError::DanglingParent {
                        id: entry.id.clone(),
                        parent: parent.to_string(),
                    }
                })?;
                if !entries[parent_idx].is_container {
                    return Err(ConstructionError::ParentNotContainer {
                        id: entry.id.clone(),
                        parent: parent.to_string(),
                    }
                    .into());
                }
                child_indices[parent_idx].push(idx);
            }
            by_parent
                .entry(parent_key(entry.parent_id.as_deref()).to_string())
                .or_default()
                .push(entry.id.clone());
        }

        // Preorder walk from the root: reachability, depth and sibling index.
        let mut preorder: Vec<usize> = Vec::with_capacity(entries.len());
        let mut seeds: Vec<(usize, usize)> = vec![(0, 0); entries.len()];
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, 0, 0)];
        while let Some((idx, depth, sibling)) = stack.pop() {
            preorder.push(idx);
            seeds[idx] = (sibling, depth);
            for (pos, &child) in child_indices[idx].iter().enumerate().rev() {
                stack.push((child, depth + 1, pos));
            }
        }
        if preorder.len() != entries.len() {
            let mut reached = vec![false; entries.len()];
            for &idx in &preorder {
                reached[idx] = true;
            }
            if let Some(idx) = reached.iter().position(|r| !r) {
                return Err(ConstructionError::Unreachable(entries[idx].id.clone()).into());
            }
        }

        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        for (idx, entry) in entries.iter_mut().enumerate() {
            let (sibling, depth) = seeds[idx];
            entry.position = Position::new(
                sibling as f64 * options.sibling_spacing,
                depth as f64 * options.depth_spacing,
            );
            entry.children = child_indices[idx]
                .iter()
                .map(|&c| ids[c].clone())
                .collect();
            entry.first_document_id = None;
        }

        // Children before parents, so each container sees its subcontainers'
        // results.
        for &idx in preorder.iter().rev() {
            if !entries[idx].is_container {
                continue;
            }
            let direct = child_indices[idx]
                .iter()
                .find(|&&c| entries[c].is_document(&options.document_extensions));
            let found = match direct {
                Some(&c) => Some(entries[c].id.clone()),
                None => child_indices[idx]
                    .iter()
                    .filter(|&&c| entries[c].is_container)
                    .find_map(|&c| entries[c].first_document_id.clone()),
            };
            entries[idx].first_document_id = found;
        }

        tracing::debug!(
            entries = entries.len(),
            root = %entries[root].id,
            "built document index"
        );

        Ok(Self {
            entries,
            by_id,
            by_parent,
            root,
            options,
        })
    }

    /// Rebuild an index from a persisted snapshot.
    pub fn from_snapshot(snapshot: IndexSnapshot, options: IndexOptions) -> Result<Self> {
        Self::from_entries(snapshot.nodes, options)
    }

    /// Produce the persisted form of this index.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            nodes: self.entries.clone(),
            by_id: self
                .entries
                .iter()
                .map(|e| (e.id.clone(), e.clone()))
                .collect(),
            by_parent: self.by_parent.clone(),
        }
    }

    /// The root entry
    pub fn root(&self) -> &Entry {
        &self.entries[self.root]
    }

    /// The root id
    pub fn root_id(&self) -> &str {
        &self.entries[self.root].id
    }

    /// Get an entry by id
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// Get an entry by id, treating a miss as [`Error::NotFound`]
    pub fn lookup(&self, id: &str) -> Result<&Entry> {
        self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Whether an entry with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All entries in discovery order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed index (the root exists)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Child ids of `key` in discovery order. Use [`ROOT_PARENT_KEY`] for
    /// the level above the root. Unknown keys and leaves yield an empty
    /// slice.
    pub fn children_of(&self, key: &str) -> &[String] {
        self.by_parent.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The `ByParent` lookup
    pub fn by_parent(&self) -> &BTreeMap<String, Vec<String>> {
        &self.by_parent
    }

    /// The document an activation of `id` should navigate to, if any
    pub fn first_document(&self, id: &str) -> Option<&Entry> {
        self.get(id)?
            .first_document_id
            .as_deref()
            .and_then(|doc| self.get(doc))
    }

    /// Options the index was built with
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }
}

/// Flatten a raw listing into entries in depth-first discovery order.
fn flatten(root: &RawItem) -> Result<Vec<Entry>> {
    let root_name = normalize_name(&root.name);
    if root_name.is_empty() {
        return Err(ConstructionError::EmptyName(ROOT_PARENT_KEY.to_string()).into());
    }
    if !root.is_container {
        return Err(ConstructionError::RootNotContainer(root_name).into());
    }

    let mut entries = Vec::new();
    let mut stack: Vec<(&RawItem, String, Option<String>)> =
        vec![(root, format!("{}/", root_name), None)];

    while let Some((item, id, parent_id)) = stack.pop() {
        if !item.is_container && !item.children.is_empty() {
            return Err(ConstructionError::LeafWithChildren(id).into());
        }

        for child in item.children.iter().rev() {
            let name = normalize_name(&child.name);
            if name.is_empty() {
                return Err(ConstructionError::EmptyName(id.clone()).into());
            }
            let child_id = if child.is_container {
                format!("{}{}/", id, name)
            } else {
                format!("{}{}", id, name)
            };
            stack.push((child, child_id, Some(id.clone())));
        }

        entries.push(Entry {
            label: label_for(id.trim_end_matches('/'), item.is_container),
            id,
            parent_id,
            is_container: item.is_container,
            position: Position::default(),
            children: Vec::new(),
            first_document_id: None,
        });
    }

    Ok(entries)
}
