//! Visibility projection.
//!
//! The set of rendered entries is a pure function of the index and the
//! expand history. The history is an ordered stack whose bottom is always
//! the root: expanding pushes, "back" pops the most recent expansion.

use std::collections::HashSet;

use serde::Serialize;

use crate::index::DocIndex;
use crate::models::Entry;

/// Ordered expand history.
///
/// The root sits at the bottom of the stack and is never popped, so the
/// stack is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpandedStack {
    ids: Vec<String>,
}

impl ExpandedStack {
    /// Create a stack holding only the root
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            ids: vec![root.into()],
        }
    }

    /// Create a stack holding only the root of `index`
    pub fn for_index(index: &DocIndex) -> Self {
        Self::new(index.root_id())
    }

    /// The permanent bottom entry
    pub fn root(&self) -> &str {
        &self.ids[0]
    }

    /// The most recently expanded id (the root when nothing else is open)
    pub fn last(&self) -> &str {
        &self.ids[self.ids.len() - 1]
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove and return the most recent expansion. The root is never
    /// removed; returns `None` when it is the only member.
    pub fn pop_last(&mut self) -> Option<String> {
        if self.ids.len() > 1 {
            self.ids.pop()
        } else {
            None
        }
    }

    /// Whether anything besides the root can be collapsed
    pub fn can_collapse(&self) -> bool {
        self.ids.len() > 1
    }

    /// Whether `id` has been expanded
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|e| e == id)
    }

    /// Number of members, root included
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: the root is a permanent member
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Members from oldest (root) to newest
    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

/// Parent-child edge between two visible entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleEdge {
    pub source_id: String,
    pub target_id: String,
}

impl VisibleEdge {
    /// Create a new edge
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_id: source.into(),
            target_id: target.into(),
        }
    }
}

/// Entries currently eligible for rendering, in depth-first discovery
/// order, with the edges between them.
#[derive(Debug, Clone, Default)]
pub struct VisibleGraph<'a> {
    pub nodes: Vec<&'a Entry>,
    pub edges: Vec<VisibleEdge>,
}

impl<'a> VisibleGraph<'a> {
    /// Visible ids in order
    pub fn ids(&self) -> Vec<&'a str> {
        self.nodes.iter().map(|e| e.id.as_str()).collect()
    }

    /// Whether `id` is visible
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|e| e.id == id)
    }

    /// Number of visible entries
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is visible
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Project the visible subtree of `index` for the given expand history.
///
/// Starting at the root, each entry is emitted once and its children are
/// descended into only when the entry has been expanded.
pub fn project<'a>(index: &'a DocIndex, expanded: &ExpandedStack) -> VisibleGraph<'a> {
    let open: HashSet<&str> = expanded.as_slice().iter().map(String::as_str).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes: Vec<&'a Entry> = Vec::new();
    let mut stack: Vec<&'a str> = vec![index.root_id()];

    while let Some(id) = stack.pop() {
        let Some(entry) = index.get(id) else {
            continue;
        };
        if !seen.insert(entry.id.as_str()) {
            continue;
        }
        nodes.push(entry);
        if open.contains(id) {
            for child in index.children_of(id).iter().rev() {
                stack.push(child.as_str());
            }
        }
    }

    let edges: Vec<VisibleEdge> = nodes
        .iter()
        .filter_map(|e| {
            let parent = e.parent_id.as_deref()?;
            seen.contains(parent).then(|| VisibleEdge::new(parent, e.id.as_str()))
        })
        .collect();

    tracing::debug!(
        visible = nodes.len(),
        edges = edges.len(),
        expanded = ?expanded.as_slice(),
        "projected visible tree"
    );

    VisibleGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexOptions;
    use crate::models::RawItem;

    fn sample_index() -> DocIndex {
        let raw = RawItem::container(
            "docs",
            vec![
                RawItem::leaf("a.md"),
                RawItem::container("sub", vec![RawItem::leaf("b.md")]),
                RawItem::container(
                    "guide",
                    vec![
                        RawItem::container("deep", vec![RawItem::leaf("c.md")]),
                        RawItem::leaf("d.md"),
                    ],
                ),
            ],
        );
        DocIndex::from_raw(&raw, IndexOptions::default()).unwrap()
    }

    #[test]
    fn test_stack_root_is_permanent() {
        let mut stack = ExpandedStack::new("docs/");
        assert_eq!(stack.pop_last(), None);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.root(), "docs/");
        assert!(!stack.can_collapse());
    }

    #[test]
    fn test_stack_push_is_idempotent() {
        let mut stack = ExpandedStack::new("docs/");
        assert!(stack.push("docs/sub/"));
        assert!(!stack.push("docs/sub/"));
        assert!(!stack.push("docs/"));
        assert_eq!(stack.as_slice(), ["docs/".to_string(), "docs/sub/".to_string()]);
        assert_eq!(stack.last(), "docs/sub/");
    }

    #[test]
    fn test_stack_pop_order() {
        let mut stack = ExpandedStack::new("docs/");
        stack.push("docs/guide/");
        stack.push("docs/guide/deep/");
        assert_eq!(stack.pop_last().as_deref(), Some("docs/guide/deep/"));
        assert_eq!(stack.pop_last().as_deref(), Some("docs/guide/"));
        assert_eq!(stack.pop_last(), None);
    }

    #[test]
    fn test_root_only_expanded() {
        let index = sample_index();
        let stack = ExpandedStack::for_index(&index);
        let visible = project(&index, &stack);
        assert_eq!(
            visible.ids(),
            vec!["docs/", "docs/a.md", "docs/sub/", "docs/guide/"]
        );
        assert_eq!(visible.edges.len(), 3);
        assert_eq!(visible.edges[0], VisibleEdge::new("docs/", "docs/a.md"));
    }

    #[test]
    fn test_expand_adds_children_in_place() {
        let index = sample_index();
        let mut stack = ExpandedStack::for_index(&index);
        stack.push("docs/sub/");
        let visible = project(&index, &stack);
        assert_eq!(
            visible.ids(),
            vec!["docs/", "docs/a.md", "docs/sub/", "docs/sub/b.md", "docs/guide/"]
        );
        assert_eq!(visible.edges.len(), visible.len() - 1);
    }

    #[test]
    fn test_expand_collapse_on_minimal_tree() {
        let raw = RawItem::container(
            "docs",
            vec![
                RawItem::leaf("a.md"),
                RawItem::container("sub", vec![RawItem::leaf("b.md")]),
            ],
        );
        let index = DocIndex::from_raw(&raw, IndexOptions::default()).unwrap();
        let mut stack = ExpandedStack::for_index(&index);

        let visible = project(&index, &stack);
        assert_eq!(visible.ids(), vec!["docs/", "docs/a.md", "docs/sub/"]);
        assert_eq!(
            visible.edges,
            vec![
                VisibleEdge::new("docs/", "docs/a.md"),
                VisibleEdge::new("docs/", "docs/sub/"),
            ]
        );

        stack.push("docs/sub/");
        let visible = project(&index, &stack);
        assert_eq!(
            visible.ids(),
            vec!["docs/", "docs/a.md", "docs/sub/", "docs/sub/b.md"]
        );
        assert_eq!(visible.edges.len(), 3);
        assert!(visible.edges.contains(&VisibleEdge::new("docs/sub/", "docs/sub/b.md")));

        stack.pop_last();
        let visible = project(&index, &stack);
        assert_eq!(visible.ids(), vec!["docs/", "docs/a.md", "docs/sub/"]);
        assert_eq!(visible.edges.len(), 2);
    }

    #[test]
    fn test_expand_then_collapse_restores() {
        let index = sample_index();
        let mut stack = ExpandedStack::for_index(&index);
        stack.push("docs/guide/");
        let before = project(&index, &stack).ids();

        stack.push("docs/guide/deep/");
        let during = project(&index, &stack);
        assert!(during.contains("docs/guide/deep/c.md"));

        stack.pop_last();
        assert_eq!(project(&index, &stack).ids(), before);
    }

    #[test]
    fn test_expanded_but_hidden_container_stays_hidden() {
        // deep/ is expanded but its parent guide/ is not, so neither deep/
        // nor its children are visible.
        let index = sample_index();
        let mut stack = ExpandedStack::for_index(&index);
        stack.push("docs/guide/deep/");
        let visible = project(&index, &stack);
        assert!(!visible.contains("docs/guide/deep/"));
        assert!(!visible.contains("docs/guide/deep/c.md"));
    }

    #[test]
    fn test_visible_closure_and_no_duplicates() {
        let index = sample_index();
        let mut stack = ExpandedStack::for_index(&index);
        stack.push("docs/guide/");
        stack.push("docs/sub/");
        stack.push("docs/guide/deep/");
        stack.push("docs/a.md");
        let visible = project(&index, &stack);

        let ids = visible.ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(ids.len(), index.len());

        for entry in &visible.nodes {
            if let Some(parent) = entry.parent_id.as_deref() {
                assert!(visible.contains(parent));
                assert!(stack.contains(parent));
            }
        }
        assert_eq!(visible.edges.len(), visible.len() - 1);
    }

    #[test]
    fn test_unknown_expanded_id_is_ignored() {
        let index = sample_index();
        let mut stack = ExpandedStack::for_index(&index);
        stack.push("docs/missing/");
        assert_eq!(project(&index, &stack).len(), 4);
    }
}
