//! Layered tree layout for the visible documentation graph.
//!
//! The algorithm runs in three phases over the visible forest:
//! - Rank assignment: roots are rank 0, every child is its parent's rank + 1
//! - Ordering: a preorder walk numbers nodes within each rank, so every
//!   subtree occupies a contiguous block and tree edges never cross
//! - Coordinates: primary = `margin + rank * rank_spacing`; secondary is a
//!   running offset per rank advancing by `secondary extent + node_spacing`
//!
//! Vertical layouts additionally re-centre every rank on the root so it
//! stays centred over subtrees of differing width.
//!
//! Both orientations share this core; only the [`route::AxisMap`] and the
//! [`route::EdgeRouter`] differ. Layout is a pure function of its input.

pub mod route;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Entry, Position};
use crate::visibility::{VisibleEdge, VisibleGraph};
use crate::{Error, Result};

pub use route::{Anchor, AxisMap, EdgeRouter, RouteStyle};

/// Layout direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Ranks progress left to right
    #[default]
    Horizontal,
    /// Ranks progress top to bottom
    Vertical,
}

impl Orientation {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" | "h" | "lr" => Some(Orientation::Horizontal),
            "vertical" | "v" | "tb" => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }

    /// The other orientation
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown orientation '{}'", s))
    }
}

/// Edge set inconsistent with the node set handed to the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferentialError {
    #[error("edge {source_id} -> {target_id} references unknown node {missing}")]
    UnknownEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("node {0} appears more than once")]
    DuplicateNode(String),

    #[error("node {0} has more than one parent")]
    MultipleParents(String),

    #[error("node {0} is not reachable from any root")]
    Unreachable(String),
}

/// Spacing and sizing for a layout.
///
/// `rank_spacing` is the distance between consecutive rank origins along the
/// primary axis, so it must be at least the node extent along that axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Gap between neighbouring nodes of the same rank
    pub node_spacing: f64,
    /// Distance between consecutive ranks
    pub rank_spacing: f64,
    /// Node box width
    pub node_width: f64,
    /// Node box height
    pub node_height: f64,
    /// Offset of the first rank and first slot from the origin
    pub margin: f64,
}

impl LayoutConfig {
    /// Left-to-right preset
    pub fn horizontal() -> Self {
        Self {
            node_spacing: 50.0,
            rank_spacing: 300.0,
            node_width: 180.0,
            node_height: 50.0,
            margin: 0.0,
        }
    }

    /// Top-to-bottom preset
    pub fn vertical() -> Self {
        Self {
            node_spacing: 100.0,
            rank_spacing: 95.0,
            node_width: 180.0,
            node_height: 45.0,
            margin: 40.0,
        }
    }

    /// Preset for an orientation
    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::horizontal(),
            Orientation::Vertical => Self::vertical(),
        }
    }

    /// Validate the config values for use with `orientation`.
    pub fn validate(&self, orientation: Orientation) -> Result<()> {
        let fields = [
            ("node-spacing", self.node_spacing, false),
            ("rank-spacing", self.rank_spacing, true),
            ("node-width", self.node_width, true),
            ("node-height", self.node_height, true),
            ("margin", self.margin, false),
        ];
        for (name, value, strictly_positive) in fields {
            let min_ok = if strictly_positive {
                value > 0.0
            } else {
                value >= 0.0
            };
            let ok = value.is_finite() && min_ok;
            if !ok {
                return Err(Error::InvalidInput(format!(
                    "{} must be {}, got {}",
                    name,
                    if strictly_positive { "positive" } else { "non-negative" },
                    value
                )));
            }
        }

        let axes = AxisMap::new(orientation, self);
        if self.rank_spacing < axes.primary_extent {
            return Err(Error::InvalidInput(format!(
                "rank-spacing {} is smaller than the {} node extent {}",
                self.rank_spacing, orientation, axes.primary_extent
            )));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::horizontal()
    }
}

/// A positioned node. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub rank: usize,
    pub order_in_rank: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub is_container: bool,
    pub first_document_id: Option<String>,
}

impl LayoutNode {
    /// Whether activating this node should navigate to a document
    pub fn navigates_to_document(&self) -> bool {
        self.is_container && self.first_document_id.is_some()
    }

    /// Centre of the node box
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A routed edge between two positioned nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub source_id: String,
    pub target_id: String,
    pub source_anchor: Anchor,
    pub target_anchor: Anchor,
    pub style: RouteStyle,
    pub routed_points: Vec<Position>,
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Result of laying out a visible graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub orientation: Orientation,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl Layout {
    /// A layout with no nodes and no edges
    pub fn empty(orientation: Orientation) -> Self {
        Self {
            orientation,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of ranks in use
    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0)
    }

    /// Nodes of one rank, in order
    pub fn rank(&self, rank: usize) -> Vec<&LayoutNode> {
        let mut nodes: Vec<&LayoutNode> = self.nodes.iter().filter(|n| n.rank == rank).collect();
        nodes.sort_by_key(|n| n.order_in_rank);
        nodes
    }

    /// Tight bounding box of all nodes (zero-sized when empty)
    pub fn bounds(&self) -> Bounds {
        let mut iter = self.nodes.iter();
        let Some(first) = iter.next() else {
            return Bounds::default();
        };
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x + first.width, first.y + first.height);
        for n in iter {
            min_x = min_x.min(n.x);
            min_y = min_y.min(n.y);
            max_x = max_x.max(n.x + n.width);
            max_y = max_y.max(n.y + n.height);
        }
        Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// Layered layout engine for one orientation.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    /// Layout direction
    pub orientation: Orientation,
    /// Spacing and sizing
    pub config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine using the orientation's preset
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            config: LayoutConfig::for_orientation(orientation),
        }
    }

    /// Create an engine with custom configuration
    pub fn with_config(orientation: Orientation, config: LayoutConfig) -> Self {
        Self {
            orientation,
            config,
        }
    }

    /// Lay out a projected graph
    pub fn layout(&self, graph: &VisibleGraph<'_>) -> Result<Layout> {
        self.layout_parts(&graph.nodes, &graph.edges)
    }

    /// Lay out nodes and edges given separately.
    ///
    /// Every edge endpoint must be in `nodes` and the edges must form a
    /// forest; anything else is a [`ReferentialError`].
    pub fn layout_parts(&self, nodes: &[&Entry], edges: &[VisibleEdge]) -> Result<Layout> {
        let positions: HashMap<&str, usize> = index_nodes(nodes)?;
        let tree = Forest::build(nodes, edges, &positions)?;

        if nodes.is_empty() {
            return Ok(Layout::empty(self.orientation));
        }
        self.config.validate(self.orientation)?;

        let (rank, order) = tree.rank_and_order(nodes)?;
        let axes = AxisMap::new(self.orientation, &self.config);
        let secondary = self.secondary_offsets(&rank, &order, &axes);

        let layout_nodes: Vec<LayoutNode> = nodes
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let primary = self.config.margin + rank[i] as f64 * self.config.rank_spacing;
                let top_left = axes.point(primary, secondary[i]);
                LayoutNode {
                    id: entry.id.clone(),
                    label: entry.label.clone(),
                    rank: rank[i],
                    order_in_rank: order[i],
                    x: top_left.x,
                    y: top_left.y,
                    width: self.config.node_width,
                    height: self.config.node_height,
                    is_container: entry.is_container,
                    first_document_id: entry.first_document_id.clone(),
                }
            })
            .collect();

        let router = route::router_for(self.orientation);
        let layout_edges: Vec<LayoutEdge> = tree
            .edge_pairs
            .iter()
            .map(|&(s, t)| {
                let start = router.source_anchor().point(&layout_nodes[s]);
                let end = router.target_anchor().point(&layout_nodes[t]);
                LayoutEdge {
                    source_id: layout_nodes[s].id.clone(),
                    target_id: layout_nodes[t].id.clone(),
                    source_anchor: router.source_anchor(),
                    target_anchor: router.target_anchor(),
                    style: router.style(),
                    routed_points: router.route(start, end),
                }
            })
            .collect();

        tracing::debug!(
            nodes = layout_nodes.len(),
            edges = layout_edges.len(),
            orientation = %self.orientation,
            "computed layout"
        );

        Ok(Layout {
            orientation: self.orientation,
            nodes: layout_nodes,
            edges: layout_edges,
        })
    }

    /// Secondary-axis offset of every node.
    ///
    /// Nodes are visited rank by rank in within-rank order, each rank's
    /// cursor advancing by one node extent plus spacing. Vertical layouts
    /// then shift each rank so its centre lines up with the root, which sits
    /// at the centre of the widest rank.
    fn secondary_offsets(&self, rank: &[usize], order: &[usize], axes: &AxisMap) -> Vec<f64> {
        let step = axes.secondary_extent + self.config.node_spacing;
        let rank_count = rank.iter().copied().max().map_or(0, |r| r + 1);

        let mut slots: Vec<usize> = (0..rank.len()).collect();
        slots.sort_by_key(|&i| (rank[i], order[i]));

        let mut cursor = vec![self.config.margin; rank_count];
        let mut offsets = vec![0.0; rank.len()];
        for i in slots {
            offsets[i] = cursor[rank[i]];
            cursor[rank[i]] += step;
        }

        if self.orientation != Orientation::Vertical {
            return offsets;
        }

        // Width of a rank is its last cursor position minus the trailing gap.
        let widths: Vec<f64> = cursor
            .iter()
            .map(|&end| end - self.config.node_spacing - self.config.margin)
            .collect();
        let widest = widths.iter().copied().fold(0.0, f64::max);
        let center = self.config.margin + widest / 2.0;
        let shifts: Vec<f64> = widths
            .iter()
            .map(|w| center - (self.config.margin + w / 2.0))
            .collect();
        for (i, &r) in rank.iter().enumerate() {
            offsets[i] += shifts[r];
        }
        offsets
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Orientation::default())
    }
}

fn index_nodes<'a>(nodes: &[&'a Entry]) -> Result<HashMap<&'a str, usize>> {
    let mut positions = HashMap::with_capacity(nodes.len());
    for (i, entry) in nodes.iter().enumerate() {
        if positions.insert(entry.id.as_str(), i).is_some() {
            return Err(ReferentialError::DuplicateNode(entry.id.clone()).into());
        }
    }
    Ok(positions)
}

/// Parent/child adjacency over node positions.
struct Forest {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    edge_pairs: Vec<(usize, usize)>,
}

impl Forest {
    fn build(
        nodes: &[&Entry],
        edges: &[VisibleEdge],
        positions: &HashMap<&str, usize>,
    ) -> Result<Self> {
        let mut parent = vec![None; nodes.len()];
        let mut children = vec![Vec::new(); nodes.len()];
        let mut edge_pairs = Vec::with_capacity(edges.len());

        for edge in edges {
            let resolve = |id: &str| {
                positions
                    .get(id)
                    .copied()
                    .ok_or_else(|| ReferentialError::UnknownEndpoint {
                        source_id: edge.source_id.clone(),
                        target_id: edge.target_id.clone(),
                        missing: id.to_string(),
                    })
            };
            let s = resolve(&edge.source_id)?;
            let t = resolve(&edge.target_id)?;
            if parent[t].is_some() {
                return Err(ReferentialError::MultipleParents(edge.target_id.clone()).into());
            }
            parent[t] = Some(s);
            children[s].push(t);
            edge_pairs.push((s, t));
        }

        // Siblings follow their order in the node sequence.
        for list in &mut children {
            list.sort_unstable();
        }

        Ok(Self {
            parent,
            children,
            edge_pairs,
        })
    }

    /// Rank and within-rank order of every node.
    fn rank_and_order(&self, nodes: &[&Entry]) -> Result<(Vec<usize>, Vec<usize>)> {
        let n = self.parent.len();
        let mut rank = vec![0usize; n];
        let mut order = vec![0usize; n];
        let mut visited = vec![false; n];
        let mut next_in_rank: Vec<usize> = Vec::new();

        let roots = (0..n).filter(|&i| self.parent[i].is_none());
        for root in roots {
            let mut stack = vec![(root, 0usize)];
            while let Some((node, r)) = stack.pop() {
                if visited[node] {
                    continue;
                }
                visited[node] = true;
                if next_in_rank.len() <= r {
                    next_in_rank.resize(r + 1, 0);
                }
                rank[node] = r;
                order[node] = next_in_rank[r];
                next_in_rank[r] += 1;
                for &child in self.children[node].iter().rev() {
                    stack.push((child, r + 1));
                }
            }
        }

        if let Some(i) = visited.iter().position(|v| !v) {
            return Err(ReferentialError::Unreachable(nodes[i].id.clone()).into());
        }
        Ok((rank, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DocIndex, IndexOptions};
    use crate::models::RawItem;
    use crate::visibility::{ExpandedStack, project};

    fn index_with(children: Vec<RawItem>) -> DocIndex {
        DocIndex::from_raw(&RawItem::container("docs", children), IndexOptions::default())
            .unwrap()
    }

    fn three_siblings() -> DocIndex {
        index_with(vec![
            RawItem::leaf("a.md"),
            RawItem::leaf("b.md"),
            RawItem::leaf("c.md"),
        ])
    }

    fn uneven_tree() -> DocIndex {
        index_with(vec![
            RawItem::container(
                "wide",
                vec![
                    RawItem::leaf("1.md"),
                    RawItem::leaf("2.md"),
                    RawItem::leaf("3.md"),
                    RawItem::leaf("4.md"),
                ],
            ),
            RawItem::container("narrow", vec![RawItem::leaf("only.md")]),
            RawItem::leaf("top.md"),
        ])
    }

    fn fully_expanded(index: &DocIndex) -> ExpandedStack {
        let mut stack = ExpandedStack::for_index(index);
        for e in index.entries().iter().filter(|e| e.is_container) {
            stack.push(e.id.clone());
        }
        stack
    }

    fn run(index: &DocIndex, orientation: Orientation) -> Layout {
        let visible = project(index, &fully_expanded(index));
        LayoutEngine::new(orientation).layout(&visible).unwrap()
    }

    fn secondary(node: &LayoutNode, orientation: Orientation) -> (f64, f64) {
        match orientation {
            Orientation::Horizontal => (node.y, node.y + node.height),
            Orientation::Vertical => (node.x, node.x + node.width),
        }
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!(Orientation::parse("Horizontal"), Some(Orientation::Horizontal));
        assert_eq!(Orientation::parse("tb"), Some(Orientation::Vertical));
        assert_eq!(Orientation::parse("diagonal"), None);
        assert_eq!("v".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert_eq!(Orientation::Vertical.toggled(), Orientation::Horizontal);
    }

    #[test]
    fn test_horizontal_siblings_share_rank() {
        let index = three_siblings();
        let layout = run(&index, Orientation::Horizontal);

        let kids: Vec<&LayoutNode> = layout.rank(1);
        let ids: Vec<&str> = kids.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["docs/a.md", "docs/b.md", "docs/c.md"]);
        assert!(kids.iter().all(|n| n.x == kids[0].x));
        assert!(kids[0].y < kids[1].y && kids[1].y < kids[2].y);

        let root = layout.node("docs/").unwrap();
        assert!(root.x < kids[0].x);
        assert_eq!((root.x, root.y), (0.0, 0.0));
    }

    #[test]
    fn test_horizontal_coordinates() {
        let index = three_siblings();
        let layout = run(&index, Orientation::Horizontal);
        let config = LayoutConfig::horizontal();
        let b = layout.node("docs/b.md").unwrap();
        assert_eq!(b.x, config.rank_spacing);
        assert_eq!(b.y, config.node_height + config.node_spacing);
        assert_eq!(b.order_in_rank, 1);
    }

    #[test]
    fn test_subtrees_are_contiguous() {
        let index = uneven_tree();
        let layout = run(&index, Orientation::Horizontal);
        let ids: Vec<&str> = layout.rank(2).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "docs/wide/1.md",
                "docs/wide/2.md",
                "docs/wide/3.md",
                "docs/wide/4.md",
                "docs/narrow/only.md",
            ]
        );
    }

    #[test]
    fn test_parent_rank_precedes_child() {
        let index = uneven_tree();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let layout = run(&index, orientation);
            for edge in &layout.edges {
                let s = layout.node(&edge.source_id).unwrap();
                let t = layout.node(&edge.target_id).unwrap();
                assert_eq!(t.rank, s.rank + 1);
                match orientation {
                    Orientation::Horizontal => assert!(s.x + s.width <= t.x),
                    Orientation::Vertical => assert!(s.y + s.height <= t.y),
                }
            }
        }
    }

    #[test]
    fn test_no_overlap_within_rank() {
        let index = uneven_tree();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let layout = run(&index, orientation);
            for r in 0..layout.rank_count() {
                let nodes = layout.rank(r);
                for pair in nodes.windows(2) {
                    let (_, a_end) = secondary(pair[0], orientation);
                    let (b_start, _) = secondary(pair[1], orientation);
                    assert!(a_end <= b_start, "overlap in rank {}", r);
                }
            }
        }
    }

    #[test]
    fn test_vertical_root_is_centred() {
        let index = uneven_tree();
        let layout = run(&index, Orientation::Vertical);
        let root_center = layout.node("docs/").unwrap().center().x;
        for r in 1..layout.rank_count() {
            let nodes = layout.rank(r);
            let left = nodes.first().unwrap().x;
            let right = nodes.last().map(|n| n.x + n.width).unwrap();
            assert!(((left + right) / 2.0 - root_center).abs() < 1e-9);
        }
        let bounds = layout.bounds();
        assert!((bounds.x - LayoutConfig::vertical().margin).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_root_not_recentred() {
        let index = uneven_tree();
        let layout = run(&index, Orientation::Horizontal);
        let root = layout.node("docs/").unwrap();
        assert_eq!(root.y, LayoutConfig::horizontal().margin);
        assert_eq!(root.order_in_rank, 0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let index = uneven_tree();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let a = serde_json::to_string(&run(&index, orientation)).unwrap();
            let b = serde_json::to_string(&run(&index, orientation)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_edge_routes_per_orientation() {
        let index = three_siblings();

        let h = run(&index, Orientation::Horizontal);
        let edge = &h.edges[1];
        let s = h.node(&edge.source_id).unwrap();
        let t = h.node(&edge.target_id).unwrap();
        assert_eq!(edge.style, RouteStyle::SmoothStep);
        assert_eq!(edge.routed_points.first(), Some(&Anchor::Right.point(s)));
        assert_eq!(edge.routed_points.last(), Some(&Anchor::Left.point(t)));

        let v = run(&index, Orientation::Vertical);
        let edge = &v.edges[0];
        let s = v.node(&edge.source_id).unwrap();
        let t = v.node(&edge.target_id).unwrap();
        assert_eq!(edge.style, RouteStyle::Straight);
        assert_eq!(
            edge.routed_points,
            vec![Anchor::Bottom.point(s), Anchor::Top.point(t)]
        );
    }

    #[test]
    fn test_first_document_exposed() {
        let index = uneven_tree();
        let layout = run(&index, Orientation::Horizontal);
        let wide = layout.node("docs/wide/").unwrap();
        assert!(wide.navigates_to_document());
        assert_eq!(wide.first_document_id.as_deref(), Some("docs/wide/1.md"));
        assert!(!layout.node("docs/top.md").unwrap().navigates_to_document());
    }

    #[test]
    fn test_empty_input_yields_empty_layout() {
        let layout = LayoutEngine::default().layout(&VisibleGraph::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.bounds(), Bounds::default());
    }

    #[test]
    fn test_unknown_endpoint_fails_fast() {
        let index = three_siblings();
        let visible = project(&index, &ExpandedStack::for_index(&index));
        let mut edges = visible.edges.clone();
        edges.push(VisibleEdge::new("docs/", "docs/ghost.md"));

        let err = LayoutEngine::default()
            .layout_parts(&visible.nodes, &edges)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Referential(ReferentialError::UnknownEndpoint { ref missing, .. })
                if missing == "docs/ghost.md"
        ));
    }

    #[test]
    fn test_edges_without_nodes_fail() {
        let edges = vec![VisibleEdge::new("a/", "a/b")];
        let err = LayoutEngine::default().layout_parts(&[], &edges).unwrap_err();
        assert!(matches!(err, Error::Referential(_)));
    }

    #[test]
    fn test_duplicate_and_multi_parent_rejected() {
        let index = three_siblings();
        let visible = project(&index, &ExpandedStack::for_index(&index));

        let mut doubled = visible.nodes.clone();
        doubled.push(visible.nodes[1]);
        let err = LayoutEngine::default()
            .layout_parts(&doubled, &visible.edges)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Referential(ReferentialError::DuplicateNode(_))
        ));

        let mut edges = visible.edges.clone();
        edges.push(VisibleEdge::new("docs/a.md", "docs/b.md"));
        let err = LayoutEngine::default()
            .layout_parts(&visible.nodes, &edges)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Referential(ReferentialError::MultipleParents(ref id)) if id == "docs/b.md"
        ));
    }

    #[test]
    fn test_cycle_is_unreachable() {
        let index = three_siblings();
        let visible = project(&index, &ExpandedStack::for_index(&index));
        let nodes = &visible.nodes[1..3];
        let edges = vec![
            VisibleEdge::new("docs/a.md", "docs/b.md"),
            VisibleEdge::new("docs/b.md", "docs/a.md"),
        ];
        let err = LayoutEngine::default().layout_parts(nodes, &edges).unwrap_err();
        assert!(matches!(
            err,
            Error::Referential(ReferentialError::Unreachable(_))
        ));
    }

    #[test]
    fn test_forest_roots_share_rank_zero() {
        let index = three_siblings();
        let visible = project(&index, &ExpandedStack::for_index(&index));
        let layout = LayoutEngine::default()
            .layout_parts(&visible.nodes[1..], &[])
            .unwrap();
        assert!(layout.nodes.iter().all(|n| n.rank == 0));
        let orders: Vec<usize> = layout.nodes.iter().map(|n| n.order_in_rank).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_config_validation() {
        assert!(LayoutConfig::horizontal().validate(Orientation::Horizontal).is_ok());
        assert!(LayoutConfig::vertical().validate(Orientation::Vertical).is_ok());

        // Vertical preset ranks are too tight for 180-wide horizontal boxes.
        assert!(matches!(
            LayoutConfig::vertical().validate(Orientation::Horizontal),
            Err(Error::InvalidInput(_))
        ));

        let config = LayoutConfig {
            node_width: 0.0,
            ..LayoutConfig::horizontal()
        };
        assert!(config.validate(Orientation::Horizontal).is_err());

        let config = LayoutConfig {
            node_spacing: f64::NAN,
            ..LayoutConfig::horizontal()
        };
        assert!(config.validate(Orientation::Horizontal).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_by_engine() {
        let index = three_siblings();
        let visible = project(&index, &ExpandedStack::for_index(&index));
        let engine = LayoutEngine::with_config(
            Orientation::Horizontal,
            LayoutConfig {
                rank_spacing: 10.0,
                ..LayoutConfig::horizontal()
            },
        );
        assert!(matches!(
            engine.layout(&visible),
            Err(Error::InvalidInput(_))
        ));
    }
}
