//! Orientation policies: axis mapping and edge routing.
//!
//! The layout core works in (primary, secondary) coordinates. Primary
//! follows rank progression; secondary spaces nodes within a rank. An
//! [`AxisMap`] turns those into screen (x, y), and an [`EdgeRouter`] picks
//! anchors and the polyline joining them.

use serde::{Deserialize, Serialize};

use super::{LayoutConfig, LayoutNode, Orientation};
use crate::models::Position;

/// Side of a node an edge attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    /// Centre of this side of `node`
    pub fn point(self, node: &LayoutNode) -> Position {
        match self {
            Anchor::Top => Position::new(node.x + node.width / 2.0, node.y),
            Anchor::Bottom => Position::new(node.x + node.width / 2.0, node.y + node.height),
            Anchor::Left => Position::new(node.x, node.y + node.height / 2.0),
            Anchor::Right => Position::new(node.x + node.width, node.y + node.height / 2.0),
        }
    }
}

/// How a renderer should draw the routed points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStyle {
    /// Orthogonal segments with rounded corners
    SmoothStep,
    /// A single straight segment
    Straight,
}

/// Edge routing policy for one orientation.
pub trait EdgeRouter {
    /// Anchor on the parent side
    fn source_anchor(&self) -> Anchor;

    /// Anchor on the child side
    fn target_anchor(&self) -> Anchor;

    /// Drawing style of the produced route
    fn style(&self) -> RouteStyle;

    /// Points from `start` to `end`, both included
    fn route(&self, start: Position, end: Position) -> Vec<Position>;
}

/// Right-centre to left-centre, stepping through the horizontal midpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothStepRouter;

impl EdgeRouter for SmoothStepRouter {
    fn source_anchor(&self) -> Anchor {
        Anchor::Right
    }

    fn target_anchor(&self) -> Anchor {
        Anchor::Left
    }

    fn style(&self) -> RouteStyle {
        RouteStyle::SmoothStep
    }

    fn route(&self, start: Position, end: Position) -> Vec<Position> {
        if start.y == end.y {
            return vec![start, end];
        }
        let mid_x = (start.x + end.x) / 2.0;
        vec![
            start,
            Position::new(mid_x, start.y),
            Position::new(mid_x, end.y),
            end,
        ]
    }
}

/// Bottom-centre to top-centre in a single segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightRouter;

impl EdgeRouter for StraightRouter {
    fn source_anchor(&self) -> Anchor {
        Anchor::Bottom
    }

    fn target_anchor(&self) -> Anchor {
        Anchor::Top
    }

    fn style(&self) -> RouteStyle {
        RouteStyle::Straight
    }

    fn route(&self, start: Position, end: Position) -> Vec<Position> {
        vec![start, end]
    }
}

/// Router used for an orientation
pub fn router_for(orientation: Orientation) -> &'static dyn EdgeRouter {
    match orientation {
        Orientation::Horizontal => &SmoothStepRouter,
        Orientation::Vertical => &StraightRouter,
    }
}

/// Mapping between (primary, secondary) layout axes and screen axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    /// Node size along the rank direction
    pub primary_extent: f64,
    /// Node size across the rank direction
    pub secondary_extent: f64,
    /// Whether the primary axis is screen y
    primary_is_y: bool,
}

impl AxisMap {
    /// Axis mapping for an orientation and node size
    pub fn new(orientation: Orientation, config: &LayoutConfig) -> Self {
        match orientation {
            Orientation::Horizontal => Self {
                primary_extent: config.node_width,
                secondary_extent: config.node_height,
                primary_is_y: false,
            },
            Orientation::Vertical => Self {
                primary_extent: config.node_height,
                secondary_extent: config.node_width,
                primary_is_y: true,
            },
        }
    }

    /// Screen position for a layout coordinate pair
    pub fn point(&self, primary: f64, secondary: f64) -> Position {
        if self.primary_is_y {
            Position::new(secondary, primary)
        } else {
            Position::new(primary, secondary)
        }
    }
}
