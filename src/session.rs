//! Explorer session state.
//!
//! A session owns the mutable part of the explorer: the expand history, the
//! orientation and the current selection. The index is shared, read-only
//! reference data. Every user action takes `&mut self` and applies its whole
//! state change before returning, so a recomputation can never observe a
//! half-applied action.

use std::sync::Arc;

use serde::Serialize;

use crate::index::DocIndex;
use crate::layout::{Layout, LayoutConfig, LayoutEngine, LayoutNode, Orientation};
use crate::visibility::{self, ExpandedStack, VisibleGraph};
use crate::{Error, Result};

/// What the document pane should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Nothing selected (e.g., the requested entry does not exist)
    None,
    /// A leaf entry
    Document { id: String, label: String },
    /// A container with no reachable document
    Container { id: String, label: String },
}

impl Selection {
    /// Selected id, if any
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Document { id, .. } | Selection::Container { id, .. } => Some(id),
        }
    }
}

/// Everything a renderer needs after one recomputation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub expanded: Vec<String>,
    pub layout: Layout,
    /// Node of the most recent expansion, for centring the viewport
    pub focus: Option<LayoutNode>,
}

/// Interactive explorer over a shared index.
#[derive(Debug, Clone)]
pub struct Session {
    index: Arc<DocIndex>,
    expanded: ExpandedStack,
    orientation: Orientation,
    horizontal: LayoutConfig,
    vertical: LayoutConfig,
    selection: Selection,
}

impl Session {
    /// Start a session with only the root expanded and selected
    pub fn new(index: Arc<DocIndex>) -> Self {
        let root = index.root();
        let selection = Selection::Container {
            id: root.id.clone(),
            label: root.label.clone(),
        };
        Self {
            expanded: ExpandedStack::for_index(&index),
            orientation: Orientation::default(),
            horizontal: LayoutConfig::horizontal(),
            vertical: LayoutConfig::vertical(),
            selection,
            index,
        }
    }

    /// Use `config` whenever laying out in `orientation`
    pub fn with_layout_config(mut self, orientation: Orientation, config: LayoutConfig) -> Self {
        match orientation {
            Orientation::Horizontal => self.horizontal = config,
            Orientation::Vertical => self.vertical = config,
        }
        self
    }

    /// Start in `orientation`
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// The shared index
    pub fn index(&self) -> &DocIndex {
        &self.index
    }

    /// The expand history
    pub fn expanded(&self) -> &ExpandedStack {
        &self.expanded
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Spacing used for the current orientation
    pub fn layout_config(&self) -> &LayoutConfig {
        match self.orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Expand a container. Returns false if it was already expanded or if
    /// `id` is no longer in the index.
    pub fn expand(&mut self, id: &str) -> Result<bool> {
        let Some(entry) = self.index.get(id) else {
            tracing::warn!(id, "expanded entry not found, ignoring");
            return Ok(false);
        };
        if !entry.is_container {
            return Err(Error::InvalidInput(format!("not a container: {}", id)));
        }
        Ok(self.expanded.push(entry.id.clone()))
    }

    /// Undo the most recent expansion. The root is never collapsed.
    pub fn collapse_last(&mut self) -> Option<String> {
        self.expanded.pop_last()
    }

    /// Flip between horizontal and vertical
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        self.orientation
    }

    /// Handle a click on `id`.
    ///
    /// Containers are expanded and their first document selected, falling
    /// back to the container itself. Leaves are selected directly. An
    /// unknown id clears the selection.
    pub fn activate(&mut self, id: &str) -> &Selection {
        let Some(entry) = self.index.get(id) else {
            tracing::warn!(id, "activated entry not found, clearing selection");
            self.selection = Selection::None;
            return &self.selection;
        };

        self.selection = if entry.is_container {
            self.expanded.push(entry.id.clone());
            match self.index.first_document(&entry.id) {
                Some(doc) => Selection::Document {
                    id: doc.id.clone(),
                    label: doc.label.clone(),
                },
                None => Selection::Container {
                    id: entry.id.clone(),
                    label: entry.label.clone(),
                },
            }
        } else {
            Selection::Document {
                id: entry.id.clone(),
                label: entry.label.clone(),
            }
        };
        tracing::debug!(id, selected = ?self.selection.id(), "activated entry");
        &self.selection
    }

    /// Current visible subtree
    pub fn visible(&self) -> VisibleGraph<'_> {
        visibility::project(&self.index, &self.expanded)
    }

    /// Recompute the layout from scratch
    pub fn layout(&self) -> Result<Layout> {
        LayoutEngine::with_config(self.orientation, self.layout_config().clone())
            .layout(&self.visible())
    }

    /// Node of the most recent expansion within `layout`, if visible
    pub fn focus<'l>(&self, layout: &'l Layout) -> Option<&'l LayoutNode> {
        layout.node(self.expanded.last())
    }

    /// Recompute everything a renderer needs
    pub fn view(&self) -> Result<View> {
        let layout = self.layout()?;
        let focus = self.focus(&layout).cloned();
        Ok(View {
            expanded: self.expanded.as_slice().to_vec(),
            layout,
            focus,
        })
    }
}
