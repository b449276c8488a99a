//! Command implementations for the PopDocs CLI.
//!
//! Every command loads the tree from its source, replays the requested
//! expand history on a fresh [`Session`] and returns a result that can be
//! printed as JSON or for humans:
//! - `index` - build and persist the index snapshot
//! - `visible` - visible entries and edges
//! - `layout` - positioned nodes and routed edges
//! - `open` - node activation
//! - `config` - resolved configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ConfigPaths, ResolvedConfig};
use crate::index::{DocIndex, IndexOptions, IndexSnapshot, scan};
use crate::layout::{Bounds, Layout, LayoutEdge, LayoutNode, Orientation};
use crate::models::RawItem;
use crate::session::{Selection, Session};
use crate::visibility::VisibleEdge;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("failed to serialize output: {}", e) }).to_string()
    })
}

// === Loading ===

/// Load an index from a directory, a snapshot file or a raw hierarchy file.
pub fn load_index(source: &Path, options: IndexOptions) -> Result<DocIndex> {
    if !source.exists() {
        return Err(Error::InvalidInput(format!(
            "source does not exist: {}",
            source.display()
        )));
    }

    if source.is_dir() {
        let raw = scan::scan_dir(source)?;
        return DocIndex::from_raw(&raw, options);
    }

    let content = fs::read_to_string(source)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    // A snapshot carries a flat `nodes` list; anything else is a raw tree.
    if value.get("nodes").is_some() {
        let snapshot: IndexSnapshot = serde_json::from_value(value)?;
        DocIndex::from_snapshot(snapshot, options)
    } else {
        let raw: RawItem = serde_json::from_value(value)?;
        DocIndex::from_raw(&raw, options)
    }
}

/// Map a user-typed id to an indexed one, accepting a container id
/// without its trailing `/`.
fn canonical_id<'a>(index: &'a DocIndex, id: &'a str) -> &'a str {
    if index.contains(id) {
        return id;
    }
    let with_slash = format!("{}/", id.trim_end_matches('/'));
    match index.get(&with_slash) {
        Some(entry) => entry.id.as_str(),
        None => id,
    }
}

/// Build a session for `source` and replay `expand` then `back` collapses.
pub fn open_session(
    source: &Path,
    config: &ResolvedConfig,
    expand: &[String],
    back: usize,
) -> Result<Session> {
    let index = Arc::new(load_index(source, config.index_options())?);
    let mut session = Session::new(Arc::clone(&index))
        .with_orientation(config.orientation())
        .with_layout_config(
            Orientation::Horizontal,
            config.layout_config(Orientation::Horizontal).clone(),
        )
        .with_layout_config(
            Orientation::Vertical,
            config.layout_config(Orientation::Vertical).clone(),
        );

    for id in expand {
        session.expand(canonical_id(&index, id))?;
    }
    for _ in 0..back {
        if session.collapse_last().is_none() {
            break;
        }
    }
    Ok(session)
}

// === Index ===

pub struct IndexResult {
    pub snapshot: IndexSnapshot,
    pub written_to: Option<PathBuf>,
    pub documents: usize,
}

#[derive(Serialize)]
struct IndexWritten<'a> {
    written: &'a Path,
    entries: usize,
    documents: usize,
}

impl Output for IndexResult {
    fn to_json(&self) -> String {
        match self.written_to {
            Some(ref path) => json(&IndexWritten {
                written: path,
                entries: self.snapshot.nodes.len(),
                documents: self.documents,
            }),
            None => json(&self.snapshot),
        }
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for entry in &self.snapshot.nodes {
            let depth = entry.id.trim_end_matches('/').matches('/').count();
            lines.push(format!("{}{}", "  ".repeat(depth), entry.label));
        }
        let summary = format!(
            "{} entries, {} documents",
            self.snapshot.nodes.len(),
            self.documents
        );
        match self.written_to {
            Some(ref path) => format!("Wrote {} ({})", path.display(), summary),
            None => format!("{}\n\n{}", lines.join("\n"), summary),
        }
    }
}

/// Build the index for `source`, writing the snapshot to `output` if given.
pub fn index(source: &Path, config: &ResolvedConfig, output: Option<&Path>) -> Result<IndexResult> {
    let options = config.index_options();
    let index = load_index(source, options.clone())?;
    let snapshot = index.snapshot();
    let documents = index
        .entries()
        .iter()
        .filter(|e| e.is_document(&options.document_extensions))
        .count();

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        tracing::debug!(path = %path.display(), entries = snapshot.nodes.len(), "wrote snapshot");
    }

    Ok(IndexResult {
        snapshot,
        written_to: output.map(Path::to_path_buf),
        documents,
    })
}

// === Visible ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleEntry {
    pub id: String,
    pub label: String,
    pub parent_id: Option<String>,
    pub is_container: bool,
    pub expanded: bool,
}

#[derive(Serialize)]
pub struct VisibleResult {
    pub expanded: Vec<String>,
    pub nodes: Vec<VisibleEntry>,
    pub edges: Vec<VisibleEdge>,
}

impl Output for VisibleResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for node in &self.nodes {
            let depth = node.id.trim_end_matches('/').matches('/').count();
            let marker = match (node.is_container, node.expanded) {
                (true, true) => "[-] ",
                (true, false) => "[+] ",
                (false, _) => "    ",
            };
            lines.push(format!("{}{}{}", "  ".repeat(depth), marker, node.label));
        }
        lines.push(String::new());
        lines.push(format!(
            "{} visible, {} edges, expanded: {}",
            self.nodes.len(),
            self.edges.len(),
            self.expanded.join(" > ")
        ));
        lines.join("\n")
    }
}

/// Visible entries after replaying the expand history.
pub fn visible(
    source: &Path,
    config: &ResolvedConfig,
    expand: &[String],
    back: usize,
) -> Result<VisibleResult> {
    let session = open_session(source, config, expand, back)?;
    let graph = session.visible();
    let nodes = graph
        .nodes
        .iter()
        .map(|e| VisibleEntry {
            id: e.id.clone(),
            label: e.label.clone(),
            parent_id: e.parent_id.clone(),
            is_container: e.is_container,
            expanded: session.expanded().contains(&e.id),
        })
        .collect();

    Ok(VisibleResult {
        expanded: session.expanded().as_slice().to_vec(),
        nodes,
        edges: graph.edges,
    })
}

// === Layout ===

#[derive(Serialize)]
pub struct LayoutResult {
    pub orientation: Orientation,
    pub expanded: Vec<String>,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Bounds,
    pub focus: Option<String>,
}

impl LayoutResult {
    fn from_parts(layout: Layout, expanded: Vec<String>, focus: Option<String>) -> Self {
        let bounds = layout.bounds();
        Self {
            orientation: layout.orientation,
            expanded,
            nodes: layout.nodes,
            edges: layout.edges,
            bounds,
            focus,
        }
    }
}

impl Output for LayoutResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} layout: {} nodes, {} edges, {}x{}",
            self.orientation,
            self.nodes.len(),
            self.edges.len(),
            self.bounds.width,
            self.bounds.height
        )];
        let mut nodes: Vec<&LayoutNode> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| (n.rank, n.order_in_rank));
        for node in nodes {
            let focus = if self.focus.as_deref() == Some(node.id.as_str()) {
                " *"
            } else {
                ""
            };
            let target = match &node.first_document_id {
                Some(doc) if node.navigates_to_document() => format!(" -> {}", doc),
                _ => String::new(),
            };
            lines.push(format!(
                "  rank {} #{}  ({}, {})  {}{}{}",
                node.rank, node.order_in_rank, node.x, node.y, node.id, focus, target
            ));
        }
        lines.join("\n")
    }
}

/// Layout of the visible entries after replaying the expand history.
pub fn layout(
    source: &Path,
    config: &ResolvedConfig,
    expand: &[String],
    back: usize,
) -> Result<LayoutResult> {
    let session = open_session(source, config, expand, back)?;
    let view = session.view()?;
    Ok(LayoutResult::from_parts(
        view.layout,
        view.expanded,
        view.focus.map(|n| n.id),
    ))
}

// === Open ===

#[derive(Serialize)]
pub struct OpenResult {
    pub selection: Selection,
    pub expanded: Vec<String>,
}

impl Output for OpenResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let selected = match self.selection {
            Selection::None => "Nothing selected".to_string(),
            Selection::Document { ref id, .. } => format!("Selected document {}", id),
            Selection::Container { ref id, .. } => format!("Selected container {}", id),
        };
        format!("{}\nExpanded: {}", selected, self.expanded.join(" > "))
    }
}

/// Activate `id` after replaying the expand history.
pub fn open(
    source: &Path,
    config: &ResolvedConfig,
    id: &str,
    expand: &[String],
    back: usize,
) -> Result<OpenResult> {
    let mut session = open_session(source, config, expand, back)?;
    let id = canonical_id(session.index(), id).to_string();
    let selection = session.activate(&id).clone();
    Ok(OpenResult {
        selection,
        expanded: session.expanded().as_slice().to_vec(),
    })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigShowResult {
    #[serde(flatten)]
    pub config: ResolvedConfig,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        let mut lines = vec![
            format!(
                "output-format = {} ({})",
                c.output_format.value, c.output_format.source
            ),
            format!(
                "orientation = {} ({})",
                c.orientation.value, c.orientation.source
            ),
            format!(
                "document-extensions = {} ({})",
                c.document_extensions.value.join(" "),
                c.document_extensions.source
            ),
        ];
        for (name, resolved) in [("horizontal", &c.horizontal), ("vertical", &c.vertical)] {
            let l = &resolved.value;
            lines.push(format!(
                "{} = node-spacing {} rank-spacing {} node-width {} node-height {} margin {} ({})",
                name,
                l.node_spacing,
                l.rank_spacing,
                l.node_width,
                l.node_height,
                l.margin,
                resolved.source
            ));
        }
        lines.join("\n")
    }
}

/// Show the resolved configuration.
pub fn config_show(config: &ResolvedConfig) -> ConfigShowResult {
    ConfigShowResult {
        config: config.clone(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigPathResult {
    pub system: Option<PathBuf>,
    pub system_exists: bool,
    pub project: PathBuf,
    pub project_exists: bool,
}

impl Output for ConfigPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mark = |exists: bool| if exists { "" } else { " (missing)" };
        let system = match self.system {
            Some(ref p) => format!("{}{}", p.display(), mark(self.system_exists)),
            None => "none".to_string(),
        };
        format!(
            "system: {}\nproject: {}{}",
            system,
            self.project.display(),
            mark(self.project_exists)
        )
    }
}

/// Show the config file locations.
pub fn config_path(paths: &ConfigPaths) -> ConfigPathResult {
    ConfigPathResult {
        system_exists: paths.system.as_deref().is_some_and(Path::exists),
        system: paths.system.clone(),
        project_exists: paths.project.exists(),
        project: paths.project.clone(),
    }
}
