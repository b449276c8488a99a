//! KDL schema for `config.kdl` and `popdocs.kdl`.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Conversion to and from KDL documents
//! - Validation and merging

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::layout::{LayoutConfig, Orientation};
use crate::{Error, Result};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric layout overrides applied on top of an orientation preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingOverrides {
    pub node_spacing: Option<f64>,
    pub rank_spacing: Option<f64>,
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub margin: Option<f64>,
}

const SPACING_KEYS: [&str; 5] = [
    "node-spacing",
    "rank-spacing",
    "node-width",
    "node-height",
    "margin",
];

impl SpacingOverrides {
    /// Whether no override is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<f64>> {
        match key {
            "node-spacing" => Some(&mut self.node_spacing),
            "rank-spacing" => Some(&mut self.rank_spacing),
            "node-width" => Some(&mut self.node_width),
            "node-height" => Some(&mut self.node_height),
            "margin" => Some(&mut self.margin),
            _ => None,
        }
    }

    fn values(&self) -> [(&'static str, Option<f64>); 5] {
        [
            (SPACING_KEYS[0], self.node_spacing),
            (SPACING_KEYS[1], self.rank_spacing),
            (SPACING_KEYS[2], self.node_width),
            (SPACING_KEYS[3], self.node_height),
            (SPACING_KEYS[4], self.margin),
        ]
    }

    /// Read the spacing keys present at the top level of `doc`.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut spacing = Self::default();
        for key in SPACING_KEYS {
            if let Some(node) = doc.get(key) {
                let value = first_number(node)
                    .ok_or_else(|| Error::InvalidInput(format!("{} must be a number", key)))?;
                if let Some(slot) = spacing.slot(key) {
                    *slot = Some(value);
                }
            }
        }
        Ok(spacing)
    }

    /// Append the set keys to `doc`.
    pub fn write_kdl(&self, doc: &mut KdlDocument) {
        for (key, value) in self.values() {
            if let Some(value) = value {
                doc.nodes_mut().push(number_node(key, value));
            }
        }
    }

    /// Check each value on its own. Cross-field checks (rank spacing
    /// against node extent) happen once the preset is known.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.values() {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("{} must be finite", key)));
            }
            let positive = matches!(key, "rank-spacing" | "node-width" | "node-height");
            if positive && value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must be greater than 0, got {}",
                    key, value
                )));
            }
            if !positive && value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must not be negative, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }

    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &SpacingOverrides) {
        for (key, value) in other.values() {
            if let (Some(value), Some(slot)) = (value, self.slot(key)) {
                *slot = Some(value);
            }
        }
    }

    /// Overwrite the matching fields of `config`.
    pub fn apply(&self, config: &mut LayoutConfig) {
        if let Some(v) = self.node_spacing {
            config.node_spacing = v;
        }
        if let Some(v) = self.rank_spacing {
            config.rank_spacing = v;
        }
        if let Some(v) = self.node_width {
            config.node_width = v;
        }
        if let Some(v) = self.node_height {
            config.node_height = v;
        }
        if let Some(v) = self.margin {
            config.margin = v;
        }
    }
}

/// User preferences stored in `config.kdl` or a project `popdocs.kdl`.
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"        // or "json"
/// orientation "vertical"       // or "horizontal"
/// document-extensions "md" "mdx"
/// node-width 200               // applies to both orientations
/// horizontal {
///     rank-spacing 320
/// }
/// vertical {
///     node-spacing 80
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopdocsConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Starting orientation
    pub orientation: Option<Orientation>,

    /// Leaf extensions that count as documents
    pub document_extensions: Option<Vec<String>>,

    /// Overrides shared by both orientations
    pub spacing: SpacingOverrides,

    /// Overrides for the horizontal layout only
    pub horizontal: SpacingOverrides,

    /// Overrides for the vertical layout only
    pub vertical: SpacingOverrides,
}

impl PopdocsConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref extensions) = self.document_extensions {
            if extensions.is_empty() {
                return Err(Error::InvalidInput(
                    "document-extensions needs at least one value".to_string(),
                ));
            }
            if extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
                return Err(Error::InvalidInput(
                    "document-extensions must not contain empty values".to_string(),
                ));
            }
        }
        self.spacing.validate()?;
        self.horizontal.validate()?;
        self.vertical.validate()?;
        Ok(())
    }

    /// Parse config from a KDL document. Unknown keys are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        // Parse output-format
        if let Some(node) = doc.get("output-format") {
            let s = first_string(node)
                .ok_or_else(|| Error::InvalidInput("output-format must be a string".to_string()))?;
            config.output_format = Some(OutputFormat::parse(s).ok_or_else(|| {
                Error::InvalidInput(format!("output-format must be json or human, got {}", s))
            })?);
        }

        // Parse orientation
        if let Some(node) = doc.get("orientation") {
            let s = first_string(node)
                .ok_or_else(|| Error::InvalidInput("orientation must be a string".to_string()))?;
            config.orientation = Some(Orientation::parse(s).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "orientation must be horizontal or vertical, got {}",
                    s
                ))
            })?);
        }

        // Parse document-extensions (all positional string arguments)
        if let Some(node) = doc.get("document-extensions") {
            let extensions: Vec<String> = node
                .entries()
                .iter()
                .filter(|e| e.name().is_none())
                .filter_map(|e| e.value().as_string())
                .map(|s| s.trim_start_matches('.').to_string())
                .collect();
            config.document_extensions = Some(extensions);
        }

        config.spacing = SpacingOverrides::from_kdl(doc)?;

        if let Some(children) = doc.get("horizontal").and_then(KdlNode::children) {
            config.horizontal = SpacingOverrides::from_kdl(children)?;
        }
        if let Some(children) = doc.get("vertical").and_then(KdlNode::children) {
            config.vertical = SpacingOverrides::from_kdl(children)?;
        }

        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref format) = self.output_format {
            doc.nodes_mut()
                .push(string_node("output-format", format.as_str()));
        }

        if let Some(orientation) = self.orientation {
            doc.nodes_mut()
                .push(string_node("orientation", orientation.as_str()));
        }

        if let Some(ref extensions) = self.document_extensions {
            let mut node = KdlNode::new("document-extensions");
            for ext in extensions {
                node.push(KdlEntry::new(KdlValue::String(ext.clone())));
            }
            doc.nodes_mut().push(node);
        }

        self.spacing.write_kdl(&mut doc);

        for (name, overrides) in [("horizontal", &self.horizontal), ("vertical", &self.vertical)] {
            if overrides.is_empty() {
                continue;
            }
            let mut children = KdlDocument::new();
            overrides.write_kdl(&mut children);
            let mut node = KdlNode::new(name);
            node.set_children(children);
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &PopdocsConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
        if other.orientation.is_some() {
            self.orientation = other.orientation;
        }
        if other.document_extensions.is_some() {
            self.document_extensions = other.document_extensions.clone();
        }
        self.spacing.merge(&other.spacing);
        self.horizontal.merge(&other.horizontal);
        self.vertical.merge(&other.vertical);
    }

    /// Whether any layout override is set for `orientation`
    pub fn has_layout_overrides(&self, orientation: Orientation) -> bool {
        !self.spacing.is_empty() || !self.overrides_for(orientation).is_empty()
    }

    /// Orientation-specific overrides
    pub fn overrides_for(&self, orientation: Orientation) -> &SpacingOverrides {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Apply shared then orientation-specific overrides to `config`.
    pub fn apply_layout(&self, orientation: Orientation, config: &mut LayoutConfig) {
        self.spacing.apply(config);
        self.overrides_for(orientation).apply(config);
    }
}

fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}

fn first_number(node: &KdlNode) -> Option<f64> {
    let value = node.entries().first()?.value();
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

fn number_node(name: &str, value: f64) -> KdlNode {
    let mut node = KdlNode::new(name);
    if value.fract() == 0.0 && value.abs() < 1e15 {
        node.push(KdlEntry::new(KdlValue::Integer(value as i128)));
    } else {
        node.push(KdlEntry::new(KdlValue::Float(value)));
    }
    node
}
