//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Project `popdocs.kdl` in the working directory
//! 3. System `config.kdl` (`~/.config/popdocs/config.kdl`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use serde::Serialize;

use crate::Result;
use crate::config::schema::{OutputFormat, PopdocsConfig, SpacingOverrides};
use crate::index::IndexOptions;
use crate::layout::{LayoutConfig, Orientation};

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "PD_CONFIG_DIR";

/// File name of the system config.
pub const SYSTEM_CONFIG_FILE: &str = "config.kdl";

/// File name of the project config.
pub const PROJECT_CONFIG_FILE: &str = "popdocs.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Built-in default value
    Default,
    /// Value from the system config.kdl
    System,
    /// Value from the project popdocs.kdl
    Project,
    /// Value from CLI flag
    #[serde(rename = "cli")]
    CliFlag,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Project => write!(f, "project"),
            ValueSource::CliFlag => write!(f, "cli"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub orientation: Resolved<Orientation>,
    pub document_extensions: Resolved<Vec<String>>,
    pub horizontal: Resolved<LayoutConfig>,
    pub vertical: Resolved<LayoutConfig>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            orientation: Resolved::new(Orientation::Horizontal, ValueSource::Default),
            document_extensions: Resolved::new(
                IndexOptions::default().document_extensions,
                ValueSource::Default,
            ),
            horizontal: Resolved::new(LayoutConfig::horizontal(), ValueSource::Default),
            vertical: Resolved::new(LayoutConfig::vertical(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Get the output format value.
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    /// Get the starting orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation.value
    }

    /// Layout spacing for `orientation`.
    pub fn layout_config(&self, orientation: Orientation) -> &LayoutConfig {
        match orientation {
            Orientation::Horizontal => &self.horizontal.value,
            Orientation::Vertical => &self.vertical.value,
        }
    }

    /// Indexing options derived from the document extensions.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions::default().with_document_extensions(self.document_extensions.value.clone())
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Output format override from CLI flag
    pub output_format: Option<OutputFormat>,
    /// Orientation override from CLI flag
    pub orientation: Option<Orientation>,
    /// Document extensions override from CLI flag
    pub document_extensions: Option<Vec<String>>,
    /// Spacing overrides from CLI flags, applied to both orientations
    pub spacing: SpacingOverrides,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set orientation override.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Set document extensions override.
    pub fn with_document_extensions(mut self, extensions: Vec<String>) -> Self {
        self.document_extensions = Some(extensions);
        self
    }

    /// Set spacing overrides.
    pub fn with_spacing(mut self, spacing: SpacingOverrides) -> Self {
        self.spacing = spacing;
        self
    }

    fn as_config(&self) -> PopdocsConfig {
        PopdocsConfig {
            output_format: self.output_format.clone(),
            orientation: self.orientation,
            document_extensions: self.document_extensions.clone(),
            spacing: self.spacing.clone(),
            ..Default::default()
        }
    }
}

/// Locations of the config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// System config file, if a config directory exists on this platform
    pub system: Option<PathBuf>,
    /// Project config file
    pub project: PathBuf,
}

impl ConfigPaths {
    /// Standard locations for a working directory.
    ///
    /// `PD_CONFIG_DIR` replaces the platform config directory.
    pub fn discover(cwd: &Path) -> Self {
        let system_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|d| d.join("popdocs")),
        };
        Self {
            system: system_dir.map(|d| d.join(SYSTEM_CONFIG_FILE)),
            project: cwd.join(PROJECT_CONFIG_FILE),
        }
    }
}

/// Load and validate a config file. A missing file yields an empty config.
pub fn load_config_file(path: &Path) -> Result<PopdocsConfig> {
    if !path.exists() {
        return Ok(PopdocsConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let doc: KdlDocument = content.parse()?;
    let config = PopdocsConfig::from_kdl(&doc)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Resolve configuration with full precedence chain.
///
/// Precedence (highest to lowest):
/// 1. CLI flags (from `overrides`)
/// 2. Project popdocs.kdl
/// 3. System config.kdl
/// 4. Built-in defaults
pub fn resolve_config(paths: &ConfigPaths, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system_config = match paths.system {
        Some(ref path) => load_config_file(path)?,
        None => PopdocsConfig::default(),
    };
    let project_config = load_config_file(&paths.project)?;
    let cli_config = overrides.as_config();
    cli_config.validate()?;

    // Lowest precedence first so later layers win
    let layers = [
        (ValueSource::System, &system_config),
        (ValueSource::Project, &project_config),
        (ValueSource::CliFlag, &cli_config),
    ];

    let mut result = ResolvedConfig::default();
    for (source, layer) in layers {
        if let Some(ref format) = layer.output_format {
            result.output_format = Resolved::new(format.clone(), source);
        }
        if let Some(orientation) = layer.orientation {
            result.orientation = Resolved::new(orientation, source);
        }
        if let Some(ref extensions) = layer.document_extensions {
            result.document_extensions = Resolved::new(extensions.clone(), source);
        }
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            if !layer.has_layout_overrides(orientation) {
                continue;
            }
            let slot = match orientation {
                Orientation::Horizontal => &mut result.horizontal,
                Orientation::Vertical => &mut result.vertical,
            };
            layer.apply_layout(orientation, &mut slot.value);
            slot.source = source;
        }
    }

    Ok(result)
}
