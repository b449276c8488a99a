//! Configuration for PopDocs.
//!
//! Preferences live in KDL files:
//!
//! - System: `~/.config/popdocs/config.kdl` (directory overridable with
//!   `PD_CONFIG_DIR`)
//! - Project: `popdocs.kdl` in the working directory
//!
//! Keys:
//! - `output-format` - "json" or "human"
//! - `orientation` - "horizontal" or "vertical"
//! - `document-extensions` - leaf extensions treated as documents
//! - `node-spacing`, `rank-spacing`, `node-width`, `node-height`, `margin`,
//!   either at the top level or inside a `horizontal`/`vertical` block
//!
//! ## Precedence
//!
//! CLI flag > project config > system config > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, ConfigPaths, PROJECT_CONFIG_FILE, Resolved, ResolvedConfig,
    SYSTEM_CONFIG_FILE, ValueSource, load_config_file, resolve_config,
};
pub use schema::{OutputFormat, PopdocsConfig, SpacingOverrides};
