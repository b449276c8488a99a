//! PopDocs - index a documentation tree and lay it out as an expandable diagram.
//!
//! This library provides the core functionality for the `pd` CLI tool:
//! building an addressable index from a nested directory listing, projecting
//! the currently visible subtree from the expand history, and computing a
//! deterministic left-to-right or top-to-bottom layout for it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod index;
pub mod layout;
pub mod logging;
pub mod models;
pub mod session;
pub mod visibility;

pub use index::{ConstructionError, DocIndex, IndexOptions, IndexSnapshot};
pub use layout::{Layout, LayoutConfig, LayoutEngine, Orientation, ReferentialError};
pub use models::{Entry, Position, RawItem};
pub use session::{Selection, Session};
pub use visibility::{ExpandedStack, VisibleGraph};

/// Library-level error type for PopDocs operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Malformed hierarchy: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Layout input rejected: {0}")]
    Referential(#[from] ReferentialError),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for PopDocs operations.
pub type Result<T> = std::result::Result<T, Error>;
