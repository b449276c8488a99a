//! Directory scanning.
//!
//! Produces the raw nested listing the indexer consumes. Entries are sorted
//! by file name so repeated scans of the same tree yield the same discovery
//! order. Symbolic links are recorded as leaves and never followed.

use std::fs;
use std::path::Path;

use crate::models::RawItem;
use crate::{Error, Result};

/// Scan `path` into a raw listing rooted at that directory.
pub fn scan_dir(path: &Path) -> Result<RawItem> {
    let meta = fs::symlink_metadata(path)?;
    if !meta.is_dir() {
        return Err(Error::InvalidInput(format!(
            "not a directory: {}",
            path.display()
        )));
    }

    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => fs::canonicalize(path)?
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::InvalidInput(format!("cannot name {}", path.display())))?,
    };

    let children = scan_children(path)?;
    tracing::debug!(root = %name, items = children.len(), "scanned directory");
    Ok(RawItem::container(name, children))
}

fn scan_children(dir: &Path) -> Result<Vec<RawItem>> {
    let mut dir_entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    dir_entries.sort_by_key(|e| e.file_name());

    let mut items = Vec::with_capacity(dir_entries.len());
    for entry in dir_entries {
        let name = entry.file_name().to_string_lossy().to_string();
        // file_type() does not follow symlinks
        if entry.file_type()?.is_dir() {
            let children = scan_children(&entry.path())?;
            items.push(RawItem::container(name, children));
        } else {
            items.push(RawItem::leaf(name));
        }
    }
    Ok(items)
}
