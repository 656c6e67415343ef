/// Generated file output
///
/// Every generated file goes through `write_if_changed` so unchanged output
/// keeps its timestamp and downstream builds are not invalidated.

use std::path::Path;
use crate::error::Result;
use crate::{compiler_debug, compiler_err};

/// What `write_if_changed` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Write `contents` to `path` unless the file already holds exactly that text
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// `Error::Io` with the path if the directory or file cannot be written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<WriteOutcome> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents.as_bytes() {
            compiler_debug!("galaxy3d::Writer", "Unchanged {}", path.display());
            return Ok(WriteOutcome::Unchanged);
        }
    }
    create_parent(path)?;
    std::fs::write(path, contents).map_err(|e| compiler_err!("galaxy3d::Writer", Io,
        "Cannot write '{}': {}", path.display(), e))?;
    compiler_debug!("galaxy3d::Writer", "Wrote {}", path.display());
    Ok(WriteOutcome::Written)
}

/// Create or truncate a zero-byte marker file
///
/// Always rewritten, so its timestamp marks the end of the last complete pass.
pub fn touch_marker(path: &Path) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, b"").map_err(|e| compiler_err!("galaxy3d::Writer", Io,
        "Cannot write marker '{}': {}", path.display(), e))
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| compiler_err!("galaxy3d::Writer", Io,
                "Cannot create directory '{}': {}", parent.display(), e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
