/// Include resolution for the in-process backend
///
/// The backend hands every `#include` to an `IncludeResolver`. Resolution is
/// fail-fast: a header that cannot be found aborts the whole compilation with
/// "Include X not found".

use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::{compiler_bail, compiler_trace};

/// `#include "x"` vs `#include <x>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    /// Quoted: includer's directory first, then the include directories
    Local,
    /// Angle brackets: include directories only
    System,
}

/// A header found by a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    /// Absolute or includer-relative path, reported back to the backend as the
    /// includer of nested headers
    pub path: PathBuf,
    pub content: String,
}

/// Maps an include request to header text
pub trait IncludeResolver: Send + Sync {
    /// Resolve `header` requested from `includer`
    ///
    /// # Errors
    ///
    /// `Error::Compilation("Include X not found")` when no candidate exists,
    /// `Error::Io` when a candidate exists but cannot be read.
    fn resolve(&self, includer: &Path, header: &str, kind: IncludeKind) -> Result<ResolvedInclude>;
}

/// Resolver backed by the file system
#[derive(Debug, Clone, Default)]
pub struct FileSystemIncludeResolver {
    include_dirs: Vec<PathBuf>,
}

impl FileSystemIncludeResolver {
    pub fn new(include_dirs: Vec<PathBuf>) -> Self {
        Self { include_dirs }
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// Candidate paths, in search order
    pub fn candidates(&self, includer: &Path, header: &str, kind: IncludeKind) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(self.include_dirs.len() + 1);
        if kind == IncludeKind::Local {
            let base = includer.parent().unwrap_or_else(|| Path::new(""));
            candidates.push(base.join(header));
        }
        candidates.extend(self.include_dirs.iter().map(|dir| dir.join(header)));
        candidates
    }
}

impl IncludeResolver for FileSystemIncludeResolver {
    fn resolve(&self, includer: &Path, header: &str, kind: IncludeKind) -> Result<ResolvedInclude> {
        for candidate in self.candidates(includer, header, kind) {
            if !candidate.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&candidate).map_err(|e| {
                crate::compiler_err!("galaxy3d::Include", Io,
                    "Cannot read include '{}': {}", candidate.display(), e)
            })?;
            compiler_trace!("galaxy3d::Include", "'{}' -> '{}'", header, candidate.display());
            return Ok(ResolvedInclude { path: candidate, content });
        }
        compiler_bail!("galaxy3d::Include", Compilation, "Include {} not found", header);
    }
}

#[cfg(test)]
#[path = "include_tests.rs"]
mod tests;
