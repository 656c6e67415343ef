//! Error types for the Galaxy3D shader compiler
//!
//! This module defines the error types used throughout the pipeline,
//! from argument parsing to backend compilation and code generation.

use std::fmt;

/// Result type for shader compiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shader compiler errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid command line, manifest or descriptor (unknown stage/platform/API, missing field)
    Configuration(String),

    /// Backend diagnostics (syntax error, unresolved include, link failure)
    Compilation(String),

    /// External compiler exceeded its wall-clock budget
    Timeout(String),

    /// Bytecode could not be parsed by the reflection engine
    Reflection(String),

    /// Metadata could not be generated (duplicate or conflicting names, invalid identifiers)
    Generation(String),

    /// File system failure (always carries the offending path)
    Io(String),
}

impl Error {
    /// Bare diagnostic text, without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Error::Configuration(msg)
            | Error::Compilation(msg)
            | Error::Timeout(msg)
            | Error::Reflection(msg)
            | Error::Generation(msg)
            | Error::Io(msg) => msg,
        }
    }

    /// Short category tag
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Compilation(_) => "compilation",
            Error::Timeout(_) => "timeout",
            Error::Reflection(_) => "reflection",
            Error::Generation(_) => "generation",
            Error::Io(_) => "io",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Compilation(msg) => write!(f, "Compilation failed: {}", msg),
            Error::Timeout(msg) => write!(f, "Timed out: {}", msg),
            Error::Reflection(msg) => write!(f, "Reflection failed: {}", msg),
            Error::Generation(msg) => write!(f, "Metadata generation failed: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
