/*!
# Galaxy 3D Shader Compiler

Offline shader pipeline for the Galaxy 3D engine.

Takes HLSL source, drives a native compiler backend (DXC as an external
process, or glslang in-process), reflects the resulting SPIR-V, and emits
strongly-typed binding metadata (enums, plain-data structs, lookup tables)
that the runtime uses to build its descriptor/resource tables.

## Architecture

- **compile**: `CompilationDescriptor`, backends (`DxcBackend`, `GlslangBackend`)
  and the `ShaderCompiler` router
- **reflection**: SPIR-V reflection into a `ReflectionResult`
- **metadata**: `MetadataRegistry` (engine-wide IDs), the code IR, and the
  C++ / Rust emitters
- **builtin**: manifest discovery and the builtin shader batch builder
- **cli**: argument parsing and mode dispatch for the `shader_compiler` binary
*/

// Internal modules
mod error;
pub mod log;
pub mod compile;
pub mod reflection;
pub mod metadata;
pub mod builtin;
pub mod cli;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Log, Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Compilation sub-module
    pub mod compile {
        pub use crate::compile::*;
    }

    // Reflection sub-module
    pub mod reflection {
        pub use crate::reflection::*;
    }

    // Metadata generation sub-module
    pub mod metadata {
        pub use crate::metadata::*;
    }

    // Builtin shader batch sub-module
    pub mod builtin {
        pub use crate::builtin::*;
    }

    // Command line sub-module
    pub mod cli {
        pub use crate::cli::*;
    }
}
