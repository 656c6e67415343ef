/// Compile module - compilation descriptors, backends and the routing layer

// Module declarations
pub mod shader_types;
pub mod descriptor;
pub mod bytecode;
pub mod include;
pub mod config;
pub mod backend;
pub mod shader_compiler;

// Re-export everything
pub use shader_types::*;
pub use descriptor::*;
pub use bytecode::*;
pub use include::*;
pub use config::*;
pub use backend::{CompilerBackend, DxcBackend, DxcTarget, GlslangBackend, ProcessOutput};
pub use shader_compiler::*;
