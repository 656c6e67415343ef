/// Builtin module - manifest discovery, batch compilation and embedding code

pub mod manifest;
pub mod batch;
pub mod codegen;

pub use manifest::*;
pub use batch::*;
pub use codegen::*;
