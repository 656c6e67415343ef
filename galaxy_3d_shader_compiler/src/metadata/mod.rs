/// Metadata module - engine-wide resource IDs, code IR and emitters

pub mod registry;
pub mod ir;
pub mod generator;
pub mod emit;
pub mod writer;

pub use registry::*;
pub use ir::*;
pub use generator::*;
pub use emit::{EmittedFile, Emitter, OutputLanguage, CppEmitter, RustEmitter, GENERATED_BANNER, write_emitted};
pub use writer::*;
