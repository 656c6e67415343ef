/// Reflection module - resource-binding interface recovered from SPIR-V

pub mod types;
pub mod spirv_reflection;
pub mod sidecar;

#[cfg(test)]
pub(crate) mod test_spirv;

pub use types::*;
pub use spirv_reflection::*;
pub use sidecar::*;
