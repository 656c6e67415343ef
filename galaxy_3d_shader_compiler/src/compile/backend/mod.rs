/// Backend module - native compilers and the tagged backend selector

pub mod dxc;
pub mod glslang;

pub use dxc::{DxcBackend, DxcTarget, ProcessOutput, run_process, shader_profile};
pub use glslang::GlslangBackend;

use crate::error::Result;
use crate::compile::bytecode::Bytecode;
use crate::compile::descriptor::CompilationDescriptor;

/// Backend chosen for one compilation
///
/// Selected by `ShaderCompiler::backend_for` from the graphics API and the
/// configured SPIR-V backend. Adding an API means adding a variant here.
#[derive(Debug, Clone, Copy)]
pub enum CompilerBackend<'a> {
    /// External DXC producing DXIL or SPIR-V
    Dxc(&'a DxcBackend, DxcTarget),
    /// In-process glslang producing SPIR-V
    Glslang(&'a GlslangBackend),
}

impl CompilerBackend<'_> {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            CompilerBackend::Dxc(_, DxcTarget::Dxil) => "dxc (DXIL)",
            CompilerBackend::Dxc(_, DxcTarget::Spirv) => "dxc (SPIR-V)",
            CompilerBackend::Glslang(_) => "glslang (SPIR-V)",
        }
    }

    /// Whether the backend produces SPIR-V (and can therefore be reflected)
    pub fn produces_spirv(&self) -> bool {
        !matches!(self, CompilerBackend::Dxc(_, DxcTarget::Dxil))
    }

    pub fn compile(&self, desc: &CompilationDescriptor) -> Result<Bytecode> {
        match self {
            CompilerBackend::Dxc(backend, target) => backend.compile(desc, *target),
            CompilerBackend::Glslang(backend) => backend.compile(desc),
        }
    }
}
