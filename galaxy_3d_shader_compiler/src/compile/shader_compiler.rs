/// Shader compiler - routes a descriptor to the backend for its graphics API
///
/// Pure routing layer: no retry, no file system access of its own. A failed
/// compile is returned to the caller, which decides whether to abort.

use std::time::Instant;
use crate::error::Result;
use crate::compile::backend::{CompilerBackend, DxcBackend, DxcTarget, GlslangBackend};
use crate::compile::bytecode::Bytecode;
use crate::compile::config::{CompilerConfig, SpirvBackend};
use crate::compile::descriptor::CompilationDescriptor;
use crate::compile::shader_types::GraphicsApi;
use crate::{compiler_debug, compiler_error};

/// Per-build compiler context
///
/// Created once per invocation and shared by reference with every job.
#[derive(Debug, Clone)]
pub struct ShaderCompiler {
    config: CompilerConfig,
    dxc: DxcBackend,
    glslang: GlslangBackend,
}

impl ShaderCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let dxc = DxcBackend::new(&config);
        let glslang = GlslangBackend::new(&config);
        Self { config, dxc, glslang }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Backend used for `api`
    ///
    /// Vulkan goes through the SPIR-V path (glslang or DXC `-spirv`), D3D12
    /// through DXC producing DXIL.
    pub fn backend_for(&self, api: GraphicsApi) -> CompilerBackend<'_> {
        match api {
            GraphicsApi::Vulkan => match self.config.spirv_backend {
                SpirvBackend::Glslang => CompilerBackend::Glslang(&self.glslang),
                SpirvBackend::Dxc => CompilerBackend::Dxc(&self.dxc, DxcTarget::Spirv),
            },
            GraphicsApi::D3D12 => CompilerBackend::Dxc(&self.dxc, DxcTarget::Dxil),
        }
    }

    /// Compile one descriptor
    ///
    /// # Errors
    ///
    /// Whatever the selected backend reports; the error is logged here with
    /// the job's identity before being returned.
    pub fn compile(&self, desc: &CompilationDescriptor) -> Result<Bytecode> {
        let backend = self.backend_for(desc.graphics_api());
        let start = Instant::now();

        compiler_debug!("galaxy3d::ShaderCompiler", "Compiling {} '{}' ({}, {}) with {}",
            desc.input_path().display(), desc.entry_point(), desc.stage(),
            desc.graphics_api(), backend.name());

        let result = backend.compile(desc);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(bytecode) => compiler_debug!("galaxy3d::ShaderCompiler",
                "Compiled {} ({} bytes) in {:.1} ms",
                desc.unique_binary_name(), bytecode.len(), elapsed_ms),
            Err(e) => compiler_error!("galaxy3d::ShaderCompiler",
                "Compiling {} failed after {:.1} ms: {}",
                desc.unique_binary_name(), elapsed_ms, e.kind_name()),
        }
        result
    }
}

impl Default for ShaderCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

#[cfg(test)]
#[path = "shader_compiler_tests.rs"]
mod tests;
