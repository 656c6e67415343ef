/// glslang backend - in-process HLSL to SPIR-V through shaderc
///
/// Only available with the `glslang` cargo feature. Without it the backend
/// still exists so routing code compiles, but every compile call fails with a
/// configuration error.
///
/// The SPIR-V target (Vulkan 1.1 client, SPIR-V 1.3) is fixed so every build
/// produces the same ABI regardless of the caller.

use std::sync::Arc;
use crate::error::Result;
use crate::compile::bytecode::Bytecode;
use crate::compile::config::CompilerConfig;
use crate::compile::descriptor::CompilationDescriptor;
use crate::compile::include::{FileSystemIncludeResolver, IncludeResolver};

/// In-process glslang compiler
#[derive(Clone)]
pub struct GlslangBackend {
    #[cfg_attr(not(feature = "glslang"), allow(dead_code))]
    resolver: Arc<dyn IncludeResolver>,
}

impl GlslangBackend {
    /// Backend resolving includes from the file system and `config.include_dirs`
    pub fn new(config: &CompilerConfig) -> Self {
        Self::with_resolver(Arc::new(FileSystemIncludeResolver::new(config.include_dirs.clone())))
    }

    /// Backend with a custom include resolver
    pub fn with_resolver(resolver: Arc<dyn IncludeResolver>) -> Self {
        Self { resolver }
    }

    /// Whether this build carries the glslang library
    pub fn is_available() -> bool {
        cfg!(feature = "glslang")
    }

    /// Compile `desc` to SPIR-V and write it to `output_path`
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` when built without the `glslang` feature
    /// - `Error::Compilation` with glslang's diagnostics (parse, link, I/O
    ///   mapping, unresolved include)
    /// - `Error::Io` if the source cannot be read or the output written
    pub fn compile(&self, desc: &CompilationDescriptor) -> Result<Bytecode> {
        self.compile_impl(desc)
    }

    #[cfg(not(feature = "glslang"))]
    fn compile_impl(&self, desc: &CompilationDescriptor) -> Result<Bytecode> {
        crate::compiler_bail!("galaxy3d::Glslang", Configuration,
            "cannot compile '{}': glslang backend not built (enable the 'glslang' feature or use -spirvbackend dxc)",
            desc.input_path().display());
    }

    #[cfg(feature = "glslang")]
    fn compile_impl(&self, desc: &CompilationDescriptor) -> Result<Bytecode> {
        use crate::compile::descriptor::split_define;
        use crate::compile::include::IncludeKind;
        use crate::compile::shader_types::ShaderStage;
        use crate::{compiler_bail, compiler_err, compiler_warn};
        use std::path::Path;

        let kind = match desc.stage() {
            ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
            ShaderStage::Pixel => shaderc::ShaderKind::Fragment,
            ShaderStage::Hull => shaderc::ShaderKind::TessControl,
            ShaderStage::Domain => shaderc::ShaderKind::TessEvaluation,
            ShaderStage::Geometry => shaderc::ShaderKind::Geometry,
            ShaderStage::Compute => shaderc::ShaderKind::Compute,
            ShaderStage::RootSignature => compiler_bail!("galaxy3d::Glslang", Compilation,
                "stage RootSignature is not supported by glslang"),
        };

        let source = std::fs::read_to_string(desc.input_path()).map_err(|e| compiler_err!(
            "galaxy3d::Glslang", Io, "Cannot read '{}': {}", desc.input_path().display(), e))?;

        let compiler = shaderc::Compiler::new().ok_or_else(|| compiler_err!(
            "galaxy3d::Glslang", Configuration, "Failed to initialize glslang"))?;
        let mut options = shaderc::CompileOptions::new().ok_or_else(|| compiler_err!(
            "galaxy3d::Glslang", Configuration, "Failed to create glslang options"))?;

        options.set_source_language(shaderc::SourceLanguage::HLSL);
        options.set_target_env(shaderc::TargetEnv::Vulkan, shaderc::EnvVersion::Vulkan1_1 as u32);
        options.set_target_spirv(shaderc::SpirvVersion::V1_3);
        options.set_hlsl_offsets(true);
        options.set_hlsl_io_mapping(true);
        options.set_auto_bind_uniforms(true);
        for define in desc.defines() {
            let (name, value) = split_define(define);
            options.add_macro_definition(name, value);
        }

        let resolver = Arc::clone(&self.resolver);
        options.set_include_callback(move |header, include_type, includer, _depth| {
            let kind = match include_type {
                shaderc::IncludeType::Relative => IncludeKind::Local,
                shaderc::IncludeType::Standard => IncludeKind::System,
            };
            resolver
                .resolve(Path::new(includer), header, kind)
                .map(|resolved| shaderc::ResolvedInclude {
                    resolved_name: resolved.path.to_string_lossy().into_owned(),
                    content: resolved.content,
                })
                .map_err(|e| e.message().to_string())
        });

        let input_name = desc.input_path().to_string_lossy();
        let artifact = compiler
            .compile_into_spirv(&source, kind, &input_name, desc.entry_point(), Some(&options))
            .map_err(|e| compiler_err!("galaxy3d::Glslang", Compilation,
                "{} ({}): {}", desc.input_path().display(), desc.entry_point(), e))?;

        if artifact.get_num_warnings() > 0 {
            compiler_warn!("galaxy3d::Glslang", "{} ({}): {}",
                desc.input_path().display(), desc.entry_point(),
                artifact.get_warning_messages().trim());
        }

        let bytes = artifact.as_binary_u8().to_vec();
        if let Some(parent) = desc.output_path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| compiler_err!("galaxy3d::Glslang", Io,
                    "Cannot create output directory '{}': {}", parent.display(), e))?;
            }
        }
        std::fs::write(desc.output_path(), &bytes).map_err(|e| compiler_err!("galaxy3d::Glslang", Io,
            "Cannot write '{}': {}", desc.output_path().display(), e))?;

        Bytecode::new(bytes, desc.entry_point(), desc.stage())
    }
}

impl std::fmt::Debug for GlslangBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlslangBackend")
            .field("available", &Self::is_available())
            .finish()
    }
}

#[cfg(test)]
#[path = "glslang_tests.rs"]
mod tests;
