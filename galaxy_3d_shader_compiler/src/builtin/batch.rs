/// Builtin shader batch builder
///
/// Discover -> CompileAll -> BuildMetadata -> Done, or Failed as soon as a
/// step errors. Every declared shader is compiled once per requested API;
/// compilation is a barrier before any code is generated. BuildMetadata
/// writes the bytecode-embedding files and, from the reflected SPIR-V
/// variants, the binding metadata files.

use std::path::{Path, PathBuf};
use rayon::prelude::*;
use crate::builtin::codegen::{generate_builtin_files, UPTODATE_MARKER};
use crate::builtin::manifest::{discover_manifests, ShaderDeclaration, ShaderManifest};
use crate::compile::bytecode::Bytecode;
use crate::compile::descriptor::CompilationDescriptor;
use crate::compile::shader_compiler::ShaderCompiler;
use crate::compile::shader_types::{GraphicsApi, Platform, ShaderStage};
use crate::error::Result;
use crate::metadata::emit::{write_emitted, OutputLanguage};
use crate::metadata::generator::generate_resource_metadata;
use crate::metadata::ir::CodeFile;
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::writer::{touch_marker, WriteOutcome};
use crate::reflection::spirv_reflection::reflect_bytecode;
use crate::{compiler_debug, compiler_error, compiler_info};

/// Sub-directory of the output directory receiving raw bytecode
pub const BYTECODE_DIR: &str = "Bytecode";

/// Step the batch is in (or stopped at)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Discover,
    CompileAll,
    BuildMetadata,
    Done,
    Failed,
}

/// What to build and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinBatchOptions {
    /// Root scanned for `*.shaders` manifests
    pub input_dir: PathBuf,
    /// Generated code directory (bytecode goes to `BYTECODE_DIR` below it)
    pub output_dir: PathBuf,
    pub apis: Vec<GraphicsApi>,
    pub platform: Platform,
    /// Generate code after compiling (off: compile only)
    pub build_metadata: bool,
    pub language: OutputLanguage,
}

impl BuiltinBatchOptions {
    /// Every API, current platform, C++ output
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            apis: GraphicsApi::ALL.to_vec(),
            platform: Platform::current(),
            build_metadata: true,
            language: OutputLanguage::Cpp,
        }
    }
}

/// One (shader, API) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinJob {
    pub shader: ShaderDeclaration,
    pub api: GraphicsApi,
    /// `Blit_main_Vulkan.spv`
    pub unique_binary_name: String,
    /// `None` for combinations skipped by design (placeholder entry)
    pub descriptor: Option<CompilationDescriptor>,
}

/// Result of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    pub name: String,
    pub entry_point: String,
    pub stage: ShaderStage,
    pub api: GraphicsApi,
    pub unique_binary_name: String,
    /// `None` for placeholders
    pub bytecode: Option<Bytecode>,
}

/// Everything a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub shaders: Vec<CompiledShader>,
    pub files: Vec<(PathBuf, WriteOutcome)>,
    /// Up-to-date marker, when code was generated
    pub marker: Option<PathBuf>,
}

/// `Blit_main_Vulkan.spv`
pub fn unique_binary_name(shader: &ShaderDeclaration, api: GraphicsApi) -> String {
    format!("{}_{}_{}.{}", shader.name, shader.entry_point, api.name(), api.bytecode_extension())
}

/// Whether a stage is meaningful for an API (root signatures are D3D12 only)
pub fn is_supported(stage: ShaderStage, api: GraphicsApi) -> bool {
    stage != ShaderStage::RootSignature || api == GraphicsApi::D3D12
}

/// One job per declared shader per API, declaration order first
pub fn plan_jobs(
    manifests: &[ShaderManifest],
    apis: &[GraphicsApi],
    bytecode_dir: &Path,
    platform: Platform,
) -> Result<Vec<BuiltinJob>> {
    let mut jobs = Vec::new();
    for shader in manifests.iter().flat_map(|m| m.shaders.iter()) {
        for &api in apis {
            let unique_binary_name = unique_binary_name(shader, api);
            let descriptor = if is_supported(shader.stage, api) {
                Some(CompilationDescriptor::builder()
                    .input_path(&shader.source_path)
                    .output_path(bytecode_dir.join(&unique_binary_name))
                    .entry_point(&shader.entry_point)
                    .stage(shader.stage)
                    .platform(platform)
                    .graphics_api(api)
                    .defines(shader.defines.iter().cloned())
                    .build()?)
            } else {
                compiler_debug!("galaxy3d::BuiltinBatch", "Skipping {} for {} (placeholder)",
                    shader.name, api);
                None
            };
            jobs.push(BuiltinJob { shader: shader.clone(), api, unique_binary_name, descriptor });
        }
    }
    Ok(jobs)
}

/// Registry of every compiled SPIR-V variant, fed in job order
///
/// DXIL variants and placeholders have nothing to reflect and are skipped.
///
/// # Errors
///
/// `Error::Reflection` if a module cannot be reflected, `Error::Generation`
/// if shaders declare one resource with conflicting layouts.
pub fn reflect_compiled(shaders: &[CompiledShader]) -> Result<MetadataRegistry> {
    let mut registry = MetadataRegistry::new();
    for shader in shaders {
        let Some(bytecode) = shader.bytecode.as_ref().filter(|b| b.is_spirv()) else {
            continue;
        };
        let reflection = reflect_bytecode(bytecode)?;
        compiler_debug!("galaxy3d::BuiltinBatch", "Reflected {}: {} binding(s)",
            shader.unique_binary_name, reflection.binding_count());
        registry.add_reflection(&reflection)?;
    }
    Ok(registry)
}

/// Embedding files followed by the binding metadata files
pub fn generate_batch_files(shaders: &[CompiledShader], apis: &[GraphicsApi]) -> Result<Vec<CodeFile>> {
    let mut files = generate_builtin_files(shaders, apis)?;
    let registry = reflect_compiled(shaders)?;
    compiler_info!("galaxy3d::BuiltinBatch", "{} resource(s) reflected from {} SPIR-V shader(s)",
        registry.resource_count(), registry.shader_count());
    files.extend(generate_resource_metadata(&registry)?);
    Ok(files)
}

/// Batch driver; owns nothing but its options and a borrowed compiler
pub struct BuiltinBatch<'a> {
    compiler: &'a ShaderCompiler,
    options: BuiltinBatchOptions,
    state: BatchState,
}

impl<'a> BuiltinBatch<'a> {
    pub fn new(compiler: &'a ShaderCompiler, options: BuiltinBatchOptions) -> Self {
        Self { compiler, options, state: BatchState::Discover }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn options(&self) -> &BuiltinBatchOptions {
        &self.options
    }

    /// Run every step; the state stays at `Failed` on error
    pub fn run(&mut self) -> Result<BatchReport> {
        let result = self.run_steps();
        if let Err(e) = &result {
            compiler_error!("galaxy3d::BuiltinBatch", "Builtin batch failed while in {:?}: {}",
                self.state, e.kind_name());
            self.state = BatchState::Failed;
        }
        result
    }

    fn run_steps(&mut self) -> Result<BatchReport> {
        self.state = BatchState::Discover;
        let manifests = discover_manifests(&self.options.input_dir)?;
        let bytecode_dir = self.options.output_dir.join(BYTECODE_DIR);
        let jobs = plan_jobs(&manifests, &self.options.apis, &bytecode_dir, self.options.platform)?;
        compiler_info!("galaxy3d::BuiltinBatch", "{} manifest(s), {} job(s) for {:?}",
            manifests.len(), jobs.len(), self.options.apis);

        self.state = BatchState::CompileAll;
        let shaders = self.compile_all(&jobs)?;

        let mut report = BatchReport { shaders, files: Vec::new(), marker: None };
        if self.options.build_metadata {
            self.state = BatchState::BuildMetadata;
            let files = generate_batch_files(&report.shaders, &self.options.apis)?;
            let emitted = self.options.language.emitter().emit_all(&files)?;
            report.files = write_emitted(&self.options.output_dir, &emitted)?;

            let marker = self.options.output_dir.join(UPTODATE_MARKER);
            touch_marker(&marker)?;
            report.marker = Some(marker);

            let written = report.files.iter().filter(|(_, o)| *o == WriteOutcome::Written).count();
            compiler_info!("galaxy3d::BuiltinBatch", "Generated {} file(s), {} changed",
                report.files.len(), written);
        }

        self.state = BatchState::Done;
        Ok(report)
    }

    /// Compile every job, in parallel unless disabled; output keeps job order
    fn compile_all(&self, jobs: &[BuiltinJob]) -> Result<Vec<CompiledShader>> {
        if self.compiler.config().parallel {
            jobs.par_iter().map(|job| self.compile_job(job)).collect()
        } else {
            jobs.iter().map(|job| self.compile_job(job)).collect()
        }
    }

    fn compile_job(&self, job: &BuiltinJob) -> Result<CompiledShader> {
        let bytecode = match &job.descriptor {
            Some(desc) => Some(self.compiler.compile(desc)?),
            None => None,
        };
        Ok(CompiledShader {
            name: job.shader.name.clone(),
            entry_point: job.shader.entry_point.clone(),
            stage: job.shader.stage,
            api: job.api,
            unique_binary_name: job.unique_binary_name.clone(),
            bytecode,
        })
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
