/// Compilation descriptor - one immutable compilation request
///
/// Built through `CompilationDescriptorBuilder`, which stays mutable (defines
/// can be pushed) until `build()` validates it. The resulting descriptor has
/// no setters: once handed to a backend it cannot change.

use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::compile::shader_types::{GraphicsApi, Platform, ShaderStage};
use crate::compiler_bail;

/// One compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationDescriptor {
    input_path: PathBuf,
    output_path: PathBuf,
    temp_path: PathBuf,
    entry_point: String,
    stage: ShaderStage,
    platform: Platform,
    graphics_api: GraphicsApi,
    defines: Vec<String>,
    build_reflection: bool,
}

impl CompilationDescriptor {
    /// Start building a descriptor
    pub fn builder() -> CompilationDescriptorBuilder {
        CompilationDescriptorBuilder::default()
    }

    pub fn input_path(&self) -> &Path { &self.input_path }

    pub fn output_path(&self) -> &Path { &self.output_path }

    /// Scratch directory for intermediate files
    pub fn temp_path(&self) -> &Path { &self.temp_path }

    pub fn entry_point(&self) -> &str { &self.entry_point }

    pub fn stage(&self) -> ShaderStage { self.stage }

    pub fn platform(&self) -> Platform { self.platform }

    pub fn graphics_api(&self) -> GraphicsApi { self.graphics_api }

    /// Preprocessor symbols, `NAME` or `NAME=VALUE`, in declaration order
    pub fn defines(&self) -> &[String] { &self.defines }

    /// Whether a reflection sidecar is requested alongside the bytecode
    pub fn build_reflection(&self) -> bool { self.build_reflection }

    /// File stem of the output path (name + API + entry point qualified for builtin shaders)
    pub fn unique_binary_name(&self) -> String {
        self.output_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Mutable builder for `CompilationDescriptor`
#[derive(Debug, Clone, Default)]
pub struct CompilationDescriptorBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    temp_path: Option<PathBuf>,
    entry_point: Option<String>,
    stage: Option<ShaderStage>,
    platform: Option<Platform>,
    graphics_api: Option<GraphicsApi>,
    defines: Vec<String>,
    build_reflection: bool,
}

impl CompilationDescriptorBuilder {
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn temp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_path = Some(path.into());
        self
    }

    pub fn entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    pub fn stage(mut self, stage: ShaderStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn graphics_api(mut self, api: GraphicsApi) -> Self {
        self.graphics_api = Some(api);
        self
    }

    /// Append one define (`NAME` or `NAME=VALUE`)
    pub fn define(mut self, define: impl Into<String>) -> Self {
        self.defines.push(define.into());
        self
    }

    /// Append several defines, keeping their order
    pub fn defines<I, S>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defines.extend(defines.into_iter().map(Into::into));
        self
    }

    pub fn build_reflection(mut self, enabled: bool) -> Self {
        self.build_reflection = enabled;
        self
    }

    /// Validate and freeze the descriptor
    ///
    /// # Errors
    ///
    /// `Error::Configuration` when the entry point, input or output is missing
    /// or empty, when no stage or graphics API was given, or when a define is
    /// empty.
    pub fn build(self) -> Result<CompilationDescriptor> {
        let entry_point = match self.entry_point {
            Some(entry_point) if !entry_point.trim().is_empty() => entry_point,
            _ => compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "no entry point specified"),
        };
        let input_path = match self.input_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "no input file specified"),
        };
        let output_path = match self.output_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "no output file specified"),
        };
        let Some(stage) = self.stage else {
            compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "no shader stage specified");
        };
        let Some(graphics_api) = self.graphics_api else {
            compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "no graphics API specified");
        };
        if let Some(position) = self.defines.iter().position(|d| d.trim().is_empty()) {
            compiler_bail!("galaxy3d::CompilationDescriptor", Configuration,
                "define #{} for '{}' is empty", position, input_path.display());
        }

        Ok(CompilationDescriptor {
            input_path,
            output_path,
            temp_path: self.temp_path.unwrap_or_else(std::env::temp_dir),
            entry_point,
            stage,
            platform: self.platform.unwrap_or_else(Platform::current),
            graphics_api,
            defines: self.defines,
            build_reflection: self.build_reflection,
        })
    }
}

/// Split a define into its name and optional value (`NAME=VALUE`)
pub fn split_define(define: &str) -> (&str, Option<&str>) {
    match define.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (define.trim(), None),
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
