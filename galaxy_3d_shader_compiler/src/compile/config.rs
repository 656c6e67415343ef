/// Compiler configuration - tool locations, include directories and limits

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the DXC executable path
pub const DXC_PATH_ENV: &str = "DXC_PATH";

/// Wall-clock budget for one external compiler invocation
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Which backend produces SPIR-V for the Vulkan route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpirvBackend {
    /// DXC with `-spirv` (external process)
    Dxc,
    /// glslang in-process (requires the `glslang` feature)
    Glslang,
}

impl SpirvBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SpirvBackend::Dxc => "dxc",
            SpirvBackend::Glslang => "glslang",
        }
    }

    /// Parse a `-spirvbackend` value
    pub fn from_cli_name(name: &str) -> Option<Self> {
        match name {
            "dxc" => Some(SpirvBackend::Dxc),
            "glslang" => Some(SpirvBackend::Glslang),
            _ => None,
        }
    }
}

impl Default for SpirvBackend {
    fn default() -> Self {
        if cfg!(feature = "glslang") {
            SpirvBackend::Glslang
        } else {
            SpirvBackend::Dxc
        }
    }
}

/// Settings shared by every compilation of one build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// DXC executable (bare name is looked up in PATH)
    pub dxc_path: PathBuf,
    pub spirv_backend: SpirvBackend,
    /// Extra include directories, searched in order
    pub include_dirs: Vec<PathBuf>,
    /// Per-process timeout for external compilers
    pub timeout: Duration,
    /// Compile batch jobs on the rayon thread pool
    pub parallel: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dxc_path: PathBuf::from("dxc"),
            spirv_backend: SpirvBackend::default(),
            include_dirs: Vec::new(),
            timeout: DEFAULT_PROCESS_TIMEOUT,
            parallel: true,
        }
    }
}

impl CompilerConfig {
    /// Defaults, with `DXC_PATH` applied when set and non-empty
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(DXC_PATH_ENV) {
            if !path.is_empty() {
                config.dxc_path = PathBuf::from(path);
            }
        }
        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
