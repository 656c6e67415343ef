/// Shader stage, graphics API and platform enumerations
///
/// Each enum knows its command-line spelling (lowercase) and its display /
/// manifest spelling (CamelCase). Parsing is strict: unknown names are
/// rejected instead of mapping to a sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

// ===== SHADER STAGE =====

/// Pipeline stage a compilation unit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Hull,
    Domain,
    Geometry,
    Compute,
    /// D3D12 root signature blob (no shader code)
    RootSignature,
}

impl ShaderStage {
    /// All stages, in declaration order
    pub const ALL: [ShaderStage; 7] = [
        ShaderStage::Vertex,
        ShaderStage::Pixel,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Compute,
        ShaderStage::RootSignature,
    ];

    /// CamelCase name, as written in manifests and generated code
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::Pixel => "Pixel",
            ShaderStage::Hull => "Hull",
            ShaderStage::Domain => "Domain",
            ShaderStage::Geometry => "Geometry",
            ShaderStage::Compute => "Compute",
            ShaderStage::RootSignature => "RootSignature",
        }
    }

    /// Lowercase name accepted by `-stage`
    pub fn cli_name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Hull => "hull",
            ShaderStage::Domain => "domain",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Compute => "compute",
            ShaderStage::RootSignature => "rootsignature",
        }
    }

    /// Parse a `-stage` value (lowercase)
    pub fn from_cli_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|stage| stage.cli_name() == name)
    }

    /// Parse a manifest `stage:` value (case-sensitive, CamelCase)
    pub fn from_manifest_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|stage| stage.name() == name)
    }

    /// Position in `ALL`, used as the generated enum value
    pub fn index(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== GRAPHICS API =====

/// Graphics API a compilation unit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphicsApi {
    /// SPIR-V bytecode
    Vulkan,
    /// DXIL bytecode
    D3D12,
}

impl GraphicsApi {
    /// All APIs, in declaration order
    pub const ALL: [GraphicsApi; 2] = [GraphicsApi::Vulkan, GraphicsApi::D3D12];

    /// Display name, also used in generated identifiers and filenames
    pub fn name(&self) -> &'static str {
        match self {
            GraphicsApi::Vulkan => "Vulkan",
            GraphicsApi::D3D12 => "D3D12",
        }
    }

    /// Lowercase name accepted by `-graphicsapi`
    pub fn cli_name(&self) -> &'static str {
        match self {
            GraphicsApi::Vulkan => "vulkan",
            GraphicsApi::D3D12 => "d3d12",
        }
    }

    /// Parse a `-graphicsapi` value
    pub fn from_cli_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|api| api.cli_name() == name)
    }

    /// File extension of the raw compiler output
    pub fn bytecode_extension(&self) -> &'static str {
        match self {
            GraphicsApi::Vulkan => "spv",
            GraphicsApi::D3D12 => "dxil",
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== PLATFORM =====

/// Target OS / hardware platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Windows,
        Platform::Linux,
        Platform::MacOS,
        Platform::Android,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOS => "MacOS",
            Platform::Android => "Android",
        }
    }

    /// Lowercase name accepted by `-platform`
    pub fn cli_name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
            Platform::Android => "android",
        }
    }

    pub fn from_cli_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|platform| platform.cli_name() == name)
    }

    /// Platform the compiler itself runs on
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "shader_types_tests.rs"]
mod tests;
