/// Shader manifests - `*.shaders` YAML files declaring builtin shaders
///
/// ```yaml
/// Blit:
///   entrypoint: main
///   stage: Pixel
///   defines: [LINEAR_FILTER, SAMPLES=4]
/// ```
///
/// Every manifest is paired with the `.hlsl` file of the same stem.

use std::path::{Path, PathBuf};
use serde::Deserialize;
use walkdir::WalkDir;
use crate::compile::shader_types::ShaderStage;
use crate::error::Result;
use crate::metadata::emit::is_reserved_identifier;
use crate::{compiler_bail, compiler_debug, compiler_err};

/// Extension of manifest files
pub const MANIFEST_EXTENSION: &str = "shaders";

/// Extension of the paired shader source
pub const SOURCE_EXTENSION: &str = "hlsl";

/// One shader declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDeclaration {
    pub name: String,
    pub entry_point: String,
    pub stage: ShaderStage,
    pub defines: Vec<String>,
    /// HLSL file holding the entry point
    pub source_path: PathBuf,
}

/// Parsed manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderManifest {
    pub path: PathBuf,
    pub source_path: PathBuf,
    /// Declarations in document order
    pub shaders: Vec<ShaderDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeclaration {
    entrypoint: String,
    stage: String,
    #[serde(default)]
    defines: Option<RawDefines>,
}

/// `defines:` accepts a single string or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDefines {
    One(String),
    Many(Vec<String>),
}

impl RawDefines {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawDefines::One(define) => vec![define],
            RawDefines::Many(defines) => defines,
        }
    }
}

/// `shaders/Blit.shaders` -> `shaders/Blit.hlsl`
pub fn source_path_for(manifest_path: &Path) -> PathBuf {
    manifest_path.with_extension(SOURCE_EXTENSION)
}

/// Parse manifest text
///
/// # Errors
///
/// `Error::Configuration` on malformed YAML, on a name that is not a valid
/// identifier (a space usually means a missing `:`), on an unknown stage
/// or on an empty entry point.
pub fn parse_manifest(path: &Path, text: &str) -> Result<ShaderManifest> {
    let source_path = source_path_for(path);
    let document: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| compiler_err!(
        "galaxy3d::Manifest", Configuration, "Malformed manifest '{}': {}", path.display(), e))?;

    let mapping = match document {
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => compiler_bail!("galaxy3d::Manifest", Configuration,
            "Manifest '{}' must map shader names to declarations", path.display()),
    };

    let mut shaders = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(name) = key.as_str() else {
            compiler_bail!("galaxy3d::Manifest", Configuration,
                "Manifest '{}' has a non-string shader name", path.display());
        };
        validate_name(path, name)?;

        let raw: RawDeclaration = serde_yaml::from_value(value).map_err(|e| compiler_err!(
            "galaxy3d::Manifest", Configuration,
            "Shader '{}' in '{}' is malformed: {}", name, path.display(), e))?;

        let Some(stage) = ShaderStage::from_manifest_name(&raw.stage) else {
            compiler_bail!("galaxy3d::Manifest", Configuration,
                "Shader '{}' in '{}' has unknown stage '{}'", name, path.display(), raw.stage);
        };
        if raw.entrypoint.trim().is_empty() {
            compiler_bail!("galaxy3d::Manifest", Configuration,
                "Shader '{}' in '{}' has an empty entrypoint", name, path.display());
        }

        shaders.push(ShaderDeclaration {
            name: name.to_string(),
            entry_point: raw.entrypoint,
            stage,
            defines: raw.defines.map(RawDefines::into_vec).unwrap_or_default(),
            source_path: source_path.clone(),
        });
    }

    Ok(ShaderManifest { path: path.to_path_buf(), source_path, shaders })
}

fn validate_name(path: &Path, name: &str) -> Result<()> {
    if name.contains(char::is_whitespace) {
        compiler_bail!("galaxy3d::Manifest", Configuration,
            "Shader name '{}' in '{}' contains a space. Did you miss a ':'?", name, path.display());
    }
    let valid = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        compiler_bail!("galaxy3d::Manifest", Configuration,
            "Shader name '{}' in '{}' is not a valid identifier", name, path.display());
    }
    if is_reserved_identifier(name) {
        compiler_bail!("galaxy3d::Manifest", Configuration,
            "Shader name '{}' in '{}' is reserved in generated code", name, path.display());
    }
    Ok(())
}

/// Read and parse one manifest
pub fn load_manifest(path: &Path) -> Result<ShaderManifest> {
    let text = std::fs::read_to_string(path).map_err(|e| compiler_err!("galaxy3d::Manifest", Io,
        "Cannot read manifest '{}': {}", path.display(), e))?;
    parse_manifest(path, &text)
}

/// Find and parse every manifest under `root`, sorted by path
///
/// # Errors
///
/// `Error::Io` if `root` cannot be walked, `Error::Configuration` for a
/// malformed manifest, a missing `.hlsl` partner or a shader name declared
/// twice.
pub fn discover_manifests(root: &Path) -> Result<Vec<ShaderManifest>> {
    let mut manifests = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| compiler_err!("galaxy3d::Manifest", Io,
            "Cannot scan '{}': {}", root.display(), e))?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXTENSION)
        {
            continue;
        }

        let manifest = load_manifest(path)?;
        if !manifest.source_path.is_file() {
            compiler_bail!("galaxy3d::Manifest", Configuration,
                "Manifest '{}' has no matching source '{}'",
                path.display(), manifest.source_path.display());
        }
        compiler_debug!("galaxy3d::Manifest", "Found {} with {} shader(s)",
            path.display(), manifest.shaders.len());
        manifests.push(manifest);
    }

    check_unique_names(&manifests)?;
    Ok(manifests)
}

fn check_unique_names(manifests: &[ShaderManifest]) -> Result<()> {
    let mut seen: Vec<(&str, &Path)> = Vec::new();
    for manifest in manifests {
        for shader in &manifest.shaders {
            if let Some((_, first)) = seen.iter().find(|(name, _)| *name == shader.name) {
                compiler_bail!("galaxy3d::Manifest", Configuration,
                    "Shader '{}' is declared in both '{}' and '{}'",
                    shader.name, first.display(), manifest.path.display());
            }
            seen.push((shader.name.as_str(), manifest.path.as_path()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
