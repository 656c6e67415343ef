/// Reflection sidecar - `<output>.reflection.yaml` next to compiled bytecode

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::metadata::writer::{write_if_changed, WriteOutcome};
use crate::reflection::types::ReflectionResult;
use crate::compiler_err;

/// Suffix appended to the bytecode file name
pub const SIDECAR_SUFFIX: &str = ".reflection.yaml";

/// `shaders/Fog.spv` -> `shaders/Fog.spv.reflection.yaml`
pub fn sidecar_path(output_path: &Path) -> PathBuf {
    let mut name: OsString = output_path.file_name().map(OsString::from).unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    output_path.with_file_name(name)
}

/// Serialize a reflection result to YAML
pub fn reflection_to_yaml(reflection: &ReflectionResult) -> Result<String> {
    serde_yaml::to_string(reflection).map_err(|e| compiler_err!("galaxy3d::Sidecar", Generation,
        "Cannot serialize reflection: {}", e))
}

/// Parse a sidecar back
pub fn reflection_from_yaml(text: &str) -> Result<ReflectionResult> {
    serde_yaml::from_str(text).map_err(|e| compiler_err!("galaxy3d::Sidecar", Reflection,
        "Malformed reflection sidecar: {}", e))
}

/// Write the sidecar for `output_path`, returning its path
pub fn write_reflection_sidecar(output_path: &Path, reflection: &ReflectionResult) -> Result<(PathBuf, WriteOutcome)> {
    let path = sidecar_path(output_path);
    let outcome = write_if_changed(&path, &reflection_to_yaml(reflection)?)?;
    Ok((path, outcome))
}

#[cfg(test)]
#[path = "sidecar_tests.rs"]
mod tests;
