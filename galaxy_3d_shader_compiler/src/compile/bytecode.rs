/// Compiled shader bytecode (SPIR-V words or DXIL blob) plus its header

use std::hash::Hasher;
use rustc_hash::FxHasher;
use crate::error::Result;
use crate::compile::shader_types::ShaderStage;
use crate::{compiler_bail, compiler_err};

/// SPIR-V magic number (first word of every module)
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Immutable compiled shader
///
/// Owned by whoever uploads it to the GPU API layer; the reflection engine
/// only borrows `as_bytes()` / `spirv_words()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode {
    data: Vec<u8>,
    entry_point: String,
    stage: ShaderStage,
    hash: u64,
}

impl Bytecode {
    /// Wrap backend output
    ///
    /// # Errors
    ///
    /// `Error::Compilation` if the backend produced no bytes at all.
    pub fn new(data: Vec<u8>, entry_point: impl Into<String>, stage: ShaderStage) -> Result<Self> {
        let entry_point = entry_point.into();
        if data.is_empty() {
            compiler_bail!("galaxy3d::Bytecode", Compilation,
                "backend produced empty bytecode for entry point '{}' ({})", entry_point, stage);
        }
        let hash = hash_bytes(&data);
        Ok(Self { data, entry_point, stage, hash })
    }

    pub fn as_bytes(&self) -> &[u8] { &self.data }

    pub fn into_bytes(self) -> Vec<u8> { self.data }

    pub fn len(&self) -> usize { self.data.len() }

    /// Always false for a successfully constructed bytecode
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn entry_point(&self) -> &str { &self.entry_point }

    pub fn stage(&self) -> ShaderStage { self.stage }

    /// 64-bit FxHash digest of the bytes (stable for a given build)
    pub fn hash(&self) -> u64 { self.hash }

    /// Whether the bytes start with the SPIR-V magic number
    pub fn is_spirv(&self) -> bool {
        self.data.len() >= 4
            && u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]) == SPIRV_MAGIC
    }

    /// Reinterpret the bytes as little-endian SPIR-V words
    ///
    /// # Errors
    ///
    /// `Error::Reflection` if the length is not a multiple of 4 or the magic
    /// number is missing.
    pub fn spirv_words(&self) -> Result<Vec<u32>> {
        spirv_words_from_bytes(&self.data)
    }
}

/// Convert a little-endian SPIR-V byte stream to words
pub fn spirv_words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        compiler_bail!("galaxy3d::Bytecode", Reflection,
            "SPIR-V size {} is not a multiple of 4", bytes.len());
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    let magic = words.first().copied()
        .ok_or_else(|| compiler_err!("galaxy3d::Bytecode", Reflection, "SPIR-V module is empty"))?;
    if magic != SPIRV_MAGIC {
        compiler_bail!("galaxy3d::Bytecode", Reflection,
            "not a SPIR-V module (magic 0x{:08x})", magic);
    }
    Ok(words)
}

/// Convert SPIR-V words to their little-endian byte stream
pub fn spirv_bytes_from_words(words: &[u32]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        bytemuck::cast_slice::<u32, u8>(words).to_vec()
    } else {
        words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }
}

fn hash_bytes(data: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
#[path = "bytecode_tests.rs"]
mod tests;
