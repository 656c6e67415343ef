/// Metadata registry - engine-wide resource IDs for one build
///
/// Accumulates reflection results from any number of shaders. Each resource
/// bucket owns a `ResourceMetadataTable` that hands out IDs in first-seen
/// order, so the same shader set fed in the same order always yields the same
/// IDs. The registry is an ordinary value: create one per build and pass it
/// along.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::reflection::types::{
    BufferLayout, ReflectionResult, ResourceType, ShaderResourceBinding, ShaderStageFlags,
    SourceLanguage, StageReflection,
};
use crate::{compiler_bail, compiler_debug};

/// Everything the generator needs about one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Position in discovery order, also the generated enum value
    pub id: u32,
    pub name: String,
    pub resource_type: ResourceType,
    /// Member layout (structured buffers unwrapped to their element)
    pub layout: Option<BufferLayout>,
    /// Language of the first shader that declared the resource
    pub language: SourceLanguage,
    /// Stages referencing the resource, across all shaders
    pub stages: ShaderStageFlags,
    /// Slot in the first shader that declared the resource
    pub set: u32,
    pub bind_point: u32,
}

impl ResourceMetadata {
    /// Size of one element in bytes, zero for unstructured resources
    pub fn size(&self) -> u32 {
        self.layout.as_ref().map_or(0, |layout| layout.size)
    }
}

/// ID assignment for one resource bucket
#[derive(Debug, Clone)]
pub struct ResourceMetadataTable {
    resource_type: ResourceType,
    entries: Vec<ResourceMetadata>,
    by_name: FxHashMap<String, u32>,
}

impl ResourceMetadataTable {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            entries: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ID order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceMetadata> + '_ {
        self.entries.iter()
    }

    /// Lookup by ID
    pub fn get(&self, id: u32) -> Option<&ResourceMetadata> {
        self.entries.get(id as usize)
    }

    /// Lookup by name
    pub fn get_by_name(&self, name: &str) -> Option<&ResourceMetadata> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    /// Register a binding seen in `stage`, returning its ID
    ///
    /// A name already present keeps its ID and gains the stage; it must carry
    /// the same layout.
    ///
    /// # Errors
    ///
    /// `Error::Generation` if the name is already registered with a different
    /// layout, `Error::Reflection` if the element layout overflows.
    pub fn insert(
        &mut self,
        binding: &ShaderResourceBinding,
        stage: ShaderStageFlags,
        language: SourceLanguage,
    ) -> Result<u32> {
        let layout = binding.layout.as_ref().map(element_layout).transpose()?;

        if let Some(&id) = self.by_name.get(&binding.name) {
            let entry = &mut self.entries[id as usize];
            if entry.layout != layout {
                compiler_bail!("galaxy3d::MetadataRegistry", Generation,
                    "{} '{}' is declared with conflicting layouts", self.resource_type, binding.name);
            }
            entry.stages |= stage;
            return Ok(id);
        }

        let id = self.entries.len() as u32;
        self.entries.push(ResourceMetadata {
            id,
            name: binding.name.clone(),
            resource_type: self.resource_type,
            layout,
            language,
            stages: stage,
            set: binding.set,
            bind_point: binding.bind_point,
        });
        self.by_name.insert(binding.name.clone(), id);
        Ok(id)
    }
}

/// Structured buffers describe their element, not the `T[]` wrapper
fn element_layout(layout: &BufferLayout) -> Result<BufferLayout> {
    Ok(layout.runtime_array_element()?.unwrap_or_else(|| layout.clone()))
}

/// Per-build registry of all resource buckets
#[derive(Debug, Clone)]
pub struct MetadataRegistry {
    tables: Vec<ResourceMetadataTable>,
    shader_count: usize,
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self {
            tables: ResourceType::ALL.iter().map(|&t| ResourceMetadataTable::new(t)).collect(),
            shader_count: 0,
        }
    }

    /// Table of one bucket
    pub fn table(&self, resource_type: ResourceType) -> &ResourceMetadataTable {
        &self.tables[resource_type as usize]
    }

    /// All tables, in `ResourceType::ALL` order
    pub fn tables(&self) -> &[ResourceMetadataTable] {
        &self.tables
    }

    /// Number of reflection results added so far
    pub fn shader_count(&self) -> usize {
        self.shader_count
    }

    /// Total number of distinct resources across buckets
    pub fn resource_count(&self) -> usize {
        self.tables.iter().map(ResourceMetadataTable::len).sum()
    }

    /// Add every binding of a reflected shader
    ///
    /// Stages are visited in stored order and bindings in their sorted order,
    /// which keeps ID assignment deterministic. On error the registry is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// `Error::Generation` on invalid stage bindings or conflicting layouts.
    pub fn add_reflection(&mut self, reflection: &ReflectionResult) -> Result<()> {
        reflection.validate()?;
        let mut staged = self.tables.clone();
        for stage in &reflection.stages {
            add_stage(&mut staged, stage, reflection.language)?;
        }
        self.tables = staged;
        self.shader_count += 1;
        compiler_debug!("galaxy3d::MetadataRegistry", "Registered shader #{} ({} resources total)",
            self.shader_count, self.resource_count());
        Ok(())
    }
}

fn add_stage(
    tables: &mut [ResourceMetadataTable],
    stage: &StageReflection,
    language: SourceLanguage,
) -> Result<()> {
    let flags = ShaderStageFlags::from_stage(stage.stage);
    for binding in &stage.bindings {
        tables[binding.resource_type as usize].insert(binding, flags, language)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
