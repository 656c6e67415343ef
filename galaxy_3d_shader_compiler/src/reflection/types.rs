/// Reflection result types
///
/// Language-neutral description of the resource-binding interface recovered
/// from bytecode: one `StageReflection` per entry point, each holding its
/// bindings with bucket, bind point and (for buffers) member layout.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::Result;
use crate::compile::shader_types::ShaderStage;
use crate::compiler_bail;

// ===== RESOURCE TYPE =====

/// Resource bucket a binding falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// `cbuffer` / `ConstantBuffer<T>` (uniform buffer)
    ConstantBuffer,
    /// `Texture*` (sampled image)
    Texture,
    /// `SamplerState`
    Sampler,
    /// `RWTexture*` (storage image)
    RWTexture,
    /// `StructuredBuffer` / `ByteAddressBuffer` (read-only storage buffer)
    StorageBuffer,
    /// `RWStructuredBuffer` / `RWByteAddressBuffer`
    RWStorageBuffer,
    /// `Buffer<T>` (uniform texel buffer)
    TypedBuffer,
    /// `RWBuffer<T>` (storage texel buffer)
    RWTypedBuffer,
}

impl ResourceType {
    /// All buckets, in generation order
    pub const ALL: [ResourceType; 8] = [
        ResourceType::ConstantBuffer,
        ResourceType::Texture,
        ResourceType::Sampler,
        ResourceType::RWTexture,
        ResourceType::StorageBuffer,
        ResourceType::RWStorageBuffer,
        ResourceType::TypedBuffer,
        ResourceType::RWTypedBuffer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::ConstantBuffer => "ConstantBuffer",
            ResourceType::Texture => "Texture",
            ResourceType::Sampler => "Sampler",
            ResourceType::RWTexture => "RWTexture",
            ResourceType::StorageBuffer => "StorageBuffer",
            ResourceType::RWStorageBuffer => "RWStorageBuffer",
            ResourceType::TypedBuffer => "TypedBuffer",
            ResourceType::RWTypedBuffer => "RWTypedBuffer",
        }
    }

    /// Whether bindings of this bucket carry a member layout
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            ResourceType::ConstantBuffer | ResourceType::StorageBuffer | ResourceType::RWStorageBuffer
        )
    }

    /// Whether the shader may write through the binding (UAV)
    pub fn is_read_write(&self) -> bool {
        matches!(
            self,
            ResourceType::RWTexture | ResourceType::RWStorageBuffer | ResourceType::RWTypedBuffer
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== SOURCE LANGUAGE =====

/// Language the bytecode was compiled from (recorded by `OpSource`)
///
/// Decides how SPIR-V matrix dimensions map back to source-level rows and
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceLanguage {
    #[default]
    Hlsl,
    Glsl,
}

// ===== MEMBER TYPES =====

/// Scalar component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Int64,
    UInt64,
    Half,
    Float,
    Double,
}

impl ScalarKind {
    /// HLSL spelling, also the stem of vector/matrix names (`float4`, `uint2x2`)
    pub fn hlsl_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Int64 => "int64_t",
            ScalarKind::UInt64 => "uint64_t",
            ScalarKind::Half => "half",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
        }
    }

    /// Size in bytes (bool is 32-bit in buffers)
    pub fn size_bytes(&self) -> u32 {
        match self {
            ScalarKind::Half => 2,
            ScalarKind::Int64 | ScalarKind::UInt64 | ScalarKind::Double => 8,
            _ => 4,
        }
    }
}

/// Type of a buffer member
///
/// Matrices keep the SPIR-V encoding (`vector_count` vectors of
/// `vector_size` components). Mapping that back to rows and columns depends
/// on the source language and is done by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    Scalar(ScalarKind),
    Vector {
        scalar: ScalarKind,
        size: u32,
    },
    Matrix {
        scalar: ScalarKind,
        vector_count: u32,
        vector_size: u32,
    },
    Array {
        element: Box<MemberType>,
        /// `None` for a runtime-sized array
        count: Option<u32>,
        stride: Option<u32>,
    },
    Struct {
        name: String,
        members: Vec<ReflectedMember>,
    },
}

impl MemberType {
    /// Size in bytes of the GPU layout, without trailing std140/std430 padding
    ///
    /// This is the size of the mirrored plain-data struct in generated code.
    /// Arrays span `stride * count` when a stride was reflected. A runtime
    /// array counts as one element; a struct ends with its last member.
    ///
    /// # Errors
    ///
    /// `Error::Reflection` if the size does not fit in 32 bits.
    pub fn packed_size(&self) -> Result<u32> {
        let size = match self {
            MemberType::Scalar(scalar) => Some(scalar.size_bytes()),
            MemberType::Vector { scalar, size } => scalar.size_bytes().checked_mul(*size),
            MemberType::Matrix { scalar, vector_count, vector_size } => scalar
                .size_bytes()
                .checked_mul(*vector_count)
                .and_then(|s| s.checked_mul(*vector_size)),
            MemberType::Array { element, count, stride } => {
                let element_size = match stride {
                    Some(stride) => *stride,
                    None => element.packed_size()?,
                };
                element_size.checked_mul(count.unwrap_or(1))
            }
            MemberType::Struct { members, .. } => return members_extent(members),
        };
        match size {
            Some(size) => Ok(size),
            None => compiler_bail!("galaxy3d::Reflection", Reflection,
                "size of {:?} overflows 32 bits", self),
        }
    }
}

/// End of the last member (`offset + packed size`), zero when empty
///
/// # Errors
///
/// `Error::Reflection` if a member ends past `u32::MAX`.
pub fn members_extent(members: &[ReflectedMember]) -> Result<u32> {
    let mut extent = 0u32;
    for member in members {
        let Some(end) = member.offset.checked_add(member.member_type.packed_size()?) else {
            compiler_bail!("galaxy3d::Reflection", Reflection,
                "member '{}' at offset {} ends past 4 GiB", member.name, member.offset);
        };
        extent = extent.max(end);
    }
    Ok(extent)
}

/// Named member of a buffer or nested struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedMember {
    pub name: String,
    /// Byte offset in the GPU layout
    pub offset: u32,
    pub member_type: MemberType,
}

/// Member layout of a structured binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferLayout {
    /// Declared struct name, `type.` prefix removed
    pub type_name: String,
    /// GPU-side size: end of the last member (offset + packed size)
    pub size: u32,
    pub members: Vec<ReflectedMember>,
}

impl BufferLayout {
    /// # Errors
    ///
    /// `Error::Reflection` if the layout is larger than `u32::MAX` bytes.
    pub fn new(type_name: impl Into<String>, members: Vec<ReflectedMember>) -> Result<Self> {
        let size = members_extent(&members)?;
        Ok(Self { type_name: type_name.into(), size, members })
    }

    /// Element struct of a buffer whose only member is a runtime array of structs
    ///
    /// Structured buffers are reflected as `struct { T _m0[]; }`; metadata
    /// describes `T`, padded up to the array stride.
    pub fn runtime_array_element(&self) -> Result<Option<BufferLayout>> {
        let [ReflectedMember { member_type: MemberType::Array { element, count: None, stride }, .. }] =
            self.members.as_slice()
        else {
            return Ok(None);
        };
        let MemberType::Struct { name, members } = element.as_ref() else {
            return Ok(None);
        };
        let mut layout = BufferLayout::new(name.clone(), members.clone())?;
        layout.size = layout.size.max(stride.unwrap_or(0));
        Ok(Some(layout))
    }
}

// ===== STAGE FLAGS =====

bitflags! {
    /// Stages that reference a resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const PIXEL = 1 << 1;
        const HULL = 1 << 2;
        const DOMAIN = 1 << 3;
        const GEOMETRY = 1 << 4;
        const COMPUTE = 1 << 5;
    }
}

impl ShaderStageFlags {
    /// Flag for one stage (`RootSignature` has none)
    pub fn from_stage(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Pixel => ShaderStageFlags::PIXEL,
            ShaderStage::Hull => ShaderStageFlags::HULL,
            ShaderStage::Domain => ShaderStageFlags::DOMAIN,
            ShaderStage::Geometry => ShaderStageFlags::GEOMETRY,
            ShaderStage::Compute => ShaderStageFlags::COMPUTE,
            ShaderStage::RootSignature => ShaderStageFlags::empty(),
        }
    }
}

// ===== BINDINGS =====

/// One GPU-visible resource used by a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderResourceBinding {
    /// Identifier used in generated code (variable name, or type name fallback)
    pub name: String,
    /// Declared type name (`type.` prefix removed), if any
    pub type_name: Option<String>,
    pub resource_type: ResourceType,
    /// Descriptor set (register space)
    pub set: u32,
    /// Binding slot within the set
    pub bind_point: u32,
    /// Member layout, for structured buckets only
    pub layout: Option<BufferLayout>,
}

/// Reflection of one entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReflection {
    pub stage: ShaderStage,
    pub entry_point: String,
    /// Sorted by (set, bind point, name)
    pub bindings: Vec<ShaderResourceBinding>,
}

impl StageReflection {
    /// Bindings of one bucket, in stored order
    pub fn bindings_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &ShaderResourceBinding> + '_ {
        self.bindings.iter().filter(move |b| b.resource_type == resource_type)
    }

    /// Check naming and bind point uniqueness
    ///
    /// # Errors
    ///
    /// `Error::Generation` if a binding has no usable name, if two bindings
    /// of one bucket share a (set, bind point), or if two bindings of one
    /// bucket share a name.
    pub fn validate(&self) -> Result<()> {
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.name.is_empty() {
                compiler_bail!("galaxy3d::Reflection", Generation,
                    "{} binding at set {} binding {} in {} '{}' has no name",
                    binding.resource_type, binding.set, binding.bind_point, self.stage, self.entry_point);
            }
            for other in &self.bindings[..i] {
                if other.resource_type != binding.resource_type {
                    continue;
                }
                if other.set == binding.set && other.bind_point == binding.bind_point {
                    compiler_bail!("galaxy3d::Reflection", Generation,
                        "{} '{}' and '{}' share set {} binding {} in {} '{}'",
                        binding.resource_type, other.name, binding.name,
                        binding.set, binding.bind_point, self.stage, self.entry_point);
                }
                if other.name == binding.name {
                    compiler_bail!("galaxy3d::Reflection", Generation,
                        "duplicate {} name '{}' in {} '{}'",
                        binding.resource_type, binding.name, self.stage, self.entry_point);
                }
            }
        }
        Ok(())
    }
}

/// Aggregated reflection of a shader (one or more stages)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionResult {
    pub language: SourceLanguage,
    pub stages: Vec<StageReflection>,
}

impl ReflectionResult {
    pub fn new(language: SourceLanguage) -> Self {
        Self { language, stages: Vec::new() }
    }

    /// Append the stages of another result (compiled from the same language)
    pub fn merge(&mut self, other: ReflectionResult) {
        if self.stages.is_empty() {
            self.language = other.language;
        }
        self.stages.extend(other.stages);
    }

    /// Validate every stage
    pub fn validate(&self) -> Result<()> {
        self.stages.iter().try_for_each(StageReflection::validate)
    }

    /// Number of bindings across all stages
    pub fn binding_count(&self) -> usize {
        self.stages.iter().map(|s| s.bindings.len()).sum()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
