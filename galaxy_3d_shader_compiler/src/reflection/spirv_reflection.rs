/// SPIR-V reflection engine
///
/// Parses a SPIR-V module with spirq and buckets every descriptor binding
/// into a `ResourceType`, walking buffer types to build member layouts.
///
/// Reflection is best-effort: descriptor kinds with no bucket (input
/// attachments, acceleration structures) are logged and skipped. Only a module
/// that cannot be parsed at all is an error.

use spirq::ty::{AccessType, DescriptorType, ScalarType, Type};
use spirq::var::Variable;
use crate::error::Result;
use crate::compile::bytecode::{Bytecode, SPIRV_MAGIC};
use crate::compile::shader_types::ShaderStage;
use crate::reflection::types::{
    BufferLayout, MemberType, ReflectedMember, ReflectionResult, ResourceType, ScalarKind,
    ShaderResourceBinding, SourceLanguage, StageReflection,
};
use crate::{compiler_bail, compiler_debug, compiler_err, compiler_trace, compiler_warn};

// SPIR-V opcodes and enumerants read directly from the word stream
pub(crate) const OP_SOURCE: u32 = 3;
pub(crate) const SOURCE_LANGUAGE_GLSL: u32 = 2;
pub(crate) const SOURCE_LANGUAGE_HLSL: u32 = 5;
const HEADER_WORDS: usize = 5;

/// Reflect compiled bytecode (must be SPIR-V)
pub fn reflect_bytecode(bytecode: &Bytecode) -> Result<ReflectionResult> {
    let words = bytecode.spirv_words()?;
    reflect_spirv(&words)
}

/// Reflect a SPIR-V module given as words
///
/// # Errors
///
/// `Error::Reflection` if the module is not SPIR-V or spirq rejects it.
pub fn reflect_spirv(words: &[u32]) -> Result<ReflectionResult> {
    if words.len() < HEADER_WORDS || words[0] != SPIRV_MAGIC {
        compiler_bail!("galaxy3d::Reflection", Reflection, "not a SPIR-V module");
    }
    let language = scan_source_language(words);

    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| compiler_err!("galaxy3d::Reflection", Reflection,
            "SPIR-V reflection failed: {:?}", e))?;

    let mut result = ReflectionResult::new(language);

    for entry_point in &entry_points {
        // Names are not unique: one module may export `main` for several models
        let Some(stage) = stage_from_execution_model(entry_point.exec_model as u32) else {
            compiler_warn!("galaxy3d::Reflection",
                "Skipping entry point '{}': execution model {:?} has no shader stage",
                entry_point.name, entry_point.exec_model);
            continue;
        };

        let mut bindings = Vec::new();
        for var in entry_point.vars.iter() {
            let Variable::Descriptor { name, desc_bind, desc_ty, ty, .. } = var else {
                continue;
            };
            let Some(resource_type) = classify_descriptor(desc_ty) else {
                compiler_warn!("galaxy3d::Reflection",
                    "Skipping '{}' (set {}, binding {}) in '{}': unsupported descriptor type {:?}",
                    name.as_deref().unwrap_or("<unnamed>"), desc_bind.set(), desc_bind.bind(),
                    entry_point.name, desc_ty);
                continue;
            };

            let type_name = struct_name(ty).map(declared_type_name);
            let binding_name = resolve_binding_name(name.as_deref(), type_name.as_deref());
            let layout = match (resource_type.is_structured(), ty) {
                (true, Type::Struct(st)) => Some(BufferLayout::new(
                    type_name.clone().unwrap_or_else(|| binding_name.clone()),
                    convert_members(st),
                )?),
                _ => None,
            };

            compiler_trace!("galaxy3d::Reflection", "{} {} '{}' at set {} binding {}",
                stage, resource_type, binding_name, desc_bind.set(), desc_bind.bind());

            bindings.push(ShaderResourceBinding {
                name: binding_name,
                type_name,
                resource_type,
                set: desc_bind.set(),
                bind_point: desc_bind.bind(),
                layout,
            });
        }

        // spirq does not guarantee variable order; IDs are derived from this order
        bindings.sort_by(|a, b| {
            (a.set, a.bind_point, &a.name).cmp(&(b.set, b.bind_point, &b.name))
        });

        compiler_debug!("galaxy3d::Reflection", "{} '{}': {} binding(s)",
            stage, entry_point.name, bindings.len());

        result.stages.push(StageReflection {
            stage,
            entry_point: entry_point.name.clone(),
            bindings,
        });
    }

    result.stages.sort_by_key(|s| s.stage);
    Ok(result)
}

/// Bucket for a spirq descriptor type, `None` when there is none
pub fn classify_descriptor(desc_ty: &DescriptorType) -> Option<ResourceType> {
    match desc_ty {
        DescriptorType::UniformBuffer() => Some(ResourceType::ConstantBuffer),
        DescriptorType::SampledImage() | DescriptorType::CombinedImageSampler() => Some(ResourceType::Texture),
        DescriptorType::Sampler() => Some(ResourceType::Sampler),
        DescriptorType::StorageImage(..) => Some(ResourceType::RWTexture),
        DescriptorType::StorageBuffer(access) => {
            if matches!(access, AccessType::ReadOnly) {
                Some(ResourceType::StorageBuffer)
            } else {
                Some(ResourceType::RWStorageBuffer)
            }
        }
        DescriptorType::UniformTexelBuffer() => Some(ResourceType::TypedBuffer),
        DescriptorType::StorageTexelBuffer(..) => Some(ResourceType::RWTypedBuffer),
        _ => None,
    }
}

/// Strip the compiler's `type.` prefix and wrapper qualifiers
///
/// `type.CameraData` -> `CameraData`, `type.RWStructuredBuffer.Particle` -> `Particle`.
pub fn declared_type_name(raw: &str) -> String {
    let stripped = raw.strip_prefix("type.").unwrap_or(raw);
    stripped.rsplit('.').next().unwrap_or(stripped).to_string()
}

/// Identifier for a binding: its variable name, else its type name
pub fn resolve_binding_name(var_name: Option<&str>, type_name: Option<&str>) -> String {
    match var_name.filter(|n| !n.is_empty()) {
        Some(name) => sanitize_identifier(name),
        None => type_name.map(sanitize_identifier).unwrap_or_default(),
    }
}

/// Make a name usable as a C++/Rust identifier
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn struct_name(ty: &Type) -> Option<&str> {
    match ty {
        Type::Struct(st) => st.name.as_deref(),
        _ => None,
    }
}

fn convert_scalar(scalar_ty: &ScalarType) -> ScalarKind {
    match scalar_ty {
        ScalarType::Boolean => ScalarKind::Bool,
        ScalarType::Integer { bits: 64, is_signed: true } => ScalarKind::Int64,
        ScalarType::Integer { bits: 64, is_signed: false } => ScalarKind::UInt64,
        ScalarType::Integer { is_signed: true, .. } => ScalarKind::Int,
        ScalarType::Integer { is_signed: false, .. } => ScalarKind::UInt,
        ScalarType::Float { bits: 16 } => ScalarKind::Half,
        ScalarType::Float { bits: 64 } => ScalarKind::Double,
        ScalarType::Float { .. } => ScalarKind::Float,
        ScalarType::Void => ScalarKind::Float,
    }
}

fn convert_type(ty: &Type) -> MemberType {
    match ty {
        Type::Scalar(s) => MemberType::Scalar(convert_scalar(s)),
        Type::Vector(v) => MemberType::Vector {
            scalar: convert_scalar(&v.scalar_ty),
            size: v.nscalar,
        },
        Type::Matrix(m) => MemberType::Matrix {
            scalar: convert_scalar(&m.vector_ty.scalar_ty),
            vector_count: m.nvector,
            vector_size: m.vector_ty.nscalar,
        },
        Type::Array(a) => MemberType::Array {
            element: Box::new(convert_type(&a.element_ty)),
            count: a.nelement,
            stride: a.stride.map(|s| s as u32),
        },
        Type::Struct(st) => MemberType::Struct {
            name: st.name.as_deref().map(declared_type_name).unwrap_or_default(),
            members: convert_members(st),
        },
        other => {
            compiler_warn!("galaxy3d::Reflection",
                "Unsupported member type {:?}, reflected as float", other);
            MemberType::Scalar(ScalarKind::Float)
        }
    }
}

fn convert_members(st: &spirq::ty::StructType) -> Vec<ReflectedMember> {
    st.members
        .iter()
        .enumerate()
        .map(|(i, m)| ReflectedMember {
            name: m.name.clone().unwrap_or_else(|| format!("_m{}", i)),
            offset: m.offset.unwrap_or(0) as u32,
            member_type: convert_type(&m.ty),
        })
        .collect()
}

// ===== RAW MODULE SCAN =====

/// Language recorded by `OpSource` (spirq does not surface it), HLSL if absent
fn scan_source_language(words: &[u32]) -> SourceLanguage {
    let mut cursor = HEADER_WORDS;
    while cursor < words.len() {
        let word_count = (words[cursor] >> 16) as usize;
        let opcode = words[cursor] & 0xffff;
        if word_count == 0 || cursor + word_count > words.len() {
            break;
        }
        if opcode == OP_SOURCE && word_count > 1 {
            match words.get(cursor + 1) {
                Some(&SOURCE_LANGUAGE_GLSL) => return SourceLanguage::Glsl,
                Some(&SOURCE_LANGUAGE_HLSL) => return SourceLanguage::Hlsl,
                _ => {}
            }
        }
        cursor += word_count;
    }
    SourceLanguage::Hlsl
}

fn stage_from_execution_model(model: u32) -> Option<ShaderStage> {
    match model {
        0 => Some(ShaderStage::Vertex),
        1 => Some(ShaderStage::Hull),
        2 => Some(ShaderStage::Domain),
        3 => Some(ShaderStage::Geometry),
        4 => Some(ShaderStage::Pixel),
        5 => Some(ShaderStage::Compute),
        _ => None,
    }
}

#[cfg(test)]
#[path = "spirv_reflection_tests.rs"]
mod tests;
