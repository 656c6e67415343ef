/// Metadata generator - registry contents to code IR
///
/// For every resource bucket, independently, the generator emits:
/// - an enum of resource names (IDs in first-seen order, trailing `Count`)
/// - for structured buckets, a data struct per resource mirroring its GPU
///   layout (explicit `_padN` fields fill offset gaps) and a wrapper exposing
///   `index`, `size` and `stride`
/// - a kind struct (`ConstantBufferMetadata { id, size, stride }`,
///   `TextureMetadata { id }`), one instance per resource and an invalid
///   sentinel (`u32::MAX`, size 0)
/// - an ID-indexed table and a name-keyed table built from the same order
///
/// Nested structs are shared by all buckets and go to `ShaderMetadataTypes`.
/// Output is a pure function of the registry.

use crate::error::Result;
use crate::metadata::emit::{is_cpp_keyword, is_reserved_identifier};
use crate::metadata::ir::{
    CodeFile, EnumDecl, Field, FieldType, Import, InstanceDecl, Item, StructDecl, TableDecl,
    TableEntry, TableKind, ValueExpr, WrapperDecl,
};
use crate::metadata::registry::{MetadataRegistry, ResourceMetadata, ResourceMetadataTable};
use crate::reflection::spirv_reflection::sanitize_identifier;
use crate::reflection::types::{
    members_extent, MemberType, ReflectedMember, ReflectionResult, ResourceType, ScalarKind,
    SourceLanguage,
};
use crate::{compiler_bail, compiler_debug, compiler_err};

/// Umbrella file including every bucket file
pub const SHADER_METADATA_FILE: &str = "ShaderMetadata";

/// Nested structs referenced by data structs of any bucket
pub const SHADER_METADATA_TYPES_FILE: &str = "ShaderMetadataTypes";

/// Prefix of generated padding fields
pub const PADDING_PREFIX: &str = "_pad";

// ===== NAMING =====

/// `ConstantBufferMetadata` (file and kind struct)
pub fn metadata_file_name(resource_type: ResourceType) -> String {
    format!("{}Metadata", resource_type.name())
}

/// `ConstantBuffers`
pub fn resource_enum_name(resource_type: ResourceType) -> String {
    format!("{}s", resource_type.name())
}

/// `ConstantBufferMetadata`
pub fn kind_struct_name(resource_type: ResourceType) -> String {
    format!("{}Metadata", resource_type.name())
}

/// `ConstantBufferMetadata_CameraData`
pub fn instance_name(resource_type: ResourceType, resource: &str) -> String {
    format!("{}Metadata_{}", resource_type.name(), resource)
}

/// `ConstantBufferMetadataInvalid`
pub fn invalid_instance_name(resource_type: ResourceType) -> String {
    format!("{}MetadataInvalid", resource_type.name())
}

/// `ConstantBufferMetadataTable`
pub fn id_table_name(resource_type: ResourceType) -> String {
    format!("{}MetadataTable", resource_type.name())
}

/// `ConstantBufferMetadataByName`
pub fn name_table_name(resource_type: ResourceType) -> String {
    format!("{}MetadataByName", resource_type.name())
}

/// `CameraDataMetadata`
pub fn wrapper_name(resource: &str) -> String {
    format!("{}Metadata", resource)
}

// ===== MATRIX SHAPE =====

/// Source-level (rows, cols) of a SPIR-V matrix of `vector_count` vectors
///
/// DXC emits one SPIR-V vector per HLSL row; glslang one per GLSL column.
/// The two mappings are not symmetric and must stay that way.
pub fn matrix_shape(language: SourceLanguage, vector_count: u32, vector_size: u32) -> (u32, u32) {
    match language {
        SourceLanguage::Hlsl => (vector_count, vector_size),
        SourceLanguage::Glsl => (vector_size, vector_count),
    }
}

// ===== ENTRY POINTS =====

/// Reflect-to-code in one step: register `reflection` in a fresh registry
pub fn generate_from_reflection(reflection: &ReflectionResult) -> Result<Vec<CodeFile>> {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(reflection)?;
    generate_resource_metadata(&registry)
}

/// Shared types file, one file per bucket, then the `ShaderMetadata` umbrella
///
/// # Errors
///
/// `Error::Generation` if two structured resources of different buckets
/// share a name, if a name is reserved in generated code, if nested struct
/// names collide with different layouts or with a resource, or if a layout
/// cannot be mirrored by a plain struct.
pub fn generate_resource_metadata(registry: &MetadataRegistry) -> Result<Vec<CodeFile>> {
    check_resource_names(registry)?;

    let mut nested: Vec<StructDecl> = Vec::new();
    let mut data_structs: Vec<Vec<StructDecl>> = Vec::with_capacity(registry.tables().len());
    for table in registry.tables() {
        let mut structs = Vec::new();
        if table.resource_type().is_structured() {
            for resource in table.iter() {
                structs.push(data_struct(resource, &mut nested)?);
            }
        }
        data_structs.push(structs);
    }
    if let Some(clash) = data_structs.iter().flatten().find(|d| nested.iter().any(|n| n.name == d.name)) {
        compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "'{}' names both a resource and a nested struct", clash.name);
    }

    let mut files = Vec::with_capacity(ResourceType::ALL.len() + 2);
    files.push(generate_types_file(nested));
    for (table, structs) in registry.tables().iter().zip(data_structs) {
        files.push(generate_bucket(table, structs));
    }

    let mut umbrella = CodeFile::new(SHADER_METADATA_FILE);
    umbrella.header_only = true;
    umbrella.imports.push(Import::Sibling(SHADER_METADATA_TYPES_FILE.to_string()));
    umbrella.imports.extend(ResourceType::ALL.iter().map(|&t| Import::Sibling(metadata_file_name(t))));
    umbrella.items.push(Item::Comment(format!(
        "Binding metadata for {} resource(s) of {} shader(s) across {} bucket(s)",
        registry.resource_count(),
        registry.shader_count(),
        ResourceType::ALL.len()
    )));
    files.push(umbrella);

    compiler_debug!("galaxy3d::MetadataGenerator", "Generated {} metadata file(s)", files.len());
    Ok(files)
}

fn check_resource_names(registry: &MetadataRegistry) -> Result<()> {
    let mut seen: Vec<(&str, ResourceType)> = Vec::new();
    for table in registry.tables() {
        for entry in table.iter() {
            if is_reserved_identifier(&entry.name) {
                compiler_bail!("galaxy3d::MetadataGenerator", Generation,
                    "{} '{}' uses a name reserved in generated code", entry.resource_type, entry.name);
            }
            if !table.resource_type().is_structured() {
                continue;
            }
            if let Some((_, other)) = seen.iter().find(|(name, _)| *name == entry.name) {
                compiler_bail!("galaxy3d::MetadataGenerator", Generation,
                    "'{}' is both a {} and a {}; data struct names must be unique",
                    entry.name, other, entry.resource_type);
            }
            seen.push((entry.name.as_str(), entry.resource_type));
        }
    }
    Ok(())
}

fn generate_types_file(nested: Vec<StructDecl>) -> CodeFile {
    let mut file = CodeFile::new(SHADER_METADATA_TYPES_FILE);
    file.header_only = true;
    file.imports.push(Import::Std("cstdint".to_string()));
    file.items.extend(nested.into_iter().map(Item::Struct));
    file
}

/// `set 0, binding 2, 76 bytes, VERTEX|PIXEL`
fn binding_summary(resource: &ResourceMetadata) -> String {
    let stages: Vec<&str> = resource.stages.iter_names().map(|(name, _)| name).collect();
    let mut summary = format!("{}: set {}, binding {}", resource.name, resource.set, resource.bind_point);
    if resource.resource_type.is_structured() {
        summary.push_str(&format!(", {} bytes", resource.size()));
    }
    summary.push_str(&format!(", {}", stages.join("|")));
    summary
}

/// File of one bucket, given the data structs of its resources
fn generate_bucket(table: &ResourceMetadataTable, data_structs: Vec<StructDecl>) -> CodeFile {
    let resource_type = table.resource_type();
    let structured = resource_type.is_structured();
    let enum_name = resource_enum_name(resource_type);
    let kind = kind_struct_name(resource_type);

    let mut file = CodeFile::new(metadata_file_name(resource_type));
    file.imports = ["cstdint", "array", "string_view", "unordered_map"]
        .iter()
        .map(|h| Import::Std(h.to_string()))
        .collect();
    file.imports.push(Import::Sibling(SHADER_METADATA_TYPES_FILE.to_string()));

    file.items.push(Item::Enum(EnumDecl {
        name: enum_name.clone(),
        variants: table.iter().map(|r| r.name.clone()).collect(),
    }));

    let mut kind_fields = vec![Field::new("id", FieldType::UInt32)];
    if structured {
        kind_fields.push(Field::new("size", FieldType::UInt32));
        kind_fields.push(Field::new("stride", FieldType::UInt32));
    }
    file.items.push(Item::Struct(StructDecl { name: kind.clone(), fields: kind_fields }));

    if structured {
        file.items.extend(data_structs.into_iter().map(Item::Struct));

        for resource in table.iter() {
            file.items.push(Item::Wrapper(WrapperDecl {
                name: wrapper_name(&resource.name),
                base: resource.name.clone(),
                index: ValueExpr::EnumIndex { enum_name: enum_name.clone(), variant: resource.name.clone() },
                size: ValueExpr::SizeOf(resource.name.clone()),
                stride: ValueExpr::SizeOf(resource.name.clone()),
            }));
        }
    }

    for resource in table.iter() {
        let mut values = vec![(
            "id".to_string(),
            ValueExpr::EnumIndex { enum_name: enum_name.clone(), variant: resource.name.clone() },
        )];
        if structured {
            values.push(("size".to_string(), ValueExpr::SizeOf(resource.name.clone())));
            values.push(("stride".to_string(), ValueExpr::SizeOf(resource.name.clone())));
        }
        file.items.push(Item::Comment(binding_summary(resource)));
        file.items.push(Item::Instance(InstanceDecl {
            name: instance_name(resource_type, &resource.name),
            ty: kind.clone(),
            values,
        }));
    }

    let mut invalid = vec![("id".to_string(), ValueExpr::MaxU32)];
    if structured {
        invalid.push(("size".to_string(), ValueExpr::UInt(0)));
        invalid.push(("stride".to_string(), ValueExpr::UInt(0)));
    }
    file.items.push(Item::Instance(InstanceDecl {
        name: invalid_instance_name(resource_type),
        ty: kind.clone(),
        values: invalid,
    }));

    // Both tables come from the same iteration so they stay in enum order
    let entries: Vec<TableEntry> = table
        .iter()
        .map(|r| TableEntry { key: r.name.clone(), instance: instance_name(resource_type, &r.name) })
        .collect();

    file.items.push(Item::Table(TableDecl {
        name: id_table_name(resource_type),
        element_type: kind.clone(),
        kind: TableKind::ById,
        entries: entries.clone(),
        lookup_fn: format!("Get{}", kind),
        fallback: invalid_instance_name(resource_type),
    }));
    file.items.push(Item::Table(TableDecl {
        name: name_table_name(resource_type),
        element_type: kind.clone(),
        kind: TableKind::ByName,
        entries,
        lookup_fn: format!("Get{}ByName", kind),
        fallback: invalid_instance_name(resource_type),
    }));

    file
}

// ===== DATA STRUCTS =====

fn data_struct(resource: &ResourceMetadata, nested: &mut Vec<StructDecl>) -> Result<StructDecl> {
    let (members, size) = match &resource.layout {
        Some(layout) => (layout.members.as_slice(), layout.size),
        None => (&[][..], 0),
    };
    let fields = convert_members(&resource.name, members, size, resource.language, nested)?;
    Ok(StructDecl { name: resource.name.clone(), fields })
}

/// Fields placing every member at its reflected offset, padded to `size` bytes
fn convert_members(
    owner: &str,
    members: &[ReflectedMember],
    size: u32,
    language: SourceLanguage,
    nested: &mut Vec<StructDecl>,
) -> Result<Vec<Field>> {
    let mut fields = Vec::with_capacity(members.len());
    let mut cursor = 0u32;
    for member in members {
        let name = sanitize_identifier(&member.name);
        if is_cpp_keyword(&name) {
            compiler_bail!("galaxy3d::MetadataGenerator", Generation,
                "member '{}.{}' uses a name reserved in generated code", owner, name);
        }
        if member.offset < cursor {
            compiler_bail!("galaxy3d::MetadataGenerator", Generation,
                "member '{}.{}' at offset {} overlaps the previous member, which ends at {}",
                owner, name, member.offset, cursor);
        }
        push_padding(&mut fields, owner, member.offset - cursor)?;

        let (field, field_size) = convert_member(owner, &name, &member.member_type, language, nested)?;
        fields.push(field);
        cursor = member.offset.checked_add(field_size).ok_or_else(|| compiler_err!(
            "galaxy3d::MetadataGenerator", Generation,
            "member '{}.{}' ends past 4 GiB", owner, name))?;
    }
    if cursor > size {
        compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "'{}' spans {} bytes but its layout is {} bytes", owner, cursor, size);
    }
    push_padding(&mut fields, owner, size - cursor)?;

    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.name == field.name) {
            compiler_bail!("galaxy3d::MetadataGenerator", Generation,
                "'{}' has two fields named '{}'", owner, field.name);
        }
    }
    Ok(fields)
}

/// Append a `_padN` field covering `gap` bytes
fn push_padding(fields: &mut Vec<Field>, owner: &str, gap: u32) -> Result<()> {
    if gap == 0 {
        return Ok(());
    }
    let (scalar, count) = if gap % 4 == 0 {
        (ScalarKind::UInt, gap / 4)
    } else if gap % 2 == 0 {
        (ScalarKind::Half, gap / 2)
    } else {
        compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "'{}' has a {}-byte gap that cannot be padded", owner, gap);
    };
    let index = fields.iter().filter(|f| f.name.starts_with(PADDING_PREFIX)).count();
    let mut field = Field::new(format!("{}{}", PADDING_PREFIX, index), FieldType::Scalar(scalar));
    field.array_dims.push(count);
    fields.push(field);
    Ok(())
}

/// Field for one member and the bytes it occupies
fn convert_member(
    owner: &str,
    name: &str,
    member_type: &MemberType,
    language: SourceLanguage,
    nested: &mut Vec<StructDecl>,
) -> Result<(Field, u32)> {
    match member_type {
        MemberType::Scalar(scalar) => {
            let mut field = Field::new(name, FieldType::Scalar(*scalar));
            field.source_type = Some(scalar.hlsl_name().to_string());
            Ok((field, member_type.packed_size()?))
        }
        MemberType::Vector { scalar, size } => {
            let mut field = Field::new(name, FieldType::Vector { scalar: *scalar, size: *size });
            field.source_type = Some(format!("{}{}", scalar.hlsl_name(), size));
            Ok((field, member_type.packed_size()?))
        }
        MemberType::Matrix { scalar, vector_count, vector_size } => {
            let (rows, cols) = matrix_shape(language, *vector_count, *vector_size);
            let mut field = Field::new(name, FieldType::Matrix { scalar: *scalar, rows, cols });
            field.source_type = Some(format!("{}{}x{}", scalar.hlsl_name(), rows, cols));
            Ok((field, member_type.packed_size()?))
        }
        MemberType::Array { element, count, stride } => {
            let (field, element_size) = match element.as_ref() {
                MemberType::Struct { name: struct_name, members } => {
                    convert_struct(owner, name, struct_name, members, *stride, language, nested)?
                }
                other => convert_member(owner, name, other, language, nested)?,
            };
            let (mut field, element_size) = match *stride {
                Some(stride) if stride != element_size => widen_to_stride(owner, field, element_size, stride)?,
                _ => (field, element_size),
            };
            // A runtime array left inside a layout is mirrored as one element
            let count = count.unwrap_or(1);
            field.array_dims.insert(0, count);
            let size = element_size.checked_mul(count).ok_or_else(|| compiler_err!(
                "galaxy3d::MetadataGenerator", Generation,
                "array '{}.{}' is larger than 4 GiB", owner, name))?;
            Ok((field, size))
        }
        MemberType::Struct { name: struct_name, members } => {
            convert_struct(owner, name, struct_name, members, None, language, nested)
        }
    }
}

/// Field of a nested struct type, registering the struct
///
/// `span` is the array stride when the struct is an array element: the
/// struct gets trailing padding up to it.
fn convert_struct(
    owner: &str,
    field_name: &str,
    struct_name: &str,
    members: &[ReflectedMember],
    span: Option<u32>,
    language: SourceLanguage,
    nested: &mut Vec<StructDecl>,
) -> Result<(Field, u32)> {
    let struct_name = match sanitize_identifier(struct_name) {
        n if n.is_empty() => format!("{}_{}", owner, field_name),
        n => n,
    };
    if is_reserved_identifier(&struct_name) {
        compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "struct '{}' in '{}' uses a name reserved in generated code", struct_name, owner);
    }
    let extent = members_extent(members)?;
    let size = span.map_or(extent, |span| span.max(extent));

    let fields = convert_members(&struct_name, members, size, language, nested)?;
    push_struct(nested, StructDecl { name: struct_name.clone(), fields })?;

    let mut field = Field::new(field_name, FieldType::Named(struct_name.clone()));
    field.source_type = Some(struct_name);
    Ok((field, size))
}

/// Scalar and vector array elements shorter than their stride become wider
/// vectors (`float weights[4]` in a constant buffer is `float4[4]` in memory)
fn widen_to_stride(owner: &str, mut field: Field, element_size: u32, stride: u32) -> Result<(Field, u32)> {
    let scalar = match field.ty {
        FieldType::Scalar(scalar) | FieldType::Vector { scalar, .. } if field.array_dims.is_empty() => Some(scalar),
        _ => None,
    };
    match scalar {
        Some(scalar) if stride > element_size
            && stride % scalar.size_bytes() == 0
            && stride / scalar.size_bytes() <= 4 =>
        {
            let lanes = stride / scalar.size_bytes();
            field.source_type = field.source_type.map(|t| format!("{} (stride {})", t, stride));
            field.ty = FieldType::Vector { scalar, size: lanes };
            Ok((field, stride))
        }
        _ => compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "array '{}.{}' has a {}-byte stride for {}-byte elements",
            owner, field.name, stride, element_size),
    }
}

/// Add a struct unless an identical one exists
fn push_struct(structs: &mut Vec<StructDecl>, decl: StructDecl) -> Result<()> {
    match structs.iter().find(|s| s.name == decl.name) {
        Some(existing) if *existing == decl => Ok(()),
        Some(_) => compiler_bail!("galaxy3d::MetadataGenerator", Generation,
            "struct '{}' is generated twice with different layouts", decl.name),
        None => {
            structs.push(decl);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
