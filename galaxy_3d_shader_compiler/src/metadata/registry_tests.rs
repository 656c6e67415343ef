use super::*;
use crate::compile::shader_types::ShaderStage;
use crate::error::Error;
use crate::reflection::types::{MemberType, ReflectedMember, ScalarKind};

// ============================================================================
// Helpers
// ============================================================================

fn scalar_member(name: &str, offset: u32) -> ReflectedMember {
    ReflectedMember {
        name: name.to_string(),
        offset,
        member_type: MemberType::Scalar(ScalarKind::Float),
    }
}

fn buffer(name: &str, bind_point: u32, members: Vec<ReflectedMember>) -> ShaderResourceBinding {
    ShaderResourceBinding {
        name: name.to_string(),
        type_name: Some(name.to_string()),
        resource_type: ResourceType::ConstantBuffer,
        set: 0,
        bind_point,
        layout: Some(BufferLayout::new(name, members).unwrap()),
    }
}

fn texture(name: &str, bind_point: u32) -> ShaderResourceBinding {
    ShaderResourceBinding {
        name: name.to_string(),
        type_name: None,
        resource_type: ResourceType::Texture,
        set: 0,
        bind_point,
        layout: None,
    }
}

fn shader(stage: ShaderStage, bindings: Vec<ShaderResourceBinding>) -> ReflectionResult {
    ReflectionResult {
        language: SourceLanguage::Hlsl,
        stages: vec![StageReflection { stage, entry_point: "main".to_string(), bindings }],
    }
}

// ============================================================================
// ID assignment
// ============================================================================

#[test]
fn test_ids_follow_first_seen_order() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        texture("Albedo", 0),
        texture("Normal", 1),
    ])).unwrap();
    registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        texture("Roughness", 0),
        texture("Albedo", 1),
    ])).unwrap();

    let table = registry.table(ResourceType::Texture);
    let names: Vec<_> = table.iter().map(|r| (r.id, r.name.as_str())).collect();
    assert_eq!(names, vec![(0, "Albedo"), (1, "Normal"), (2, "Roughness")]);
    assert_eq!(registry.shader_count(), 2);
    assert_eq!(registry.resource_count(), 3);
}

#[test]
fn test_name_and_id_lookups_agree() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        texture("Albedo", 0),
        texture("Normal", 1),
        buffer("CameraData", 0, vec![scalar_member("exposure", 0)]),
    ])).unwrap();

    for table in registry.tables() {
        for entry in table.iter() {
            assert_eq!(table.get_by_name(&entry.name).unwrap().id, entry.id);
            assert_eq!(table.get(entry.id).unwrap().name, entry.name);
        }
    }
    assert!(registry.table(ResourceType::Texture).get_by_name("Missing").is_none());
    assert!(registry.table(ResourceType::Texture).get(99).is_none());
}

#[test]
fn test_empty_registry_has_empty_buckets() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Compute, Vec::new())).unwrap();

    assert_eq!(registry.tables().len(), ResourceType::ALL.len());
    assert!(registry.tables().iter().all(ResourceMetadataTable::is_empty));
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_same_resource_in_two_stages_merges_flags() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Vertex, vec![
        buffer("CameraData", 0, vec![scalar_member("exposure", 0)]),
    ])).unwrap();
    registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        buffer("CameraData", 2, vec![scalar_member("exposure", 0)]),
    ])).unwrap();

    let table = registry.table(ResourceType::ConstantBuffer);
    assert_eq!(table.len(), 1);
    let entry = table.get(0).unwrap();
    assert_eq!(entry.stages, ShaderStageFlags::VERTEX | ShaderStageFlags::PIXEL);
    assert_eq!(entry.bind_point, 0);
    assert_eq!(entry.size(), 4);
}

#[test]
fn test_conflicting_layout_is_rejected() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        buffer("CameraData", 0, vec![scalar_member("exposure", 0)]),
    ])).unwrap();

    let result = registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        buffer("CameraData", 0, vec![scalar_member("gamma", 0)]),
    ]));
    assert!(matches!(result, Err(Error::Generation(msg)) if msg.contains("conflicting layouts")));
}

#[test]
fn test_failed_reflection_leaves_registry_unchanged() {
    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Vertex, vec![
        buffer("CameraData", 0, vec![scalar_member("exposure", 0)]),
    ])).unwrap();

    // New texture registers before the conflicting buffer is reached
    let result = registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        texture("Albedo", 0),
        buffer("CameraData", 1, vec![scalar_member("gamma", 0)]),
    ]));
    assert!(result.is_err());

    assert!(registry.table(ResourceType::Texture).is_empty());
    let camera = registry.table(ResourceType::ConstantBuffer).get(0).unwrap();
    assert_eq!(camera.stages, ShaderStageFlags::VERTEX);
    assert_eq!(registry.shader_count(), 1);
    assert_eq!(registry.resource_count(), 1);
}

#[test]
fn test_invalid_stage_is_rejected_before_registration() {
    let mut registry = MetadataRegistry::new();
    let result = registry.add_reflection(&shader(ShaderStage::Pixel, vec![
        texture("Albedo", 0),
        texture("Normal", 0),
    ]));

    assert!(matches!(result, Err(Error::Generation(_))));
    assert!(registry.table(ResourceType::Texture).is_empty());
}

#[test]
fn test_structured_buffer_is_unwrapped_to_element() {
    let particle = MemberType::Struct {
        name: "Particle".to_string(),
        members: vec![scalar_member("age", 0), scalar_member("size", 4)],
    };
    let binding = ShaderResourceBinding {
        name: "Particles".to_string(),
        type_name: Some("Particle".to_string()),
        resource_type: ResourceType::RWStorageBuffer,
        set: 0,
        bind_point: 0,
        layout: Some(BufferLayout::new("Particle", vec![ReflectedMember {
            name: "_m0".to_string(),
            offset: 0,
            member_type: MemberType::Array { element: Box::new(particle), count: None, stride: Some(8) },
        }]).unwrap()),
    };

    let mut registry = MetadataRegistry::new();
    registry.add_reflection(&shader(ShaderStage::Compute, vec![binding])).unwrap();

    let entry = registry.table(ResourceType::RWStorageBuffer).get_by_name("Particles").unwrap();
    let layout = entry.layout.as_ref().unwrap();
    assert_eq!(layout.members.len(), 2);
    assert_eq!(layout.members[0].name, "age");
    assert_eq!(entry.size(), 8);
}
