use super::*;

fn camera_file() -> CodeFile {
    let mut file = CodeFile::new("ConstantBufferMetadata");
    file.items.push(Item::Struct(StructDecl {
        name: "CameraData".to_string(),
        fields: vec![
            Field::new("viewProj", FieldType::Matrix { scalar: ScalarKind::Float, rows: 4, cols: 4 }),
            Field::new("position", FieldType::Vector { scalar: ScalarKind::Float, size: 3 }),
        ],
    }));
    file
}

#[test]
fn test_camera_data_packed_size() {
    assert_eq!(camera_file().packed_struct_size("CameraData"), Some(76));
    assert_eq!(camera_file().packed_struct_size("Missing"), None);
}

#[test]
fn test_nested_struct_and_array_sizes() {
    let mut file = camera_file();
    let mut cameras = Field::new("cameras", FieldType::Named("CameraData".to_string()));
    cameras.array_dims = vec![2];
    file.items.push(Item::Struct(StructDecl {
        name: "Scene".to_string(),
        fields: vec![cameras, Field::new("count", FieldType::UInt32)],
    }));

    assert_eq!(file.packed_struct_size("Scene"), Some(2 * 76 + 4));
}

#[test]
fn test_struct_size_across_files() {
    let mut scene = CodeFile::new("SceneMetadata");
    scene.items.push(Item::Struct(StructDecl {
        name: "Scene".to_string(),
        fields: vec![Field::new("camera", FieldType::Named("CameraData".to_string()))],
    }));

    assert_eq!(scene.packed_struct_size("Scene"), None);
    assert_eq!(packed_struct_size_in(&[camera_file(), scene], "Scene"), Some(76));
}

#[test]
fn test_pointer_fields_have_no_packed_size() {
    let mut file = CodeFile::new("Types");
    file.items.push(Item::Struct(StructDecl {
        name: "Meta".to_string(),
        fields: vec![Field::new("name", FieldType::Str)],
    }));
    assert_eq!(file.packed_struct_size("Meta"), None);
}

#[test]
fn test_enum_values() {
    let decl = EnumDecl { name: "Textures".to_string(), variants: vec!["Albedo".to_string(), "Normal".to_string()] };
    assert_eq!(decl.cardinality(), 3);
    assert_eq!(decl.value_of("Albedo"), Some(0));
    assert_eq!(decl.value_of("Normal"), Some(1));
    assert_eq!(decl.value_of("Count"), Some(2));
    assert_eq!(decl.value_of("Missing"), None);
}

#[test]
fn test_find_looks_into_modules() {
    let mut file = CodeFile::new("BuiltinShaders_Vulkan");
    file.items.push(Item::Module(ModuleDecl {
        name: "Vulkan".to_string(),
        items: vec![Item::Instance(InstanceDecl {
            name: "Fullscreen".to_string(),
            ty: "BuiltinShaderMetadata".to_string(),
            values: Vec::new(),
        })],
    }));

    assert!(file.find_instance("Fullscreen").is_some());
    assert!(file.find_struct("Fullscreen").is_none());
}
