use super::*;

// ============================================================================
// ShaderStage
// ============================================================================

#[test]
fn test_stage_cli_names() {
    assert_eq!(ShaderStage::from_cli_name("vertex"), Some(ShaderStage::Vertex));
    assert_eq!(ShaderStage::from_cli_name("pixel"), Some(ShaderStage::Pixel));
    assert_eq!(ShaderStage::from_cli_name("hull"), Some(ShaderStage::Hull));
    assert_eq!(ShaderStage::from_cli_name("domain"), Some(ShaderStage::Domain));
    assert_eq!(ShaderStage::from_cli_name("geometry"), Some(ShaderStage::Geometry));
    assert_eq!(ShaderStage::from_cli_name("compute"), Some(ShaderStage::Compute));
    assert_eq!(ShaderStage::from_cli_name("fragment"), None);
    assert_eq!(ShaderStage::from_cli_name("Vertex"), None);
}

#[test]
fn test_stage_manifest_names_are_case_sensitive() {
    assert_eq!(ShaderStage::from_manifest_name("Pixel"), Some(ShaderStage::Pixel));
    assert_eq!(
        ShaderStage::from_manifest_name("RootSignature"),
        Some(ShaderStage::RootSignature)
    );
    assert_eq!(ShaderStage::from_manifest_name("pixel"), None);
    assert_eq!(ShaderStage::from_manifest_name("PIXEL"), None);
}

#[test]
fn test_stage_index_matches_declaration_order() {
    for (i, stage) in ShaderStage::ALL.iter().enumerate() {
        assert_eq!(stage.index(), i as u32);
    }
}

#[test]
fn test_stage_display() {
    assert_eq!(format!("{}", ShaderStage::Compute), "Compute");
}

// ============================================================================
// GraphicsApi
// ============================================================================

#[test]
fn test_graphics_api_parse() {
    assert_eq!(GraphicsApi::from_cli_name("vulkan"), Some(GraphicsApi::Vulkan));
    assert_eq!(GraphicsApi::from_cli_name("d3d12"), Some(GraphicsApi::D3D12));
    assert_eq!(GraphicsApi::from_cli_name("metal"), None);
}

#[test]
fn test_graphics_api_extensions() {
    assert_eq!(GraphicsApi::Vulkan.bytecode_extension(), "spv");
    assert_eq!(GraphicsApi::D3D12.bytecode_extension(), "dxil");
}

// ============================================================================
// Platform
// ============================================================================

#[test]
fn test_platform_parse() {
    assert_eq!(Platform::from_cli_name("windows"), Some(Platform::Windows));
    assert_eq!(Platform::from_cli_name("linux"), Some(Platform::Linux));
    assert_eq!(Platform::from_cli_name("macos"), Some(Platform::MacOS));
    assert_eq!(Platform::from_cli_name("android"), Some(Platform::Android));
    assert_eq!(Platform::from_cli_name("ps5"), None);
}

#[test]
fn test_platform_current_is_known() {
    let current = Platform::current();
    assert!(Platform::ALL.contains(&current));
}
