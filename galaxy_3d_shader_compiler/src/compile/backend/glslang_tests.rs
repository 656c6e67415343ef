use super::*;
use crate::compile::shader_types::{GraphicsApi, ShaderStage};
use crate::error::Error;

fn descriptor(input: impl Into<std::path::PathBuf>, output: impl Into<std::path::PathBuf>) -> CompilationDescriptor {
    CompilationDescriptor::builder()
        .input_path(input)
        .output_path(output)
        .entry_point("main")
        .stage(ShaderStage::Pixel)
        .graphics_api(GraphicsApi::Vulkan)
        .build()
        .unwrap()
}

#[cfg(not(feature = "glslang"))]
#[test]
fn test_unavailable_backend_reports_configuration_error() {
    assert!(!GlslangBackend::is_available());

    let backend = GlslangBackend::new(&CompilerConfig::default());
    let result = backend.compile(&descriptor("a.hlsl", "a.spv"));
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("glslang")));
}

#[cfg(feature = "glslang")]
#[test]
#[ignore] // Requires the native glslang library (shaderc build)
fn test_compile_pixel_shader_with_include() {
    let dir = std::env::temp_dir().join(format!("galaxy3d_glslang_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Color.hlsli"), "static const float4 kRed = float4(1, 0, 0, 1);").unwrap();
    std::fs::write(
        dir.join("Solid.hlsl"),
        "#include \"Color.hlsli\"\nfloat4 main() : SV_Target { return kRed; }",
    ).unwrap();

    let backend = GlslangBackend::new(&CompilerConfig::default());
    let bytecode = backend
        .compile(&descriptor(dir.join("Solid.hlsl"), dir.join("Solid_main_Vulkan.spv")))
        .unwrap();

    assert!(bytecode.is_spirv());
    assert!(dir.join("Solid_main_Vulkan.spv").is_file());
}

#[cfg(feature = "glslang")]
#[test]
#[ignore] // Requires the native glslang library (shaderc build)
fn test_missing_include_aborts_compilation() {
    let dir = std::env::temp_dir().join(format!("galaxy3d_glslang_missing_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("Broken.hlsl"),
        "#include \"Missing.hlsli\"\nfloat4 main() : SV_Target { return 0; }",
    ).unwrap();

    let backend = GlslangBackend::new(&CompilerConfig::default());
    let result = backend.compile(&descriptor(dir.join("Broken.hlsl"), dir.join("Broken.spv")));

    assert!(matches!(result, Err(Error::Compilation(msg)) if msg.contains("Include Missing.hlsli not found")));
}
