use super::*;
use crate::compile::shader_types::ShaderStage;
use crate::error::Error;
use std::path::PathBuf;

fn descriptor(api: GraphicsApi) -> CompilationDescriptor {
    CompilationDescriptor::builder()
        .input_path("galaxy3d/does/not/exist.hlsl")
        .output_path("galaxy3d/does/not/exist.bin")
        .entry_point("main")
        .stage(ShaderStage::Compute)
        .graphics_api(api)
        .build()
        .unwrap()
}

#[test]
fn test_d3d12_routes_to_dxil() {
    let compiler = ShaderCompiler::default();
    let backend = compiler.backend_for(GraphicsApi::D3D12);

    assert!(matches!(backend, CompilerBackend::Dxc(_, DxcTarget::Dxil)));
    assert!(!backend.produces_spirv());
}

#[test]
fn test_vulkan_routes_to_configured_spirv_backend() {
    let dxc = ShaderCompiler::new(CompilerConfig {
        spirv_backend: SpirvBackend::Dxc,
        ..CompilerConfig::default()
    });
    assert!(matches!(dxc.backend_for(GraphicsApi::Vulkan), CompilerBackend::Dxc(_, DxcTarget::Spirv)));

    let glslang = ShaderCompiler::new(CompilerConfig {
        spirv_backend: SpirvBackend::Glslang,
        ..CompilerConfig::default()
    });
    let backend = glslang.backend_for(GraphicsApi::Vulkan);
    assert!(matches!(backend, CompilerBackend::Glslang(_)));
    assert!(backend.produces_spirv());
}

#[test]
fn test_compile_failure_is_returned_not_retried() {
    let compiler = ShaderCompiler::new(CompilerConfig {
        dxc_path: PathBuf::from("galaxy3d-no-such-dxc"),
        spirv_backend: SpirvBackend::Dxc,
        ..CompilerConfig::default()
    });

    let result = compiler.compile(&descriptor(GraphicsApi::D3D12));
    assert!(matches!(result, Err(Error::Io(_))));
}
