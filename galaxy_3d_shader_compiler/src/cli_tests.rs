use super::*;

fn args(list: &[&str]) -> Result<CliArgs> {
    parse_args(list.iter().copied())
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_compile_invocation() {
    let parsed = args(&[
        "-input", "s.hlsl", "-output", "s.spv", "-entrypoint", "main",
        "-stage", "pixel", "-platform", "windows", "-graphicsapi", "vulkan",
        "-D", "USE_FOG", "-DSAMPLES=4", "-I", "include", "-reflection",
    ]).unwrap();

    assert_eq!(parsed.mode(), CliMode::Compile);
    assert_eq!(parsed.input, Some(PathBuf::from("s.hlsl")));
    assert_eq!(parsed.output, Some(PathBuf::from("s.spv")));
    assert_eq!(parsed.entry_point.as_deref(), Some("main"));
    assert_eq!(parsed.stage, Some(ShaderStage::Pixel));
    assert_eq!(parsed.platform, Some(Platform::Windows));
    assert_eq!(parsed.graphics_apis, vec![GraphicsApi::Vulkan]);
    assert_eq!(parsed.defines, vec!["USE_FOG", "SAMPLES=4"]);
    assert_eq!(parsed.include_dirs, vec![PathBuf::from("include")]);
    assert!(parsed.reflection);
    assert_eq!(parsed.language, OutputLanguage::Cpp);
}

#[test]
fn test_modes() {
    assert_eq!(args(&["-metadata"]).unwrap().mode(), CliMode::Metadata);
    assert_eq!(args(&["-builtin", "-metadata"]).unwrap().mode(), CliMode::Builtin);
    assert_eq!(args(&["-builtin", "-help"]).unwrap().mode(), CliMode::Help);
    assert_eq!(args(&[]).unwrap().mode(), CliMode::Compile);
}

#[test]
fn test_repeated_graphics_api_is_deduplicated() {
    let parsed = args(&["-graphicsapi", "d3d12", "-graphicsapi", "vulkan", "-graphicsapi", "d3d12"]).unwrap();
    assert_eq!(parsed.graphics_apis, vec![GraphicsApi::D3D12, GraphicsApi::Vulkan]);
}

#[test]
fn test_unknown_values_are_configuration_errors() {
    for list in [
        &["-stage", "fragment"][..],
        &["-platform", "ps5"][..],
        &["-graphicsapi", "metal"][..],
        &["-language", "hlsl"][..],
        &["-spirvbackend", "fxc"][..],
        &["-timeout", "0"][..],
        &["-timeout", "soon"][..],
        &["-unknown"][..],
    ] {
        assert!(matches!(args(list), Err(Error::Configuration(_))), "{:?} should fail", list);
    }
}

#[test]
fn test_missing_value_fails() {
    let result = args(&["-input", "s.hlsl", "-output"]);
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("-output expects a value")));
}

#[test]
fn test_compiler_config_overrides() {
    let parsed = args(&[
        "-dxc", "/opt/dxc/bin/dxc", "-spirvbackend", "glslang", "-timeout", "5",
        "-I", "a", "-I", "b", "-serial",
    ]).unwrap();
    let config = parsed.compiler_config();
    assert_eq!(config.dxc_path, PathBuf::from("/opt/dxc/bin/dxc"));
    assert_eq!(config.spirv_backend, SpirvBackend::Glslang);
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.include_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert!(!config.parallel);
}

// ============================================================================
// Required flags
// ============================================================================

#[test]
fn test_required_flags_checked_in_order() {
    let none = args(&["-stage", "pixel", "-graphicsapi", "vulkan"]).unwrap();
    assert_eq!(run(&none), Err(Error::Configuration("no entry point specified".to_string())));

    let no_input = args(&["-entrypoint", "main", "-stage", "pixel", "-graphicsapi", "vulkan"]).unwrap();
    assert_eq!(run(&no_input), Err(Error::Configuration("no input file specified".to_string())));

    let no_output = args(&["-entrypoint", "main", "-input", "s.hlsl", "-stage", "pixel", "-graphicsapi", "vulkan"]).unwrap();
    assert_eq!(run(&no_output), Err(Error::Configuration("no output file specified".to_string())));
}

#[test]
fn test_compile_mode_takes_one_api() {
    let parsed = args(&[
        "-entrypoint", "main", "-input", "s.hlsl", "-output", "s.bin", "-stage", "pixel",
        "-graphicsapi", "vulkan", "-graphicsapi", "d3d12",
    ]).unwrap();
    assert!(matches!(run(&parsed), Err(Error::Configuration(msg)) if msg.contains("only -builtin")));
}

#[test]
fn test_builtin_requires_directories() {
    let parsed = args(&["-builtin", "-output", "gen"]).unwrap();
    assert_eq!(run(&parsed), Err(Error::Configuration("no input directory specified".to_string())));
}

#[test]
fn test_builtin_metadata_is_opt_in() {
    let base = ["-builtin", "-input", "shaders", "-output", "gen", "-graphicsapi", "vulkan"];

    let options = builtin_options(&args(&base).unwrap()).unwrap();
    assert!(!options.build_metadata);
    assert_eq!(options.apis, vec![GraphicsApi::Vulkan]);

    let mut with_metadata = base.to_vec();
    with_metadata.push("-metadata");
    let parsed = args(&with_metadata).unwrap();
    assert_eq!(parsed.mode(), CliMode::Builtin);
    assert!(builtin_options(&parsed).unwrap().build_metadata);
}

#[test]
fn test_run_cli_exit_codes() {
    assert_eq!(run_cli(["-help"]), 0);
    assert_eq!(run_cli(["-stage", "pixel", "-graphicsapi", "vulkan"]), 1);
    assert_eq!(run_cli(["-bogus"]), 1);
}
