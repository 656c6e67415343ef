use super::*;
use crate::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Helpers
// ============================================================================

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "galaxy3d_manifest_tests_{}_{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(path: &Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn parse(text: &str) -> Result<ShaderManifest> {
    parse_manifest(Path::new("shaders/Blit.shaders"), text)
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_declarations_in_order() {
    let manifest = parse(
        "BlitPS:\n  entrypoint: main\n  stage: Pixel\n  defines: [LINEAR, SAMPLES=4]\n\
         BlitVS:\n  entrypoint: VSMain\n  stage: Vertex\n  defines: FULLSCREEN\n\
         BlitRS:\n  entrypoint: RootSig\n  stage: RootSignature\n",
    ).unwrap();

    assert_eq!(manifest.source_path, PathBuf::from("shaders/Blit.hlsl"));
    let names: Vec<_> = manifest.shaders.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["BlitPS", "BlitVS", "BlitRS"]);

    assert_eq!(manifest.shaders[0].stage, ShaderStage::Pixel);
    assert_eq!(manifest.shaders[0].defines, vec!["LINEAR", "SAMPLES=4"]);
    assert_eq!(manifest.shaders[1].entry_point, "VSMain");
    assert_eq!(manifest.shaders[1].defines, vec!["FULLSCREEN"]);
    assert!(manifest.shaders[2].defines.is_empty());
    assert_eq!(manifest.shaders[2].stage, ShaderStage::RootSignature);
}

#[test]
fn test_empty_manifest_has_no_shaders() {
    assert!(parse("").unwrap().shaders.is_empty());
    assert!(parse("# nothing yet\n").unwrap().shaders.is_empty());
}

#[test]
fn test_name_with_space_asks_for_missing_colon() {
    let result = parse("My Shader:\n  entrypoint: main\n  stage: Pixel\n");
    assert!(matches!(result, Err(Error::Configuration(msg))
        if msg.contains("'My Shader'") && msg.contains("Did you miss a ':'?")));
}

#[test]
fn test_invalid_identifier_is_rejected() {
    let result = parse("2Blit:\n  entrypoint: main\n  stage: Pixel\n");
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("valid identifier")));
}

#[test]
fn test_reserved_names_are_rejected() {
    for name in ["Count", "class"] {
        let result = parse(&format!("{}:\n  entrypoint: main\n  stage: Pixel\n", name));
        assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("reserved")));
    }
}

#[test]
fn test_stage_is_case_sensitive() {
    let result = parse("Blit:\n  entrypoint: main\n  stage: pixel\n");
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("unknown stage 'pixel'")));
}

#[test]
fn test_missing_and_unknown_fields_fail() {
    assert!(matches!(parse("Blit:\n  stage: Pixel\n"), Err(Error::Configuration(_))));
    assert!(matches!(
        parse("Blit:\n  entrypoint: main\n  stage: Pixel\n  optimize: true\n"),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(parse("- Blit\n- Copy\n"), Err(Error::Configuration(_))));
}

#[test]
fn test_empty_entrypoint_fails() {
    let result = parse("Blit:\n  entrypoint: \"\"\n  stage: Pixel\n");
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("empty entrypoint")));
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discover_sorted_with_sources() {
    let root = scratch_dir();
    write(&root.join("b/Copy.shaders"), "Copy:\n  entrypoint: main\n  stage: Compute\n");
    write(&root.join("b/Copy.hlsl"), "[numthreads(8, 8, 1)] void main() {}\n");
    write(&root.join("a/Blit.shaders"), "Blit:\n  entrypoint: main\n  stage: Pixel\n");
    write(&root.join("a/Blit.hlsl"), "float4 main() : SV_Target { return 0; }\n");
    write(&root.join("a/readme.txt"), "not a manifest");

    let manifests = discover_manifests(&root).unwrap();
    let names: Vec<_> = manifests.iter().map(|m| m.shaders[0].name.as_str()).collect();
    assert_eq!(names, vec!["Blit", "Copy"]);
    assert_eq!(manifests[0].shaders[0].source_path, root.join("a/Blit.hlsl"));
}

#[test]
fn test_discover_requires_source() {
    let root = scratch_dir();
    write(&root.join("Lonely.shaders"), "Lonely:\n  entrypoint: main\n  stage: Pixel\n");

    let result = discover_manifests(&root);
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("no matching source")));
}

#[test]
fn test_discover_rejects_duplicate_names() {
    let root = scratch_dir();
    for stem in ["A", "B"] {
        write(&root.join(format!("{}.shaders", stem)), "Blit:\n  entrypoint: main\n  stage: Pixel\n");
        write(&root.join(format!("{}.hlsl", stem)), "");
    }

    let result = discover_manifests(&root);
    assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("declared in both")));
}

#[test]
fn test_discover_missing_root_is_io_error() {
    let root = scratch_dir().join("missing");
    assert!(matches!(discover_manifests(&root), Err(Error::Io(_))));
}
