use super::*;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("galaxy3d_writer_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_write_if_changed_creates_and_skips() {
    let dir = scratch("skip");
    let path = dir.join("nested/Generated.h");

    assert_eq!(write_if_changed(&path, "a").unwrap(), WriteOutcome::Written);
    assert_eq!(write_if_changed(&path, "a").unwrap(), WriteOutcome::Unchanged);
    assert_eq!(write_if_changed(&path, "b").unwrap(), WriteOutcome::Written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "b");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_touch_marker_truncates() {
    let dir = scratch("marker");
    let path = dir.join("BuiltinShaders.uptodate");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&path, "stale").unwrap();

    touch_marker(&path).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_write_into_file_path_fails_with_io_error() {
    let dir = scratch("blocked");
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("file");
    std::fs::write(&blocker, "x").unwrap();

    let result = write_if_changed(&blocker.join("child.h"), "text");
    assert!(matches!(result, Err(crate::error::Error::Io(msg)) if msg.contains("child.h") || msg.contains("file")));

    let _ = std::fs::remove_dir_all(&dir);
}
