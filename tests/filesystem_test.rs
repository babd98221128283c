//! Tests for the RealFileSystem implementation

use std::fs;

use tempfile::TempDir;

use hirepass::infrastructure::traits::{FileSystem, RealFileSystem};

#[test]
fn given_missing_parent_when_write_atomic_then_creates_directories() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a/b/state.json");
    let fs_impl = RealFileSystem;

    // Act
    fs_impl.write_atomic(&path, "[]").unwrap();

    // Assert
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn given_existing_file_when_write_atomic_then_replaces_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.json");
    fs::write(&path, "old content that is longer").unwrap();

    RealFileSystem.write_atomic(&path, "new").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    // no temp files left behind
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn given_file_when_rename_then_moves_it() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("state.json");
    let to = temp.path().join("state.json.corrupt");
    fs::write(&from, "x").unwrap();

    RealFileSystem.rename(&from, &to).unwrap();

    assert!(!RealFileSystem.exists(&from));
    assert_eq!(RealFileSystem.read_to_string(&to).unwrap(), "x");
}

#[test]
fn given_missing_file_when_read_then_not_found() {
    let temp = TempDir::new().unwrap();

    let err = RealFileSystem
        .read_to_string(&temp.path().join("nope"))
        .unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
