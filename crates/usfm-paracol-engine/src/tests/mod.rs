use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for test files
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content, creating parent directories as needed
pub fn create_test_file(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
