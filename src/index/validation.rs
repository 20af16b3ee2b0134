//! Target file validation.
//!
//! Checks performed before the index is built, so that an unusable path is
//! reported as a configuration problem instead of a mid-scan I/O failure.

use crate::error::{LineServeError, Result};
use std::fs::File;
use std::path::Path;

/// Validate that a file path can be indexed and served
///
/// # Validations Performed
/// - Path exists
/// - Path is a regular file (not a directory)
/// - File can be opened for reading by the current process
///
/// Empty files are accepted; they simply have no servable lines.
pub fn validate_file_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LineServeError::config(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(path).map_err(|e| {
        LineServeError::config(format!(
            "Failed to read file metadata for {}: {}",
            path.display(),
            e
        ))
    })?;

    if !metadata.is_file() {
        return Err(LineServeError::config(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }

    File::open(path).map_err(|e| {
        LineServeError::config(format!(
            "Cannot open file for reading: {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    #[test]
    fn test_validate_valid_file() {
        let test_file = create_test_file(b"Line 1\nLine 2\nLine 3\n");
        assert!(validate_file_path(test_file.path()).is_ok());
    }

    #[test]
    fn test_validate_empty_file_is_accepted() {
        let empty_file = create_test_file(&[]);
        assert!(validate_file_path(empty_file.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let non_existent = Path::new("/this/file/does/not/exist.txt");
        match validate_file_path(non_existent).unwrap_err() {
            LineServeError::ConfigError { message } => {
                assert!(message.contains("File does not exist"));
            }
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        match validate_file_path(temp_dir.path()).unwrap_err() {
            LineServeError::ConfigError { message } => {
                assert!(message.contains("Path is not a file"));
            }
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }
}
