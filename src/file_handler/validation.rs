//! File validation utilities run before a file is opened for paging.
//!
//! Failures here are "open failures": the dispatcher reports them inline and the
//! browsing session moves on to the next file.

use crate::error::{Result, RlpagerError};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Validate that a file path can be paged
///
/// # Validations Performed
/// - Path exists
/// - Path is a regular file (not a directory); empty files are accepted because they
///   may still grow
/// - File is readable by the current process
pub fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(RlpagerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            return Err(RlpagerError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            return Err(RlpagerError::file_error(
                format!("Failed to read metadata of {}", path.display()),
                err,
            ));
        }
    };

    if !metadata.is_file() {
        return Err(RlpagerError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    // Try to open the file to verify read permissions
    match File::open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            Err(RlpagerError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(err) => Err(RlpagerError::file_error(
            format!("Cannot open {} for reading", path.display()),
            err,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Create a test file with specific content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    #[test]
    fn test_validate_valid_file() {
        let test_file = create_test_file(b"This is valid log content\nLine 2\nLine 3\n");
        assert!(validate_file_path(test_file.path()).is_ok());
    }

    #[test]
    fn test_validate_empty_file_is_accepted() {
        let empty_file = create_test_file(&[]);
        assert!(validate_file_path(empty_file.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let non_existent = Path::new("/this/file/does/not/exist.log");
        match validate_file_path(non_existent) {
            Err(RlpagerError::FileNotFound { path }) => assert_eq!(path, non_existent),
            other => panic!("Expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(matches!(
            validate_file_path(temp_dir.path()),
            Err(RlpagerError::NotAFile { .. })
        ));
    }
}
