//! File system abstraction layer
//!
//! Provides trait-based abstractions for the file system operations the
//! compilation database parser and filter need, enabling dependency injection
//! and testing through in-memory and mock implementations.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as headers when expanding an include directory
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];

// ============================================================================
// File System Trait
// ============================================================================

/// Trait for file system operations
///
/// Only reads are required by the parser; `write` is used by the filter to
/// emit the pruned database.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystemTrait {
    /// Check if a path (file or directory) exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path exists and is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as UTF-8 text
    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Create or truncate a file and write the given contents
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), std::io::Error>;

    /// Check if a path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Recursively enumerate header files below a directory, sorted by path
    ///
    /// Hidden directories are descended into like any other directory.
    fn find_headers(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error>;
}

/// Check whether a path carries one of the [`HEADER_EXTENSIONS`]
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
}

// ============================================================================
// Real File System Implementation
// ============================================================================

/// Real file system implementation using std::fs and walkdir
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystemTrait for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
        std::fs::write(path, contents)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn find_headers(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut headers = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && is_header(path) {
                headers.push(path.to_path_buf());
            }
        }

        headers.sort();
        Ok(headers)
    }
}

// ============================================================================
// Test File System Implementation
// ============================================================================

#[cfg(test)]
mod test_filesystem {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct TestFileData {
        files: BTreeMap<PathBuf, String>,
        dirs: BTreeSet<PathBuf>,
    }

    /// In-memory filesystem for parser and filter tests
    ///
    /// Paths are taken verbatim, so tests should use absolute, normalized
    /// paths. Parent directories of every file are registered implicitly.
    #[derive(Clone, Default)]
    pub struct TestFileSystem {
        state: Arc<Mutex<TestFileData>>,
    }

    impl TestFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_file_content<P: Into<PathBuf>>(&self, path: P, content: &str) {
            let path = path.into();
            let mut state = self.state.lock().unwrap();
            for ancestor in path.ancestors().skip(1) {
                state.dirs.insert(ancestor.to_path_buf());
            }
            state.files.insert(path, content.to_string());
        }

        pub fn add_dir<P: Into<PathBuf>>(&self, path: P) {
            let path = path.into();
            let mut state = self.state.lock().unwrap();
            for ancestor in path.ancestors() {
                state.dirs.insert(ancestor.to_path_buf());
            }
        }

        pub fn file_content<P: AsRef<Path>>(&self, path: P) -> Option<String> {
            let state = self.state.lock().unwrap();
            state.files.get(path.as_ref()).cloned()
        }
    }

    impl FileSystemTrait for TestFileSystem {
        fn exists(&self, path: &Path) -> bool {
            let state = self.state.lock().unwrap();
            state.files.contains_key(path) || state.dirs.contains(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            let state = self.state.lock().unwrap();
            state.files.contains_key(path)
        }

        fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
            let state = self.state.lock().unwrap();
            state
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn write(&self, path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
            let content = String::from_utf8(contents.to_vec())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            self.set_file_content(path, &content);
            Ok(())
        }

        fn is_dir(&self, path: &Path) -> bool {
            let state = self.state.lock().unwrap();
            state.dirs.contains(path)
        }

        fn find_headers(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
            let state = self.state.lock().unwrap();
            if !state.dirs.contains(dir) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Directory not found",
                ));
            }
            Ok(state
                .files
                .keys()
                .filter(|path| path.starts_with(dir) && is_header(path))
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
pub use test_filesystem::TestFileSystem;

// ============================================================================
// Tests
// ============================================================================
