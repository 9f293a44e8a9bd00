//! File system abstraction
//!
//! The resolver and the graph builder only reach the disk through
//! [`FileSystem`], so the whole traversal can run against [`MockFileSystem`].

use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<String>;

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;

    /// True only for regular files; directories never satisfy module lookups.
    fn is_file(&self, path: &Path) -> bool;
}

/// File system backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        RealFileSystem
    }
}

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file system for tests
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: Mutex<FxHashMap<PathBuf, String>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    fn files(&self) -> std::sync::MutexGuard<'_, FxHashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MockFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.files().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_read_write() {
        let fs = MockFileSystem::new().with_file("/project/main.luau", "print(1)");

        assert_eq!(
            fs.read_file(Path::new("/project/main.luau")).unwrap(),
            "print(1)"
        );

        fs.write_file(Path::new("/out/bundle.lua"), "-- bundle")
            .unwrap();
        assert!(fs.is_file(Path::new("/out/bundle.lua")));
    }

    #[test]
    fn test_mock_directories_are_not_files() {
        let fs = MockFileSystem::new().with_file("/project/lib/util.luau", "");

        assert!(fs.is_file(Path::new("/project/lib/util.luau")));
        assert!(!fs.is_file(Path::new("/project/lib")));
    }

    #[test]
    fn test_mock_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let err = fs.read_file(Path::new("/missing.luau")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
