//! Mock implementations for testing

use luapack_core::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Wraps another file system and counts reads per path
pub struct CountingFileSystem {
    inner: Arc<dyn FileSystem>,
    reads: Mutex<HashMap<PathBuf, usize>>,
}

impl CountingFileSystem {
    pub fn new(inner: Arc<dyn FileSystem>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: Mutex::new(HashMap::new()),
        })
    }

    pub fn reads_of(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .lock()
            .unwrap()
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap().values().sum()
    }
}

impl FileSystem for CountingFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        *self
            .reads
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        self.inner.write_file(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
}
