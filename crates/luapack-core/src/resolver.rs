//! Import path resolution
//!
//! Turns the literal written in an import call into the module's canonical
//! path: its location relative to the base directory, `/`-separated.

use crate::errors::{BundleError, Result};
use crate::fs::FileSystem;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub struct PathResolver {
    fs: Arc<dyn FileSystem>,
    base_dir: PathBuf,
    extensions: Vec<String>,
}

impl PathResolver {
    pub fn new(fs: Arc<dyn FileSystem>, base_dir: &Path, extensions: Vec<String>) -> Self {
        Self {
            fs,
            base_dir: normalize_path(base_dir),
            extensions,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `literal` as written inside the module `current` (a canonical path)
    pub fn resolve(&self, current: &str, literal: &str) -> Result<String> {
        let current_abs = self.absolute(current);
        let dir = current_abs.parent().unwrap_or(self.base_dir.as_path());
        let target = normalize_path(&dir.join(literal));

        let candidates = if self.has_module_extension(literal) {
            vec![target]
        } else {
            self.extensions
                .iter()
                .map(|ext| with_appended_extension(&target, ext))
                .collect()
        };

        if let Some(found) = candidates.iter().find(|path| self.fs.is_file(path)) {
            let canonical = self.canonical(found);
            debug!("Resolved '{}' from {} to {}", literal, current, canonical);
            return Ok(canonical);
        }

        Err(BundleError::ModuleNotFound {
            literal: literal.to_string(),
            candidates: candidates.iter().map(|path| self.canonical(path)).collect(),
            referenced_from: current.to_string(),
        })
    }

    /// True when the last segment ends in one of the probed extensions
    ///
    /// Other dots are part of the name: `./Foo.client` probes `Foo.client.luau`.
    fn has_module_extension(&self, literal: &str) -> bool {
        let Some(name) = Path::new(literal).file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.extensions
            .iter()
            .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
    }

    /// Filesystem-absolute form of a canonical path
    pub fn absolute(&self, canonical: &str) -> PathBuf {
        normalize_path(&self.base_dir.join(canonical))
    }

    /// Canonical form of a path, relative to the base directory
    pub fn canonical(&self, path: &Path) -> String {
        let path = normalize_path(&self.base_dir.join(path));
        relative_to(&self.base_dir, &path)
    }
}


fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(ext);
    PathBuf::from(raw)
}

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Express `path` relative to `base` with `/` separators
///
/// Paths outside `base` keep leading `..` segments.
pub fn relative_to(base: &Path, path: &Path) -> String {
    let base_parts: Vec<Component> = base.components().collect();
    let path_parts: Vec<Component> = path.components().collect();

    let shared = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    segments.extend(std::iter::repeat("..".to_string()).take(base_parts.len() - shared));
    segments.extend(
        path_parts[shared..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );

    segments.join("/")
}
