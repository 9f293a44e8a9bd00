//! Bundling helpers for tests
//!
//! Every helper stamps artifacts with [`FIXED_TIMESTAMP`] so two builds of
//! the same tree produce byte-identical output.

use chrono::{DateTime, TimeZone, Utc};
use luapack_core::{
    Bundle, BundlerConfig, CollectingDiagnosticHandler, Container, MockFileSystem, Result,
};
use std::path::Path;
use std::sync::Arc;

/// 2026-01-01T00:00:00Z
pub const FIXED_TIMESTAMP: i64 = 1_767_225_600;

pub fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_TIMESTAMP, 0)
        .single()
        .unwrap_or_default()
}

/// Bundle an in-memory tree rooted at `/project`
///
/// # Arguments
/// * `files` - `(path relative to /project, contents)` pairs
/// * `entry` - entry module, relative to `/project`
pub fn bundle_files(files: &[(&str, &str)], entry: &str) -> Result<Bundle> {
    bundle_files_with_config(files, entry, BundlerConfig::default())
}

pub fn bundle_files_with_config(
    files: &[(&str, &str)],
    entry: &str,
    config: BundlerConfig,
) -> Result<Bundle> {
    let mut fs = MockFileSystem::new();
    for (path, contents) in files {
        fs.add_file(Path::new("/project").join(path), *contents);
    }

    let container = Container::with_dependencies(
        config,
        Arc::new(CollectingDiagnosticHandler::new()),
        Arc::new(fs),
    );
    container.bundle_at(Path::new("/project"), Path::new(entry), fixed_time())
}

/// Bundle a tree on disk with production dependencies
pub fn bundle_project(base_dir: &Path, entry: &str) -> Result<Bundle> {
    let container = Container::with_dependencies(
        BundlerConfig::default(),
        Arc::new(CollectingDiagnosticHandler::new()),
        Arc::new(luapack_core::RealFileSystem::new()),
    );
    container.bundle_at(base_dir, Path::new(entry), fixed_time())
}
