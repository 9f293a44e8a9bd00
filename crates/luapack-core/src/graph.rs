//! Module graph construction
//!
//! Depth-first traversal from the entry module. Each reachable module is
//! read once, rewritten, and inserted into the [`ModuleTable`] before its own
//! dependencies are visited, so table order is first-discovery order.

use crate::config::BundlerConfig;
use crate::diagnostics::DiagnosticHandler;
use crate::errors::{BundleError, Result};
use crate::fs::FileSystem;
use crate::resolver::PathResolver;
use crate::transform::ContentTransformer;
use crate::type_scan::scan_type_declarations;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A bundled module. Immutable once inserted into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Canonical path, the table key
    pub path: String,
    /// Source text as read from disk
    pub source: String,
    /// Source with import call sites rewritten
    pub body: String,
    /// Direct dependencies in first-occurrence order, duplicates kept
    pub dependencies: Vec<String>,
}

/// Canonical path -> module, in insertion order
pub type ModuleTable = IndexMap<String, Module>;

/// Everything a build produces before serialization
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    pub modules: ModuleTable,
    /// The entry module; never part of `modules`
    pub entry: Module,
}

impl ModuleGraph {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.modules.contains_key(canonical)
    }
}

/// Mutable state of one traversal
#[derive(Default)]
struct Traversal {
    table: ModuleTable,
    visited: FxHashSet<PathBuf>,
    /// Absolute paths currently being opened, paired with their canonical form
    active: Vec<(PathBuf, String)>,
}

impl Traversal {
    fn cycle_through(&self, absolute: &Path, canonical: &str) -> Option<Vec<String>> {
        let first = self.active.iter().position(|(path, _)| path == absolute)?;
        let mut chain: Vec<String> = self.active[first..]
            .iter()
            .map(|(_, name)| name.clone())
            .collect();
        chain.push(canonical.to_string());
        Some(chain)
    }
}

pub struct ModuleGraphBuilder {
    config: Arc<BundlerConfig>,
    fs: Arc<dyn FileSystem>,
    diagnostics: Arc<dyn DiagnosticHandler>,
    resolver: PathResolver,
}

impl ModuleGraphBuilder {
    pub fn new(
        config: Arc<BundlerConfig>,
        fs: Arc<dyn FileSystem>,
        diagnostics: Arc<dyn DiagnosticHandler>,
        base_dir: &Path,
    ) -> Self {
        let resolver = PathResolver::new(fs.clone(), base_dir, config.extensions.clone());
        Self {
            config,
            fs,
            diagnostics,
            resolver,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Build the graph reachable from `entry` (relative to the base directory)
    ///
    /// Each call owns a fresh traversal, so one builder can serve repeated builds.
    pub fn build(&self, entry: &Path) -> Result<ModuleGraph> {
        let mut traversal = Traversal::default();

        let entry_path = self.resolver.canonical(entry);
        let entry_abs = self.resolver.absolute(&entry_path);
        info!("Bundling from entry {}", entry_path);

        traversal.active.push((entry_abs.clone(), entry_path.clone()));
        let entry_module = self.read_module(&entry_path, &entry_abs)?;

        for dependency in &entry_module.dependencies {
            self.load(&mut traversal, dependency, &entry_path)?;
        }
        traversal.active.pop();

        info!(
            "Collected {} module(s) reachable from {}",
            traversal.table.len(),
            entry_path
        );

        Ok(ModuleGraph {
            modules: traversal.table,
            entry: entry_module,
        })
    }

    fn load(&self, traversal: &mut Traversal, canonical: &str, referencing: &str) -> Result<()> {
        let absolute = self.resolver.absolute(canonical);

        if let Some(chain) = traversal.cycle_through(&absolute, canonical) {
            return Err(BundleError::CircularImport { chain });
        }

        if traversal.visited.contains(&absolute) {
            debug!("{} already bundled (imported again by {})", canonical, referencing);
            return Ok(());
        }

        traversal.active.push((absolute.clone(), canonical.to_string()));
        debug!("Loading {} (imported by {})", canonical, referencing);

        let module = self.read_module(canonical, &absolute)?;
        let dependencies = module.dependencies.clone();
        traversal.table.insert(canonical.to_string(), module);

        for dependency in &dependencies {
            self.load(traversal, dependency, canonical)?;
        }

        traversal.active.pop();
        traversal.visited.insert(absolute);
        Ok(())
    }

    /// Read, diagnose and rewrite one module
    fn read_module(&self, canonical: &str, absolute: &Path) -> Result<Module> {
        let source = self
            .fs
            .read_file(absolute)
            .map_err(|e| BundleError::io(absolute, e))?;

        if self.config.type_warnings {
            scan_type_declarations(&source, canonical, self.diagnostics.as_ref());
        }

        let transformer = ContentTransformer::new(
            &self.resolver,
            &self.config.import_function,
            &self.config.loader_name,
        );
        let transformed = transformer.transform(&source, canonical)?;

        Ok(Module {
            path: canonical.to_string(),
            source,
            body: transformed.text,
            dependencies: transformed.dependencies,
        })
    }
}
