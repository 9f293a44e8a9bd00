use crate::config::BundlerConfig;
use crate::diagnostics::{ConsoleDiagnosticHandler, DiagnosticHandler};
use crate::emitter::Emitter;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{ModuleGraph, ModuleGraphBuilder};
use crate::manifest::BuildManifest;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A finished build: the module graph and the artifact text serialized from it
#[derive(Debug, Clone)]
pub struct Bundle {
    pub graph: ModuleGraph,
    pub artifact: String,
    pub generated_at: DateTime<Utc>,
}

impl Bundle {
    pub fn manifest(&self) -> BuildManifest {
        BuildManifest::from_graph(&self.graph, self.generated_at)
    }
}

/// Dependency injection container
/// Manages all shared dependencies and creates instances with proper wiring
pub struct Container {
    config: Arc<BundlerConfig>,
    diagnostic_handler: Arc<dyn DiagnosticHandler>,
    file_system: Arc<dyn FileSystem>,
}

impl Container {
    /// Create a new container with production dependencies
    pub fn new(config: BundlerConfig) -> Self {
        let config = Arc::new(config);

        let diagnostic_handler = Arc::new(ConsoleDiagnosticHandler::new(config.pretty));

        let file_system = Arc::new(RealFileSystem::new());

        Container {
            config,
            diagnostic_handler,
            file_system,
        }
    }

    /// Create a container with custom dependencies (for testing)
    pub fn with_dependencies(
        config: BundlerConfig,
        diagnostic_handler: Arc<dyn DiagnosticHandler>,
        file_system: Arc<dyn FileSystem>,
    ) -> Self {
        Container {
            config: Arc::new(config),
            diagnostic_handler,
            file_system,
        }
    }

    pub fn config(&self) -> &Arc<BundlerConfig> {
        &self.config
    }

    pub fn diagnostic_handler(&self) -> &Arc<dyn DiagnosticHandler> {
        &self.diagnostic_handler
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostic_handler.warning_count()
    }

    /// Build the module graph from `entry` and serialize it
    ///
    /// Nothing is written; a failed build leaves no trace on disk.
    pub fn bundle(&self, base_dir: &Path, entry: &Path) -> Result<Bundle> {
        self.bundle_at(base_dir, entry, Utc::now())
    }

    /// Same as [`Container::bundle`] with a fixed header timestamp
    pub fn bundle_at(
        &self,
        base_dir: &Path,
        entry: &Path,
        generated_at: DateTime<Utc>,
    ) -> Result<Bundle> {
        let builder = ModuleGraphBuilder::new(
            self.config.clone(),
            self.file_system.clone(),
            self.diagnostic_handler.clone(),
            base_dir,
        );
        let graph = builder.build(entry)?;

        let artifact = Emitter::with_timestamp(&self.config, generated_at).emit(&graph);
        info!(
            "Bundled {} module(s) plus entry {} ({} bytes)",
            graph.len(),
            graph.entry.path,
            artifact.len()
        );

        Ok(Bundle {
            graph,
            artifact,
            generated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnosticHandler;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_container_creation() {
        let container = Container::new(BundlerConfig::default());
        assert_eq!(container.warning_count(), 0);
        assert!(!container.diagnostic_handler().has_errors());
    }

    #[test]
    fn test_container_with_mock_dependencies() {
        let diagnostics = Arc::new(CollectingDiagnosticHandler::new());
        let fs = MockFileSystem::new()
            .with_file("/project/main.luau", "type T = number\nprint(import('./util'))")
            .with_file("/project/util.luau", "return 42");

        let container =
            Container::with_dependencies(BundlerConfig::default(), diagnostics, Arc::new(fs));
        let bundle = container
            .bundle(Path::new("/project"), Path::new("main.luau"))
            .unwrap();

        assert!(bundle.graph.contains("util.luau"));
        assert!(bundle.artifact.ends_with("print(import(\"util.luau\"))\n"));
        assert_eq!(container.warning_count(), 1);
    }

    #[test]
    fn test_container_config_access() {
        let mut config = BundlerConfig::default();
        config.bridge.enabled = false;

        let container = Container::new(config);

        assert!(!container.config().bridge.enabled);
    }
}
