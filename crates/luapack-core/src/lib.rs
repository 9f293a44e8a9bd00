//! Static bundler for Lua-family module trees.
//!
//! Follows `import("./path")` calls from an entry module, rejects cycles,
//! and serializes every reachable module into one self-contained artifact
//! with a memoizing loader.

pub mod config;
pub mod di;
pub mod diagnostics;
pub mod emitter;
pub mod errors;
pub mod fs;
pub mod graph;
pub mod manifest;
pub mod resolver;
pub mod transform;
pub mod type_scan;

pub use config::{BridgeOptions, BundlerConfig, CliOverrides};
pub use di::{Bundle, Container};
pub use diagnostics::{
    CollectingDiagnosticHandler, ConsoleDiagnosticHandler, Diagnostic, DiagnosticHandler,
    DiagnosticLevel,
};
pub use emitter::Emitter;
pub use errors::{BundleError, Result};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use graph::{Module, ModuleGraph, ModuleGraphBuilder, ModuleTable};
pub use manifest::BuildManifest;
pub use resolver::PathResolver;
pub use transform::{ContentTransformer, ImportSite, Transformed};
