//! JSON description of a finished build

use crate::emitter::{TOOL_NAME, TOOL_VERSION};
use crate::errors::{BundleError, Result};
use crate::graph::ModuleGraph;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Blake3 hash of the module's source as read
    pub hash: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub tool: String,
    pub version: String,
    pub generated_at: String,
    pub entry: String,
    pub entry_dependencies: Vec<String>,
    /// Modules in bundle order
    pub modules: IndexMap<String, ManifestEntry>,
}

impl BuildManifest {
    pub fn from_graph(graph: &ModuleGraph, generated_at: DateTime<Utc>) -> Self {
        let modules = graph
            .modules
            .iter()
            .map(|(path, module)| {
                let entry = ManifestEntry {
                    hash: blake3::hash(module.source.as_bytes()).to_hex().to_string(),
                    dependencies: module.dependencies.clone(),
                };
                (path.clone(), entry)
            })
            .collect();

        Self {
            tool: TOOL_NAME.to_string(),
            version: TOOL_VERSION.to_string(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry: graph.entry.path.clone(),
            entry_dependencies: graph.entry.dependencies.clone(),
            modules,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BundleError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Module, ModuleTable};
    use chrono::TimeZone;

    fn module(path: &str, source: &str, deps: &[&str]) -> Module {
        Module {
            path: path.to_string(),
            source: source.to_string(),
            body: source.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_manifest_preserves_order_and_hashes_source() {
        let mut table = ModuleTable::new();
        table.insert("z.luau".into(), module("z.luau", "return 'z'", &["a.luau"]));
        table.insert("a.luau".into(), module("a.luau", "return 'a'", &[]));
        let graph = ModuleGraph {
            modules: table,
            entry: module("main.luau", "import('./z')", &["z.luau"]),
        };

        let timestamp = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        let manifest = BuildManifest::from_graph(&graph, timestamp);

        let keys: Vec<&String> = manifest.modules.keys().collect();
        assert_eq!(keys, vec!["z.luau", "a.luau"]);
        assert_eq!(
            manifest.modules["z.luau"].hash,
            blake3::hash(b"return 'z'").to_hex().to_string()
        );
        assert_eq!(manifest.generated_at, "2026-10-18T00:00:00Z");

        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"entryDependencies\""));
        assert!(json.find("z.luau").unwrap() < json.find("\"a.luau\": {").unwrap());
    }
}
