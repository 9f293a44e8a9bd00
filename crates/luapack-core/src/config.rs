use crate::errors::BundleError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names probed in the base directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["luapack.yaml", "luapack.yml", "luapack.json"];

/// Options for the generated host bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOptions {
    /// Emit the bridge at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Name the bridge is bound to in the artifact (default: game_require)
    #[serde(default = "default_bridge_name")]
    pub name: String,

    /// Host-provided module loader the bridge wraps (default: require)
    #[serde(default = "default_host_loader")]
    pub loader: String,

    /// Host primitive returning the current thread identity
    #[serde(default = "default_get_identity")]
    pub get_identity: String,

    /// Host primitive setting the thread identity
    #[serde(default = "default_set_identity")]
    pub set_identity: String,

    /// Identity level held while the host loader runs (default: 2)
    #[serde(default = "default_identity")]
    pub identity: u32,
}

fn default_true() -> bool {
    true
}

fn default_bridge_name() -> String {
    "game_require".to_string()
}

fn default_host_loader() -> String {
    "require".to_string()
}

fn default_get_identity() -> String {
    "getthreadidentity".to_string()
}

fn default_set_identity() -> String {
    "setthreadidentity".to_string()
}

fn default_identity() -> u32 {
    2
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_bridge_name(),
            loader: default_host_loader(),
            get_identity: default_get_identity(),
            set_identity: default_set_identity(),
            identity: default_identity(),
        }
    }
}

/// Main bundler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    /// Extensions probed, in order, for import paths written without one
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Name of the import primitive scanned for in module sources
    #[serde(default = "default_import_function")]
    pub import_function: String,

    /// Name of the generated loader that rewritten call sites invoke
    #[serde(default = "default_import_function")]
    pub loader_name: String,

    /// Emit the tool/timestamp header comment (default: true)
    #[serde(default = "default_true")]
    pub header: bool,

    /// Warn about type declarations found in module sources (default: true)
    #[serde(default = "default_true")]
    pub type_warnings: bool,

    #[serde(default)]
    pub bridge: BridgeOptions,

    /// Pretty-print diagnostics (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_extensions() -> Vec<String> {
    vec![".luau".to_string(), ".lua".to_string()]
}

fn default_import_function() -> String {
    "import".to_string()
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            import_function: default_import_function(),
            loader_name: default_import_function(),
            header: true,
            type_warnings: true,
            bridge: BridgeOptions::default(),
            pretty: true,
        }
    }
}

/// Overrides collected from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub extensions: Option<Vec<String>>,
    pub header: Option<bool>,
    pub type_warnings: Option<bool>,
    pub bridge: Option<bool>,
    pub pretty: Option<bool>,
}

impl BundlerConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self, BundleError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BundleError::io(path, e))?;

        let config: BundlerConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| BundleError::Config(format!("{}: {}", path.display(), e)))?,
            _ => serde_yaml::from_str(&content)
                .map_err(|e| BundleError::Config(format!("{}: {}", path.display(), e)))?,
        };

        config.validated()
    }

    /// Find a config file in `dir`, if any
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Write the default configuration as YAML
    pub fn init_file(path: &Path) -> Result<(), BundleError> {
        let yaml = serde_yaml::to_string(&BundlerConfig::default())
            .map_err(|e| BundleError::Config(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| BundleError::io(path, e))?;
        Ok(())
    }

    /// Merge CLI overrides into this configuration
    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(ref extensions) = overrides.extensions {
            self.extensions = extensions.clone();
        }
        if let Some(header) = overrides.header {
            self.header = header;
        }
        if let Some(type_warnings) = overrides.type_warnings {
            self.type_warnings = type_warnings;
        }
        if let Some(bridge) = overrides.bridge {
            self.bridge.enabled = bridge;
        }
        if let Some(pretty) = overrides.pretty {
            self.pretty = pretty;
        }
    }

    /// Normalize extensions to a leading dot and reject unusable settings
    pub fn validated(mut self) -> Result<Self, BundleError> {
        self.extensions = self
            .extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.trim().to_string();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .filter(|ext| ext.len() > 1)
            .collect();

        if self.extensions.is_empty() {
            return Err(BundleError::Config(
                "at least one module extension is required".to_string(),
            ));
        }

        for (field, value) in [
            ("importFunction", &self.import_function),
            ("loaderName", &self.loader_name),
        ] {
            if !is_lua_identifier(value) {
                return Err(BundleError::Config(format!(
                    "{} must be a Lua identifier, got '{}'",
                    field, value
                )));
            }
        }

        if RESERVED_NAMES.contains(&self.loader_name.as_str()) {
            return Err(BundleError::Config(format!(
                "loaderName '{}' is reserved by the bundle runtime",
                self.loader_name
            )));
        }

        if self.bridge.enabled {
            if !is_lua_identifier(&self.bridge.name) {
                return Err(BundleError::Config(format!(
                    "bridge.name must be a Lua identifier, got '{}'",
                    self.bridge.name
                )));
            }

            if RESERVED_NAMES.contains(&self.bridge.name.as_str()) {
                return Err(BundleError::Config(format!(
                    "bridge.name '{}' is reserved by the bundle runtime",
                    self.bridge.name
                )));
            }

            // Both are locals of the same chunk; the bridge would shadow the loader
            if self.bridge.name == self.loader_name {
                return Err(BundleError::Config(format!(
                    "bridge.name and loaderName must differ, both are '{}'",
                    self.loader_name
                )));
            }
        }

        Ok(self)
    }
}

/// Names the generated runtime binds itself
const RESERVED_NAMES: &[&str] = &["__modules"];

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

fn is_lua_identifier(name: &str) -> bool {
    if LUA_KEYWORDS.contains(&name) {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BundlerConfig::default();
        assert_eq!(config.extensions, vec![".luau", ".lua"]);
        assert_eq!(config.import_function, "import");
        assert_eq!(config.bridge.name, "game_require");
        assert_eq!(config.bridge.identity, 2);
    }

    #[test]
    fn test_serialize_config() {
        let config = BundlerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("importFunction"));
        assert!(json.contains("getIdentity"));
    }

    #[test]
    fn test_deserialize_yaml_config() {
        let yaml = r#"
extensions: [lua]
typeWarnings: false
bridge:
  identity: 8
"#;
        let config: BundlerConfig = serde_yaml::from_str(yaml).unwrap();
        let config = config.validated().unwrap();
        assert_eq!(config.extensions, vec![".lua"]);
        assert!(!config.type_warnings);
        assert_eq!(config.bridge.identity, 8);
        assert_eq!(config.bridge.loader, "require");
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let config = BundlerConfig {
            extensions: vec![],
            ..BundlerConfig::default()
        };
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));
    }

    #[test]
    fn test_invalid_loader_name_rejected() {
        let config = BundlerConfig {
            loader_name: "my-loader".to_string(),
            ..BundlerConfig::default()
        };
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));
    }

    #[test]
    fn test_loader_and_bridge_names_must_differ() {
        let config = BundlerConfig {
            loader_name: "game_require".to_string(),
            ..BundlerConfig::default()
        };
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));
    }

    #[test]
    fn test_loader_may_share_bridge_name_when_bridge_disabled() {
        let mut config = BundlerConfig {
            loader_name: "game_require".to_string(),
            ..BundlerConfig::default()
        };
        config.bridge.enabled = false;
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_runtime_registry_name_rejected() {
        let config = BundlerConfig {
            loader_name: "__modules".to_string(),
            ..BundlerConfig::default()
        };
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));

        let mut config = BundlerConfig::default();
        config.bridge.name = "__modules".to_string();
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));
    }

    #[test]
    fn test_keywords_rejected() {
        for keyword in ["end", "local", "function", "nil"] {
            let config = BundlerConfig {
                loader_name: keyword.to_string(),
                ..BundlerConfig::default()
            };
            assert!(
                matches!(config.validated(), Err(BundleError::Config(_))),
                "loaderName '{}' should be rejected",
                keyword
            );
        }

        let mut config = BundlerConfig::default();
        config.bridge.name = "end".to_string();
        assert!(matches!(config.validated(), Err(BundleError::Config(_))));
    }

    #[test]
    fn test_merge_overrides() {
        let mut config = BundlerConfig::default();
        config.merge(&CliOverrides {
            bridge: Some(false),
            header: Some(false),
            ..CliOverrides::default()
        });
        assert!(!config.bridge.enabled);
        assert!(!config.header);
        assert!(config.type_warnings);
    }

    #[test]
    fn test_init_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("luapack.yaml");
        BundlerConfig::init_file(&path).unwrap();

        assert_eq!(BundlerConfig::discover(dir.path()), Some(path.clone()));
        assert_eq!(
            BundlerConfig::from_file(&path).unwrap(),
            BundlerConfig::default()
        );
    }
}
