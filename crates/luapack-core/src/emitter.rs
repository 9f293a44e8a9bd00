//! Artifact serialization
//!
//! Layout, top to bottom:
//!
//! 1. header comment (tool, version, timestamp)
//! 2. module registry and forward declarations
//! 3. one pending thunk per module, in table order
//! 4. the memoizing loader
//! 5. the host bridge
//! 6. the rewritten entry module

use crate::config::BundlerConfig;
use crate::graph::{Module, ModuleGraph};
use crate::transform::lua_string;
use chrono::{DateTime, SecondsFormat, Utc};
use luapack_runtime::{bridge, module};

pub const TOOL_NAME: &str = "luapack";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Emitter<'a> {
    config: &'a BundlerConfig,
    generated_at: DateTime<Utc>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a BundlerConfig) -> Self {
        Self::with_timestamp(config, Utc::now())
    }

    pub fn with_timestamp(config: &'a BundlerConfig, generated_at: DateTime<Utc>) -> Self {
        Self {
            config,
            generated_at,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn emit(&self, graph: &ModuleGraph) -> String {
        let mut output = String::new();

        if self.config.header {
            output.push_str(&format!(
                "-- Bundled by {} v{}\n-- Generated at {}\n\n",
                TOOL_NAME,
                TOOL_VERSION,
                self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }

        output.push_str(&module::prelude(&self.config.loader_name));
        if self.config.bridge.enabled {
            output.push_str(&bridge::declaration(&self.config.bridge.name));
        }
        output.push('\n');

        for module in graph.modules.values() {
            self.write_thunk(&mut output, module);
        }

        output.push_str(&module::loader(&self.config.loader_name));
        output.push('\n');

        if self.config.bridge.enabled {
            let options = &self.config.bridge;
            output.push_str(&bridge::render(&bridge::BridgeNames {
                bridge: &options.name,
                host_loader: &options.loader,
                get_identity: &options.get_identity,
                set_identity: &options.set_identity,
                identity: options.identity,
            }));
            output.push('\n');
        }

        output.push_str(&format!("-- Entry: {}\n", graph.entry.path));
        output.push_str(&graph.entry.body);
        if !graph.entry.body.ends_with('\n') {
            output.push('\n');
        }

        output
    }

    fn write_thunk(&self, output: &mut String, module: &Module) {
        output.push_str(&format!("-- Module: {}\n", module.path));
        output.push_str(&format!(
            "__modules[{}] = {{ state = \"pending\", thunk = function(...)\n",
            lua_string(&module.path)
        ));
        output.push_str(&module.body);
        if !module.body.ends_with('\n') {
            output.push('\n');
        }
        output.push_str("end }\n\n");
    }
}
