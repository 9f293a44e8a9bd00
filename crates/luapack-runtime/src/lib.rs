//! Runtime support code for luapack bundles.
//! Provides the Lua snippets the emitter splices into every artifact.

pub mod bridge;
pub mod module;
