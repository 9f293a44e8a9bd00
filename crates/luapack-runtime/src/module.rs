//! Module system runtime for bundled output.
//! Uses `{loader}` as a placeholder for the loader's name - replace before use.

/// Declarations emitted ahead of the module thunks.
///
/// The loader is declared as a local up front so that module bodies, which
/// are closures defined before the loader itself, capture the same binding.
pub const MODULE_PRELUDE: &str = r#"-- Module registry
local __modules = {}
local {loader}
"#;

/// Loader shim emitted after the module thunks.
///
/// Every `__modules` slot starts as `{ state = "pending", thunk = fn }` and is
/// switched to `{ state = "evaluated", value = v }` on first access, so a
/// module body runs at most once and every importer sees the same value.
pub const MODULE_LOADER: &str = r#"-- Bundled module loader
{loader} = function(name)
    local slot = __modules[name]
    if slot == nil then
        error("unknown module: " .. tostring(name), 2)
    end

    if slot.state == "evaluated" then
        return slot.value
    end

    if slot.state == "evaluating" then
        error("module is still initializing: " .. tostring(name), 2)
    end

    slot.state = "evaluating"
    local ok, value = pcall(slot.thunk)
    if not ok then
        slot.state = "pending"
        error(value, 0)
    end

    slot.state = "evaluated"
    slot.value = value
    slot.thunk = nil
    return value
end
"#;

/// Render the prelude for a loader named `loader`.
pub fn prelude(loader: &str) -> String {
    MODULE_PRELUDE.replace("{loader}", loader)
}

/// Render the loader shim for a loader named `loader`.
pub fn loader(loader: &str) -> String {
    MODULE_LOADER.replace("{loader}", loader)
}
