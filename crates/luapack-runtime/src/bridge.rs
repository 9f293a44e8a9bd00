//! Host bridge for loading modules that live outside the bundle.
//!
//! The bridge wraps the host's native loader, switching the thread identity
//! to an elevated level for the duration of the call and restoring it on
//! both the success and the failure path.

/// Placeholders: `{bridge}`, `{host_loader}`, `{get_identity}`,
/// `{set_identity}`, `{identity}`.
pub const HOST_BRIDGE: &str = r#"-- Host module bridge
{bridge} = function(target, continuation)
    local previous = {get_identity}()
    {set_identity}({identity})
    local ok, result = pcall({host_loader}, target)
    {set_identity}(previous)

    if not ok then
        error(result, 2)
    end

    if result == nil then
        error("host loader returned no value for " .. tostring(target), 2)
    end

    if continuation ~= nil then
        return continuation(result)
    end

    return result
end
"#;

/// Names of the host primitives the bridge is wired to.
#[derive(Debug, Clone, Copy)]
pub struct BridgeNames<'a> {
    pub bridge: &'a str,
    pub host_loader: &'a str,
    pub get_identity: &'a str,
    pub set_identity: &'a str,
    pub identity: u32,
}

/// Forward declaration emitted with the prelude so module bodies can call the bridge.
pub fn declaration(bridge: &str) -> String {
    format!("local {}\n", bridge)
}

pub fn render(names: &BridgeNames<'_>) -> String {
    HOST_BRIDGE
        .replace("{bridge}", names.bridge)
        .replace("{host_loader}", names.host_loader)
        .replace("{get_identity}", names.get_identity)
        .replace("{set_identity}", names.set_identity)
        .replace("{identity}", &names.identity.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roblox_names() -> BridgeNames<'static> {
        BridgeNames {
            bridge: "game_require",
            host_loader: "require",
            get_identity: "getthreadidentity",
            set_identity: "setthreadidentity",
            identity: 2,
        }
    }

    #[test]
    fn test_render_substitutes_every_placeholder() {
        let code = render(&roblox_names());
        assert!(code.contains("game_require = function(target, continuation)"));
        assert!(code.contains("local previous = getthreadidentity()"));
        assert!(code.contains("setthreadidentity(2)"));
        assert!(code.contains("pcall(require, target)"));
        assert!(!code.contains('{'));
    }

    #[test]
    fn test_identity_restored_before_error_propagates() {
        let code = render(&roblox_names());
        let restore = code.find("setthreadidentity(previous)").unwrap();
        let rethrow = code.find("error(result, 2)").unwrap();
        assert!(restore < rethrow);
    }
}
