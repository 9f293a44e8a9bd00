//! Import call-site rewriting
//!
//! The scan is textual, not a parse. A call site is the import primitive's
//! name, optional whitespace, `(`, and everything up to the *first* `)`.
//! Consequences that callers should expect:
//!
//! - nested parentheses in the argument cut the call short
//! - a `)` inside a string argument ends the call early
//! - call sites inside comments and strings are rewritten too
//! - paren-less calls (`import "x"`) and member calls (`m.import(...)`) are not matched

use crate::errors::Result;
use crate::resolver::PathResolver;
use std::ops::Range;

/// One import call found in module text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSite<'src> {
    /// Byte range of the whole call, name through closing parenthesis
    pub span: Range<usize>,
    /// Argument text between the parentheses, trimmed
    pub argument: &'src str,
}

impl<'src> ImportSite<'src> {
    /// Contents of the argument when it is a plain quoted literal
    pub fn literal(&self) -> Option<&'src str> {
        string_literal(self.argument)
    }
}

/// Result of rewriting one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// Canonical paths of literal imports, in textual order, duplicates kept
    pub dependencies: Vec<String>,
}

pub struct ContentTransformer<'a> {
    resolver: &'a PathResolver,
    import_function: &'a str,
    loader_name: &'a str,
}

impl<'a> ContentTransformer<'a> {
    pub fn new(resolver: &'a PathResolver, import_function: &'a str, loader_name: &'a str) -> Self {
        Self {
            resolver,
            import_function,
            loader_name,
        }
    }

    /// Rewrite every import call in `source`, which belongs to module `current`
    pub fn transform(&self, source: &str, current: &str) -> Result<Transformed> {
        let mut text = String::with_capacity(source.len());
        let mut dependencies = Vec::new();
        let mut cursor = 0;

        for site in find_import_sites(source, self.import_function) {
            text.push_str(&source[cursor..site.span.start]);

            match site.literal() {
                Some(literal) => {
                    let canonical = self.resolver.resolve(current, literal)?;
                    text.push_str(self.loader_name);
                    text.push('(');
                    text.push_str(&lua_string(&canonical));
                    text.push(')');
                    dependencies.push(canonical);
                }
                None => {
                    text.push_str(self.loader_name);
                    text.push('(');
                    text.push_str(site.argument);
                    text.push(')');
                }
            }

            cursor = site.span.end;
        }

        text.push_str(&source[cursor..]);

        Ok(Transformed { text, dependencies })
    }
}

/// Find import call sites left to right
pub fn find_import_sites<'src>(source: &'src str, name: &str) -> Vec<ImportSite<'src>> {
    let mut sites = Vec::new();
    if name.is_empty() {
        return sites;
    }

    let bytes = source.as_bytes();
    let mut from = 0;

    while let Some(offset) = source[from..].find(name) {
        let start = from + offset;
        let after_name = start + name.len();
        from = after_name;

        if start > 0 && !is_call_boundary(bytes[start - 1]) {
            continue;
        }

        let open = after_name
            + source[after_name..]
                .bytes()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
        if bytes.get(open) != Some(&b'(') {
            continue;
        }

        let Some(close_offset) = source[open + 1..].find(')') else {
            break;
        };
        let close = open + 1 + close_offset;

        sites.push(ImportSite {
            span: start..close + 1,
            argument: source[open + 1..close].trim(),
        });
        from = close + 1;
    }

    sites
}

fn is_call_boundary(previous: u8) -> bool {
    !(previous.is_ascii_alphanumeric() || matches!(previous, b'_' | b'.' | b':'))
}

/// Unquote `"..."` or `'...'` when the quote character does not reappear inside
fn string_literal(argument: &str) -> Option<&str> {
    let quote = argument.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = argument.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.contains(quote) {
        return None;
    }
    Some(inner)
}

/// Quote `value` as a double-quoted Lua string
pub fn lua_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BundleError;
    use crate::fs::MockFileSystem;
    use indoc::indoc;
    use proptest::prelude::*;
    use std::path::Path;
    use std::sync::Arc;

    fn project_resolver() -> PathResolver {
        let fs = MockFileSystem::new()
            .with_file("/project/main.luau", "")
            .with_file("/project/util.luau", "")
            .with_file("/project/lib/log.lua", "");
        PathResolver::new(
            Arc::new(fs),
            Path::new("/project"),
            vec![".luau".to_string(), ".lua".to_string()],
        )
    }

    fn transform(source: &str) -> Result<Transformed> {
        let resolver = project_resolver();
        ContentTransformer::new(&resolver, "import", "import").transform(source, "main.luau")
    }

    #[test]
    fn test_literal_imports_rewritten_in_order() {
        let source = indoc! {r#"
            local log = import("./lib/log")
            local util = import './util'
            local again = import ( './util' )
        "#};

        let out = transform(source).unwrap();

        assert_eq!(
            out.text,
            indoc! {r#"
                local log = import("lib/log.lua")
                local util = import './util'
                local again = import("util.luau")
            "#}
        );
        assert_eq!(out.dependencies, vec!["lib/log.lua", "util.luau"]);
    }

    #[test]
    fn test_duplicate_imports_kept() {
        let out = transform("import('./util') import(\"./util\")").unwrap();
        assert_eq!(out.dependencies, vec!["util.luau", "util.luau"]);
        assert_eq!(out.text, "import(\"util.luau\") import(\"util.luau\")");
    }

    #[test]
    fn test_dynamic_argument_passes_through() {
        let out = transform("local m = import(base .. name)").unwrap();
        assert_eq!(out.text, "local m = import(base .. name)");
        assert!(out.dependencies.is_empty());
    }

    #[test]
    fn test_dynamic_argument_forwarded_to_renamed_loader() {
        let resolver = project_resolver();
        let out = ContentTransformer::new(&resolver, "require", "__bundle_load")
            .transform("local m = require(script.Parent.Thing)", "main.luau")
            .unwrap();

        assert_eq!(out.text, "local m = __bundle_load(script.Parent.Thing)");
        assert!(out.dependencies.is_empty());
    }

    #[test]
    fn test_missing_module_reports_current_module() {
        let err = transform("import('./nope')").unwrap_err();
        match err {
            BundleError::ModuleNotFound {
                referenced_from, ..
            } => assert_eq!(referenced_from, "main.luau"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identifier_boundaries() {
        let sites = find_import_sites(
            "reimport('a') obj.import('b') obj:import('c') import_all('d') import('e')",
            "import",
        );
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].literal(), Some("e"));
    }

    #[test]
    fn test_nested_parentheses_cut_call_short() {
        let sites = find_import_sites("import(pick(a, b))", "import");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].argument, "pick(a, b");
        assert_eq!(sites[0].literal(), None);
    }

    #[test]
    fn test_calls_inside_comments_are_matched() {
        let sites = find_import_sites("-- import('./util')\nreturn 1", "import");
        assert_eq!(sites.len(), 1);
    }

    #[test]
    fn test_unterminated_call_left_alone() {
        let out = transform("local x = import('./util'").unwrap();
        assert_eq!(out.text, "local x = import('./util'");
        assert!(out.dependencies.is_empty());
    }

    #[test]
    fn test_string_literal_detection() {
        assert_eq!(string_literal("\"a/b\""), Some("a/b"));
        assert_eq!(string_literal("'a'"), Some("a"));
        assert_eq!(string_literal("'a\""), None);
        assert_eq!(string_literal("\"a\" .. \"b\""), None);
        assert_eq!(string_literal("[[a]]"), None);
        assert_eq!(string_literal(""), None);
    }

    #[test]
    fn test_lua_string_escapes() {
        assert_eq!(lua_string(r#"odd"name\x"#), r#""odd\"name\\x""#);
    }

    proptest! {
        #[test]
        fn prop_text_without_calls_is_unchanged(source in "[a-z0-9 =.,\n]{0,200}") {
            let out = transform(&source).unwrap();
            prop_assert_eq!(out.text, source);
            prop_assert!(out.dependencies.is_empty());
        }
    }
}
