//! Advisory scan for Luau type declarations.
//!
//! Bundling passes type syntax through untouched, so a module that declares
//! types only runs on hosts that understand it. The scan reports each
//! declaration and never influences the artifact.

use crate::diagnostics::DiagnosticHandler;

/// Kind of type declaration found at the start of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDeclaration {
    Local(String),
    Exported(String),
}

/// Classify one source line
pub fn classify_line(line: &str) -> Option<TypeDeclaration> {
    let trimmed = line.trim_start();

    if let Some(rest) = strip_keyword(trimmed, "export") {
        return strip_keyword(rest, "type")
            .and_then(type_name)
            .map(TypeDeclaration::Exported);
    }

    strip_keyword(trimmed, "type")
        .and_then(type_name)
        .map(TypeDeclaration::Local)
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.starts_with(|c: char| c.is_whitespace()) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn type_name(text: &str) -> Option<String> {
    let name: String = text
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return None;
    }

    // `type Name = ...` or `type Name<T> = ...`; anything else is ordinary code
    let after = text[name.len()..].trim_start();
    if after.starts_with('=') || after.starts_with('<') {
        Some(name)
    } else {
        None
    }
}

/// Report every type declaration in `source`, returning how many were found
pub fn scan_type_declarations(
    source: &str,
    display_name: &str,
    handler: &dyn DiagnosticHandler,
) -> usize {
    let mut found = 0;

    for (index, line) in source.lines().enumerate() {
        let message = match classify_line(line) {
            Some(TypeDeclaration::Local(name)) => format!(
                "local type declaration '{}' is kept verbatim; the host must support type syntax",
                name
            ),
            Some(TypeDeclaration::Exported(name)) => format!(
                "exported type declaration '{}' is kept verbatim; exports are not visible across bundled modules",
                name
            ),
            None => continue,
        };

        handler.warning(display_name, index + 1, &message);
        found += 1;
    }

    found
}
