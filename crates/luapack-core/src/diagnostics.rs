use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message attached to a module and a 1-based line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub module: String,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(module: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            module: module.into(),
            line,
            message: message.into(),
        }
    }

    pub fn warning(module: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            module: module.into(),
            line,
            message: message.into(),
        }
    }

    pub fn info(module: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            module: module.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.level, self.module, self.line, self.message
        )
    }
}

/// Trait for handling diagnostics
/// This allows for dependency injection and testing with mock handlers
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn warning(&self, module: &str, line: usize, message: &str) {
        self.report(Diagnostic::warning(module, line, message));
    }

    fn info(&self, module: &str, line: usize, message: &str) {
        self.report(Diagnostic::info(module, line, message));
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize;
    fn warning_count(&self) -> usize;
    fn get_diagnostics(&self) -> Vec<Diagnostic>;
}

fn count_level(diagnostics: &[Diagnostic], level: DiagnosticLevel) -> usize {
    diagnostics.iter().filter(|d| d.level == level).count()
}

/// Console-based diagnostic handler that prints to stderr
pub struct ConsoleDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
    pretty: bool,
}

impl ConsoleDiagnosticHandler {
    pub fn new(pretty: bool) -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            pretty,
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticHandler for ConsoleDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        if self.pretty {
            eprintln!(
                "\x1b[1;33m{}\x1b[0m at {}:{}: {}",
                diagnostic.level, diagnostic.module, diagnostic.line, diagnostic.message
            );
        } else {
            eprintln!("{}", diagnostic);
        }

        self.entries().push(diagnostic);
    }

    fn error_count(&self) -> usize {
        count_level(&self.entries(), DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        count_level(&self.entries(), DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.entries().clone()
    }
}

/// Collecting diagnostic handler for testing
/// Collects all diagnostics without printing
#[derive(Default)]
pub struct CollectingDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries().push(diagnostic);
    }

    fn error_count(&self) -> usize {
        count_level(&self.entries(), DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        count_level(&self.entries(), DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.entries().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("lib/util.luau", 3, "Test warning");
        assert_eq!(diag.to_string(), "warning at lib/util.luau:3: Test warning");
    }

    #[test]
    fn test_collecting_handler() {
        let handler = CollectingDiagnosticHandler::new();

        handler.report(Diagnostic::error("main.luau", 1, "Error 1"));
        handler.warning("main.luau", 2, "Warning 1");
        handler.report(Diagnostic::error("main.luau", 3, "Error 2"));

        assert_eq!(handler.error_count(), 2);
        assert_eq!(handler.warning_count(), 1);
        assert!(handler.has_errors());
        assert_eq!(handler.get_diagnostics().len(), 3);
    }

    #[test]
    fn test_no_errors() {
        let handler = CollectingDiagnosticHandler::new();

        handler.warning("main.luau", 1, "Warning 1");
        handler.info("main.luau", 2, "Info 1");

        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
    }
}
