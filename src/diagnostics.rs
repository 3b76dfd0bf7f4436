//! Reported diagnostics (§6 "Diagnostic") and their ANSI-colored rendering
//! (§7 "Error reporting format").
//!
//! The teacher never pulls in a color crate for its own debug output
//! (`util/logger.rs` writes plain `println!`); this module keeps that
//! dependency-free style and writes raw ANSI escapes directly, matching
//! §7's "RED `Error:`, YELLOW file paths" wording.

use crate::error::ErrorKind;
use crate::hash::FileHash;
use std::fmt::{Display, Formatter};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    fn label(&self) -> &'static str {
        match self {
            Severity::Hint => "Hint",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One reported problem, per §6's record shape: a source range, a severity,
/// a human message and the taxonomy tag that produced it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub file: FileHash,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Diagnostic {
    pub fn new(
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<String>,
        file: FileHash,
        line: usize,
        column: usize,
        length: usize,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            file,
            line,
            column,
            length,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, file: FileHash, line: usize, column: usize) -> Self {
        Self::new(kind, Severity::Error, message, file, line, column, 0)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let color = match self.severity {
            Severity::Error => RED,
            _ => YELLOW,
        };
        write!(
            f,
            "{color}{}:{RESET} {} {YELLOW}{}:{}:{}{RESET} [{}]",
            self.severity.label(),
            self.message,
            self.file,
            self.line,
            self.column,
            self.kind,
        )
    }
}

/// An append-only collector of diagnostics for one compilation run, owned by
/// the `CompilationContext` (SPEC_FULL.md §D).
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn print_all(&self) {
        for entry in &self.entries {
            println!("{entry}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_detects_only_error_severity() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::new(
            ErrorKind::ErrLex,
            Severity::Warning,
            "unreachable branch",
            FileHash::NONE,
            1,
            1,
            0,
        ));
        assert!(!sink.has_errors());
        sink.push(Diagnostic::error(ErrorKind::ErrParsing, "unexpected token", FileHash::NONE, 2, 3));
        assert!(sink.has_errors());
    }

    #[test]
    fn display_includes_tag_and_position() {
        let d = Diagnostic::error(ErrorKind::ErrUnknownType, "no such type `Foo`", FileHash::NONE, 4, 5);
        let rendered = format!("{d}");
        assert!(rendered.contains("ErrUnknownType"));
        assert!(rendered.contains("4:5"));
    }
}
