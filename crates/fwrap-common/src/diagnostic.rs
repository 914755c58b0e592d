//! Diagnostic reporting infrastructure for the binding generator.
//!
//! Diagnostics are collected into a [`Diagnostics`] sink during a run and
//! rendered by the caller through miette. Every diagnostic is also mirrored
//! to `tracing` at the matching level when it is pushed.

use crate::location::SourceLocation;
use miette::Diagnostic as MietteDiagnostic;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// Category of a diagnostic, used for filtering and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A case-insensitive name collision, or a rename to avoid one.
    NameConflict,
    /// An identifier that had to be changed or cannot be used at all.
    Identifier,
    /// A required typemap is missing.
    TypemapUndefined,
    /// A construct the target cannot express (varargs, multi-statement constants).
    NativeUnimplemented,
    /// A second base class was dropped.
    MultipleInheritance,
    /// A function could not be demoted to a subroutine.
    NoSubroutine,
    /// A literal needed an explicit kind suffix.
    KindSuffix,
    /// A declaration is inconsistent with its requested mode.
    InvalidDeclaration,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCode::NameConflict => "name-conflict",
            DiagnosticCode::Identifier => "identifier",
            DiagnosticCode::TypemapUndefined => "typemap-undefined",
            DiagnosticCode::NativeUnimplemented => "native-unimplemented",
            DiagnosticCode::MultipleInheritance => "multiple-inheritance",
            DiagnosticCode::NoSubroutine => "no-subroutine",
            DiagnosticCode::KindSuffix => "kind-suffix",
            DiagnosticCode::InvalidDeclaration => "invalid-declaration",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("{}{}", location_prefix(.location), .message)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Option<SourceLocation>,
    #[help]
    pub help: Option<String>,
}

fn location_prefix(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) if !loc.is_unknown() => format!("{}: ", loc),
        _ => String::new(),
    }
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

/// Ordered collection of the diagnostics reported during one run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Error => {
                tracing::error!(code = %diagnostic.code, "{}", diagnostic)
            }
            DiagnosticLevel::Warning => {
                tracing::warn!(code = %diagnostic.code, "{}", diagnostic)
            }
        }
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Whether any diagnostic with `code` mentions `needle`.
    pub fn mentions(&self, code: DiagnosticCode, needle: &str) -> bool {
        self.items
            .iter()
            .any(|d| d.code == code && d.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let diag = Diagnostic::warning(DiagnosticCode::NameConflict, "clash")
            .with_location(SourceLocation::new("foo.h", 12));
        assert_eq!(diag.to_string(), "foo.h:12: clash");
    }

    #[test]
    fn test_display_without_location() {
        let diag = Diagnostic::error(DiagnosticCode::Identifier, "bad name");
        assert_eq!(diag.to_string(), "bad name");
    }

    #[test]
    fn test_sink_counts_errors() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning(DiagnosticCode::KindSuffix, "w"));
        assert!(!diags.has_errors());
        diags.push(Diagnostic::error(DiagnosticCode::Identifier, "e"));
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.warnings().count(), 1);
        assert!(diags.mentions(DiagnosticCode::KindSuffix, "w"));
    }
}
