//! Case-insensitive symbol tables.
//!
//! Fortran folds identifier case, so two C symbols differing only in case
//! collide. The registry keeps one table per scope (the module, or one
//! derived type) keyed by the lower-cased name. Registration order is the
//! traversal order and decides who keeps a contested name: the first
//! writer wins.

use crate::ident::{is_valid_identifier, mangle};
use fwrap_common::{Diagnostic, DiagnosticCode};
use fwrap_decl::DeclId;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

/// A symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Names visible anywhere in the generated module.
    Module,
    /// Type-bound procedure names of one derived type.
    Aggregate(DeclId),
}

/// How a collision is reported. An invalid identifier is always an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warn,
    Silent,
}

impl Severity {
    /// Diagnostic for a failed registration on behalf of `label`, a `kind`
    /// of declaration, or `None` when this severity stays quiet.
    pub fn diagnose(self, err: &RegisterError, label: &str, kind: &str) -> Option<Diagnostic> {
        match err {
            RegisterError::Invalid { name } => Some(Diagnostic::error(
                DiagnosticCode::Identifier,
                format!(
                    "The name '{}' is not a valid Fortran identifier. You must rename this {}.",
                    name, kind
                ),
            )),
            RegisterError::Conflict { folded, existing } => {
                let message = format!(
                    "Ignoring '{}' due to Fortran name ('{}') conflict with '{}'",
                    label, folded, existing
                );
                match self {
                    Severity::Fatal => Some(Diagnostic::error(DiagnosticCode::NameConflict, message)),
                    Severity::Warn => Some(Diagnostic::warning(DiagnosticCode::NameConflict, message)),
                    Severity::Silent => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// Name as it was registered, before case folding.
    pub name: SmolStr,
    /// Declaration that owns the name, if any.
    pub owner: Option<DeclId>,
    /// Human-readable owner for diagnostics.
    pub label: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("'{name}' is not a valid Fortran identifier")]
    Invalid { name: String },

    #[error("Fortran name '{folded}' conflicts with '{existing}'")]
    Conflict { folded: SmolStr, existing: SmolStr },
}

#[derive(Debug, Default)]
pub struct SymbolRegistry {
    scopes: FxHashMap<Scope, IndexMap<SmolStr, SymbolEntry>>,
}

fn fold(name: &str) -> SmolStr {
    SmolStr::new(name.to_lowercase())
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` in `scope`.
    pub fn register(
        &mut self,
        scope: Scope,
        name: &str,
        owner: Option<DeclId>,
        label: &str,
    ) -> Result<(), RegisterError> {
        if !is_valid_identifier(name) {
            return Err(RegisterError::Invalid {
                name: name.to_string(),
            });
        }
        let folded = fold(name);
        let table = self.scopes.entry(scope).or_default();
        if let Some(existing) = table.get(&folded) {
            return Err(RegisterError::Conflict {
                folded,
                existing: existing.label.clone(),
            });
        }
        table.insert(
            folded,
            SymbolEntry {
                name: SmolStr::new(name),
                owner,
                label: SmolStr::new(label),
            },
        );
        Ok(())
    }

    pub fn contains(&self, scope: Scope, name: &str) -> bool {
        self.lookup(scope, name).is_some()
    }

    pub fn lookup(&self, scope: Scope, name: &str) -> Option<&SymbolEntry> {
        self.scopes.get(&scope)?.get(&fold(name))
    }

    /// Mangle `raw` and register it, appending `1`, `2`, ... until the
    /// folded name is free. Returns the registered name and whether a
    /// suffix was needed.
    pub fn unique_symbol(
        &mut self,
        scope: Scope,
        raw: &str,
        owner: Option<DeclId>,
        label: &str,
    ) -> Result<(String, bool), RegisterError> {
        let base = mangle(raw);
        let mut candidate = base.clone();
        let mut suffix = 0u32;
        while self.contains(scope, &candidate) {
            suffix += 1;
            candidate = mangle(&format!("{}{}", base, suffix));
        }
        self.register(scope, &candidate, owner, label)?;
        Ok((candidate, suffix != 0))
    }

    /// Registered names of `scope`, in registration order.
    pub fn names(&self, scope: Scope) -> impl Iterator<Item = &str> {
        self.scopes
            .get(&scope)
            .into_iter()
            .flat_map(|table| table.values().map(|entry| entry.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwrap_decl::{Decl, DeclGraph, ModuleInfo};

    #[test]
    fn test_case_insensitive_conflict() {
        let mut reg = SymbolRegistry::new();
        assert!(reg.register(Scope::Module, "Foo", None, "Foo").is_ok());
        let err = reg.register(Scope::Module, "foo", None, "foo").unwrap_err();
        assert_eq!(
            err,
            RegisterError::Conflict {
                folded: "foo".into(),
                existing: "Foo".into()
            }
        );
        assert_eq!(reg.lookup(Scope::Module, "FOO").map(|e| e.name.as_str()), Some("Foo"));
    }

    #[test]
    fn test_severity_decides_reporting() {
        let conflict = RegisterError::Conflict {
            folded: "area".into(),
            existing: "Area".into(),
        };
        let fatal = Severity::Fatal.diagnose(&conflict, "area", "function").unwrap();
        assert!(fatal.is_error());
        assert_eq!(
            fatal.message,
            "Ignoring 'area' due to Fortran name ('area') conflict with 'Area'"
        );
        assert!(!Severity::Warn.diagnose(&conflict, "area", "function").unwrap().is_error());
        assert!(Severity::Silent.diagnose(&conflict, "area", "function").is_none());

        let invalid = RegisterError::Invalid { name: "_x".into() };
        let diagnostic = Severity::Silent.diagnose(&invalid, "_x", "constant").unwrap();
        assert_eq!(diagnostic.code, DiagnosticCode::Identifier);
        assert!(diagnostic.message.ends_with("You must rename this constant."));
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut reg = SymbolRegistry::new();
        let mut graph = DeclGraph::new(ModuleInfo::new("m"));
        let class = graph.add(None, Decl::class("Circle"));
        reg.register(Scope::Module, "area", None, "area").unwrap();
        assert!(reg.register(Scope::Aggregate(class), "area", None, "area").is_ok());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut reg = SymbolRegistry::new();
        assert!(matches!(
            reg.register(Scope::Module, "_x", None, "_x"),
            Err(RegisterError::Invalid { .. })
        ));
        assert!(reg.register(Scope::Module, &"a".repeat(64), None, "a").is_err());
    }

    #[test]
    fn test_unique_symbol_suffixes_in_order() {
        let mut reg = SymbolRegistry::new();
        let (first, renamed) = reg.unique_symbol(Scope::Module, "RED", None, "RED").unwrap();
        assert_eq!((first.as_str(), renamed), ("RED", false));
        let (second, renamed) = reg.unique_symbol(Scope::Module, "red", None, "red").unwrap();
        assert_eq!((second.as_str(), renamed), ("red1", true));
        let (third, _) = reg.unique_symbol(Scope::Module, "Red", None, "Red").unwrap();
        assert_eq!(third, "Red2");
        let names: Vec<_> = reg.names(Scope::Module).collect();
        assert_eq!(names, vec!["RED", "red1", "Red2"]);
    }

    #[test]
    fn test_unique_symbol_mangles_first() {
        let mut reg = SymbolRegistry::new();
        let (name, _) = reg.unique_symbol(Scope::Module, "_hidden", None, "_hidden").unwrap();
        assert_eq!(name, "hidden_");
    }
}
