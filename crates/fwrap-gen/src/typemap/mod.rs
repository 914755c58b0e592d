//! Marshaling templates ("typemaps").
//!
//! The generator never decides how a C type crosses the ABI boundary by
//! itself: it asks a [`TypemapEngine`] for a snippet per method (the C type,
//! the interface type, the conversion code, ...) and splices the result into
//! its output. [`TypemapTable`] is a table-driven engine with a builtin rule
//! set; further rules can be added at run time.

mod builtin;
mod table;

pub use builtin::builtin_rules;
pub use table::{TypemapRule, TypemapTable};

use fwrap_decl::TypeSig;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of marshaling snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypemapMethod {
    /// C type of the wrapper's parameter or result.
    CType,
    /// Interface type used in the `bind(C)` declaration.
    ImType,
    /// Proxy-facing Fortran type.
    FType,
    /// Directly interoperable Fortran type for `bind(C)` code.
    BindC,
    /// C: wrapper argument to local variable.
    In,
    /// C: argument constraint check.
    Check,
    /// C: write back output arguments.
    ArgOut,
    /// C: release argument resources.
    FreeArg,
    /// C: local result to wrapper result.
    Out,
    /// C: result resource management.
    Ret,
    /// Fortran: proxy argument to interface argument.
    FIn,
    /// Fortran: temporaries needed by `fin`.
    FInDecl,
    /// Fortran: interface result to proxy result.
    FOut,
    /// Fortran: temporaries needed by `fout`.
    FOutDecl,
    /// Fortran: write back after the interface call.
    FArgOut,
}

impl TypemapMethod {
    pub const ALL: [TypemapMethod; 15] = [
        TypemapMethod::CType,
        TypemapMethod::ImType,
        TypemapMethod::FType,
        TypemapMethod::BindC,
        TypemapMethod::In,
        TypemapMethod::Check,
        TypemapMethod::ArgOut,
        TypemapMethod::FreeArg,
        TypemapMethod::Out,
        TypemapMethod::Ret,
        TypemapMethod::FIn,
        TypemapMethod::FInDecl,
        TypemapMethod::FOut,
        TypemapMethod::FOutDecl,
        TypemapMethod::FArgOut,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypemapMethod::CType => "ctype",
            TypemapMethod::ImType => "imtype",
            TypemapMethod::FType => "ftype",
            TypemapMethod::BindC => "bindc",
            TypemapMethod::In => "in",
            TypemapMethod::Check => "check",
            TypemapMethod::ArgOut => "argout",
            TypemapMethod::FreeArg => "freearg",
            TypemapMethod::Out => "out",
            TypemapMethod::Ret => "ret",
            TypemapMethod::FIn => "fin",
            TypemapMethod::FInDecl => "findecl",
            TypemapMethod::FOut => "fout",
            TypemapMethod::FOutDecl => "foutdecl",
            TypemapMethod::FArgOut => "fargout",
        }
    }
}

impl fmt::Display for TypemapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypemapMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypemapMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown typemap method '{}'", s))
    }
}

/// What a typemap is looked up for.
#[derive(Debug, Clone, Copy)]
pub struct TypemapTarget<'a> {
    /// Declared type.
    pub ty: &'a TypeSig,
    /// The same type with typedefs resolved.
    pub resolved: &'a TypeSig,
    /// Parameter or declaration name, used for name-specific rules.
    pub name: Option<&'a str>,
    /// Local variable substituted for `$1`.
    pub lname: &'a str,
}

/// A resolved marshaling snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typemap {
    pub code: String,
    #[serde(default)]
    pub kwargs: FxHashMap<String, String>,
}

impl Typemap {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kwargs: FxHashMap::default(),
        }
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn kwarg(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).map(String::as_str)
    }

    /// A keyword set to anything but `0`.
    pub fn flag(&self, key: &str) -> bool {
        self.kwarg(key).map_or(false, |v| v != "0")
    }

    /// Code specialised for `ext` (e.g. the `in` variant of a `ctype`),
    /// falling back to the plain code.
    pub fn code_for(&self, ext: Option<&str>) -> &str {
        ext.and_then(|e| self.kwarg(e)).unwrap_or(&self.code)
    }
}

/// Source of marshaling snippets.
pub trait TypemapEngine {
    /// Find the snippet for `method` applied to `target`, with `$1`-style
    /// special variables already substituted.
    fn lookup(&self, method: TypemapMethod, target: &TypemapTarget<'_>) -> Option<Typemap>;
}
