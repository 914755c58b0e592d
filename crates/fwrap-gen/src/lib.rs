//! Fortran 2003 binding generator.
//!
//! Walks a [`fwrap_decl::DeclGraph`] depth first and produces two
//! coordinated sources: a C or C++ wrapper exposing every declaration with C
//! linkage, and a Fortran module that binds those wrappers through
//! `ISO_C_BINDING` and presents them as idiomatic procedures and derived
//! types.
//!
//! ```text
//! DeclGraph ──▶ generate() ──▶ Output { wrapper, module, diagnostics }
//!                  │
//!                  ├── ident / registry   Fortran-legal, collision-free names
//!                  ├── typemap            marshaling snippets per C type
//!                  ├── pipeline           C wrapper → bind(C) interface → proxy
//!                  ├── overload           generic interfaces
//!                  └── class / enums      derived types, enums and constants
//! ```

mod attrs;
mod bridge;
mod class;
mod enums;
mod error;
mod functions;
mod generator;
mod ident;
mod overload;
mod pipeline;
mod registry;
mod runtime;
mod sections;
mod typemap;
mod variables;

pub use attrs::OperationNames;
pub use bridge::{is_default_real_literal, is_fortran_intexpr, make_import_string, make_specifier_suffix};
pub use error::{GenError, Result};
pub use generator::{generate, GenConfig, Output};
pub use ident::{
    interface_name, is_valid_identifier, mangle, mangle_with_report, proxy_name, wrapper_name,
    MangleReport, MAX_IDENT_LEN,
};
pub use overload::Overloads;
pub use registry::{RegisterError, Scope, Severity, SymbolRegistry};
pub use sections::MAX_LINE_LENGTH;
pub use typemap::{
    builtin_rules, Typemap, TypemapEngine, TypemapMethod, TypemapRule, TypemapTable, TypemapTarget,
};
