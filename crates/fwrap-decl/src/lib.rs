//! Declaration graph for the fwrap binding generator.
//!
//! The graph is produced by an external C/C++ front end and handed to the
//! generator fully resolved: every declaration carries its kind, its type
//! signature and the feature overrides requested for it. This crate owns the
//! data model, the C declarator parser used for type signatures, and loading
//! a graph from its JSON form.

mod decl;
mod error;
mod graph;
mod load;
mod types;

pub use decl::{
    Access, ClassDecl, ClassKeyword, Decl, DeclId, DeclKind, EnumDecl, Features, FunctionDecl,
    FunctionRole, InsertSection, ModuleInfo, Param, VariableDecl, VariableRole,
};
pub use error::{DeclError, Result};
pub use graph::DeclGraph;
pub use load::load_graph;
pub use types::TypeSig;
