//! Per-declaration attributes computed during generation.
//!
//! The declaration graph stays read-only apart from appended children; what
//! the generator learns about a declaration (its Fortran name, the names of
//! the routines generated for it, whether an enum has been emitted) lives in
//! this side table keyed by [`DeclId`].

use fwrap_decl::DeclId;
use rustc_hash::FxHashMap;

/// Names of one wrapped operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNames {
    /// C linkage name of the wrapper, or of the bound function itself.
    pub wrapper: String,
    /// `bind(C)` interface routine.
    pub interface: String,
    /// Fortran proxy routine, absent for directly bound functions.
    pub proxy: Option<String>,
    /// Public or type-bound name the proxy is exposed under.
    pub public: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeclAttrs {
    /// Fortran name of a class or enum.
    pub fortran_name: Option<String>,
    /// Assignment policy macro of a class.
    pub policy: Option<String>,
    /// The enum is available as a Fortran kind.
    pub declared: bool,
    /// Typemap name given to the implicit first argument.
    pub rename_self: Option<&'static str>,
    /// Typemap names given to declared parameters, by position.
    pub rename_params: Vec<(usize, &'static str)>,
    /// Operations generated for the declaration, in generation order.
    pub operations: Vec<OperationNames>,
}

#[derive(Debug, Default)]
pub struct AttrTable {
    attrs: FxHashMap<DeclId, DeclAttrs>,
}

impl AttrTable {
    pub fn get(&self, id: DeclId) -> Option<&DeclAttrs> {
        self.attrs.get(&id)
    }

    pub fn entry(&mut self, id: DeclId) -> &mut DeclAttrs {
        self.attrs.entry(id).or_default()
    }

    pub fn fortran_name(&self, id: DeclId) -> Option<&str> {
        self.get(id)?.fortran_name.as_deref()
    }

    pub fn is_declared(&self, id: DeclId) -> bool {
        self.get(id).map_or(false, |a| a.declared)
    }
}
