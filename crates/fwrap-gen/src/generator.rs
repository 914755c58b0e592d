//! Generator driver: traversal of the declaration graph and dispatch to the
//! per-kind handlers.

use crate::attrs::AttrTable;
use crate::bridge::symbol_of;
use crate::class::ClassContext;
use crate::error::Result;
use crate::overload::Overloads;
use crate::pipeline::Outcome;
use crate::registry::{Scope, Severity, SymbolRegistry};
use crate::runtime::{base_runtime, Fragments};
use crate::sections::{write_docstring, Section, Sections};
use crate::typemap::TypemapEngine;
use fwrap_common::{Diagnostic, DiagnosticCode, Diagnostics, SourceLocation};
use fwrap_decl::{Access, Decl, DeclGraph, DeclId, DeclKind, FunctionRole, VariableRole};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Options of a generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Use C++ casts in the generated `SWIG_*_cast` macros.
    pub cppcast: bool,
    /// Extension of the generated Fortran module file.
    pub fext: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            cppcast: true,
            fext: "f90".to_string(),
        }
    }
}

/// The two generated files and everything reported while producing them.
#[derive(Debug, Clone)]
pub struct Output {
    pub module_name: String,
    pub cplusplus: bool,
    pub fext: String,
    /// C or C++ wrapper source.
    pub wrapper: String,
    /// Fortran module source.
    pub module: String,
    pub diagnostics: Diagnostics,
}

impl Output {
    pub fn wrapper_file_name(&self) -> String {
        let ext = if self.cplusplus { "cxx" } else { "c" };
        format!("{}_wrap.{}", self.module_name, ext)
    }

    pub fn module_file_name(&self) -> String {
        format!("{}.{}", self.module_name, self.fext)
    }
}

/// Generate the wrapper and module files for `graph`.
///
/// Declaration-level problems are reported in [`Output::diagnostics`] and
/// only skip the offending declaration; an `Err` means the run as a whole
/// produced nothing usable.
pub fn generate(graph: DeclGraph, config: &GenConfig, typemaps: &dyn TypemapEngine) -> Result<Output> {
    let mut generator = Generator::new(graph, config, typemaps);
    generator.run()?;
    Ok(generator.finish())
}

/// Traversal state of one run.
pub struct Generator<'a> {
    pub(crate) graph: DeclGraph,
    pub(crate) config: &'a GenConfig,
    pub(crate) typemaps: &'a dyn TypemapEngine,
    pub(crate) cplusplus: bool,
    pub(crate) sections: Sections,
    pub(crate) registry: SymbolRegistry,
    pub(crate) attrs: AttrTable,
    /// Placeholder Fortran types declared for unknown C types, by mangled type.
    pub(crate) opaque: FxHashMap<String, String>,
    pub(crate) fragments: Fragments,
    /// Module-level generic interfaces.
    pub(crate) overloads: Overloads,
    pub(crate) diagnostics: Diagnostics,
    /// The class whose members are being wrapped.
    pub(crate) class: Option<ClassContext>,
    /// Enumerator names of the native enum being emitted.
    pub(crate) native_enum: Option<Vec<String>>,
}

impl<'a> Generator<'a> {
    pub fn new(graph: DeclGraph, config: &'a GenConfig, typemaps: &'a dyn TypemapEngine) -> Self {
        let cplusplus = graph.module().cplusplus;
        Self {
            graph,
            config,
            typemaps,
            cplusplus,
            sections: Sections::default(),
            registry: SymbolRegistry::new(),
            attrs: AttrTable::default(),
            opaque: FxHashMap::default(),
            fragments: Fragments::new(),
            overloads: Overloads::new(),
            diagnostics: Diagnostics::new(),
            class: None,
            native_enum: None,
        }
    }

    fn run(&mut self) -> Result<()> {
        let module_name = self.graph.module().name.clone();
        let span = tracing::info_span!("generate", module = %module_name);
        let _enter = span.enter();

        self.sections
            .runtime
            .push_str(&base_runtime(self.config.cppcast));
        self.module_directive();

        let inserts = self.graph.module().inserts.clone();
        for (section, code) in inserts {
            let buffer = self.sections.get_mut(Section::from(section));
            buffer.push_str(&code);
            if !code.ends_with('\n') {
                buffer.push('\n');
            }
        }

        let roots = self.graph.roots().to_vec();
        for id in roots {
            self.emit_decl(id)?;
        }
        tracing::info!(
            declarations = self.graph.len(),
            diagnostics = self.diagnostics.len(),
            "generation finished"
        );
        Ok(())
    }

    fn finish(self) -> Output {
        let mut overloads = String::new();
        self.overloads.write_module(&mut overloads);
        Output {
            module_name: self.graph.module().name.clone(),
            cplusplus: self.cplusplus,
            fext: self.config.fext.clone(),
            wrapper: self.sections.write_wrapper(self.cplusplus),
            module: self.sections.write_module(&overloads),
            diagnostics: self.diagnostics,
        }
    }

    /// Open the Fortran module and reserve its name.
    fn module_directive(&mut self) {
        let module = self.graph.module().clone();
        let lower = module.name.to_lowercase();
        if let Err(err) = self.registry.register(Scope::Module, &lower, None, &module.name) {
            if let Some(diagnostic) = Severity::Silent.diagnose(&err, &module.name, "module") {
                self.diagnostics.push(diagnostic);
            }
        }
        write_docstring(&mut self.sections.fuse, module.docstring.as_deref());
        self.sections.fuse.push_str(&format!(
            "module {}\n use, intrinsic :: ISO_C_BINDING\n",
            lower
        ));
        for import in &module.imports {
            self.sections.fuse.push_str(&format!(" use {}\n", import));
        }
    }

    /// Wrap one declaration and, through its handler, its children.
    pub(crate) fn emit_decl(&mut self, id: DeclId) -> Result<Outcome> {
        let decl = self.graph.get(id).clone();
        if decl.features.ignore {
            tracing::trace!(name = %decl.name, "ignored");
            return Ok(Outcome::NoWrap);
        }
        if decl.access != Access::Public {
            tracing::trace!(name = %decl.name, access = ?decl.access, "not public");
            return Ok(Outcome::NoWrap);
        }
        tracing::debug!(kind = decl.kind.name(), name = %decl.name, "wrapping declaration");

        let outcome = match &decl.kind {
            DeclKind::Function(function) => match function.role {
                FunctionRole::Free => self.global_function(id, &decl),
                FunctionRole::Member => self.member_function(id, &decl, false)?,
                FunctionRole::StaticMember => self.member_function(id, &decl, true)?,
                FunctionRole::Constructor => self.constructor(id, &decl)?,
                FunctionRole::Destructor => self.destructor(id, &decl)?,
            },
            DeclKind::Variable(variable) => match variable.role {
                VariableRole::Global => self.global_variable(id, &decl),
                VariableRole::Member => self.member_variable(id, &decl)?,
                VariableRole::StaticMember => self.static_member_variable(id, &decl),
            },
            DeclKind::Class(_) => self.class_handler(id, &decl)?,
            DeclKind::Enum(_) => self.enum_handler(id, &decl)?,
            DeclKind::EnumMember { .. } => self.enum_member(id, &decl),
            DeclKind::Constant { .. } => self.constant(id, &decl),
            DeclKind::ClassForward => self.class_forward(&decl),
            DeclKind::EnumForward => self.enum_forward(&decl),
        };
        if outcome == Outcome::NoWrap {
            tracing::debug!(name = %decl.name, "declaration not wrapped");
        }
        Ok(outcome)
    }

    /// Claim a Fortran name derived from the symbol of `decl`, numbering it
    /// when the name is taken.
    pub(crate) fn make_unique_symname(&mut self, id: DeclId, decl: &Decl) -> Option<String> {
        let raw = symbol_of(decl);
        match self
            .registry
            .unique_symbol(Scope::Module, &raw, Some(id), &decl.name)
        {
            Ok((name, renamed)) => {
                if renamed {
                    self.warn(
                        DiagnosticCode::NameConflict,
                        format!(
                            "Renaming duplicate {} '{}' (Fortran name '{}') to '{}'",
                            decl.kind.name(),
                            raw,
                            raw.to_lowercase(),
                            name
                        ),
                        &decl.location,
                    );
                }
                Some(name)
            }
            Err(err) => {
                if let Some(diagnostic) = Severity::Warn.diagnose(&err, &raw, decl.kind.name()) {
                    self.diagnostics
                        .push(diagnostic.with_location(decl.location.clone()));
                }
                None
            }
        }
    }

    pub(crate) fn warn(&mut self, code: DiagnosticCode, message: String, location: &SourceLocation) {
        self.diagnostics
            .push(Diagnostic::warning(code, message).with_location(location.clone()));
    }

    pub(crate) fn error(&mut self, code: DiagnosticCode, message: String, location: &SourceLocation) {
        self.diagnostics
            .push(Diagnostic::error(code, message).with_location(location.clone()));
    }
}
