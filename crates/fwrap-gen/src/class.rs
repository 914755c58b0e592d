//! Classes and structs.
//!
//! A class becomes a Fortran derived type holding a `SwigClassWrapper`
//! handle, with its methods bound to the type. Constructors are exposed
//! through a generic interface named after the type, the destructor as the
//! `release` procedure and the copy semantics through a generated
//! `assignment(=)`. A struct with the `bindc` feature instead becomes an
//! interoperable `bind(C)` type whose components mirror its data members.

use crate::bridge::symbol_of;
use crate::error::{GenError, Result};
use crate::generator::Generator;
use crate::overload::Overloads;
use crate::pipeline::Outcome;
use crate::sections::write_docstring;
use fwrap_common::DiagnosticCode;
use fwrap_decl::{ClassDecl, Decl, DeclId, DeclKind, Features, FunctionRole, Param, TypeSig};

/// The class whose members are being wrapped.
#[derive(Debug)]
pub(crate) struct ClassContext {
    pub id: DeclId,
    /// Qualified C++ name.
    pub name: String,
    pub symname: String,
    pub fortran_name: String,
    pub bindc: bool,
    /// Text of the derived type definition so far.
    pub body: String,
    /// Type-bound generic groups.
    pub methods: Overloads,
    /// Proxy names of the wrapped constructors, in order.
    pub constructors: Vec<String>,
}

/// What the enclosing class looks like to its members.
pub(crate) struct Owner {
    pub name: String,
    pub symname: String,
    pub fortran_name: String,
    pub bindc: bool,
}

fn has_role(graph: &fwrap_decl::DeclGraph, id: DeclId, role: FunctionRole) -> bool {
    graph
        .children(id)
        .iter()
        .any(|&child| graph.get(child).as_function().map_or(false, |f| f.role == role))
}

impl Generator<'_> {
    pub(crate) fn owner(&self) -> Option<Owner> {
        self.class.as_ref().map(|class| Owner {
            name: class.name.clone(),
            symname: class.symname.clone(),
            fortran_name: class.fortran_name.clone(),
            bindc: class.bindc,
        })
    }

    pub(crate) fn class_handler(&mut self, id: DeclId, decl: &Decl) -> Result<Outcome> {
        let Some(class) = decl.as_class() else {
            return Ok(Outcome::NoWrap);
        };
        if decl.features.only_children {
            return self.class_children_only(id);
        }

        let bindc = decl.features.bindc;
        if bindc && !class.bases.is_empty() {
            return Err(GenError::BindCBase {
                name: decl.name.clone(),
                location: decl.location.clone(),
            });
        }

        let fortran_name = match self.attrs.fortran_name(id) {
            Some(name) => name.to_string(),
            None => {
                let Some(name) = self.make_unique_symname(id, decl) else {
                    return Ok(Outcome::NoWrap);
                };
                self.attrs.entry(id).fortran_name = Some(name.clone());
                name
            }
        };
        let base = self.resolve_base(decl, class);
        tracing::debug!(class = %decl.name, fortran = %fortran_name, bindc, "opening derived type");

        let mut body = format!(" ! {} {}\n", class.keyword.as_str(), decl.name);
        write_docstring(&mut body, decl.features.docstring.as_deref());
        body.push_str(" type");
        if let Some(base) = &base {
            body.push_str(&format!(", extends({})", base));
        } else if bindc {
            body.push_str(", bind(C)");
        }
        body.push_str(&format!(", public :: {}\n", fortran_name));

        let policy = if self.cplusplus {
            Some(self.define_policy(id, decl, class))
        } else {
            None
        };
        if !bindc {
            if base.is_none() {
                self.require_fragments("SwigClassWrapper_f");
                body.push_str("  type(SwigClassWrapper), public :: swigdata\n");
            }
            self.add_assignment(id, decl, policy.as_deref());
            if !decl.features.nodefault {
                self.add_default_members(id, decl, class);
            }
            body.push_str(" contains\n");
        }

        self.class = Some(ClassContext {
            id,
            name: decl.name.clone(),
            symname: symbol_of(decl),
            fortran_name: fortran_name.clone(),
            bindc,
            body,
            methods: Overloads::new(),
            constructors: Vec::new(),
        });

        let mut nested = Vec::new();
        for child in self.graph.children(id).to_vec() {
            if matches!(self.graph.get(child).kind, DeclKind::Class(_)) {
                nested.push(child);
                continue;
            }
            self.emit_decl(child)?;
        }

        let Some(mut context) = self.class.take() else {
            return Ok(Outcome::Wrapped);
        };
        if !bindc {
            context.methods.write_generics(&mut context.body);
        }
        context.body.push_str(&format!(" end type {}\n", fortran_name));
        self.sections.fdecl.push_str(&context.body);

        if !context.constructors.is_empty() {
            let fdecl = &mut self.sections.fdecl;
            fdecl.push_str(&format!(" interface {}\n", fortran_name));
            for constructor in &context.constructors {
                fdecl.push_str(&format!("  module procedure {}\n", constructor));
            }
            fdecl.push_str(" end interface\n");
        }

        for child in nested {
            self.emit_decl(child)?;
        }
        Ok(Outcome::Wrapped)
    }

    /// Wrap the enums, constants and nested classes of a class that is not
    /// itself exposed.
    fn class_children_only(&mut self, id: DeclId) -> Result<Outcome> {
        for child in self.graph.children(id).to_vec() {
            let kind = &self.graph.get(child).kind;
            if matches!(kind, DeclKind::Enum(_) | DeclKind::Constant { .. } | DeclKind::Class(_)) {
                self.emit_decl(child)?;
            }
        }
        Ok(Outcome::Wrapped)
    }

    /// Fortran name of the base the derived type extends. Only the first
    /// wrapped base can be honoured.
    fn resolve_base(&mut self, decl: &Decl, class: &ClassDecl) -> Option<String> {
        let mut chosen = None;
        for base in &class.bases {
            let Some(base_id) = self.graph.find_class(base) else {
                self.warn(
                    DiagnosticCode::InvalidDeclaration,
                    format!("Base class '{}' of '{}' is not known and is ignored", base, decl.name),
                    &decl.location,
                );
                continue;
            };
            let base_decl = self.graph.get(base_id);
            if base_decl.features.ignore {
                continue;
            }
            if chosen.is_none() {
                chosen = Some(match self.attrs.fortran_name(base_id) {
                    Some(name) => name.to_string(),
                    None => symbol_of(base_decl),
                });
            } else {
                self.warn(
                    DiagnosticCode::MultipleInheritance,
                    format!(
                        "Multiple inheritance is not supported in Fortran. Ignoring base class {} for {}",
                        base, decl.name
                    ),
                    &decl.location,
                );
            }
        }
        chosen
    }

    /// Emit the assignment policy macro of a C++ class.
    fn define_policy(&mut self, id: DeclId, decl: &Decl, class: &ClassDecl) -> String {
        let policy = format!("SWIGPOLICY{}", TypeSig::named(&decl.name).mangle());
        let kind = if decl.features.smartptr.is_some() {
            "ASSIGNMENT_SMARTPTR"
        } else if !class.has_default_destructor {
            "ASSIGNMENT_NODESTRUCT"
        } else {
            "ASSIGNMENT_DEFAULT"
        };
        self.sections
            .policies
            .push_str(&format!("#define {} swig::{}\n", policy, kind));
        self.attrs.entry(id).policy = Some(policy.clone());
        policy
    }

    /// Append the `assignment(=)` member that shares or copies handles.
    fn add_assignment(&mut self, id: DeclId, decl: &Decl, policy: Option<&str>) {
        let action = match policy {
            Some(policy) => format!(
                "SWIG_assign<{}, {}>(farg1, *farg2);",
                decl.features.smartptr.as_deref().unwrap_or(&decl.name),
                policy
            ),
            None => "SWIG_assign(farg1, *farg2);".to_string(),
        };
        let features = Features {
            generic: Some("assignment(=)".to_string()),
            action: Some(action),
            fragment: Some("SWIG_assign".to_string()),
            ..Features::default()
        };
        let mut assign = Decl::function(
            format!("{}::operator =", decl.name),
            TypeSig::Void,
            vec![Param::new("other", TypeSig::named(&decl.name).reference())],
        )
        .with_sym_name("op_assign__")
        .with_function_role(FunctionRole::Member)
        .with_location(decl.location.clone())
        .with_features(features);
        assign.nspace = decl.nspace.clone();

        let assign_id = self.graph.add(Some(id), assign);
        let attrs = self.attrs.entry(assign_id);
        attrs.rename_self = Some("ASSIGNMENT_SELF");
        attrs.rename_params.push((0, "ASSIGNMENT_OTHER"));
    }

    /// Append the implicit default constructor and destructor the class
    /// does not declare itself.
    fn add_default_members(&mut self, id: DeclId, decl: &Decl, class: &ClassDecl) {
        let symbol = decl.symbol().to_string();
        if !has_role(&self.graph, id, FunctionRole::Constructor) {
            let mut ctor = Decl::function(decl.name.clone(), TypeSig::Void, Vec::new())
                .with_function_role(FunctionRole::Constructor)
                .with_location(decl.location.clone());
            ctor.nspace = decl.nspace.clone();
            self.graph.add(Some(id), ctor);
        }
        if class.has_default_destructor && !has_role(&self.graph, id, FunctionRole::Destructor) {
            let mut dtor = Decl::function(format!("{}::~{}", decl.name, symbol), TypeSig::Void, Vec::new())
                .with_function_role(FunctionRole::Destructor)
                .with_location(decl.location.clone());
            dtor.nspace = decl.nspace.clone();
            self.graph.add(Some(id), dtor);
        }
    }

    /// Reserve the Fortran name of a class at its forward declaration, so
    /// earlier uses of the type agree with the later definition.
    pub(crate) fn class_forward(&mut self, decl: &Decl) -> Outcome {
        let Some(def) = self.graph.find_class(&decl.name) else {
            return Outcome::NoWrap;
        };
        let definition = self.graph.get(def).clone();
        if self.attrs.fortran_name(def).is_some() || definition.features.ignore {
            return Outcome::NoWrap;
        }
        match self.make_unique_symname(def, &definition) {
            Some(name) => {
                self.attrs.entry(def).fortran_name = Some(name);
                Outcome::Wrapped
            }
            None => Outcome::NoWrap,
        }
    }
}
