//! The function wrapping pipeline.
//!
//! Every callable the generator exposes, whether a free function, a method,
//! a constructor or a variable accessor, is described by an [`Operation`]
//! and passed through the same stages:
//!
//! 1. a C wrapper with C linkage that marshals arguments and calls the
//!    original (`cwrap`),
//! 2. a `bind(C)` interface declaration for that wrapper (`interface`),
//! 3. a Fortran proxy procedure that converts native Fortran arguments for
//!    the interface call (`proxy`).
//!
//! With the `bindc` feature the C function is bound directly and only the
//! interface stage runs. Stage output is collected locally and written to
//! the output sections only once every stage succeeded, so an operation
//! that cannot be wrapped leaves no trace besides its diagnostics.

mod cwrap;
mod interface;
mod names;
mod params;
mod proxy;

pub(crate) use names::Names;

use crate::attrs::OperationNames;
use crate::generator::Generator;
use fwrap_common::SourceLocation;
use fwrap_decl::{Decl, DeclId, Features, Param, TypeSig};

/// Result of handling one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Wrapped,
    NoWrap,
}

/// Which variable accessor an operation implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Accessor {
    Get,
    Set,
}

impl Accessor {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Accessor::Get => "get",
            Accessor::Set => "set",
        }
    }
}

/// One parameter of an operation.
#[derive(Debug, Clone)]
pub(crate) struct OpParam {
    /// Declared name, the source of the proxy argument name.
    pub name: Option<String>,
    /// Name used when matching name-specific typemaps.
    pub tm_name: Option<String>,
    pub ty: TypeSig,
    /// Local variable in the C wrapper (`argN`).
    pub lname: String,
    /// Argument of the C wrapper and of the interface routine (`fargN`).
    pub imname: String,
    /// Argument name in the proxy routine.
    pub fname: Option<String>,
}

impl OpParam {
    fn new(index: usize, param: Param) -> Self {
        let n = index + 1;
        Self {
            tm_name: param.name.clone(),
            name: param.name,
            ty: param.ty,
            lname: format!("arg{}", n),
            imname: format!("farg{}", n),
            fname: None,
        }
    }
}

/// A callable to be wrapped.
#[derive(Debug, Clone)]
pub(crate) struct Operation {
    /// Declaration the operation belongs to.
    pub id: DeclId,
    /// C/C++ name of the declaration.
    pub name: String,
    /// Symbol the generated names derive from, e.g. `Circle_area`.
    pub symname: String,
    pub nspace: Option<String>,
    pub location: SourceLocation,
    pub features: Features,
    pub return_type: TypeSig,
    pub params: Vec<OpParam>,
    pub overload: Option<String>,
    pub is_extern_c: bool,
    /// C statement(s) performing the call and storing `result`.
    pub action: String,
    /// Fixed name of the proxy routine.
    pub private_fname: Option<String>,
    /// Variable name and accessor kind for getters and setters.
    pub variable: Option<(String, Accessor)>,
    /// Public name overriding the symbol name.
    pub fortran_name: Option<String>,
    /// Bound to the enclosing derived type.
    pub member: bool,
    /// Not exported from the module.
    pub private: bool,
    /// Type-bound without a passed-object argument.
    pub nopass: bool,
    /// Typemap name given to the first parameter.
    pub rename_self: Option<&'static str>,
    /// Name of the proxy's function result.
    pub result_name: Option<String>,
    /// Proxy code wrapped around the interface call (`$action`).
    pub shadow: Option<String>,
    /// The caller owns the returned object.
    pub owner: bool,
}

impl Operation {
    pub(crate) fn new(
        id: DeclId,
        decl: &Decl,
        symname: impl Into<String>,
        return_type: TypeSig,
        params: Vec<Param>,
    ) -> Self {
        let function = decl.as_function();
        Self {
            id,
            name: decl.name.clone(),
            symname: symname.into(),
            nspace: decl.nspace.clone(),
            location: decl.location.clone(),
            features: decl.features.clone(),
            return_type,
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, p)| OpParam::new(i, p))
                .collect(),
            overload: function.and_then(|f| f.overload.clone()),
            is_extern_c: function.map_or(false, |f| f.is_extern_c),
            action: String::new(),
            private_fname: None,
            variable: None,
            fortran_name: None,
            member: false,
            private: false,
            nopass: false,
            rename_self: None,
            result_name: None,
            shadow: None,
            owner: decl.features.new_object,
        }
    }

    /// Human-readable declaration string used for `$decl`.
    fn decl_string(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.render("")).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Comma-separated call arguments; references are passed by dereferencing
/// the pointer local that holds them.
pub(crate) fn call_args(params: &[OpParam]) -> String {
    params
        .iter()
        .filter(|p| !p.ty.is_varargs())
        .map(|p| {
            if p.ty.is_reference() {
                format!("*{}", p.lname)
            } else {
                p.lname.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statement storing `expr` into the wrapper's `result` local.
pub(crate) fn assign_result(return_type: &TypeSig, expr: &str) -> String {
    if return_type.is_void() {
        format!("{};", expr)
    } else if return_type.is_reference() {
        format!("result = ({}) &{};", return_type.ltype().render(""), expr)
    } else {
        format!("result = ({}){};", return_type.ltype().render(""), expr)
    }
}

/// Append `text` line by line with `indent` in front of each non-empty line.
pub(crate) fn push_lines(out: &mut String, text: &str, indent: &str) {
    for line in text.trim_end().lines() {
        if !line.trim().is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Text produced by the stages of one operation.
struct Staged {
    wrapper: String,
    interface: String,
    proxy: String,
}

impl Generator<'_> {
    /// Run an operation through the pipeline. Returns its names when it was
    /// wrapped.
    pub(crate) fn wrap_function(&mut self, op: &mut Operation) -> Option<Names> {
        let names = self.allocate_names(op)?;

        if let Some(self_name) = op.rename_self {
            if let Some(first) = op.params.first_mut() {
                first.tm_name = Some(self_name.to_string());
            }
        }
        if let Some(fragments) = op.features.fragment.clone() {
            self.require_fragments(&fragments);
        }

        let staged = if op.features.bindc {
            let cparams = self.bindc_params(op)?;
            Staged {
                wrapper: String::new(),
                interface: self.interface(op, &names, &cparams)?,
                proxy: String::new(),
            }
        } else {
            let (wrapper, cparams) = self.c_wrapper(op, &names)?;
            let interface = self.interface(op, &names, &cparams)?;
            let proxy = self.proxy(op, &names, &cparams)?;
            Staged {
                wrapper,
                interface,
                proxy,
            }
        };

        self.sections.wrapper.push_str(&staged.wrapper);
        self.sections.finterfaces.push_str(&staged.interface);
        self.sections.fsubprograms.push_str(&staged.proxy);
        self.publish(op, &names);

        tracing::trace!(
            symbol = %op.symname,
            wrapper = %names.wname,
            proxy = names.fname.as_deref().unwrap_or(""),
            "wrapped operation"
        );
        self.attrs.entry(op.id).operations.push(OperationNames {
            wrapper: names.wname.clone(),
            interface: names.imname.clone(),
            proxy: names.fname.clone(),
            public: names.fsymname.clone(),
        });
        Some(names)
    }

    /// Expose a wrapped operation: as a type-bound procedure, as part of a
    /// generic interface, or as a public module procedure.
    fn publish(&mut self, op: &Operation, names: &Names) {
        if op.private {
            return;
        }
        let fname = names.fname.as_deref().unwrap_or(&names.imname);
        if op.member {
            let Some(class) = self.class.as_mut() else {
                return;
            };
            class.body.push_str("  procedure");
            if names.generic {
                class.body.push_str(", private");
            }
            if op.nopass {
                class.body.push_str(", nopass");
            }
            class.body.push_str(" :: ");
            match (&names.fsymname, names.generic) {
                (Some(fsymname), true) => {
                    class.methods.add(fsymname, fname);
                    class.body.push_str(fname);
                }
                (Some(fsymname), false) => {
                    class.body.push_str(fsymname);
                    class.body.push_str(" => ");
                    class.body.push_str(fname);
                }
                (None, _) => class.body.push_str(fname),
            }
            class.body.push('\n');
        } else if let Some(fsymname) = &names.fsymname {
            self.overloads.add(fsymname, fname);
        } else {
            self.sections.fdecl.push_str(" public :: ");
            self.sections.fdecl.push_str(fname);
            self.sections.fdecl.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, ty: &str) -> OpParam {
        OpParam::new(0, Param::new(name, TypeSig::parse(ty).expect("type")))
    }

    #[test]
    fn test_call_args_dereference_references() {
        let mut params = vec![param("a", "int"), param("b", "const Foo &"), param("c", "...")];
        params[1].lname = "arg2".to_string();
        assert_eq!(call_args(&params), "arg1, *arg2");
    }

    #[test]
    fn test_assign_result_forms() {
        let void = TypeSig::Void;
        assert_eq!(assign_result(&void, "f(arg1)"), "f(arg1);");
        let double = TypeSig::Double;
        assert_eq!(assign_result(&double, "f()"), "result = (double)f();");
        let cref = TypeSig::parse("const Foo &").expect("type");
        assert_eq!(assign_result(&cref, "get()"), "result = (const Foo *) &get();");
    }

    #[test]
    fn test_push_lines_indents_non_empty_lines() {
        let mut out = String::new();
        push_lines(&mut out, "a;\n\nb;\n", "  ");
        assert_eq!(out, "  a;\n\n  b;\n");
    }
}
