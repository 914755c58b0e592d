//! Enums and constants.
//!
//! An enum whose values are all plain integer literals becomes a native
//! `enum, bind(c)` block with an integer kind named after the enum. Any
//! other enum is an integer kind alias whose members are wrapped like
//! constants: as `parameter`s when their value is a numeric literal or the
//! `const` feature asks for it, otherwise as `protected` variables bound to
//! a C global that holds the value.

use crate::bridge::{is_default_real_literal, is_fortran_intexpr, make_specifier_suffix, symbol_of};
use crate::error::Result;
use crate::generator::Generator;
use crate::ident::{mangle, wrapper_name};
use crate::pipeline::Outcome;
use crate::registry::{Scope, Severity};
use crate::sections::print_wrapped_list;
use crate::typemap::TypemapMethod;
use fwrap_common::DiagnosticCode;
use fwrap_decl::{Decl, DeclId, DeclKind, TypeSig};

/// Interface variable names longer than this start on a continuation line.
const LONG_BINDING_NAME: usize = 60;

/// Whether a literal can be given a kind suffix such as `_C_INT`.
fn is_numeric_literal(value: &str) -> bool {
    is_fortran_intexpr(value) || is_default_real_literal(value)
}

impl Generator<'_> {
    pub(crate) fn enum_handler(&mut self, id: DeclId, decl: &Decl) -> Result<Outcome> {
        let Some(info) = decl.as_enum() else {
            return Ok(Outcome::NoWrap);
        };
        if info.missing {
            return Ok(Outcome::NoWrap);
        }

        let enum_name = if decl.name.is_empty() {
            None
        } else {
            match self.enum_fortran_name(id, decl) {
                Some(name) => Some(name),
                None => return Ok(Outcome::NoWrap),
            }
        };

        if let Some(name) = &enum_name {
            let storage = info
                .storage
                .as_deref()
                .map(|s| format!("{} ", s))
                .unwrap_or_default();
            self.sections
                .fdecl
                .push_str(&format!(" ! {}{} {}\n", storage, info.enum_key, name));
        }

        let children = self.graph.children(id).to_vec();
        let native = !children.is_empty() && self.is_native_enum(decl, &children);
        let block_start = self.sections.fdecl.len();
        if native {
            self.sections.fdecl.push_str(" enum, bind(c)\n");
            self.native_enum = Some(Vec::new());
        }

        for child in children {
            self.emit_decl(child)?;
        }

        let enumerators = self.native_enum.take().filter(|list| !list.is_empty());
        if native && enumerators.is_none() {
            // Every member failed: drop the empty block and fall back to the alias.
            self.sections.fdecl.truncate(block_start);
        }
        if let Some(enumerators) = enumerators {
            let fdecl = &mut self.sections.fdecl;
            fdecl.push_str(" end enum\n");
            if let (Some(name), Some(first)) = (&enum_name, enumerators.first()) {
                fdecl.push_str(&format!(" integer, parameter, public :: {} = kind({})\n", name, first));
            }
            fdecl.push_str(" public :: ");
            print_wrapped_list(fdecl, &enumerators, 11);
            fdecl.push('\n');
            self.attrs.entry(id).declared = true;
        } else if let Some(name) = &enum_name {
            self.sections
                .fdecl
                .push_str(&format!(" integer, parameter, public :: {} = C_INT\n", name));
            self.attrs.entry(id).declared = true;
        }
        Ok(Outcome::Wrapped)
    }

    /// Fortran kind name of a named enum; enums nested in a class are
    /// prefixed with the class symbol.
    fn enum_fortran_name(&mut self, id: DeclId, decl: &Decl) -> Option<String> {
        let sym = symbol_of(decl);
        let name = match (&self.class, self.attrs.fortran_name(id)) {
            (Some(class), _) => mangle(&format!("{}_{}", class.symname, sym)),
            (None, Some(existing)) => return Some(existing.to_string()),
            (None, None) => mangle(&sym),
        };
        if let Err(err) = self
            .registry
            .register(Scope::Module, &name, Some(id), &decl.name)
        {
            if let Some(diagnostic) = Severity::Warn.diagnose(&err, &decl.name, "enum") {
                self.diagnostics
                    .push(diagnostic.with_location(decl.location.clone()));
            }
            return None;
        }
        self.attrs.entry(id).fortran_name = Some(name.clone());
        Some(name)
    }

    /// An enum is emitted natively when forced by the `const` feature, or
    /// when every member is wrapped and initialized (if at all) by a plain
    /// integer literal.
    fn is_native_enum(&self, decl: &Decl, children: &[DeclId]) -> bool {
        match decl.features.fortran_const {
            Some(forced) => forced,
            None => children.iter().all(|&child| {
                let member = self.graph.get(child);
                !member.features.ignore
                    && match &member.kind {
                        DeclKind::EnumMember { enum_value, .. } => {
                            enum_value.as_deref().map_or(true, is_fortran_intexpr)
                        }
                        _ => false,
                    }
            }),
        }
    }

    pub(crate) fn enum_member(&mut self, id: DeclId, decl: &Decl) -> Outcome {
        let DeclKind::EnumMember { enum_value, value } = &decl.kind else {
            return Outcome::NoWrap;
        };
        let ty = match decl.parent() {
            Some(parent) => self.graph.get(parent).ty.clone(),
            None => TypeSig::int(),
        };
        let value = if self.native_enum.is_some() {
            enum_value.clone()
        } else {
            Some(value.clone())
        };
        self.constant_wrapper(id, decl, &ty, value)
    }

    pub(crate) fn constant(&mut self, id: DeclId, decl: &Decl) -> Outcome {
        let DeclKind::Constant { value, raw_value } = &decl.kind else {
            return Outcome::NoWrap;
        };
        let value = raw_value.clone().unwrap_or_else(|| value.clone());
        self.constant_wrapper(id, decl, &decl.ty, Some(value))
    }

    /// Emit a named value: an enumerator inside a native enum, a Fortran
    /// `parameter`, or a `protected` variable bound to a C global.
    pub(crate) fn constant_wrapper(
        &mut self,
        id: DeclId,
        decl: &Decl,
        ty: &TypeSig,
        value: Option<String>,
    ) -> Outcome {
        let mut value = value;
        // A variable has no literal initializer to write out, only its name.
        let mut as_parameter = !matches!(decl.kind, DeclKind::Variable(_))
            && match decl.features.fortran_const {
                Some(forced) => forced,
                None => value.as_deref().is_some_and(is_numeric_literal),
            };
        if let Some(forced) = &decl.features.const_value {
            value = Some(forced.clone());
            as_parameter = true;
        }

        let Some(symname) = self.make_unique_symname(id, decl) else {
            return Outcome::NoWrap;
        };
        let Some(bindc) = self.typemap(TypemapMethod::BindC, ty, Some(&decl.name), &symname) else {
            self.warn(
                DiagnosticCode::TypemapUndefined,
                format!(
                    "The 'bindc' typemap for '{} {}' is not defined, so the corresponding constant cannot be generated",
                    ty, symname
                ),
                &decl.location,
            );
            return Outcome::NoWrap;
        };
        if self.check_dims(ty, &bindc, &decl.location) {
            return Outcome::NoWrap;
        }

        if let Some(enumerators) = self.native_enum.as_mut() {
            enumerators.push(symname.clone());
            let line = match &value {
                Some(v) => format!("  enumerator :: {} = {}\n", symname, v),
                None => format!("  enumerator :: {}\n", symname),
            };
            self.sections.fdecl.push_str(&line);
            return Outcome::Wrapped;
        }

        if as_parameter {
            let Some(mut literal) = value else {
                self.error(
                    DiagnosticCode::InvalidDeclaration,
                    format!("constant '{}' has no value to write as a parameter", symname),
                    &decl.location,
                );
                return Outcome::NoWrap;
            };
            if let Some(suffix) = make_specifier_suffix(&bindc.code) {
                if is_numeric_literal(&literal) {
                    if is_default_real_literal(&literal) && suffix != "C_FLOAT" {
                        self.warn(
                            DiagnosticCode::KindSuffix,
                            format!(
                                "Literal '{}' of '{}' is given the kind suffix _{} to keep its precision",
                                literal, symname, suffix
                            ),
                            &decl.location,
                        );
                    }
                    literal = format!("{}_{}", literal, suffix);
                }
            }
            self.sections.fdecl.push_str(&format!(
                " {}, parameter, public :: {} = {}\n",
                bindc.code, symname, literal
            ));
            return Outcome::Wrapped;
        }

        self.bound_constant(decl, ty, &symname, &bindc.code, value.as_deref().unwrap_or(&decl.name))
    }

    /// A constant whose value only C can compute: a `const` C global
    /// initialized from the value and bound as a `protected` variable.
    fn bound_constant(
        &mut self,
        decl: &Decl,
        ty: &TypeSig,
        symname: &str,
        bindc: &str,
        value: &str,
    ) -> Outcome {
        let wname = wrapper_name(symname);
        let Some(out) = self.require_typemap(
            TypemapMethod::Out,
            ty,
            Some(&decl.name),
            value,
            symname,
            &decl.location,
        ) else {
            return Outcome::NoWrap;
        };
        let statements = out.code.matches(';').count();
        if statements != 1 {
            self.error(
                DiagnosticCode::NativeUnimplemented,
                format!(
                    "The 'out' typemap for '{}' must have only a single statement to wrap as a constant, but it has {}.",
                    symname, statements
                ),
                &decl.location,
            );
            return Outcome::NoWrap;
        }
        let Some(ctype) = self.require_typemap(
            TypemapMethod::CType,
            ty,
            Some(&decl.name),
            value,
            symname,
            &decl.location,
        ) else {
            return Outcome::NoWrap;
        };
        let declaration = match TypeSig::parse(&ctype.code) {
            Ok(cty) => cty.constant().render(&wname),
            Err(err) => {
                self.error(
                    DiagnosticCode::TypemapUndefined,
                    format!("Failed to parse 'ctype' typemap of constant '{}': {}", symname, err),
                    &decl.location,
                );
                return Outcome::NoWrap;
            }
        };

        let code = out.code.replace("$result", &declaration);
        self.sections
            .wrapper
            .push_str(&format!("SWIGEXPORT SWIGEXTERN {}\n\n", code.trim()));
        let continuation = if wname.len() > LONG_BINDING_NAME { "&\n    " } else { "" };
        self.sections.fdecl.push_str(&format!(
            " {}, protected, public, &\n   bind(C, name=\"{}\") :: {}{}\n",
            bindc, wname, continuation, symname
        ));
        Outcome::Wrapped
    }

    /// Reserve the Fortran name of an enum at its forward declaration.
    pub(crate) fn enum_forward(&mut self, decl: &Decl) -> Outcome {
        if decl.name.is_empty() {
            return Outcome::NoWrap;
        }
        let Some(def) = self.graph.find_enum(&decl.name) else {
            return Outcome::NoWrap;
        };
        if self.attrs.fortran_name(def).is_some() || self.class.is_some() {
            return Outcome::NoWrap;
        }
        let definition = self.graph.get(def).clone();
        if definition.features.ignore {
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
