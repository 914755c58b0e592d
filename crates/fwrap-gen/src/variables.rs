//! Variables, exposed through getter and setter procedures.

use crate::bridge::symbol_of;
use crate::class::Owner;
use crate::error::{GenError, Result};
use crate::functions::{member_name, outcome};
use crate::generator::Generator;
use crate::ident::mangle;
use crate::pipeline::{assign_result, Accessor, Operation, Outcome};
use crate::typemap::TypemapMethod;
use fwrap_common::DiagnosticCode;
use fwrap_decl::{Decl, DeclId, DeclKind, Param, TypeSig};

/// Where a variable lives.
enum Storage {
    Global,
    Member(Owner),
    Static(Owner),
}

impl Generator<'_> {
    pub(crate) fn global_variable(&mut self, id: DeclId, decl: &Decl) -> Outcome {
        if decl.features.fortran_const == Some(true) {
            return self.constant_wrapper(id, decl, &decl.ty, Some(decl.name.clone()));
        }
        if decl.features.bindc {
            self.error(
                DiagnosticCode::NativeUnimplemented,
                format!(
                    "Can't wrap '{}': bind(C) support for global variables is not yet implemented",
                    symbol_of(decl)
                ),
                &decl.location,
            );
            return Outcome::NoWrap;
        }
        self.wrap_variable(id, decl, Storage::Global)
    }

    pub(crate) fn member_variable(&mut self, id: DeclId, decl: &Decl) -> Result<Outcome> {
        let Some(owner) = self.owner() else {
            return Ok(Outcome::NoWrap);
        };
        if !owner.bindc {
            return Ok(self.wrap_variable(id, decl, Storage::Member(owner)));
        }

        let component = mangle(&symbol_of(decl));
        let Some(tm) = self.typemap(
            TypemapMethod::BindC,
            &decl.ty,
            Some(member_name(decl)),
            &component,
        ) else {
            return Err(GenError::BindCMember {
                name: owner.symname,
                member: component,
                ty: decl.ty.to_string(),
                location: decl.location.clone(),
            });
        };
        if self.check_dims(&decl.ty, &tm, &decl.location) {
            return Ok(Outcome::NoWrap);
        }
        if let Some(class) = self.class.as_mut() {
            class
                .body
                .push_str(&format!("  {}, public :: {}\n", tm.code, component));
        }
        Ok(Outcome::Wrapped)
    }

    pub(crate) fn static_member_variable(&mut self, id: DeclId, decl: &Decl) -> Outcome {
        let Some(owner) = self.owner() else {
            return Outcome::NoWrap;
        };
        if owner.bindc {
            self.warn(
                DiagnosticCode::NativeUnimplemented,
                format!(
                    "Static member '{}' of bind(C) struct '{}' is not wrapped",
                    symbol_of(decl),
                    owner.symname
                ),
                &decl.location,
            );
            return Outcome::NoWrap;
        }
        self.wrap_variable(id, decl, Storage::Static(owner))
    }

    /// Class instances are returned by reference so the getter does not
    /// copy them.
    fn is_class_value(&self, ty: &TypeSig) -> bool {
        match self.graph.resolve(ty).strip_const() {
            TypeSig::Named(name) => self.graph.find_class(name).is_some(),
            _ => false,
        }
    }

    fn wrap_variable(&mut self, id: DeclId, decl: &Decl, storage: Storage) -> Outcome {
        let sym = symbol_of(decl);
        let cname = member_name(decl);
        let (var, prefix, target, self_param) = match &storage {
            Storage::Global => (sym.clone(), sym.clone(), decl.name.clone(), None),
            Storage::Member(owner) => (
                mangle(&sym),
                format!("{}_{}", owner.symname, sym),
                format!("(arg1)->{}", cname),
                Some(Param::new("self", TypeSig::named(&owner.name).ptr())),
            ),
            Storage::Static(owner) => (
                sym.clone(),
                format!("{}_{}", owner.symname, sym),
                format!("{}::{}", owner.name, cname),
                None,
            ),
        };
        let member = !matches!(storage, Storage::Global);
        let nopass = matches!(storage, Storage::Static(_));
        let by_reference = self.is_class_value(&decl.ty);

        let get_type = if by_reference {
            decl.ty.clone().ptr()
        } else {
            decl.ty.clone()
        };
        let get_action = if by_reference {
            format!("result = ({}) &({});", get_type.ltype().render(""), target)
        } else {
            assign_result(&get_type, &format!("({})", target))
        };
        let mut getter = Operation::new(
            id,
            decl,
            format!("{}_get", prefix),
            get_type.clone(),
            self_param.iter().cloned().collect(),
        );
        getter.variable = Some((var.clone(), Accessor::Get));
        getter.member = member;
        getter.nopass = nopass;
        getter.action = get_action;
        let wrapped = self.wrap_function(&mut getter).is_some();

        let immutable = matches!(&decl.kind, DeclKind::Variable(v) if v.immutable);
        if immutable || matches!(decl.ty, TypeSig::Const(_)) || decl.ty.is_array() {
            return outcome(wrapped);
        }

        let mut params: Vec<Param> = self_param.into_iter().collect();
        params.push(Param::new(cname, get_type));
        let value = if by_reference {
            format!("*arg{}", params.len())
        } else {
            format!("arg{}", params.len())
        };
        let set_action = match storage {
            Storage::Member(_) => format!("if (arg1) {} = {};", target, value),
            _ => format!("{} = {};", target, value),
        };
        let mut setter = Operation::new(id, decl, format!("{}_set", prefix), TypeSig::Void, params);
        setter.variable = Some((var, Accessor::Set));
        setter.member = member;
        setter.nopass = nopass;
        setter.action = set_action;
        let set = self.wrap_function(&mut setter).is_some();
        outcome(wrapped || set)
    }
}
