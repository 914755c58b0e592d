//! Free functions, methods, constructors and destructors.

use crate::bridge::symbol_of;
use crate::class::Owner;
use crate::error::{GenError, Result};
use crate::ident::{mangle, proxy_name};
use crate::generator::Generator;
use crate::pipeline::{assign_result, call_args, Operation, Outcome};
use fwrap_decl::{Decl, DeclId, Param, TypeSig};

/// Proxy body of a destructor: only an owning handle destroys its object,
/// and the handle is cleared either way.
const RELEASE_SHADOW: &str = "if (btest(farg1%cmemflags, swig_cmem_own_bit)) then\n  $action\nendif\nfarg1%cptr = C_NULL_PTR\nfarg1%cmemflags = 0\n";

/// Unqualified C++ name of a member.
pub(crate) fn member_name(decl: &Decl) -> &str {
    decl.name.rsplit("::").next().unwrap_or(&decl.name)
}

pub(crate) fn outcome(wrapped: bool) -> Outcome {
    if wrapped {
        Outcome::Wrapped
    } else {
        Outcome::NoWrap
    }
}

impl Generator<'_> {
    fn reject_bindc_member(&self, owner: &Owner, decl: &Decl) -> Result<()> {
        if owner.bindc {
            return Err(GenError::BindCMethod {
                name: owner.symname.clone(),
                member: symbol_of(decl),
                location: decl.location.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn global_function(&mut self, id: DeclId, decl: &Decl) -> Outcome {
        let params = decl.params().to_vec();
        let mut op = Operation::new(id, decl, symbol_of(decl), decl.ty.clone(), params);
        let call = format!("{}({})", decl.name, call_args(&op.params));
        op.action = assign_result(&op.return_type, &call);
        outcome(self.wrap_function(&mut op).is_some())
    }

    pub(crate) fn member_function(&mut self, id: DeclId, decl: &Decl, is_static: bool) -> Result<Outcome> {
        let Some(owner) = self.owner() else {
            return Ok(Outcome::NoWrap);
        };
        self.reject_bindc_member(&owner, decl)?;

        let sym = symbol_of(decl);
        let mut params = Vec::with_capacity(decl.params().len() + 1);
        if !is_static {
            params.push(Param::new("self", TypeSig::named(&owner.name).ptr()));
        }
        params.extend(decl.params().iter().cloned());

        let mut op = Operation::new(
            id,
            decl,
            format!("{}_{}", owner.symname, sym),
            decl.ty.clone(),
            params,
        );
        op.private_fname = Some(proxy_name(
            op.nspace.as_deref(),
            Some(&owner.fortran_name),
            &sym,
        ));
        op.fortran_name = Some(mangle(&sym));
        op.member = true;
        op.nopass = is_static;

        if let Some(attrs) = self.attrs.get(id) {
            op.rename_self = attrs.rename_self;
            for &(index, tm_name) in &attrs.rename_params {
                if let Some(param) = op.params.get_mut(index + usize::from(!is_static)) {
                    param.tm_name = Some(tm_name.to_string());
                }
            }
        }

        let call = if is_static {
            format!("{}::{}({})", owner.name, member_name(decl), call_args(&op.params))
        } else {
            format!(
                "(arg1)->{}({})",
                member_name(decl),
                call_args(&op.params[1..])
            )
        };
        op.action = assign_result(&op.return_type, &call);
        Ok(outcome(self.wrap_function(&mut op).is_some()))
    }

    pub(crate) fn constructor(&mut self, id: DeclId, decl: &Decl) -> Result<Outcome> {
        let Some(owner) = self.owner() else {
            return Ok(Outcome::NoWrap);
        };
        self.reject_bindc_member(&owner, decl)?;

        let class_ptr = TypeSig::named(&owner.name).ptr();
        let mut op = Operation::new(
            id,
            decl,
            format!("new_{}", owner.symname),
            class_ptr,
            decl.params().to_vec(),
        );
        op.private_fname = Some(proxy_name(
            op.nspace.as_deref(),
            Some("create"),
            &owner.fortran_name,
        ));
        op.result_name = Some("self".to_string());
        op.private = true;
        op.owner = true;
        op.action = if self.cplusplus {
            format!(
                "result = ({} *)new {}({});",
                owner.name,
                owner.name,
                call_args(&op.params)
            )
        } else {
            format!(
                "result = ({} *)calloc(1, sizeof({}));",
                owner.name, owner.name
            )
        };

        let Some(names) = self.wrap_function(&mut op) else {
            return Ok(Outcome::NoWrap);
        };
        if let (Some(class), Some(fname)) = (self.class.as_mut(), names.fname) {
            class.constructors.push(fname);
        }
        Ok(Outcome::Wrapped)
    }

    pub(crate) fn destructor(&mut self, id: DeclId, decl: &Decl) -> Result<Outcome> {
        let Some(owner) = self.owner() else {
            return Ok(Outcome::NoWrap);
        };
        self.reject_bindc_member(&owner, decl)?;

        let self_param = Param::new("self", TypeSig::named(&owner.name).ptr());
        let mut op = Operation::new(
            id,
            decl,
            format!("delete_{}", owner.symname),
            TypeSig::Void,
            vec![self_param],
        );
        op.fortran_name = Some("release".to_string());
        op.member = true;
        op.private_fname = Some(proxy_name(
            op.nspace.as_deref(),
            Some("release"),
            &owner.fortran_name,
        ));
        op.rename_self = Some("DESTRUCTOR_SELF");
        op.shadow = Some(RELEASE_SHADOW.to_string());
        op.action = if self.cplusplus {
            "delete arg1;".to_string()
        } else {
            "free((char *) arg1);".to_string()
        };
        Ok(outcome(self.wrap_function(&mut op).is_some()))
    }
}
