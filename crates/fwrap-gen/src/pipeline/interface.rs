//! `bind(C)` interface stage.

use super::{Names, Operation};
use crate::bridge::make_import_string;
use crate::generator::Generator;
use crate::registry::Severity;
use crate::sections::print_wrapped_list;
use crate::typemap::TypemapMethod;
use indexmap::IndexSet;

impl Generator<'_> {
    /// Declare the C routine of `op` to Fortran. In direct-binding mode
    /// this is the user-facing routine and uses the `bindc` typemaps.
    pub(super) fn interface(&mut self, op: &Operation, names: &Names, cparams: &[usize]) -> Option<String> {
        // A directly bound function has no proxy to fall back on.
        let (method, severity) = if op.features.bindc {
            (TypemapMethod::BindC, Severity::Fatal)
        } else {
            (TypemapMethod::ImType, Severity::Warn)
        };
        let context = op.symname.as_str();
        let ret = self.require_typemap_as(
            severity,
            method,
            &op.return_type,
            None,
            "fresult",
            context,
            &op.location,
        )?;
        let return_imtype = ret.code.clone();
        let is_subroutine = return_imtype.is_empty();
        let kind = if is_subroutine { "subroutine" } else { "function" };

        let mut imports: IndexSet<String> = IndexSet::new();
        imports.extend(make_import_string(&return_imtype));

        let mut locals = String::new();
        let mut args = Vec::with_capacity(cparams.len());
        for &index in cparams {
            let param = &op.params[index];
            let tm = self.require_typemap_as(
                severity,
                method,
                &param.ty,
                param.tm_name.as_deref(),
                &param.imname,
                context,
                &op.location,
            )?;
            if self.check_dims(&param.ty, &tm, &op.location) {
                return None;
            }
            let imtype = tm.code_for(Some("in"));
            imports.extend(make_import_string(imtype));
            locals.push_str(&format!("   {} :: {}\n", imtype, param.imname));
            args.push(param.imname.as_str());
        }
        if !is_subroutine {
            locals.push_str(&format!("   {} :: fresult\n", return_imtype));
        }

        let mut out = format!("{} {}(", kind, names.imname);
        let column = out.len();
        print_wrapped_list(&mut out, &args, column);
        out.push_str(&format!(") &\n    bind(C, name=\"{}\")", names.wname));
        if !is_subroutine {
            out.push_str(" &\n     result(fresult)");
        }
        out.push_str("\n   use, intrinsic :: ISO_C_BINDING\n");
        for name in &imports {
            out.push_str(&format!("   import :: {}\n", name));
        }
        out.push_str(&locals);
        out.push_str(&format!("  end {}\n", kind));
        Some(out)
    }
}
