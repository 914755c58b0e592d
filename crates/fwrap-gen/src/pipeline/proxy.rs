//! Fortran proxy stage.

use super::{push_lines, Names, Operation};
use crate::generator::Generator;
use crate::sections::{print_wrapped_list, write_docstring};
use crate::typemap::TypemapMethod;
use fwrap_common::{Diagnostic, DiagnosticCode};

impl Generator<'_> {
    /// Generate the Fortran procedure users call. It converts its native
    /// arguments with the `fin` typemaps, calls the interface routine and
    /// converts the result back with `fout`.
    pub(super) fn proxy(&mut self, op: &mut Operation, names: &Names, cparams: &[usize]) -> Option<String> {
        let fname = names.fname.clone()?;
        let context = op.symname.clone();
        let location = op.location.clone();

        let ret_ftype = self.require_typemap(
            TypemapMethod::FType,
            &op.return_type,
            None,
            "fresult",
            &context,
            &location,
        )?;
        if self.check_dims(&op.return_type, &ret_ftype, &location) {
            return None;
        }
        let ret_imtype = self.require_typemap(
            TypemapMethod::ImType,
            &op.return_type,
            None,
            "fresult",
            &context,
            &location,
        )?;

        let mut locals = String::new();
        let call_prefix = if ret_imtype.code.is_empty() {
            format!("call {}(", names.imname)
        } else {
            locals.push_str(&format!("  {} :: fresult\n", ret_imtype.code));
            format!("fresult = {}(", names.imname)
        };

        let mut func_to_subroutine = !ret_imtype.code.is_empty() && op.features.subroutine;
        if func_to_subroutine && ret_ftype.flag("nofortransubroutine") {
            self.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::NoSubroutine,
                    format!(
                        "The 'ftype' of '{}' does not allow it to be converted to a subroutine",
                        context
                    ),
                )
                .with_location(location.clone()),
            );
            func_to_subroutine = false;
        }
        let is_subroutine = ret_ftype.code.is_empty() || func_to_subroutine;
        let kind = if is_subroutine { "subroutine" } else { "function" };
        let result_name = op
            .result_name
            .clone()
            .unwrap_or_else(|| "swig_result".to_string());

        let mut decls = String::new();
        if !is_subroutine {
            decls.push_str(&format!("  {} :: {}\n", ret_ftype.code, result_name));
        }

        self.assign_friendly_names(op, cparams);
        let mut fargs = Vec::with_capacity(cparams.len() + 1);
        let mut call_args = Vec::with_capacity(cparams.len());
        let mut conversions = String::new();
        let mut writeback = String::new();
        for &index in cparams {
            let param = op.params[index].clone();
            let friendly = param.fname.clone().unwrap_or_else(|| param.imname.clone());
            let tm_name = param.tm_name.as_deref();
            let require = |gen: &mut Self, method| {
                gen.require_typemap(method, &param.ty, tm_name, &param.imname, &context, &location)
            };

            let imtype = require(self, TypemapMethod::ImType)?;
            locals.push_str(&format!("  {} :: {}\n", imtype.code, param.imname));

            let ftype = require(self, TypemapMethod::FType)?;
            if self.check_dims(&param.ty, &ftype, &location) {
                return None;
            }
            decls.push_str(&format!("  {} :: {}\n", ftype.code_for(Some("in")), friendly));

            let fin = require(self, TypemapMethod::FIn)?;
            push_lines(&mut conversions, &fin.code.replace("$input", &friendly), "  ");
            if let Some(tm) = self.typemap(TypemapMethod::FInDecl, &param.ty, tm_name, &param.imname) {
                push_lines(&mut decls, &tm.code, "  ");
            }
            if let Some(tm) = self.typemap(TypemapMethod::FArgOut, &param.ty, tm_name, &param.imname) {
                let text = tm
                    .code
                    .replace("$result", &result_name)
                    .replace("$input", &friendly);
                push_lines(&mut writeback, &text, "  ");
            }
            fargs.push(friendly);
            call_args.push(param.imname);
        }

        if func_to_subroutine {
            decls.push_str(&format!(
                "  {}, intent(out), optional :: {}\n",
                ret_ftype.code, result_name
            ));
            fargs.push(result_name.clone());
        }

        let fout = self.require_typemap(
            TypemapMethod::FOut,
            &op.return_type,
            None,
            "fresult",
            &context,
            &location,
        )?;
        let mut fout_code = fout
            .code
            .replace("$result", &result_name)
            .replace("$owner", if op.owner { ".true." } else { ".false." });
        if func_to_subroutine && !fout_code.trim().is_empty() {
            let mut guarded = format!("if (present({})) then\n", result_name);
            push_lines(&mut guarded, &fout_code, "  ");
            guarded.push_str("endif");
            fout_code = guarded;
        }
        if let Some(tm) = self.typemap(TypemapMethod::FOutDecl, &op.return_type, None, "fresult") {
            push_lines(&mut decls, &tm.code, "  ");
        }

        let mut call = call_prefix;
        let column = call.len() + 2;
        print_wrapped_list(&mut call, &call_args, column);
        call.push(')');
        let action = match &op.shadow {
            Some(shadow) => shadow.replace("$action", &call),
            None => call,
        };

        let mut out = String::new();
        write_docstring(&mut out, op.features.docstring.as_deref());
        let mut def = format!("{} {}(", kind, fname);
        let column = def.len();
        print_wrapped_list(&mut def, &fargs, column);
        def.push(')');
        if !is_subroutine {
            def.push_str(&format!(" &\n     result({})", result_name));
        }
        out.push_str(&def);
        out.push_str("\n  use, intrinsic :: ISO_C_BINDING\n");
        out.push_str(&decls);
        out.push_str(&locals);
        out.push('\n');
        if let Some(prepend) = &op.features.prepend {
            push_lines(&mut out, prepend, "  ");
        }
        out.push_str(&conversions);
        push_lines(&mut out, &action, "  ");
        push_lines(&mut out, &fout_code, "  ");
        out.push_str(&writeback);
        if let Some(append) = &op.features.append {
            push_lines(&mut out, append, "  ");
        }
        out.push_str(&format!("end {}\n\n", kind));
        Some(out)
    }
}
