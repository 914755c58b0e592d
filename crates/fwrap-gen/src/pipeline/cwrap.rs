//! C wrapper stage.

use super::{push_lines, Names, Operation};
use crate::generator::Generator;
use crate::typemap::TypemapMethod;
use fwrap_common::{Diagnostic, DiagnosticCode};
use fwrap_decl::TypeSig;

impl Generator<'_> {
    /// Generate the C-linkage wrapper of `op`. Returns the wrapper text and
    /// the indices of the parameters that cross the boundary.
    pub(super) fn c_wrapper(&mut self, op: &Operation, names: &Names) -> Option<(String, Vec<usize>)> {
        let context = op.symname.as_str();
        let ret_tm = self.require_typemap(
            TypemapMethod::CType,
            &op.return_type,
            None,
            "result",
            context,
            &op.location,
        )?;
        let c_return = self.parse_ctype(&ret_tm.code, "return value", op)?;
        let null_value = ret_tm.kwarg("null").unwrap_or("0").to_string();
        let is_csubroutine = c_return.is_void();

        let mut out = String::new();
        let mut locals = String::new();
        let return_decl = if c_return.needs_typedef() {
            let alias = format!("{}_swigrtype", op.symname);
            out.push_str(&format!("typedef {};\n", c_return.render(&alias)));
            locals.push_str(&format!("  {} fresult;\n", alias));
            alias
        } else {
            if !is_csubroutine {
                locals.push_str(&format!("  {};\n", c_return.render("fresult")));
            }
            c_return.render("")
        };
        out.push_str(&format!("SWIGEXPORT {} {}(", return_decl, names.wname));

        for param in op.params.iter().filter(|p| !p.ty.is_varargs()) {
            let ltype = param.ty.ltype();
            let init = if ltype.is_pointer() { " = 0" } else { "" };
            locals.push_str(&format!("  {}{};\n", ltype.render(&param.lname), init));
        }
        if !op.return_type.is_void() {
            locals.push_str(&format!("  {};\n", op.return_type.ltype().render("result")));
        }

        let mut cparams = Vec::new();
        let mut code = String::new();
        let mut cleanup = String::new();
        let mut outarg = String::new();
        for (index, param) in op.params.iter().enumerate() {
            if param.ty.is_varargs() {
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::NativeUnimplemented,
                        format!(
                            "Variable arguments (in function '{}') are not implemented in Fortran.",
                            op.symname
                        ),
                    )
                    .with_location(op.location.clone()),
                );
                continue;
            }
            let tm_name = param.tm_name.as_deref();
            let input = self.require_typemap(
                TypemapMethod::In,
                &param.ty,
                tm_name,
                &param.lname,
                context,
                &op.location,
            )?;
            if input.kwarg("numinputs") == Some("0") {
                continue;
            }
            let ctype = self.require_typemap(
                TypemapMethod::CType,
                &param.ty,
                tm_name,
                &param.lname,
                context,
                &op.location,
            )?;
            let c_param = self.parse_ctype(ctype.code_for(Some("in")), "parameter", op)?;
            if !cparams.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&c_param.render(&param.imname));
            cparams.push(index);

            push_lines(&mut code, &input.code.replace("$input", &param.imname), "");
            if let Some(tm) = self.typemap(TypemapMethod::Check, &param.ty, tm_name, &param.lname) {
                push_lines(&mut code, &tm.code.replace("$input", &param.imname), "");
            }
            if let Some(tm) = self.typemap(TypemapMethod::FreeArg, &param.ty, tm_name, &param.lname) {
                push_lines(&mut cleanup, &tm.code.replace("$input", &param.imname), "");
            }
            if let Some(tm) = self.typemap(TypemapMethod::ArgOut, &param.ty, tm_name, &param.lname) {
                let text = tm
                    .code
                    .replace("$result", "fresult")
                    .replace("$input", &param.imname);
                push_lines(&mut outarg, &text, "");
            }
        }
        out.push_str(") {\n");

        let action = op.features.action.as_deref().unwrap_or(&op.action);
        push_lines(&mut code, action, "");

        match self.typemap(TypemapMethod::Out, &op.return_type, None, "result") {
            Some(tm) => {
                let text = tm
                    .code
                    .replace("$result", "fresult")
                    .replace("$owner", if op.owner { "1" } else { "0" });
                push_lines(&mut code, &text, "");
            }
            None => self.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::TypemapUndefined,
                    format!(
                        "Unable to use return type {} in function {}.",
                        op.return_type, op.symname
                    ),
                )
                .with_location(op.location.clone()),
            ),
        }
        code.push_str(&outarg);
        code.push_str(&cleanup);
        if let Some(tm) = self.typemap(TypemapMethod::Ret, &op.return_type, None, "result") {
            push_lines(&mut code, &tm.code, "");
        }
        if !is_csubroutine {
            code.push_str("return fresult;\n");
        }

        if op.features.contract {
            code = code.replace("SWIG_contract_assert(", "SWIG_contract_assert(return $null, ");
        }
        let code = code
            .replace("$cleanup", cleanup.trim_end())
            .replace("$decl", &op.decl_string())
            .replace("$null", &null_value)
            .replace("$symname", &op.symname);

        out.push_str(&locals);
        out.push('\n');
        push_lines(&mut out, &code, "  ");
        out.push_str("}\n\n");
        Some((out, cparams))
    }

    /// Parse the text of a `ctype` typemap, reporting an unusable one.
    fn parse_ctype(&mut self, text: &str, what: &str, op: &Operation) -> Option<TypeSig> {
        match TypeSig::parse(text) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::TypemapUndefined,
                        format!(
                            "Failed to parse 'ctype' typemap {} of '{}': {}",
                            what, op.symname, err
                        ),
                    )
                    .with_location(op.location.clone()),
                );
                None
            }
        }
    }
}
