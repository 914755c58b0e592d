//! Proxy argument names and direct-binding setup.

use super::Operation;
use crate::generator::Generator;
use crate::ident::is_valid_identifier;
use crate::registry::Scope;
use fwrap_common::{Diagnostic, DiagnosticCode};

impl Generator<'_> {
    /// Give every boundary-crossing parameter a Fortran argument name: the
    /// lower-cased C name when usable, `argN` otherwise, numbered further
    /// when it clashes with an earlier argument or a module-level name.
    pub(super) fn assign_friendly_names(&self, op: &mut Operation, cparams: &[usize]) {
        for (position, &index) in cparams.iter().enumerate() {
            if op.params[index].fname.is_some() {
                continue;
            }
            let base = match &op.params[index].name {
                Some(name) if is_valid_identifier(name) && !name.contains("::") => {
                    name.to_lowercase()
                }
                _ => format!("arg{}", position),
            };
            let mut candidate = base.clone();
            let mut number = position;
            while op.params[..index]
                .iter()
                .any(|earlier| earlier.fname.as_deref() == Some(candidate.as_str()))
                || self.registry.contains(Scope::Module, &candidate)
            {
                candidate = format!("{}{}", base, number);
                number += 1;
            }
            op.params[index].fname = Some(candidate);
        }
    }

    /// Parameters of a directly bound function. The interface uses the
    /// Fortran argument names since it is the public routine.
    pub(super) fn bindc_params(&mut self, op: &mut Operation) -> Option<Vec<usize>> {
        if self.cplusplus && !op.is_extern_c {
            self.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::Identifier,
                    format!(
                        "The function '{}' appears not to be defined with external C linkage (extern \"C\"). Link errors may result.",
                        op.name
                    ),
                )
                .with_location(op.location.clone()),
            );
        }
        if op.params.iter().any(|p| p.ty.is_varargs()) {
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
            return None;
        }
        let cparams: Vec<usize> = (0..op.params.len()).collect();
        self.assign_friendly_names(op, &cparams);
        for param in &mut op.params {
            if let Some(fname) = &param.fname {
                param.imname = fname.clone();
            }
        }
        Some(cparams)
    }
}
