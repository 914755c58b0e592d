//! Names of the routines generated for an operation.

use super::Operation;
use crate::generator::Generator;
use crate::ident::{interface_name, mangle, proxy_name, wrapper_name};
use crate::registry::{Scope, Severity};
use fwrap_common::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Names {
    /// C linkage name of the wrapper (or of the bound C function).
    pub wname: String,
    /// Interface routine.
    pub imname: String,
    /// Proxy routine; `None` for directly bound functions.
    pub fname: Option<String>,
    /// Public or type-bound name, when it differs from `fname`.
    pub fsymname: Option<String>,
    /// `fsymname` names a generic group rather than a single procedure.
    pub generic: bool,
}

impl Generator<'_> {
    /// Compute and claim the names of `op`. Returns `None`, after reporting
    /// why, when a name is invalid or already taken.
    pub(super) fn allocate_names(&mut self, op: &Operation) -> Option<Names> {
        let bindc = op.features.bindc;
        let sym = op.symname.as_str();
        let nspace = op.nspace.as_deref();
        let mut fsymname = None;

        let (mut wname, mut imname, mut fname) = if bindc {
            (op.name.clone(), mangle(sym), None)
        } else {
            let fname = if let Some(private) = &op.private_fname {
                private.clone()
            } else if let Some((var, accessor)) = &op.variable {
                let accessor_name = mangle(&format!("{}_{}", accessor.prefix(), var));
                if op.member {
                    fsymname = Some(accessor_name);
                    proxy_name(nspace, None, sym)
                } else {
                    accessor_name
                }
            } else {
                mangle(sym)
            };
            (wrapper_name(sym), interface_name(sym), Some(fname))
        };

        let mut generic = false;
        if let Some(name) = &op.features.generic {
            fsymname = Some(name.clone());
            generic = true;
        } else if let Some(name) = &op.fortran_name {
            fsymname = Some(name.clone());
        }

        if let Some(ext) = &op.overload {
            if bindc {
                self.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::InvalidDeclaration,
                        format!(
                            "overloaded function '{}' cannot be bound directly with bind(C)",
                            sym
                        ),
                    )
                    .with_location(op.location.clone()),
                );
                return None;
            }
            wname.push_str(ext);
            imname = mangle(&format!("{}{}", imname, ext));
            if fsymname.is_none() {
                fsymname = fname.clone();
                if op.private_fname.is_none() {
                    fname = Some(proxy_name(nspace, None, sym));
                }
            }
            fname = fname.map(|f| mangle(&format!("{}{}", f, ext)));
            generic = true;
        }

        self.claim(Scope::Module, &imname, op)?;
        if let Some(fname) = &fname {
            self.claim(Scope::Module, fname, op)?;
        }

        if op.member {
            let fsym = fsymname.as_deref().or(fname.as_deref()).unwrap_or(&imname);
            let (class_id, class_name) = match &self.class {
                Some(class) => (class.id, class.fortran_name.clone()),
                None => return None,
            };
            if fsym.eq_ignore_ascii_case(&class_name) {
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::NameConflict,
                        format!(
                            "Ignoring '{}' due to Fortran name ('{}') conflict with '{}'",
                            sym,
                            fsym.to_lowercase(),
                            class_name
                        ),
                    )
                    .with_location(op.location.clone()),
                );
                return None;
            }
            if !generic {
                let fsym = fsym.to_string();
                self.claim(Scope::Aggregate(class_id), &fsym, op)?;
            }
        }

        Some(Names {
            wname,
            imname,
            fname,
            fsymname,
            generic,
        })
    }

    fn claim(&mut self, scope: Scope, name: &str, op: &Operation) -> Option<()> {
        // A directly bound function keeps its C name, so losing the Fortran
        // name leaves no way to call it.
        let severity = if op.features.bindc {
            Severity::Fatal
        } else {
            Severity::Warn
        };
        match self.registry.register(scope, name, Some(op.id), &op.symname) {
            Ok(()) => Some(()),
            Err(err) => {
                if let Some(diagnostic) = severity.diagnose(&err, &op.symname, "function") {
                    self.diagnostics
                        .push(diagnostic.with_location(op.location.clone()));
                }
                None
            }
        }
    }
}
