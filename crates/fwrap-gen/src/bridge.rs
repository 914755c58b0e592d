//! Type bridge: Fortran names for C types and typemap post-processing.
//!
//! Typemaps refer to the Fortran name of a class or enum through the
//! `$fclassname` and `$fenumname` placeholders. A type the generator knows
//! nothing about still needs a Fortran name; it gets an opaque placeholder
//! declared once on first use.

use crate::generator::Generator;
use crate::ident::mangle;
use crate::registry::{Scope, Severity};
use crate::typemap::{Typemap, TypemapMethod, TypemapTarget};
use fwrap_common::{Diagnostic, DiagnosticCode, SourceLocation};
use fwrap_decl::TypeSig;

/// Lower-cased name inside `type(...)`, for the `import` statement an
/// interface block needs. The intrinsic `c_ptr` and `c_funptr` types are
/// visible through `ISO_C_BINDING` already.
pub fn make_import_string(imtype: &str) -> Option<String> {
    let lower = imtype.to_lowercase();
    let start = lower.find("type(")? + "type(".len();
    let len = lower[start..].find(')')?;
    let name = lower[start..start + len].trim();
    if name.is_empty() || name == "c_ptr" || name == "c_funptr" {
        return None;
    }
    Some(name.to_string())
}

/// Kind parameter of a type such as `real(C_DOUBLE)`: the text between the
/// first `(` and the last `)`.
pub fn make_specifier_suffix(bindc: &str) -> Option<String> {
    let start = bindc.find('(')? + 1;
    let stop = bindc.rfind(')')?;
    if stop <= start {
        return None;
    }
    Some(bindc[start..stop].to_string())
}

/// A plain base-10 integer literal Fortran reads the same way C does: an
/// optional `-` and a run of digits without an octal-looking leading zero.
pub fn is_fortran_intexpr(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !(digits.len() > 1 && digits.starts_with('0'))
}

/// Whether `value` is a floating-point literal that Fortran would read as
/// a default (single precision) real.
pub fn is_default_real_literal(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    let mut seen_digit = false;
    let mut seen_marker = false;
    for c in body.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' | 'e' | 'E' => seen_marker = true,
            '+' | '-' => {}
            _ => return false,
        }
    }
    seen_digit && seen_marker
}

/// Array dimensions of `ty` that cannot be written in Fortran, when the
/// typemap asks for them to be checked.
pub fn bad_fortran_dims(ty: &TypeSig, tm: &Typemap) -> Vec<String> {
    if !tm.flag("checkdim") {
        return Vec::new();
    }
    ty.array_dims()
        .into_iter()
        .flatten()
        .filter(|dim| !dim.is_empty() && !is_fortran_intexpr(dim))
        .collect()
}

impl Generator<'_> {
    /// Look up a typemap, pull in its fragments and substitute the Fortran
    /// type placeholders.
    pub(crate) fn typemap(
        &mut self,
        method: TypemapMethod,
        ty: &TypeSig,
        name: Option<&str>,
        lname: &str,
    ) -> Option<Typemap> {
        let resolved = self.graph.resolve(ty);
        let target = TypemapTarget {
            ty,
            resolved: &resolved,
            name,
            lname,
        };
        let mut tm = self.typemaps.lookup(method, &target)?;
        if let Some(fragments) = tm.kwarg("fragment").map(str::to_string) {
            self.require_fragments(&fragments);
        }
        self.replace_placeholders(ty, &mut tm.code);
        for value in tm.kwargs.values_mut() {
            self.replace_placeholders(ty, value);
        }
        Some(tm)
    }

    /// Like [`Generator::typemap`], warning when no typemap matches.
    pub(crate) fn require_typemap(
        &mut self,
        method: TypemapMethod,
        ty: &TypeSig,
        name: Option<&str>,
        lname: &str,
        context: &str,
        location: &SourceLocation,
    ) -> Option<Typemap> {
        self.require_typemap_as(Severity::Warn, method, ty, name, lname, context, location)
    }

    /// Like [`Generator::typemap`], reporting a missing typemap at
    /// `severity`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn require_typemap_as(
        &mut self,
        severity: Severity,
        method: TypemapMethod,
        ty: &TypeSig,
        name: Option<&str>,
        lname: &str,
        context: &str,
        location: &SourceLocation,
    ) -> Option<Typemap> {
        let tm = self.typemap(method, ty, name, lname);
        if tm.is_none() {
            let message = format!("no '{}' typemap defined for '{}' in '{}'", method, ty, context);
            let diagnostic = match severity {
                Severity::Fatal => Diagnostic::error(DiagnosticCode::TypemapUndefined, message),
                Severity::Warn => Diagnostic::warning(DiagnosticCode::TypemapUndefined, message),
                Severity::Silent => return None,
            };
            self.diagnostics
                .push(diagnostic.with_location(location.clone()));
        }
        tm
    }

    pub(crate) fn require_fragments(&mut self, list: &str) {
        let unknown = self
            .fragments
            .require_list(list, self.cplusplus, &mut self.sections);
        for name in unknown {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::TypemapUndefined,
                format!("unknown runtime fragment '{}'", name),
            ));
        }
    }

    /// Replace `$fclassname` and `$fenumname` in `text` with the Fortran
    /// name of the base type of `ty`. Returns whether anything changed.
    pub(crate) fn replace_placeholders(&mut self, ty: &TypeSig, text: &mut String) -> bool {
        let has_class = text.contains("$fclassname");
        let has_enum = text.contains("$fenumname");
        if !has_class && !has_enum {
            return false;
        }
        let base = self.graph.resolve(ty).base().clone();
        if has_class {
            let name = self.fortran_type_name(&base, false);
            *text = text.replace("$fclassname", &name);
        }
        if has_enum {
            let name = self.fortran_type_name(&base, true);
            *text = text.replace("$fenumname", &name);
        }
        true
    }

    /// Fortran name of a class or enum type, or of its opaque placeholder.
    pub(crate) fn fortran_type_name(&mut self, base: &TypeSig, is_enum: bool) -> String {
        let found = match base {
            TypeSig::Named(name) | TypeSig::Enum(name) => {
                if is_enum {
                    self.graph.find_enum(name)
                } else {
                    self.graph.find_class(name)
                }
            }
            _ => None,
        };

        if let Some(id) = found {
            let decl = self.graph.get(id);
            let missing = decl.as_enum().map_or(false, |e| e.missing);
            let usable = !is_enum || (!missing && self.attrs.is_declared(id));
            if usable {
                return match self.attrs.fortran_name(id) {
                    Some(name) => name.to_string(),
                    None => symbol_of(decl),
                };
            }
        }

        let key = base.mangle();
        if let Some(name) = self.opaque.get(&key) {
            return name.clone();
        }
        let placeholder = mangle(&format!("SWIGTYPE{}", key));
        let claimed = self
            .registry
            .register(Scope::Module, &placeholder, found, &base.to_string());
        if let Err(err) = &claimed {
            if let Some(diagnostic) = Severity::Silent.diagnose(err, &placeholder, "type") {
                self.diagnostics.push(diagnostic);
            }
        }
        if claimed.is_ok() {
            tracing::debug!(ty = %base, name = %placeholder, "declaring opaque type");
            if is_enum {
                self.sections
                    .fdecl
                    .push_str(&format!(" integer, parameter, public :: {} = C_INT\n", placeholder));
            } else {
                self.require_fragments("SwigClassWrapper_f");
                self.sections.fdecl.push_str(&format!(
                    " type, public :: {}\n  type(SwigClassWrapper), public :: swigdata\n end type\n",
                    placeholder
                ));
            }
        }
        self.opaque.insert(key, placeholder.clone());
        placeholder
    }

    /// Report array dimensions a typemap cannot express. Returns `true` if
    /// the declaration has to be skipped.
    pub(crate) fn check_dims(&mut self, ty: &TypeSig, tm: &Typemap, location: &SourceLocation) -> bool {
        let bad = bad_fortran_dims(ty, tm);
        for dim in &bad {
            self.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::Identifier,
                    format!("array dimension expression '{}' is incompatible with Fortran", dim),
                )
                .with_location(location.clone()),
            );
        }
        !bad.is_empty()
    }
}

/// Symbol name of a declaration after renaming.
pub fn symbol_of(decl: &fwrap_decl::Decl) -> String {
    match &decl.features.rename {
        Some(name) => name.clone(),
        None => decl.symbol().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_string() {
        assert_eq!(
            make_import_string("type(SwigClassWrapper), intent(in)").as_deref(),
            Some("swigclasswrapper")
        );
        assert_eq!(make_import_string("type(C_PTR), value"), None);
        assert_eq!(make_import_string("type(C_FUNPTR)"), None);
        assert_eq!(make_import_string("integer(C_INT)"), None);
    }

    #[test]
    fn test_specifier_suffix() {
        assert_eq!(make_specifier_suffix("real(C_DOUBLE)").as_deref(), Some("C_DOUBLE"));
        assert_eq!(
            make_specifier_suffix("integer(C_INT), intent(in)").as_deref(),
            Some("C_INT), intent(in")
        );
        assert_eq!(make_specifier_suffix("logical"), None);
    }

    #[test]
    fn test_fortran_intexpr() {
        for ok in ["0", "7", "-3", "123456"] {
            assert!(is_fortran_intexpr(ok), "{} should be accepted", ok);
        }
        for bad in ["", "-", "010", "1u", "0x10", "1 + 2", "FOO"] {
            assert!(!is_fortran_intexpr(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_default_real_literal() {
        assert!(is_default_real_literal("1.5"));
        assert!(is_default_real_literal("-2e10"));
        assert!(!is_default_real_literal("42"));
        assert!(!is_default_real_literal("1.5f"));
        assert!(!is_default_real_literal("."));
    }

    #[test]
    fn test_bad_dims_only_when_checked() {
        let ty = TypeSig::parse("double [N][3]").expect("parse");
        let plain = Typemap::new("real(C_DOUBLE)");
        assert!(bad_fortran_dims(&ty, &plain).is_empty());
        let checked = plain.with_kwarg("checkdim", "1");
        assert_eq!(bad_fortran_dims(&ty, &checked), vec!["N".to_string()]);
    }
}
