use super::{Typemap, TypemapEngine, TypemapMethod, TypemapTarget};
use fwrap_decl::TypeSig;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Placeholder base type that matches any type in a rule pattern.
pub const SWIGTYPE: &str = "SWIGTYPE";

/// One typemap definition: a method, a type pattern and optionally a
/// parameter name the rule is restricted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypemapRule {
    pub method: TypemapMethod,
    #[serde(rename = "type")]
    pub pattern: TypeSig,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub kwargs: FxHashMap<String, String>,
}

impl TypemapRule {
    pub fn new(method: TypemapMethod, pattern: TypeSig, code: impl Into<String>) -> Self {
        Self {
            method,
            pattern,
            name: None,
            code: code.into(),
            kwargs: FxHashMap::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    method: TypemapMethod,
    ty: String,
    name: Option<SmolStr>,
}

/// Table-driven [`TypemapEngine`].
///
/// A lookup tries, from most to least specific: the declared type, the
/// declared type without top-level `const`, the typedef-resolved type, the
/// resolved type with array dimensions generalised to `ANY`, and finally the
/// resolved type with its base replaced by `SWIGTYPE`. At every step a rule
/// restricted to the parameter name is preferred over an unrestricted one.
#[derive(Debug, Clone, Default)]
pub struct TypemapTable {
    rules: FxHashMap<RuleKey, Typemap>,
}

impl TypemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the builtin rules.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.extend(super::builtin_rules());
        table
    }

    /// Add a rule, replacing any rule with the same method, type and name.
    pub fn add(&mut self, rule: TypemapRule) {
        let key = RuleKey {
            method: rule.method,
            ty: rule.pattern.mangle(),
            name: rule.name.map(SmolStr::new),
        };
        self.rules.insert(
            key,
            Typemap {
                code: rule.code,
                kwargs: rule.kwargs,
            },
        );
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = TypemapRule>) {
        for rule in rules {
            self.add(rule);
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn find(&self, method: TypemapMethod, target: &TypemapTarget<'_>) -> Option<&Typemap> {
        let name = target.name.map(SmolStr::new);
        for candidate in candidates(target) {
            let ty = candidate.mangle();
            if name.is_some() {
                let key = RuleKey {
                    method,
                    ty: ty.clone(),
                    name: name.clone(),
                };
                if let Some(tm) = self.rules.get(&key) {
                    return Some(tm);
                }
            }
            let key = RuleKey {
                method,
                ty,
                name: None,
            };
            if let Some(tm) = self.rules.get(&key) {
                return Some(tm);
            }
        }
        None
    }
}

impl TypemapEngine for TypemapTable {
    fn lookup(&self, method: TypemapMethod, target: &TypemapTarget<'_>) -> Option<Typemap> {
        let tm = self.find(method, target)?;
        Some(Typemap {
            code: substitute(&tm.code, target),
            kwargs: tm
                .kwargs
                .iter()
                .map(|(k, v)| (k.clone(), substitute(v, target)))
                .collect(),
        })
    }
}

/// Types tried for a lookup, most specific first, without duplicates.
fn candidates(target: &TypemapTarget<'_>) -> Vec<TypeSig> {
    let any_dims = generalize_dims(target.resolved);
    let generic = generalize(target.resolved);
    let chain = [
        target.ty.clone(),
        target.ty.strip_const().clone(),
        target.resolved.clone(),
        target.resolved.strip_const().clone(),
        any_dims.strip_const().clone(),
        any_dims,
        generic.clone(),
        generic.strip_const().clone(),
        strip_inner_const(&generic),
    ];
    let mut out: Vec<TypeSig> = Vec::with_capacity(chain.len());
    for ty in chain {
        if !out.contains(&ty) {
            out.push(ty);
        }
    }
    out
}

fn generalize_dims(ty: &TypeSig) -> TypeSig {
    match ty {
        TypeSig::Array { element, dim } => TypeSig::Array {
            element: Box::new(generalize_dims(element)),
            dim: dim.as_ref().map(|_| "ANY".to_string()),
        },
        TypeSig::Const(inner) => generalize_dims(inner).constant(),
        TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(generalize_dims(inner))),
        TypeSig::Reference {
            referent,
            is_rvalue,
        } => TypeSig::Reference {
            referent: Box::new(generalize_dims(referent)),
            is_rvalue: *is_rvalue,
        },
        other => other.clone(),
    }
}

/// Replace the base type with `SWIGTYPE` (or `enum SWIGTYPE`) and array
/// dimensions with `ANY`. Function types collapse to `SWIGTYPE (...)`.
fn generalize(ty: &TypeSig) -> TypeSig {
    match ty {
        TypeSig::Void => TypeSig::Void,
        TypeSig::VarArgs => TypeSig::VarArgs,
        TypeSig::Enum(_) => TypeSig::Enum(SWIGTYPE.to_string()),
        TypeSig::Const(inner) => generalize(inner).constant(),
        TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(generalize(inner))),
        TypeSig::Reference {
            referent,
            is_rvalue,
        } => TypeSig::Reference {
            referent: Box::new(generalize(referent)),
            is_rvalue: *is_rvalue,
        },
        TypeSig::Array { element, dim } => TypeSig::Array {
            element: Box::new(generalize(element)),
            dim: dim.as_ref().map(|_| "ANY".to_string()),
        },
        TypeSig::Function { .. } => TypeSig::Function {
            return_type: Box::new(TypeSig::Named(SWIGTYPE.to_string())),
            params: vec![TypeSig::VarArgs],
        },
        TypeSig::MemberPointer { pointee, .. } => TypeSig::MemberPointer {
            class: SWIGTYPE.to_string(),
            pointee: Box::new(generalize(pointee)),
        },
        _ => TypeSig::Named(SWIGTYPE.to_string()),
    }
}

fn strip_inner_const(ty: &TypeSig) -> TypeSig {
    match ty {
        TypeSig::Const(inner) => strip_inner_const(inner),
        TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(strip_inner_const(inner))),
        TypeSig::Reference {
            referent,
            is_rvalue,
        } => TypeSig::Reference {
            referent: Box::new(strip_inner_const(referent)),
            is_rvalue: *is_rvalue,
        },
        TypeSig::Array { element, dim } => TypeSig::Array {
            element: Box::new(strip_inner_const(element)),
            dim: dim.clone(),
        },
        other => other.clone(),
    }
}

/// Expand the `$1` family of special variables.
fn substitute(code: &str, target: &TypemapTarget<'_>) -> String {
    if !code.contains('$') {
        return code.to_string();
    }
    let ltype = target.ty.ltype();
    let deref = match &ltype {
        TypeSig::Pointer(inner) => inner.render(""),
        other => other.render(""),
    };
    let replacements = [
        ("$*1_ltype", deref),
        ("$1_basetype", target.ty.base().render("")),
        ("$1_ltype", ltype.render("")),
        ("$1_type", target.ty.render("")),
        ("$1_name", target.name.unwrap_or(target.lname).to_string()),
        ("$1", target.lname.to_string()),
    ];
    replacements
        .iter()
        .fold(code.to_string(), |text, (from, to)| text.replace(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target<'a>(ty: &'a TypeSig, name: Option<&'a str>) -> TypemapTarget<'a> {
        TypemapTarget {
            ty,
            resolved: ty,
            name,
            lname: "arg1",
        }
    }

    fn parse(text: &str) -> TypeSig {
        TypeSig::parse(text).expect("type should parse")
    }

    #[test]
    fn test_exact_match_beats_generic() {
        let mut table = TypemapTable::new();
        table.add(TypemapRule::new(TypemapMethod::CType, parse("SWIGTYPE *"), "generic"));
        table.add(TypemapRule::new(TypemapMethod::CType, parse("Foo *"), "exact"));
        let foo = parse("Foo *");
        let bar = parse("Bar *");
        assert_eq!(table.lookup(TypemapMethod::CType, &target(&foo, None)).unwrap().code, "exact");
        assert_eq!(table.lookup(TypemapMethod::CType, &target(&bar, None)).unwrap().code, "generic");
    }

    #[test]
    fn test_named_rule_preferred_at_same_level() {
        let mut table = TypemapTable::new();
        table.add(TypemapRule::new(TypemapMethod::FType, parse("SWIGTYPE *"), "plain"));
        table.add(
            TypemapRule::new(TypemapMethod::FType, parse("SWIGTYPE *"), "self").named("DESTRUCTOR_SELF"),
        );
        let ty = parse("Foo *");
        let named = table.lookup(TypemapMethod::FType, &target(&ty, Some("DESTRUCTOR_SELF")));
        assert_eq!(named.unwrap().code, "self");
        let plain = table.lookup(TypemapMethod::FType, &target(&ty, Some("other")));
        assert_eq!(plain.unwrap().code, "plain");
    }

    #[test]
    fn test_const_and_typedef_fallbacks() {
        let mut table = TypemapTable::new();
        table.add(TypemapRule::new(TypemapMethod::ImType, TypeSig::Double, "real(C_DOUBLE)"));
        let declared = parse("const real_t");
        let resolved = parse("const double");
        let found = table.lookup(
            TypemapMethod::ImType,
            &TypemapTarget {
                ty: &declared,
                resolved: &resolved,
                name: None,
                lname: "arg1",
            },
        );
        assert_eq!(found.unwrap().code, "real(C_DOUBLE)");
    }

    #[test]
    fn test_enum_and_class_patterns_are_distinct() {
        let mut table = TypemapTable::new();
        table.add(TypemapRule::new(TypemapMethod::CType, parse("enum SWIGTYPE"), "int"));
        table.add(TypemapRule::new(TypemapMethod::CType, parse("SWIGTYPE"), "SwigClassWrapper"));
        let color = TypeSig::Enum("Color".into());
        let shape = parse("Shape");
        assert_eq!(table.lookup(TypemapMethod::CType, &target(&color, None)).unwrap().code, "int");
        assert_eq!(
            table.lookup(TypemapMethod::CType, &target(&shape, None)).unwrap().code,
            "SwigClassWrapper"
        );
    }

    #[test]
    fn test_array_dims_generalize() {
        let mut table = TypemapTable::new();
        table.add(TypemapRule::new(TypemapMethod::BindC, parse("double [ANY]"), "dims"));
        let ty = parse("double [3]");
        assert_eq!(table.lookup(TypemapMethod::BindC, &target(&ty, None)).unwrap().code, "dims");
    }

    #[test]
    fn test_special_variable_substitution() {
        let mut table = TypemapTable::new();
        table.add(
            TypemapRule::new(TypemapMethod::In, parse("const SWIGTYPE &"), "$1 = ($1_ltype)$input->cptr; // $*1_ltype $1_type")
                .with_kwarg("note", "$1_basetype"),
        );
        let ty = parse("const Foo &");
        let tm = table.lookup(TypemapMethod::In, &target(&ty, None)).unwrap();
        assert_eq!(tm.code, "arg1 = (const Foo *)$input->cptr; // const Foo const Foo &");
        assert_eq!(tm.kwarg("note"), Some("Foo"));
    }

    #[test]
    fn test_missing_rule() {
        let table = TypemapTable::new();
        let ty = TypeSig::int();
        assert!(table.lookup(TypemapMethod::Out, &target(&ty, None)).is_none());
    }
}
