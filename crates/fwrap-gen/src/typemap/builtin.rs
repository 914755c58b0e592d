//! Builtin marshaling rules.
//!
//! Scalars cross the boundary by reference on input and by value on output,
//! strings as a `(data, size)` pair, class instances as an opaque
//! `SwigClassWrapper` handle carrying ownership flags, enums as C `int`.

use super::table::{TypemapRule, SWIGTYPE};
use super::TypemapMethod as M;
use fwrap_decl::TypeSig;

fn swigtype() -> TypeSig {
    TypeSig::named(SWIGTYPE)
}

/// Arithmetic types with a direct ISO_C_BINDING counterpart.
fn fundamentals() -> Vec<(TypeSig, &'static str)> {
    let mut types = vec![
        (TypeSig::Char { signed: Some(true) }, "integer(C_SIGNED_CHAR)"),
        (TypeSig::Char { signed: Some(false) }, "integer(C_SIGNED_CHAR)"),
        (TypeSig::Short { signed: true }, "integer(C_SHORT)"),
        (TypeSig::Short { signed: false }, "integer(C_SHORT)"),
        (TypeSig::Int { signed: true }, "integer(C_INT)"),
        (TypeSig::Int { signed: false }, "integer(C_INT)"),
        (TypeSig::Long { signed: true }, "integer(C_LONG)"),
        (TypeSig::Long { signed: false }, "integer(C_LONG)"),
        (TypeSig::LongLong { signed: true }, "integer(C_LONG_LONG)"),
        (TypeSig::LongLong { signed: false }, "integer(C_LONG_LONG)"),
        (TypeSig::Float, "real(C_FLOAT)"),
        (TypeSig::Double, "real(C_DOUBLE)"),
        (TypeSig::Char { signed: None }, "character(C_CHAR)"),
        (TypeSig::named("size_t"), "integer(C_SIZE_T)"),
        (TypeSig::named("ptrdiff_t"), "integer(C_PTRDIFF_T)"),
    ];
    for (bits, kind) in [
        (8, "integer(C_INT8_T)"),
        (16, "integer(C_INT16_T)"),
        (32, "integer(C_INT32_T)"),
        (64, "integer(C_INT64_T)"),
    ] {
        types.push((TypeSig::named(format!("int{}_t", bits)), kind));
        types.push((TypeSig::named(format!("uint{}_t", bits)), kind));
    }
    types
}

/// Rules for a fundamental type passed by value, by const reference, and
/// through mutable pointers or references.
fn fundamental_rules(ty: TypeSig, fortran: &str, rules: &mut Vec<TypemapRule>) {
    let ctype = ty.render("");
    let value = [ty.clone(), ty.clone().constant()];
    let by_cref = ty.clone().constant().reference();

    for pattern in value.iter().cloned().chain([by_cref.clone()]) {
        rules.push(
            TypemapRule::new(M::CType, pattern.clone(), ctype.clone())
                .with_kwarg("in", format!("{} const *", ctype)),
        );
        rules.push(
            TypemapRule::new(M::ImType, pattern.clone(), fortran)
                .with_kwarg("in", format!("{}, intent(in)", fortran)),
        );
        rules.push(
            TypemapRule::new(M::FType, pattern.clone(), fortran)
                .with_kwarg("in", format!("{}, intent(in)", fortran)),
        );
        rules.push(
            TypemapRule::new(M::BindC, pattern.clone(), fortran)
                .with_kwarg("in", format!("{}, intent(in), value", fortran)),
        );
        rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = $input"));
        rules.push(TypemapRule::new(M::FOut, pattern, "$result = $1"));
    }
    for pattern in value {
        rules.push(TypemapRule::new(M::In, pattern.clone(), "$1 = ($1_ltype)(*$input);"));
        rules.push(TypemapRule::new(M::Out, pattern, "$result = $1;"));
    }
    rules.push(TypemapRule::new(M::In, by_cref.clone(), "$1 = $input;"));
    rules.push(TypemapRule::new(M::Out, by_cref, "$result = *$1;"));

    let mut mutable = vec![(ty.clone().reference(), "inout"), (ty.clone().ptr(), "inout")];
    // `const char *` is a string
    if ty != (TypeSig::Char { signed: None }) {
        mutable.push((ty.constant().ptr(), "in"));
    }
    for (pattern, intent) in mutable {
        let cptr = pattern.ltype().render("");
        rules.push(TypemapRule::new(M::CType, pattern.clone(), cptr));
        rules.push(
            TypemapRule::new(M::ImType, pattern.clone(), "type(C_PTR)")
                .with_kwarg("in", "type(C_PTR), value"),
        );
        rules.push(
            TypemapRule::new(M::FType, pattern.clone(), format!("{}, pointer", fortran))
                .with_kwarg("in", format!("{}, target, intent({})", fortran, intent)),
        );
        rules.push(TypemapRule::new(M::In, pattern.clone(), "$1 = ($1_ltype)$input;"));
        rules.push(TypemapRule::new(M::Out, pattern.clone(), "$result = $1;"));
        rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = c_loc($input)"));
        rules.push(TypemapRule::new(M::FOut, pattern.clone(), "call c_f_pointer($1, $result)"));
        if pattern.is_pointer() {
            rules.push(
                TypemapRule::new(M::BindC, pattern, "type(C_PTR)")
                    .with_kwarg("in", "type(C_PTR), value"),
            );
        }
    }
}

fn bool_rules(rules: &mut Vec<TypemapRule>) {
    for pattern in [TypeSig::Bool, TypeSig::Bool.constant()] {
        rules.push(
            TypemapRule::new(M::CType, pattern.clone(), "int").with_kwarg("in", "int const *"),
        );
        rules.push(
            TypemapRule::new(M::ImType, pattern.clone(), "integer(C_INT)")
                .with_kwarg("in", "integer(C_INT), intent(in)"),
        );
        rules.push(
            TypemapRule::new(M::FType, pattern.clone(), "logical")
                .with_kwarg("in", "logical, intent(in)"),
        );
        rules.push(
            TypemapRule::new(M::BindC, pattern.clone(), "logical(C_BOOL)")
                .with_kwarg("in", "logical(C_BOOL), intent(in), value"),
        );
        rules.push(TypemapRule::new(M::In, pattern.clone(), "$1 = (*$input != 0);"));
        rules.push(TypemapRule::new(M::Out, pattern.clone(), "$result = ($1 ? 1 : 0);"));
        rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = merge(1, 0, $input)"));
        rules.push(TypemapRule::new(M::FOut, pattern, "$result = ($1 /= 0)"));
    }
}

/// `void` results: an empty Fortran type makes the procedure a subroutine.
fn void_rules(rules: &mut Vec<TypemapRule>) {
    rules.push(TypemapRule::new(M::CType, TypeSig::Void, "void").with_kwarg("null", ""));
    for method in [M::ImType, M::FType, M::BindC, M::Out, M::FOut] {
        rules.push(TypemapRule::new(method, TypeSig::Void, ""));
    }
}

fn void_pointer_rules(rules: &mut Vec<TypemapRule>) {
    for pattern in [TypeSig::Void.ptr(), TypeSig::Void.constant().ptr()] {
        rules.push(TypemapRule::new(M::CType, pattern.clone(), pattern.render("")));
        for method in [M::ImType, M::BindC] {
            rules.push(
                TypemapRule::new(method, pattern.clone(), "type(C_PTR)")
                    .with_kwarg("in", "type(C_PTR), value"),
            );
        }
        rules.push(
            TypemapRule::new(M::FType, pattern.clone(), "type(C_PTR)")
                .with_kwarg("in", "type(C_PTR), intent(in)"),
        );
        rules.push(TypemapRule::new(M::In, pattern.clone(), "$1 = ($1_ltype)$input;"));
        rules.push(TypemapRule::new(M::Out, pattern.clone(), "$result = $1;"));
        rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = $input"));
        rules.push(TypemapRule::new(M::FOut, pattern, "$result = $1"));
    }
}

fn string_rules(rules: &mut Vec<TypemapRule>) {
    let pattern = TypeSig::Char { signed: None }.constant().ptr();
    rules.push(
        TypemapRule::new(M::CType, pattern.clone(), "SwigArrayWrapper")
            .with_kwarg("in", "SwigArrayWrapper *")
            .with_kwarg("fragment", "SwigArrayWrapper"),
    );
    rules.push(
        TypemapRule::new(M::ImType, pattern.clone(), "type(SwigArrayWrapper)")
            .with_kwarg("in", "type(SwigArrayWrapper)")
            .with_kwarg("fragment", "SwigArrayWrapper_f"),
    );
    rules.push(
        TypemapRule::new(
            M::FType,
            pattern.clone(),
            "character(kind=C_CHAR, len=:), allocatable",
        )
        .with_kwarg("in", "character(len=*), intent(in)"),
    );
    rules.push(TypemapRule::new(
        M::In,
        pattern.clone(),
        "$1 = ($1_ltype)($input->data);",
    ));
    rules.push(
        TypemapRule::new(
            M::Out,
            pattern.clone(),
            "$result.data = SWIG_const_cast($1, char *);\n$result.size = ($1 ? strlen($1) : 0);",
        )
        .with_kwarg("fragment", "SwigArrayWrapper"),
    );
    rules.push(TypemapRule::new(
        M::FInDecl,
        pattern.clone(),
        "character(kind=C_CHAR), dimension(:), allocatable, target :: $1_chars",
    ));
    rules.push(
        TypemapRule::new(
            M::FIn,
            pattern.clone(),
            "call SWIG_string_to_chararray($input, $1_chars, $1)",
        )
        .with_kwarg("fragment", "SWIG_string_to_chararray_f"),
    );
    rules.push(
        TypemapRule::new(M::FOut, pattern, "call SWIG_chararray_to_string($1, $result)")
            .with_kwarg("fragment", "SWIG_chararray_to_string_f"),
    );
}

fn class_rules(rules: &mut Vec<TypemapRule>) {
    let value = swigtype();
    let indirect = [
        swigtype().ptr(),
        swigtype().constant().ptr(),
        swigtype().reference(),
        swigtype().constant().reference(),
    ];

    for pattern in indirect.iter().cloned().chain([value.clone()]) {
        rules.push(
            TypemapRule::new(M::CType, pattern.clone(), "SwigClassWrapper")
                .with_kwarg("in", "SwigClassWrapper const *")
                .with_kwarg("fragment", "SwigClassWrapper"),
        );
        rules.push(
            TypemapRule::new(M::ImType, pattern.clone(), "type(SwigClassWrapper)")
                .with_kwarg("in", "type(SwigClassWrapper), intent(in)")
                .with_kwarg("fragment", "SwigClassWrapper_f"),
        );
        rules.push(
            TypemapRule::new(M::FType, pattern.clone(), "type($fclassname)")
                .with_kwarg("in", "class($fclassname), intent(in)"),
        );
        rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = $input%swigdata"));
        rules.push(TypemapRule::new(M::FOut, pattern, "$result%swigdata = $1"));
    }
    for pattern in indirect {
        rules.push(TypemapRule::new(
            M::In,
            pattern.clone(),
            "$1 = SWIG_static_cast($input->cptr, $1_ltype);",
        ));
        rules.push(TypemapRule::new(
            M::Out,
            pattern,
            "$result.cptr = (void *)$1;\n$result.cmemflags = ($owner ? SWIG_MEM_OWN : 0);",
        ));
    }
    rules.push(
        TypemapRule::new(M::BindC, swigtype().ptr(), "type(C_PTR)")
            .with_kwarg("in", "type(C_PTR), value"),
    );
    rules.push(TypemapRule::new(
        M::In,
        value.clone(),
        "$1 = *SWIG_static_cast($input->cptr, $1_ltype *);",
    ));
    rules.push(TypemapRule::new(
        M::Out,
        value,
        "$result.cptr = SWIG_new_copy($1, $1_ltype);\n$result.cmemflags = SWIG_MEM_OWN | SWIG_MEM_RVALUE;",
    ));

    // Implicit arguments of destructors and assignment operators
    let self_ty = swigtype().ptr();
    let self_rules = [
        ("DESTRUCTOR_SELF", "$1 = SWIG_static_cast($input->cptr, $1_ltype);"),
        ("ASSIGNMENT_SELF", ""),
    ];
    for (name, in_code) in self_rules {
        rules.push(
            TypemapRule::new(M::CType, self_ty.clone(), "SwigClassWrapper")
                .named(name)
                .with_kwarg("in", "SwigClassWrapper *")
                .with_kwarg("fragment", "SwigClassWrapper"),
        );
        rules.push(
            TypemapRule::new(M::ImType, self_ty.clone(), "type(SwigClassWrapper)")
                .named(name)
                .with_kwarg("in", "type(SwigClassWrapper), intent(inout)")
                .with_kwarg("fragment", "SwigClassWrapper_f"),
        );
        rules.push(
            TypemapRule::new(M::FType, self_ty.clone(), "type($fclassname)")
                .named(name)
                .with_kwarg("in", "class($fclassname), intent(inout)"),
        );
        rules.push(TypemapRule::new(M::In, self_ty.clone(), in_code).named(name));
        rules.push(TypemapRule::new(M::FIn, self_ty.clone(), "$1 = $input%swigdata").named(name));
        rules.push(
            TypemapRule::new(M::FArgOut, self_ty.clone(), "$input%swigdata = $1").named(name),
        );
    }

    let other = swigtype().reference();
    rules.push(
        TypemapRule::new(M::CType, other.clone(), "SwigClassWrapper")
            .named("ASSIGNMENT_OTHER")
            .with_kwarg("in", "SwigClassWrapper const *")
            .with_kwarg("fragment", "SwigClassWrapper"),
    );
    rules.push(
        TypemapRule::new(M::FType, other.clone(), "type($fclassname)")
            .named("ASSIGNMENT_OTHER")
            .with_kwarg("in", "type($fclassname), intent(in)"),
    );
    rules.push(TypemapRule::new(M::In, other, "").named("ASSIGNMENT_OTHER"));
}

fn enum_rules(rules: &mut Vec<TypemapRule>) {
    let pattern = TypeSig::Enum(SWIGTYPE.to_string());
    rules.push(
        TypemapRule::new(M::CType, pattern.clone(), "int").with_kwarg("in", "int const *"),
    );
    rules.push(
        TypemapRule::new(M::ImType, pattern.clone(), "integer(C_INT)")
            .with_kwarg("in", "integer(C_INT), intent(in)"),
    );
    rules.push(
        TypemapRule::new(M::FType, pattern.clone(), "integer($fenumname)")
            .with_kwarg("in", "integer($fenumname), intent(in)"),
    );
    rules.push(
        TypemapRule::new(M::BindC, pattern.clone(), "integer(C_INT)")
            .with_kwarg("in", "integer(C_INT), intent(in), value"),
    );
    rules.push(TypemapRule::new(
        M::In,
        pattern.clone(),
        "$1 = SWIG_static_cast(*$input, $1_ltype);",
    ));
    rules.push(TypemapRule::new(
        M::Out,
        pattern.clone(),
        "$result = SWIG_static_cast($1, int);",
    ));
    rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = $input"));
    rules.push(TypemapRule::new(M::FOut, pattern, "$result = $1"));
}

/// Function pointers pass through unchanged as `type(C_FUNPTR)`.
fn function_pointer_rules(rules: &mut Vec<TypemapRule>) {
    let pattern = TypeSig::Function {
        return_type: Box::new(swigtype()),
        params: vec![TypeSig::VarArgs],
    }
    .ptr();
    rules.push(TypemapRule::new(M::CType, pattern.clone(), "$1_ltype"));
    for method in [M::ImType, M::BindC] {
        rules.push(
            TypemapRule::new(method, pattern.clone(), "type(C_FUNPTR)")
                .with_kwarg("in", "type(C_FUNPTR), value"),
        );
    }
    rules.push(
        TypemapRule::new(M::FType, pattern.clone(), "type(C_FUNPTR)")
            .with_kwarg("in", "type(C_FUNPTR), intent(in), value"),
    );
    rules.push(TypemapRule::new(M::In, pattern.clone(), "$1 = $input;"));
    rules.push(TypemapRule::new(M::Out, pattern.clone(), "$result = $1;"));
    rules.push(TypemapRule::new(M::FIn, pattern.clone(), "$1 = $input"));
    rules.push(TypemapRule::new(M::FOut, pattern, "$result = $1"));
}

/// The builtin rule set, in increasing priority.
pub fn builtin_rules() -> Vec<TypemapRule> {
    let mut rules = Vec::new();
    class_rules(&mut rules);
    enum_rules(&mut rules);
    function_pointer_rules(&mut rules);
    for (ty, fortran) in fundamentals() {
        fundamental_rules(ty, fortran, &mut rules);
    }
    bool_rules(&mut rules);
    void_rules(&mut rules);
    void_pointer_rules(&mut rules);
    string_rules(&mut rules);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typemap::{TypemapEngine, TypemapTable, TypemapTarget};

    fn lookup(method: M, ty: &str, name: Option<&str>) -> Option<crate::typemap::Typemap> {
        let table = TypemapTable::with_builtins();
        let ty = TypeSig::parse(ty).expect("type should parse");
        table.lookup(
            method,
            &TypemapTarget {
                ty: &ty,
                resolved: &ty,
                name,
                lname: "arg1",
            },
        )
    }

    #[test]
    fn test_int_value_and_pointer() {
        let ctype = lookup(M::CType, "int", None).unwrap();
        assert_eq!(ctype.code_for(Some("in")), "int const *");
        assert_eq!(ctype.code, "int");
        assert_eq!(lookup(M::In, "int", None).unwrap().code, "arg1 = (int)(*$input);");
        assert_eq!(lookup(M::CType, "int *", None).unwrap().code, "int *");
        assert_eq!(
            lookup(M::FType, "double &", None).unwrap().code_for(Some("in")),
            "real(C_DOUBLE), target, intent(inout)"
        );
        assert_eq!(
            lookup(M::FType, "const double &", None).unwrap().code_for(Some("in")),
            "real(C_DOUBLE), intent(in)"
        );
    }

    #[test]
    fn test_void_is_empty() {
        assert_eq!(lookup(M::CType, "void", None).unwrap().code, "void");
        assert_eq!(lookup(M::FType, "void", None).unwrap().code, "");
        assert_eq!(lookup(M::CType, "void *", None).unwrap().code, "void *");
    }

    #[test]
    fn test_class_handles() {
        let ftype = lookup(M::FType, "const Circle &", None).unwrap();
        assert_eq!(ftype.code_for(Some("in")), "class($fclassname), intent(in)");
        assert_eq!(
            lookup(M::In, "Circle *", None).unwrap().code,
            "arg1 = SWIG_static_cast($input->cptr, Circle *);"
        );
        assert!(lookup(M::BindC, "Circle", None).is_none());
        assert_eq!(
            lookup(M::CType, "Circle", None).unwrap().kwarg("fragment"),
            Some("SwigClassWrapper")
        );
    }

    #[test]
    fn test_self_arguments() {
        let ftype = lookup(M::FType, "Circle *", Some("DESTRUCTOR_SELF")).unwrap();
        assert_eq!(ftype.code_for(Some("in")), "class($fclassname), intent(inout)");
        assert_eq!(lookup(M::In, "Circle *", Some("ASSIGNMENT_SELF")).unwrap().code, "");
        assert!(lookup(M::FArgOut, "Circle *", None).is_none());
        assert_eq!(
            lookup(M::FArgOut, "Circle *", Some("DESTRUCTOR_SELF")).unwrap().code,
            "$input%swigdata = arg1"
        );
    }

    #[test]
    fn test_enums_and_strings() {
        assert_eq!(
            lookup(M::FType, "enum Color", None).unwrap().code,
            "integer($fenumname)"
        );
        let fin = lookup(M::FInDecl, "const char *", None).unwrap();
        assert!(fin.code.ends_with(":: arg1_chars"));
        assert_eq!(lookup(M::CType, "bool", None).unwrap().code, "int");
    }

    #[test]
    fn test_function_pointer_ctype_is_declared_type() {
        assert_eq!(
            lookup(M::CType, "int (*)(double)", None).unwrap().code,
            "int (*)(double)"
        );
    }
}
