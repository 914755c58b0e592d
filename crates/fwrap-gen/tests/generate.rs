//! End-to-end generation of small declaration graphs.

use fwrap_common::DiagnosticCode;
use fwrap_decl::{Decl, DeclGraph, Features, FunctionRole, ModuleInfo, Param, TypeSig, VariableRole};
use fwrap_gen::{generate, GenConfig, GenError, Output, TypemapMethod, TypemapRule, TypemapTable};

fn parse(text: &str) -> TypeSig {
    TypeSig::parse(text).expect("type should parse")
}

fn cxx_graph(name: &str) -> DeclGraph {
    DeclGraph::new(ModuleInfo::new(name))
}

fn c_graph(name: &str) -> DeclGraph {
    let mut module = ModuleInfo::new(name);
    module.cplusplus = false;
    DeclGraph::new(module)
}

fn run_with(graph: DeclGraph, table: &TypemapTable) -> Output {
    generate(graph, &GenConfig::default(), table).expect("generation should succeed")
}

fn run(graph: DeclGraph) -> Output {
    run_with(graph, &TypemapTable::with_builtins())
}

fn run_err(graph: DeclGraph) -> GenError {
    match generate(graph, &GenConfig::default(), &TypemapTable::with_builtins()) {
        Ok(_) => panic!("generation should fail"),
        Err(err) => err,
    }
}

fn add_circle(graph: &mut DeclGraph) -> fwrap_decl::DeclId {
    graph.add(None, Decl::class("Circle"))
}

#[test]
fn test_free_function_pipeline() {
    let mut graph = c_graph("geometry");
    graph.add(
        None,
        Decl::function("square", TypeSig::Double, vec![Param::new("x", TypeSig::Double)]),
    );
    let out = run(graph);

    assert!(!out.diagnostics.has_errors());
    assert!(out
        .wrapper
        .contains("  arg1 = (double)(*farg1);\n  result = (double)square(arg1);\n  fresult = result;\n  return fresult;\n}\n"));
    assert!(!out.wrapper.contains("extern \"C\" {"));

    assert!(out
        .module
        .contains("module geometry\n use, intrinsic :: ISO_C_BINDING\n implicit none\n private\n"));
    assert!(out.module.contains(" public :: square\n"));
    assert!(out.module.contains("bind(C, name=\"_wrap_square\")"));
    assert!(out.module.contains(
        "function square(x) &\n     result(swig_result)\n  use, intrinsic :: ISO_C_BINDING\n  real(C_DOUBLE) :: swig_result\n  real(C_DOUBLE), intent(in) :: x\n  real(C_DOUBLE) :: fresult\n  real(C_DOUBLE) :: farg1\n\n  farg1 = x\n  fresult = swigc_square(farg1)\n  swig_result = fresult\nend function\n"
    ));
    assert!(out.module.trim_end().ends_with("end module"));
}

#[test]
fn test_overloads_form_one_generic_interface() {
    let mut graph = cxx_graph("ops");
    for (suffix, ty) in [("__SWIG_0", "int"), ("__SWIG_1", "double"), ("__SWIG_2", "float")] {
        graph.add(
            None,
            Decl::function("add", parse(ty), vec![Param::new("a", parse(ty))]).with_overload(suffix),
        );
    }
    let out = run(graph);

    assert!(out.module.contains(
        " interface add\n  module procedure swigf_add__SWIG_0, swigf_add__SWIG_1, swigf_add__SWIG_2\n end interface\n public :: add\n"
    ));
    for suffix in ["__SWIG_0", "__SWIG_1", "__SWIG_2"] {
        assert!(out.wrapper.contains(&format!("_wrap_add{}(", suffix)));
        assert!(out.module.contains(&format!("swigc_add{}", suffix)));
    }
    assert!(!out.module.contains(" public :: swigf_add"));
}

#[test]
fn test_class_members_and_release_guard() {
    let mut graph = cxx_graph("shapes");
    let circle = add_circle(&mut graph);
    graph.add(
        Some(circle),
        Decl::variable("Circle::radius", TypeSig::Double).with_variable_role(VariableRole::Member),
    );
    let out = run(graph);

    assert!(!out.diagnostics.has_errors());
    assert!(out.wrapper.contains("#define SWIGPOLICY_Circle swig::ASSIGNMENT_DEFAULT\n"));
    assert!(out.wrapper.contains("delete arg1;"));
    assert!(out.wrapper.contains("if (arg1) (arg1)->radius = arg2;"));

    let module = &out.module;
    assert!(module.contains(" ! class Circle\n type, public :: Circle\n  type(SwigClassWrapper), public :: swigdata\n contains\n"));
    assert!(module.contains("  procedure :: get_radius => swigf_Circle_radius_get\n"));
    assert!(module.contains("  procedure :: set_radius => swigf_Circle_radius_set\n"));
    assert!(module.contains("  procedure :: release => swigf_release_Circle\n"));
    assert!(module.contains("  generic :: assignment(=) => swigf_Circle_op_assign__\n end type Circle\n"));
    assert!(module.contains(
        "  if (btest(farg1%cmemflags, swig_cmem_own_bit)) then\n    call swigc_delete_Circle(farg1)\n  endif\n  farg1%cptr = C_NULL_PTR\n  farg1%cmemflags = 0\n  self%swigdata = farg1\n"
    ));
    assert!(module.contains(" interface Circle\n  module procedure swigf_create_Circle\n end interface\n"));
    assert!(module.contains("function swigf_create_Circle() &\n     result(self)\n"));
    assert!(module.contains("  self%swigdata = fresult\n"));
}

#[test]
fn test_overloaded_constructors_keep_declaration_order() {
    let mut graph = cxx_graph("shapes");
    let circle = add_circle(&mut graph);
    for (suffix, params) in [
        ("__SWIG_0", vec![]),
        ("__SWIG_1", vec![Param::new("r", TypeSig::Double)]),
    ] {
        graph.add(
            Some(circle),
            Decl::function("Circle::Circle", TypeSig::Void, params)
                .with_function_role(FunctionRole::Constructor)
                .with_overload(suffix),
        );
    }
    let out = run(graph);

    assert!(out.module.contains(
        " interface Circle\n  module procedure swigf_create_Circle__SWIG_0\n  module procedure swigf_create_Circle__SWIG_1\n end interface\n"
    ));
    assert!(out.wrapper.contains("_wrap_new_Circle__SWIG_1("));
    assert!(out.wrapper.contains("result = (Circle *)new Circle(arg1);"));
    assert_eq!(out.module.matches("function swigf_create_Circle").count(), 2);
}

#[test]
fn test_bindc_struct_components() {
    let mut graph = cxx_graph("points");
    let point = graph.add(
        None,
        Decl::class("Point").with_features(Features {
            bindc: true,
            ..Features::default()
        }),
    );
    for member in ["x", "y"] {
        graph.add(
            Some(point),
            Decl::variable(format!("Point::{}", member), TypeSig::Double)
                .with_variable_role(VariableRole::Member),
        );
    }
    let out = run(graph);

    assert!(out.module.contains(
        " type, bind(C), public :: Point\n  real(C_DOUBLE), public :: x\n  real(C_DOUBLE), public :: y\n end type Point\n"
    ));
    assert!(!out.module.contains("swigdata"));
    assert!(!out.wrapper.contains("_wrap_Point"));
}

#[test]
fn test_bindc_struct_rejects_member_function() {
    let mut graph = cxx_graph("points");
    let point = graph.add(
        None,
        Decl::class("Point").with_features(Features {
            bindc: true,
            ..Features::default()
        }),
    );
    graph.add(
        Some(point),
        Decl::function("Point::norm", TypeSig::Double, vec![]).with_function_role(FunctionRole::Member),
    );
    match run_err(graph) {
        GenError::BindCMethod { name, member, .. } => {
            assert_eq!(name, "Point");
            assert_eq!(member, "norm");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_bindc_struct_rejects_base_and_opaque_member() {
    let mut graph = cxx_graph("points");
    graph.add(None, Decl::class("Base"));
    graph.add(
        None,
        Decl::class("Point").with_bases(&["Base"]).with_features(Features {
            bindc: true,
            ..Features::default()
        }),
    );
    assert!(matches!(run_err(graph), GenError::BindCBase { ref name, .. } if name == "Point"));

    let mut graph = cxx_graph("points");
    add_circle(&mut graph);
    let point = graph.add(
        None,
        Decl::class("Point").with_features(Features {
            bindc: true,
            ..Features::default()
        }),
    );
    graph.add(
        Some(point),
        Decl::variable("Point::center", TypeSig::named("Circle")).with_variable_role(VariableRole::Member),
    );
    assert!(matches!(run_err(graph), GenError::BindCMember { ref member, .. } if member == "center"));
}

#[test]
fn test_native_enum() {
    let mut graph = cxx_graph("colors");
    let color = graph.add(None, Decl::enumeration(Some("Color")));
    graph.add(Some(color), Decl::enum_member("RED", None));
    graph.add(Some(color), Decl::enum_member("GREEN", Some("2")));
    graph.add(Some(color), Decl::enum_member("BLUE", None));
    let out = run(graph);

    assert!(out.module.contains(
        " ! enum Color\n enum, bind(c)\n  enumerator :: RED\n  enumerator :: GREEN = 2\n  enumerator :: BLUE\n end enum\n integer, parameter, public :: Color = kind(RED)\n public :: RED, GREEN, BLUE\n"
    ));
}

#[test]
fn test_native_enum_without_members_falls_back_to_kind() {
    let mut graph = cxx_graph("colors");
    let color = graph.add(None, Decl::enumeration(Some("Color")));
    graph.add(Some(color), Decl::enum_member("RED", None));
    graph.add(Some(color), Decl::enum_member("GREEN", Some("2")));
    let out = run_with(graph, &TypemapTable::new());

    assert!(out.diagnostics.mentions(DiagnosticCode::TypemapUndefined, "RED"));
    assert!(!out.module.contains("enum, bind(c)"));
    assert!(!out.module.contains("end enum"));
    assert!(out
        .module
        .contains(" ! enum Color\n integer, parameter, public :: Color = C_INT\n"));
}

#[test]
fn test_computed_enum_values_are_bound_constants() {
    let mut graph = cxx_graph("bits");
    let flags = graph.add(None, Decl::enumeration(Some("Flags")));
    graph.add(Some(flags), Decl::enum_member("A", Some("0")));
    graph.add(Some(flags), Decl::enum_member("B", Some("1 << 3")));
    let out = run(graph);

    assert!(!out.module.contains("enum, bind(c)"));
    assert!(!out.module.contains("enumerator"));
    for name in ["A", "B"] {
        assert!(out.module.contains(&format!(
            " integer(C_INT), protected, public, &\n   bind(C, name=\"_wrap_{0}\") :: {0}\n",
            name
        )));
        assert!(out
            .wrapper
            .contains(&format!("_wrap_{0} = SWIG_static_cast({0}, int);", name)));
    }
    assert!(out.module.contains(" integer, parameter, public :: Flags = C_INT\n"));
}

#[test]
fn test_enum_named_like_module_is_skipped() {
    let mut graph = cxx_graph("flags");
    let flags = graph.add(None, Decl::enumeration(Some("Flags")));
    graph.add(Some(flags), Decl::enum_member("READ", Some("1 << 0")));
    let out = run(graph);

    assert!(out.diagnostics.mentions(DiagnosticCode::NameConflict, "Flags"));
    assert!(!out.module.contains("_wrap_READ"));
}

#[test]
fn test_parameters_get_kind_suffix() {
    let mut graph = cxx_graph("consts");
    let native = Features {
        fortran_const: Some(true),
        ..Features::default()
    };
    graph.add(
        None,
        Decl::constant("PI", TypeSig::Double, "3.14159").with_features(native.clone()),
    );
    graph.add(None, Decl::constant("N", TypeSig::int(), "42").with_features(native));
    let out = run(graph);

    assert!(out
        .module
        .contains(" real(C_DOUBLE), parameter, public :: PI = 3.14159_C_DOUBLE\n"));
    assert!(out.module.contains(" integer(C_INT), parameter, public :: N = 42_C_INT\n"));
    assert!(out.diagnostics.mentions(DiagnosticCode::KindSuffix, "3.14159"));
    assert!(!out.diagnostics.mentions(DiagnosticCode::KindSuffix, "42"));
}

#[test]
fn test_literal_constants_become_parameters() {
    let mut graph = cxx_graph("consts");
    graph.add(None, Decl::constant("LIMIT", TypeSig::int(), "-8"));
    let opaque = Features {
        fortran_const: Some(false),
        ..Features::default()
    };
    graph.add(
        None,
        Decl::constant("SEED", TypeSig::int(), "7").with_features(opaque),
    );
    let out = run(graph);

    assert!(out.module.contains(" integer(C_INT), parameter, public :: LIMIT = -8_C_INT\n"));
    assert!(out
        .module
        .contains(" integer(C_INT), protected, public, &\n   bind(C, name=\"_wrap_SEED\") :: SEED\n"));
    assert!(out.wrapper.contains("_wrap_SEED = "));
}

#[test]
fn test_multi_statement_constant_is_an_error() {
    let mut table = TypemapTable::with_builtins();
    table.add(TypemapRule::new(TypemapMethod::BindC, parse("const char *"), "type(C_PTR)"));

    let mut graph = cxx_graph("consts");
    graph.add(None, Decl::constant("GREETING", parse("const char *"), "\"hello\""));
    let out = run_with(graph, &table);

    assert!(out.diagnostics.has_errors());
    assert!(out.diagnostics.mentions(DiagnosticCode::NativeUnimplemented, "GREETING"));
    assert!(!out.module.contains("GREETING"));
}

#[test]
fn test_multiple_inheritance_keeps_first_base() {
    let mut graph = cxx_graph("tree");
    graph.add(None, Decl::class("A"));
    graph.add(None, Decl::class("B"));
    graph.add(None, Decl::class("C").with_bases(&["A", "B"]));
    let out = run(graph);

    assert!(out.module.contains(" type, extends(A), public :: C\n"));
    assert!(out.diagnostics.mentions(DiagnosticCode::MultipleInheritance, "B"));
    assert!(!out.module.contains("extends(B)"));
}

#[test]
fn test_second_base_members_not_inherited() {
    let mut graph = cxx_graph("tree");
    graph.add(None, Decl::class("A"));
    let b = graph.add(None, Decl::class("B"));
    graph.add(
        Some(b),
        Decl::function("B::grow", TypeSig::Void, vec![]).with_function_role(FunctionRole::Member),
    );
    graph.add(None, Decl::class("C").with_bases(&["A", "B"]));
    let out = run(graph);

    let module = &out.module;
    let start = module.find(" type, extends(A), public :: C\n").expect("C is declared");
    let end = start + module[start..].find(" end type C\n").expect("C is closed");
    assert!(!module[start..end].contains("grow"));
    assert!(module.contains("grow"));
}

#[test]
fn test_opaque_type_declared_once() {
    let mut graph = cxx_graph("widgets");
    for name in ["show", "hide"] {
        graph.add(
            None,
            Decl::function(name, TypeSig::Void, vec![Param::new("w", parse("Widget *"))]),
        );
    }
    let out = run(graph);

    assert_eq!(out.module.matches(" type, public :: SWIGTYPE_Widget\n").count(), 1);
    assert!(out.module.contains("class(SWIGTYPE_Widget), intent(in) :: w"));
}

#[test]
fn test_function_demoted_to_subroutine() {
    let mut graph = cxx_graph("shapes");
    graph.add(
        None,
        Decl::function("area", TypeSig::Double, vec![]).with_features(Features {
            subroutine: true,
            ..Features::default()
        }),
    );
    let out = run(graph);

    assert!(out.module.contains("subroutine area(swig_result)\n"));
    assert!(out
        .module
        .contains("  real(C_DOUBLE), intent(out), optional :: swig_result\n"));
    assert!(out
        .module
        .contains("  if (present(swig_result)) then\n    swig_result = fresult\n  endif\n"));
}

#[test]
fn test_subroutine_demotion_refused_by_ftype() {
    let mut table = TypemapTable::with_builtins();
    table.add(
        TypemapRule::new(TypemapMethod::FType, TypeSig::Double, "real(C_DOUBLE)")
            .with_kwarg("nofortransubroutine", "1"),
    );
    let mut graph = cxx_graph("shapes");
    graph.add(
        None,
        Decl::function("area", TypeSig::Double, vec![]).with_features(Features {
            subroutine: true,
            ..Features::default()
        }),
    );
    let out = run_with(graph, &table);

    assert!(out.diagnostics.mentions(DiagnosticCode::NoSubroutine, "area"));
    assert!(out.module.contains("function area() &\n     result(swig_result)\n"));
}

#[test]
fn test_bindc_function_is_bound_directly() {
    let mut graph = c_graph("arith");
    graph.add(
        None,
        Decl::function(
            "add",
            TypeSig::int(),
            vec![Param::new("a", TypeSig::int()), Param::new("b", TypeSig::int())],
        )
        .with_features(Features {
            bindc: true,
            ..Features::default()
        }),
    );
    let out = run(graph);

    assert!(out.diagnostics.is_empty());
    assert!(out.module.contains(
        "function add(a, b) &\n    bind(C, name=\"add\") &\n     result(fresult)\n   use, intrinsic :: ISO_C_BINDING\n   integer(C_INT), intent(in), value :: a\n   integer(C_INT), intent(in), value :: b\n   integer(C_INT) :: fresult\n  end function\n"
    ));
    assert!(out.module.contains(" public :: add\n"));
    assert!(!out.wrapper.contains("_wrap_add"));
}

#[test]
fn test_case_insensitive_name_conflict_skips_later_declaration() {
    let mut graph = cxx_graph("names");
    graph.add(None, Decl::function("foo", TypeSig::Void, vec![]));
    graph.add(None, Decl::function("FOO", TypeSig::Void, vec![]));
    let out = run(graph);

    assert!(out.diagnostics.mentions(DiagnosticCode::NameConflict, "FOO"));
    assert!(out.wrapper.contains("_wrap_foo("));
    assert!(!out.wrapper.contains("_wrap_FOO("));
    assert!(!out.module.contains("swigc_FOO"));
}

#[test]
fn test_output_file_names() {
    let out = run(cxx_graph("shapes"));
    assert_eq!(out.wrapper_file_name(), "shapes_wrap.cxx");
    assert_eq!(out.module_file_name(), "shapes.f90");
    assert!(out.wrapper.contains("#define SWIG_CPLUSPLUS_CAST\n"));

    let config = GenConfig {
        cppcast: false,
        fext: "F90".to_string(),
    };
    let out = generate(c_graph("shapes"), &config, &TypemapTable::with_builtins()).expect("generate");
    assert_eq!(out.wrapper_file_name(), "shapes_wrap.c");
    assert_eq!(out.module_file_name(), "shapes.F90");
    assert!(!out.wrapper.contains("#define SWIG_CPLUSPLUS_CAST"));
}

fn features_bindc() -> Features {
    Features {
        bindc: true,
        ..Features::default()
    }
}

#[test]
fn test_varargs_dropped_from_proxy() {
    let mut graph = c_graph("sums");
    graph.add(
        None,
        Decl::function(
            "total",
            TypeSig::int(),
            vec![Param::new("n", TypeSig::int()), Param::unnamed(TypeSig::VarArgs)],
        ),
    );
    let out = run(graph);

    assert!(!out.diagnostics.has_errors());
    assert!(out.diagnostics.mentions(DiagnosticCode::NativeUnimplemented, "total"));
    assert!(out.wrapper.contains("total(arg1)"));
    assert!(out.module.contains(" public :: total\n"));
    assert!(out.module.contains("bind(C, name=\"_wrap_total\")"));
}

#[test]
fn test_varargs_reject_direct_binding() {
    let mut graph = c_graph("sums");
    graph.add(
        None,
        Decl::function(
            "total",
            TypeSig::int(),
            vec![Param::new("n", TypeSig::int()), Param::unnamed(TypeSig::VarArgs)],
        )
        .with_features(features_bindc()),
    );
    let out = run(graph);

    assert!(out.diagnostics.mentions(DiagnosticCode::NativeUnimplemented, "total"));
    assert!(!out.module.contains("bind(C, name=\"total\")"));
    assert!(!out.module.contains(" public :: total\n"));
}

#[test]
fn test_overloaded_direct_binding_is_an_error() {
    let mut graph = c_graph("arith");
    graph.add(
        None,
        Decl::function("scale", TypeSig::Double, vec![Param::new("x", TypeSig::Double)])
            .with_overload("__SWIG_0")
            .with_features(features_bindc()),
    );
    let out = run(graph);

    assert!(out.diagnostics.has_errors());
    assert!(out.diagnostics.mentions(DiagnosticCode::InvalidDeclaration, "scale"));
    assert!(!out.module.contains("bind(C, name=\"scale\")"));
}

#[test]
fn test_missing_direct_binding_typemap_is_an_error() {
    let mut graph = cxx_graph("shapes");
    add_circle(&mut graph);
    graph.add(
        None,
        Decl::function("draw", TypeSig::Void, vec![Param::new("c", TypeSig::named("Circle"))])
            .with_features(features_bindc()),
    );
    let out = run(graph);

    assert!(out.diagnostics.has_errors());
    assert!(out
        .diagnostics
        .errors()
        .any(|d| d.code == DiagnosticCode::TypemapUndefined && d.message.contains("draw")));
    assert!(!out.module.contains("bind(C, name=\"draw\")"));
}

#[test]
fn test_method_named_like_class_is_dropped() {
    let mut graph = cxx_graph("shapes");
    let circle = add_circle(&mut graph);
    graph.add(
        Some(circle),
        Decl::function("Circle::circle", TypeSig::Void, vec![])
            .with_function_role(FunctionRole::Member),
    );
    let out = run(graph);

    assert!(out.diagnostics.mentions(DiagnosticCode::NameConflict, "circle"));
    assert!(!out.module.contains("procedure :: circle"));
    assert!(out.module.contains(" type, public :: Circle\n"));
}

#[test]
fn test_interface_imports_are_deduplicated() {
    let mut graph = cxx_graph("widgets");
    graph.add(None, Decl::class("Widget"));
    graph.add(
        None,
        Decl::function(
            "swap",
            TypeSig::Void,
            vec![
                Param::new("a", parse("Widget *")),
                Param::new("b", parse("Widget *")),
            ],
        ),
    );
    let out = run(graph);

    let module = &out.module;
    let start = module.find("subroutine swigc_swap(").expect("interface is declared");
    let end = start + module[start..].find("end subroutine").expect("interface is closed");
    assert_eq!(module[start..end].matches("   import :: SwigClassWrapper\n").count(), 1);
}

#[test]
fn test_function_pointer_return_uses_typedef() {
    let mut graph = c_graph("callbacks");
    graph.add(None, Decl::function("handler", parse("int (*)(double)"), vec![]));
    let out = run(graph);

    assert!(!out.diagnostics.has_errors());
    assert!(out.wrapper.contains("typedef int (*handler_swigrtype)(double);\n"));
    assert!(out.wrapper.contains("SWIGEXPORT handler_swigrtype _wrap_handler("));
}
