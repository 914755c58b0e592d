//! Loading a declaration graph from the front end's JSON form.
//!
//! The document has three parts: the `module` record, an optional list of
//! `typedefs`, and the `decls` tree. Type signatures are C declarator
//! strings such as `"const Foo &"`.

use crate::decl::{
    Access, ClassDecl, ClassKeyword, Decl, DeclId, DeclKind, EnumDecl, Features, FunctionDecl,
    FunctionRole, ModuleInfo, Param, VariableDecl, VariableRole,
};
use crate::error::{DeclError, Result};
use crate::graph::DeclGraph;
use crate::types::TypeSig;
use fwrap_common::SourceLocation;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphSpec {
    module: ModuleInfo,
    #[serde(default)]
    typedefs: Vec<TypedefSpec>,
    #[serde(default)]
    decls: Vec<DeclSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypedefSpec {
    name: String,
    #[serde(rename = "type")]
    ty: TypeSig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindTag {
    Function,
    Variable,
    Class,
    Enum,
    EnumMember,
    Constant,
    ClassForward,
    EnumForward,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocationSpec {
    file: Option<String>,
    #[serde(default)]
    line: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamSpec {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: TypeSig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclSpec {
    kind: KindTag,
    #[serde(default)]
    name: String,
    sym_name: Option<String>,
    nspace: Option<String>,
    #[serde(rename = "type")]
    ty: Option<TypeSig>,
    #[serde(default)]
    access: Access,
    location: Option<LocationSpec>,
    #[serde(default)]
    features: Features,

    // functions and variables
    role: Option<String>,
    #[serde(default)]
    params: Vec<ParamSpec>,
    overload: Option<String>,
    #[serde(default)]
    extern_c: bool,
    #[serde(default)]
    immutable: bool,

    // classes
    keyword: Option<ClassKeyword>,
    #[serde(default)]
    bases: Vec<String>,
    default_destructor: Option<bool>,

    // enums
    enum_key: Option<String>,
    storage: Option<String>,
    #[serde(default)]
    missing: bool,

    // enum members and constants
    enum_value: Option<String>,
    value: Option<String>,
    raw_value: Option<String>,

    #[serde(default)]
    children: Vec<DeclSpec>,
}

/// Parse a JSON declaration graph.
pub fn load_graph(json: &str) -> Result<DeclGraph> {
    let spec: GraphSpec = serde_json::from_str(json)?;
    let mut graph = DeclGraph::new(spec.module);
    for typedef in spec.typedefs {
        graph.add_typedef(typedef.name, typedef.ty);
    }
    for decl in spec.decls {
        add_spec(&mut graph, None, decl)?;
    }
    Ok(graph)
}

fn invalid(name: &str, reason: impl Into<String>) -> DeclError {
    DeclError::InvalidDecl {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn add_spec(graph: &mut DeclGraph, parent: Option<DeclId>, spec: DeclSpec) -> Result<DeclId> {
    let parent_kind = parent.map(|p| graph.get(p).kind.clone());
    let in_class = matches!(parent_kind, Some(DeclKind::Class(_)));

    if spec.name.is_empty() && spec.kind != KindTag::Enum {
        return Err(invalid("<anonymous>", "only enums may be anonymous"));
    }
    if !spec.children.is_empty() && !matches!(spec.kind, KindTag::Class | KindTag::Enum) {
        return Err(invalid(&spec.name, "only classes and enums have children"));
    }

    let kind = match spec.kind {
        KindTag::Function => {
            let role = match spec.role.as_deref() {
                None if in_class => FunctionRole::Member,
                None | Some("free") => FunctionRole::Free,
                Some("member") => FunctionRole::Member,
                Some("static_member") => FunctionRole::StaticMember,
                Some("constructor") => FunctionRole::Constructor,
                Some("destructor") => FunctionRole::Destructor,
                Some(other) => return Err(invalid(&spec.name, format!("unknown function role '{}'", other))),
            };
            DeclKind::Function(FunctionDecl {
                params: spec
                    .params
                    .into_iter()
                    .map(|p| Param { name: p.name, ty: p.ty })
                    .collect(),
                role,
                overload: spec.overload,
                is_extern_c: spec.extern_c,
            })
        }
        KindTag::Variable => {
            let role = match spec.role.as_deref() {
                None if in_class => VariableRole::Member,
                None | Some("global") => VariableRole::Global,
                Some("member") => VariableRole::Member,
                Some("static_member") => VariableRole::StaticMember,
                Some(other) => return Err(invalid(&spec.name, format!("unknown variable role '{}'", other))),
            };
            DeclKind::Variable(VariableDecl {
                role,
                immutable: spec.immutable,
            })
        }
        KindTag::Class => DeclKind::Class(ClassDecl {
            keyword: spec.keyword.unwrap_or_default(),
            bases: spec.bases,
            has_default_destructor: spec.default_destructor.unwrap_or(true),
        }),
        KindTag::Enum => DeclKind::Enum(EnumDecl {
            enum_key: spec.enum_key.unwrap_or_else(|| "enum".to_string()),
            storage: spec.storage,
            missing: spec.missing,
        }),
        KindTag::EnumMember => {
            if !matches!(parent_kind, Some(DeclKind::Enum(_))) {
                return Err(invalid(&spec.name, "enum members must be children of an enum"));
            }
            DeclKind::EnumMember {
                enum_value: spec.enum_value,
                value: spec.value.unwrap_or_else(|| spec.name.clone()),
            }
        }
        KindTag::Constant => {
            let value = spec
                .value
                .ok_or_else(|| invalid(&spec.name, "constants need a value"))?;
            DeclKind::Constant {
                raw_value: spec.raw_value,
                value,
            }
        }
        KindTag::ClassForward => DeclKind::ClassForward,
        KindTag::EnumForward => DeclKind::EnumForward,
    };

    let ty = match (spec.ty, &kind) {
        (Some(ty), _) => ty,
        (None, DeclKind::Function(_)) => TypeSig::Void,
        (None, DeclKind::Class(_)) | (None, DeclKind::ClassForward) => {
            TypeSig::Named(spec.name.clone())
        }
        (None, DeclKind::Enum(_)) if spec.name.is_empty() => TypeSig::int(),
        (None, DeclKind::Enum(_)) | (None, DeclKind::EnumForward) => {
            TypeSig::Enum(spec.name.clone())
        }
        (None, DeclKind::EnumMember { .. }) => match parent {
            Some(p) => graph.get(p).ty.clone(),
            None => TypeSig::int(),
        },
        (None, _) => return Err(invalid(&spec.name, "missing 'type'")),
    };

    let mut decl = Decl::new(spec.name, ty, kind);
    decl.sym_name = spec.sym_name;
    decl.nspace = spec.nspace;
    decl.access = spec.access;
    decl.features = spec.features;
    if let Some(loc) = spec.location {
        decl.location = SourceLocation {
            file: loc.file,
            line: loc.line,
        };
    }

    let id = graph.add(parent, decl);
    for child in spec.children {
        add_spec(graph, Some(id), child)?;
    }
    Ok(id)
}
