//! Declaration records.

use crate::types::TypeSig;
use fwrap_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// Index of a declaration inside its [`crate::DeclGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Access level of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeSig,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeSig) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeSig) -> Self {
        Self { name: None, ty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionRole {
    #[default]
    Free,
    Member,
    StaticMember,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub params: Vec<Param>,
    pub role: FunctionRole,
    /// Disambiguating suffix assigned by the front end when several
    /// signatures share one symbol name (e.g. `__SWIG_1`).
    pub overload: Option<String>,
    /// Declared with `extern "C"` linkage.
    pub is_extern_c: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    #[default]
    Global,
    Member,
    StaticMember,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub role: VariableRole,
    /// No setter is generated for immutable variables.
    pub immutable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKeyword {
    #[default]
    Class,
    Struct,
    Union,
}

impl ClassKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKeyword::Class => "class",
            ClassKeyword::Struct => "struct",
            ClassKeyword::Union => "union",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub keyword: ClassKeyword,
    /// Qualified names of the base classes, in declaration order.
    pub bases: Vec<String>,
    /// The class has an accessible default destructor.
    pub has_default_destructor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    /// `enum` or `enum class`.
    pub enum_key: String,
    /// Storage class written before the enum, such as `typedef`.
    pub storage: Option<String>,
    /// Only a forward declaration of this enum is visible.
    pub missing: bool,
}

/// Kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Function(FunctionDecl),
    Variable(VariableDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    EnumMember {
        /// Initializer as written, if any.
        enum_value: Option<String>,
        /// C expression that evaluates to the member.
        value: String,
    },
    Constant {
        /// C expression that evaluates to the constant.
        value: String,
        /// Literal spelling of the value, when the front end kept one.
        raw_value: Option<String>,
    },
    ClassForward,
    EnumForward,
}

impl DeclKind {
    pub fn name(&self) -> &'static str {
        match self {
            DeclKind::Function(f) => match f.role {
                FunctionRole::Constructor => "constructor",
                FunctionRole::Destructor => "destructor",
                _ => "function",
            },
            DeclKind::Variable(_) => "variable",
            DeclKind::Class(_) => "class",
            DeclKind::Enum(_) => "enum",
            DeclKind::EnumMember { .. } => "enumerator",
            DeclKind::Constant { .. } => "constant",
            DeclKind::ClassForward => "class forward declaration",
            DeclKind::EnumForward => "enum forward declaration",
        }
    }
}

/// Feature overrides requested for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Features {
    /// Do not wrap this declaration.
    pub ignore: bool,
    /// Expose directly through the C ABI: `bind(C)` functions and structs.
    pub bindc: bool,
    /// Public generic name this procedure joins.
    pub generic: Option<String>,
    /// Public name overriding the symbol name.
    pub rename: Option<String>,
    /// Force (`true`) or forbid (`false`) native constants and enums.
    #[serde(rename = "const")]
    pub fortran_const: Option<bool>,
    /// Literal used instead of the declared value of a constant.
    pub const_value: Option<String>,
    /// Turn a function into a subroutine with an optional result argument.
    pub subroutine: bool,
    /// Proxy code inserted before the interface call.
    pub prepend: Option<String>,
    /// Proxy code inserted after the result conversion.
    pub append: Option<String>,
    /// C code replacing the default call expression.
    pub action: Option<String>,
    /// Smart pointer type wrapping instances of this class.
    pub smartptr: Option<String>,
    pub docstring: Option<String>,
    /// The returned object is owned by the caller.
    pub new_object: bool,
    /// Suppress implicit constructors and destructors.
    pub nodefault: bool,
    /// The action contains contract assertions.
    pub contract: bool,
    /// Wrap the members of a class without the class itself.
    pub only_children: bool,
    /// Runtime fragment required by the wrapper code.
    pub fragment: Option<String>,
}

/// Section of the generated output a raw code block is inserted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertSection {
    Begin,
    Runtime,
    Header,
    Wrapper,
    Init,
    Fbegin,
    Fuse,
    Fdecl,
    Fsubprograms,
}

/// The `module` directive of the wrapped library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInfo {
    pub name: String,
    pub docstring: Option<String>,
    /// Other generated modules this module depends on.
    pub imports: Vec<String>,
    /// Generate C++ rather than C wrapper code.
    pub cplusplus: bool,
    /// Raw code blocks, emitted in order into their sections.
    pub inserts: Vec<(InsertSection, String)>,
}

impl Default for ModuleInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            docstring: None,
            imports: Vec::new(),
            cplusplus: true,
            inserts: Vec::new(),
        }
    }
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One declaration of the wrapped library.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub(crate) id: Option<DeclId>,
    pub(crate) parent: Option<DeclId>,
    pub(crate) children: Vec<DeclId>,
    /// Qualified C/C++ name.
    pub name: String,
    /// Symbol name after front-end renaming.
    pub sym_name: Option<String>,
    /// Target namespace the wrappers are placed in.
    pub nspace: Option<String>,
    /// Return type for functions, value type for variables and constants,
    /// the named type itself for classes and enums.
    pub ty: TypeSig,
    pub access: Access,
    pub location: SourceLocation,
    pub features: Features,
    pub kind: DeclKind,
}

impl Decl {
    pub fn new(name: impl Into<String>, ty: TypeSig, kind: DeclKind) -> Self {
        Self {
            id: None,
            parent: None,
            children: Vec::new(),
            name: name.into(),
            sym_name: None,
            nspace: None,
            ty,
            access: Access::Public,
            location: SourceLocation::default(),
            features: Features::default(),
            kind,
        }
    }

    pub fn function(name: impl Into<String>, return_type: TypeSig, params: Vec<Param>) -> Self {
        Self::new(
            name,
            return_type,
            DeclKind::Function(FunctionDecl {
                params,
                role: FunctionRole::Free,
                overload: None,
                is_extern_c: false,
            }),
        )
    }

    pub fn variable(name: impl Into<String>, ty: TypeSig) -> Self {
        Self::new(
            name,
            ty,
            DeclKind::Variable(VariableDecl {
                role: VariableRole::Global,
                immutable: false,
            }),
        )
    }

    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            name.clone(),
            TypeSig::Named(name),
            DeclKind::Class(ClassDecl {
                keyword: ClassKeyword::Class,
                bases: Vec::new(),
                has_default_destructor: true,
            }),
        )
    }

    /// An enum; `None` creates an anonymous enum.
    pub fn enumeration(name: Option<&str>) -> Self {
        let ty = match name {
            Some(name) => TypeSig::Enum(name.to_string()),
            None => TypeSig::int(),
        };
        Self::new(
            name.unwrap_or_default(),
            ty,
            DeclKind::Enum(EnumDecl {
                enum_key: "enum".to_string(),
                storage: None,
                missing: false,
            }),
        )
    }

    pub fn enum_member(name: impl Into<String>, enum_value: Option<&str>) -> Self {
        let name = name.into();
        Self::new(
            name.clone(),
            TypeSig::int(),
            DeclKind::EnumMember {
                enum_value: enum_value.map(str::to_string),
                value: name,
            },
        )
    }

    pub fn constant(name: impl Into<String>, ty: TypeSig, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            name,
            ty,
            DeclKind::Constant {
                raw_value: Some(value.clone()),
                value,
            },
        )
    }

    pub fn with_sym_name(mut self, sym_name: impl Into<String>) -> Self {
        self.sym_name = Some(sym_name.into());
        self
    }

    pub fn with_nspace(mut self, nspace: impl Into<String>) -> Self {
        self.nspace = Some(nspace.into());
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Set the role of a function or variable declaration.
    pub fn with_function_role(mut self, role: FunctionRole) -> Self {
        if let DeclKind::Function(f) = &mut self.kind {
            f.role = role;
        }
        self
    }

    pub fn with_variable_role(mut self, role: VariableRole) -> Self {
        if let DeclKind::Variable(v) = &mut self.kind {
            v.role = role;
        }
        self
    }

    pub fn with_overload(mut self, suffix: impl Into<String>) -> Self {
        if let DeclKind::Function(f) = &mut self.kind {
            f.overload = Some(suffix.into());
        }
        self
    }

    pub fn with_bases(mut self, bases: &[&str]) -> Self {
        if let DeclKind::Class(c) = &mut self.kind {
            c.bases = bases.iter().map(|b| b.to_string()).collect();
        }
        self
    }

    /// The graph index of this declaration, once added to a graph.
    pub fn id(&self) -> Option<DeclId> {
        self.id
    }

    pub fn parent(&self) -> Option<DeclId> {
        self.parent
    }

    pub fn children(&self) -> &[DeclId] {
        &self.children
    }

    /// Symbol name, falling back to the unqualified declared name.
    pub fn symbol(&self) -> &str {
        match &self.sym_name {
            Some(sym) => sym,
            None => self.name.rsplit("::").next().unwrap_or(&self.name),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match &self.kind {
            DeclKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn params(&self) -> &[Param] {
        match &self.kind {
            DeclKind::Function(f) => &f.params,
            _ => &[],
        }
    }
}
