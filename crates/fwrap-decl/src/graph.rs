use crate::decl::{Decl, DeclId, DeclKind, ModuleInfo};
use crate::types::TypeSig;
use rustc_hash::FxHashMap;

/// Maximum typedef chain followed by [`DeclGraph::resolve`].
const MAX_TYPEDEF_DEPTH: usize = 64;

/// A fully resolved declaration graph.
///
/// Declarations are stored in one arena and addressed by [`DeclId`]. The
/// top-level declarations are kept in `roots` in declaration order; each
/// class and enum lists its members in `children`.
#[derive(Debug, Clone, Default)]
pub struct DeclGraph {
    module: ModuleInfo,
    decls: Vec<Decl>,
    roots: Vec<DeclId>,
    typedefs: FxHashMap<String, TypeSig>,
    classes: FxHashMap<String, DeclId>,
    enums: FxHashMap<String, DeclId>,
}

impl DeclGraph {
    pub fn new(module: ModuleInfo) -> Self {
        Self {
            module,
            ..Default::default()
        }
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut ModuleInfo {
        &mut self.module
    }

    /// Add a declaration under `parent` (or at the top level) after all of
    /// its existing siblings.
    pub fn add(&mut self, parent: Option<DeclId>, mut decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        decl.id = Some(id);
        decl.parent = parent;
        decl.children.clear();

        match &decl.kind {
            DeclKind::Class(_) => {
                self.classes.entry(decl.name.clone()).or_insert(id);
            }
            DeclKind::Enum(_) if !decl.name.is_empty() => {
                self.enums.entry(decl.name.clone()).or_insert(id);
            }
            _ => {}
        }

        self.decls.push(decl);
        match parent {
            Some(parent) => self.decls[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Register `name` as an alias of `target`.
    pub fn add_typedef(&mut self, name: impl Into<String>, target: TypeSig) {
        self.typedefs.insert(name.into(), target);
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    pub fn children(&self, id: DeclId) -> &[DeclId] {
        &self.decls[id.index()].children
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.decls.iter()
    }

    /// The class definition with the given qualified name.
    pub fn find_class(&self, name: &str) -> Option<DeclId> {
        self.classes.get(name).copied()
    }

    /// The enum definition with the given qualified name.
    pub fn find_enum(&self, name: &str) -> Option<DeclId> {
        self.enums.get(name).copied()
    }

    /// Resolve every typedef name inside `ty` to the type it aliases.
    pub fn resolve(&self, ty: &TypeSig) -> TypeSig {
        self.resolve_depth(ty, 0)
    }

    fn resolve_depth(&self, ty: &TypeSig, depth: usize) -> TypeSig {
        if depth > MAX_TYPEDEF_DEPTH {
            return ty.clone();
        }
        let next = depth + 1;
        match ty {
            TypeSig::Named(name) => match self.typedefs.get(name) {
                Some(target) if target != ty => self.resolve_depth(target, next),
                _ => ty.clone(),
            },
            TypeSig::Const(inner) => self.resolve_depth(inner, next).constant(),
            TypeSig::Pointer(inner) => TypeSig::Pointer(Box::new(self.resolve_depth(inner, next))),
            TypeSig::Reference {
                referent,
                is_rvalue,
            } => TypeSig::Reference {
                referent: Box::new(self.resolve_depth(referent, next)),
                is_rvalue: *is_rvalue,
            },
            TypeSig::Array { element, dim } => TypeSig::Array {
                element: Box::new(self.resolve_depth(element, next)),
                dim: dim.clone(),
            },
            TypeSig::Function {
                return_type,
                params,
            } => TypeSig::Function {
                return_type: Box::new(self.resolve_depth(return_type, next)),
                params: params.iter().map(|p| self.resolve_depth(p, next)).collect(),
            },
            TypeSig::MemberPointer { class, pointee } => TypeSig::MemberPointer {
                class: class.clone(),
                pointee: Box::new(self.resolve_depth(pointee, next)),
            },
            other => other.clone(),
        }
    }
}
