//! C/C++ type signatures.
//!
//! A [`TypeSig`] is the queryable type descriptor attached to every
//! declaration. Signatures are parsed from plain C declarator text (the form
//! the external parser and the typemap engine both speak) and rendered back
//! with an identifier inserted at the right place, which matters for
//! function pointers and arrays that cannot be written as `TYPE name`.

use crate::error::{DeclError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A C/C++ type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    /// void
    Void,
    /// bool
    Bool,
    /// char, signed char, unsigned char (`None` is plain `char`)
    Char { signed: Option<bool> },
    /// short, unsigned short
    Short { signed: bool },
    /// int, unsigned int
    Int { signed: bool },
    /// long, unsigned long
    Long { signed: bool },
    /// long long, unsigned long long
    LongLong { signed: bool },
    /// float
    Float,
    /// double
    Double,
    /// Class, struct, union or typedef name (possibly qualified)
    Named(String),
    /// Enumeration name (possibly qualified)
    Enum(String),
    /// const-qualified type
    Const(Box<TypeSig>),
    /// Pointer type: T*
    Pointer(Box<TypeSig>),
    /// Reference type: T& (lvalue) or T&& (rvalue)
    Reference {
        referent: Box<TypeSig>,
        is_rvalue: bool,
    },
    /// Array type: T[N]; the dimension is kept as written
    Array {
        element: Box<TypeSig>,
        dim: Option<String>,
    },
    /// Function type: R(Args...)
    Function {
        return_type: Box<TypeSig>,
        params: Vec<TypeSig>,
    },
    /// Pointer to member: T C::*
    MemberPointer { class: String, pointee: Box<TypeSig> },
    /// `...` in a parameter list
    VarArgs,
}

impl TypeSig {
    /// Create a signed int type.
    pub fn int() -> Self {
        TypeSig::Int { signed: true }
    }

    /// Create a named (class/typedef) type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeSig::Named(name.into())
    }

    /// Create a pointer to this type.
    pub fn ptr(self) -> Self {
        TypeSig::Pointer(Box::new(self))
    }

    /// Create a const-qualified version of this type.
    pub fn constant(self) -> Self {
        match self {
            TypeSig::Const(_) => self,
            other => TypeSig::Const(Box::new(other)),
        }
    }

    /// Create an lvalue reference to this type.
    pub fn reference(self) -> Self {
        TypeSig::Reference {
            referent: Box::new(self),
            is_rvalue: false,
        }
    }

    /// Parse a C declarator such as `const Foo &`, `int (*)(double)` or
    /// `SwigClassWrapper const *`. A declarator name, if present, is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text).map_err(|reason| DeclError::TypeParse {
            input: text.to_string(),
            reason,
        })?;
        let mut parser = TypeParser { tokens, pos: 0 };
        let ty = parser.parse_type().map_err(|reason| DeclError::TypeParse {
            input: text.to_string(),
            reason,
        })?;
        if parser.pos != parser.tokens.len() {
            return Err(DeclError::TypeParse {
                input: text.to_string(),
                reason: format!("unexpected trailing '{}'", parser.tokens[parser.pos]),
            });
        }
        Ok(ty)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeSig::Void)
    }

    pub fn is_varargs(&self) -> bool {
        matches!(self, TypeSig::VarArgs)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.strip_const(), TypeSig::Reference { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.strip_const(), TypeSig::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.strip_const(), TypeSig::Array { .. })
    }

    /// Whether this is a fundamental (builtin arithmetic or void) type.
    pub fn is_fundamental(&self) -> bool {
        matches!(
            self,
            TypeSig::Void
                | TypeSig::Bool
                | TypeSig::Char { .. }
                | TypeSig::Short { .. }
                | TypeSig::Int { .. }
                | TypeSig::Long { .. }
                | TypeSig::LongLong { .. }
                | TypeSig::Float
                | TypeSig::Double
        )
    }

    /// Remove a top-level const qualifier.
    pub fn strip_const(&self) -> &TypeSig {
        match self {
            TypeSig::Const(inner) => inner.strip_const(),
            other => other,
        }
    }

    /// The innermost type once all qualifiers, pointers, references, arrays
    /// and function wrappers have been removed.
    pub fn base(&self) -> &TypeSig {
        match self {
            TypeSig::Const(t) | TypeSig::Pointer(t) => t.base(),
            TypeSig::Reference { referent, .. } => referent.base(),
            TypeSig::Array { element, .. } => element.base(),
            TypeSig::Function { return_type, .. } => return_type.base(),
            TypeSig::MemberPointer { pointee, .. } => pointee.base(),
            other => other,
        }
    }

    /// The type used for a local variable holding a value of this type:
    /// top-level qualifiers dropped, references and arrays become pointers.
    pub fn ltype(&self) -> TypeSig {
        match self {
            TypeSig::Const(inner) => inner.ltype(),
            TypeSig::Reference { referent, .. } => TypeSig::Pointer(referent.clone()),
            TypeSig::Array { element, .. } => TypeSig::Pointer(element.clone()),
            other => other.clone(),
        }
    }

    /// Dimensions of a (possibly nested) array type, outermost first.
    pub fn array_dims(&self) -> Vec<Option<String>> {
        let mut dims = Vec::new();
        let mut current = self.strip_const();
        while let TypeSig::Array { element, dim } = current {
            dims.push(dim.clone());
            current = element.strip_const();
        }
        dims
    }

    /// Whether a function returning this type must use a typedef for its
    /// return type, because the declarator puts the name in the middle
    /// (pointer to array, pointer to function, pointer to member).
    pub fn needs_typedef(&self) -> bool {
        match self {
            TypeSig::Const(t) => t.needs_typedef(),
            TypeSig::Pointer(t) | TypeSig::Reference { referent: t, .. } => {
                matches!(
                    t.strip_const(),
                    TypeSig::Array { .. } | TypeSig::Function { .. } | TypeSig::MemberPointer { .. }
                ) || t.needs_typedef()
            }
            TypeSig::MemberPointer { .. } | TypeSig::Array { .. } | TypeSig::Function { .. } => true,
            _ => false,
        }
    }

    /// Spelling of a base (non-derived) type.
    fn base_spelling(&self) -> Option<String> {
        let s = match self {
            TypeSig::Void => "void",
            TypeSig::Bool => "bool",
            TypeSig::Char { signed: None } => "char",
            TypeSig::Char { signed: Some(true) } => "signed char",
            TypeSig::Char { signed: Some(false) } => "unsigned char",
            TypeSig::Short { signed: true } => "short",
            TypeSig::Short { signed: false } => "unsigned short",
            TypeSig::Int { signed: true } => "int",
            TypeSig::Int { signed: false } => "unsigned int",
            TypeSig::Long { signed: true } => "long",
            TypeSig::Long { signed: false } => "unsigned long",
            TypeSig::LongLong { signed: true } => "long long",
            TypeSig::LongLong { signed: false } => "unsigned long long",
            TypeSig::Float => "float",
            TypeSig::Double => "double",
            TypeSig::VarArgs => "...",
            TypeSig::Named(name) | TypeSig::Enum(name) => return Some(name.clone()),
            _ => return None,
        };
        Some(s.to_string())
    }

    /// Render as a declaration of `name` (which may be empty).
    pub fn render(&self, name: &str) -> String {
        self.declare(name.to_string()).trim().to_string()
    }

    fn declare(&self, inner: String) -> String {
        if let Some(base) = self.base_spelling() {
            return join_declarator(&base, &inner);
        }
        match self {
            TypeSig::Const(t) => match t.as_ref() {
                TypeSig::Pointer(pointee) => wrap_pointer(pointee, "*const ", inner),
                TypeSig::Array { .. } | TypeSig::Function { .. } => t.declare(inner),
                other => match other.base_spelling() {
                    Some(base) => join_declarator(&format!("const {}", base), &inner),
                    None => other.declare(inner),
                },
            },
            TypeSig::Pointer(pointee) => wrap_pointer(pointee, "*", inner),
            TypeSig::Reference {
                referent,
                is_rvalue,
            } => wrap_pointer(referent, if *is_rvalue { "&&" } else { "&" }, inner),
            TypeSig::MemberPointer { class, pointee } => {
                wrap_pointer(pointee, &format!("{}::*", class), inner)
            }
            TypeSig::Array { element, dim } => {
                element.declare(format!("{}[{}]", inner, dim.as_deref().unwrap_or("")))
            }
            TypeSig::Function {
                return_type,
                params,
            } => {
                let params = if params.is_empty() {
                    "void".to_string()
                } else {
                    params
                        .iter()
                        .map(|p| p.render(""))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                return_type.declare(format!("{}({})", inner, params))
            }
            _ => unreachable!("base types are handled above"),
        }
    }

    /// Mangled spelling used to synthesize identifiers for otherwise
    /// anonymous types, e.g. `_p_Foo` for `Foo *`.
    pub fn mangle(&self) -> String {
        let mut out = String::new();
        self.mangle_into(&mut out);
        out
    }

    fn mangle_into(&self, out: &mut String) {
        match self {
            TypeSig::Const(t) => {
                out.push_str("_q_const");
                t.mangle_into(out);
            }
            TypeSig::Pointer(t) => {
                out.push_str("_p");
                t.mangle_into(out);
            }
            TypeSig::Reference {
                referent,
                is_rvalue,
            } => {
                out.push_str(if *is_rvalue { "_rr" } else { "_r" });
                referent.mangle_into(out);
            }
            TypeSig::Array { element, dim } => {
                out.push_str("_a_");
                out.push_str(&sanitize(dim.as_deref().unwrap_or("")));
                out.push('_');
                element.mangle_into(out);
            }
            TypeSig::Function {
                return_type,
                params,
            } => {
                out.push_str("_f");
                for param in params {
                    param.mangle_into(out);
                }
                out.push_str("__");
                return_type.mangle_into(out);
            }
            TypeSig::MemberPointer { class, pointee } => {
                out.push_str("_m_");
                out.push_str(&sanitize(class));
                out.push('_');
                pointee.mangle_into(out);
            }
            TypeSig::VarArgs => out.push_str("_v_"),
            TypeSig::Enum(name) => {
                out.push_str("_enum_");
                out.push_str(&sanitize(name));
            }
            other => {
                out.push('_');
                out.push_str(&sanitize(&other.base_spelling().unwrap_or_default()));
            }
        }
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

impl Serialize for TypeSig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeSig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TypeSig::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn join_declarator(base: &str, inner: &str) -> String {
    if inner.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, inner)
    }
}

fn wrap_pointer(pointee: &TypeSig, op: &str, inner: String) -> String {
    let declarator = format!("{}{}", op, inner);
    match pointee.strip_const() {
        TypeSig::Array { .. } | TypeSig::Function { .. } => {
            pointee.declare(format!("({})", declarator.trim_end()))
        }
        _ => pointee.declare(declarator),
    }
}

fn sanitize(text: &str) -> String {
    let text = text
        .replace("::", "__")
        .replace('<', "T_")
        .replace('>', "_t")
        .replace('*', "p")
        .replace('&', "r");
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ---------------------------------------------------------------------------
// Declarator parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    Punct(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Punct(s) => f.write_str(s),
        }
    }
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' || (c == ':' && chars.get(i + 1) == Some(&':')) {
            let mut ident = String::new();
            while i < chars.len() {
                let c = chars[i];
                if c.is_ascii_alphanumeric() || c == '_' {
                    ident.push(c);
                    i += 1;
                } else if c == ':' && chars.get(i + 1) == Some(&':') {
                    ident.push_str("::");
                    i += 2;
                } else if c == '<' {
                    // Template arguments are kept verbatim as part of the name
                    let mut depth = 0;
                    while i < chars.len() {
                        let c = chars[i];
                        match c {
                            '<' => depth += 1,
                            '>' => depth -= 1,
                            _ => {}
                        }
                        let joins_words = ident.ends_with(|p: char| p.is_alphanumeric() || p == '_')
                            && chars.get(i + 1).map_or(false, |n| n.is_alphanumeric() || *n == '_');
                        if !c.is_whitespace() || joins_words {
                            ident.push(c);
                        }
                        i += 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    if depth != 0 {
                        return Err("unbalanced template brackets".to_string());
                    }
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident));
        } else if c.is_ascii_digit() {
            let mut number = String::new();
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                number.push(chars[i]);
                i += 1;
            }
            tokens.push(Token::Number(number));
        } else if c == '.' && chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
            tokens.push(Token::Punct("...".to_string()));
            i += 3;
        } else if c == '&' && chars.get(i + 1) == Some(&'&') {
            tokens.push(Token::Punct("&&".to_string()));
            i += 2;
        } else {
            tokens.push(Token::Punct(c.to_string()));
            i += 1;
        }
    }
    Ok(tokens)
}

/// One derivation step of a declarator, applied to the base type in order.
#[derive(Debug)]
enum DeclOp {
    Pointer { is_const: bool },
    Reference { is_rvalue: bool },
    MemberPointer { class: String, is_const: bool },
    Array(Option<String>),
    Function(Vec<TypeSig>),
}

struct TypeParser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl TypeParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(s)) if s == p)
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == word)
    }

    fn expect_punct(&mut self, p: &str) -> ParseResult<()> {
        if self.is_punct(p) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!(
                "expected '{}', found '{}'",
                p,
                self.peek().map(|t| t.to_string()).unwrap_or_else(|| "end of input".into())
            ))
        }
    }

    fn parse_type(&mut self) -> ParseResult<TypeSig> {
        if self.is_punct("...") {
            self.pos += 1;
            return Ok(TypeSig::VarArgs);
        }
        let base = self.parse_specifiers()?;
        let ops = self.parse_declarator()?;
        Ok(apply_ops(base, ops))
    }

    fn parse_specifiers(&mut self) -> ParseResult<TypeSig> {
        let mut is_const = false;
        let mut signed: Option<bool> = None;
        let mut shorts = 0;
        let mut longs = 0;
        let mut keyword: Option<&'static str> = None;
        let mut named: Option<TypeSig> = None;

        while let Some(Token::Ident(word)) = self.peek().cloned() {
            match word.as_str() {
                "const" => is_const = true,
                "volatile" | "typename" => {}
                "signed" => signed = Some(true),
                "unsigned" => signed = Some(false),
                "short" => shorts += 1,
                "long" => longs += 1,
                "int" => keyword = Some("int"),
                "char" => keyword = Some("char"),
                "float" => keyword = Some("float"),
                "double" => keyword = Some("double"),
                "void" => keyword = Some("void"),
                "bool" => keyword = Some("bool"),
                "struct" | "class" | "union" | "enum" => {
                    self.pos += 1;
                    let name = match self.peek() {
                        Some(Token::Ident(name)) => name.clone(),
                        _ => return Err(format!("expected a name after '{}'", word)),
                    };
                    named = Some(if word == "enum" {
                        TypeSig::Enum(name)
                    } else {
                        TypeSig::Named(name)
                    });
                }
                _ => {
                    let has_base = named.is_some()
                        || keyword.is_some()
                        || signed.is_some()
                        || shorts > 0
                        || longs > 0;
                    if has_base || word.ends_with("::") {
                        // Declarator name or member-pointer qualifier
                        break;
                    }
                    named = Some(TypeSig::Named(word.clone()));
                }
            }
            self.pos += 1;
        }

        let base = if let Some(named) = named {
            named
        } else {
            match (keyword, shorts, longs) {
                (Some("void"), _, _) => TypeSig::Void,
                (Some("bool"), _, _) => TypeSig::Bool,
                (Some("float"), _, _) => TypeSig::Float,
                (Some("double"), _, 0) => TypeSig::Double,
                (Some("double"), _, _) => TypeSig::Named("long double".to_string()),
                (Some("char"), _, _) => TypeSig::Char { signed },
                (_, s, _) if s > 0 => TypeSig::Short {
                    signed: signed.unwrap_or(true),
                },
                (_, _, 1) => TypeSig::Long {
                    signed: signed.unwrap_or(true),
                },
                (_, _, l) if l >= 2 => TypeSig::LongLong {
                    signed: signed.unwrap_or(true),
                },
                (Some("int"), _, _) => TypeSig::Int {
                    signed: signed.unwrap_or(true),
                },
                (None, _, _) if signed.is_some() => TypeSig::Int {
                    signed: signed.unwrap_or(true),
                },
                _ => {
                    return Err(format!(
                        "missing type specifier before '{}'",
                        self.peek().map(|t| t.to_string()).unwrap_or_else(|| "end of input".into())
                    ))
                }
            }
        };

        Ok(if is_const { base.constant() } else { base })
    }

    fn parse_declarator(&mut self) -> ParseResult<Vec<DeclOp>> {
        let mut ops = Vec::new();

        // Pointer operators, outermost first
        loop {
            if self.is_punct("*") {
                self.pos += 1;
                let is_const = self.parse_cv();
                ops.push(DeclOp::Pointer { is_const });
            } else if self.is_punct("&") || self.is_punct("&&") {
                let is_rvalue = self.is_punct("&&");
                self.pos += 1;
                ops.push(DeclOp::Reference { is_rvalue });
            } else if let (Some(Token::Ident(scope)), Some(Token::Punct(star))) =
                (self.peek().cloned(), self.peek_at(1).cloned())
            {
                if scope.ends_with("::") && star == "*" {
                    self.pos += 2;
                    let is_const = self.parse_cv();
                    ops.push(DeclOp::MemberPointer {
                        class: scope.trim_end_matches("::").to_string(),
                        is_const,
                    });
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        // Parenthesized inner declarator, e.g. the `(*)` of a function pointer
        let mut inner = Vec::new();
        if self.is_punct("(") && self.starts_inner_declarator() {
            self.pos += 1;
            inner = self.parse_declarator()?;
            self.expect_punct(")")?;
        } else if let Some(Token::Ident(word)) = self.peek() {
            if word != "const" && word != "volatile" {
                // Declarator name: not part of the type
                self.pos += 1;
            }
        }

        let mut suffixes = Vec::new();
        loop {
            if self.is_punct("[") {
                self.pos += 1;
                let mut dim = String::new();
                while !self.is_punct("]") {
                    match self.peek() {
                        Some(tok) => dim.push_str(&tok.to_string()),
                        None => return Err("unterminated array dimension".to_string()),
                    }
                    self.pos += 1;
                }
                self.pos += 1;
                suffixes.push(DeclOp::Array(if dim.is_empty() { None } else { Some(dim) }));
            } else if self.is_punct("(") {
                self.pos += 1;
                let params = self.parse_params()?;
                suffixes.push(DeclOp::Function(params));
                // Trailing qualifiers on member functions are irrelevant here
                while self.is_ident("const") || self.is_ident("noexcept") {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }

        ops.extend(suffixes.into_iter().rev());
        ops.extend(inner);
        Ok(ops)
    }

    fn parse_cv(&mut self) -> bool {
        let mut is_const = false;
        while self.is_ident("const") || self.is_ident("volatile") {
            if self.is_ident("const") {
                is_const = true;
            }
            self.pos += 1;
        }
        is_const
    }

    fn starts_inner_declarator(&self) -> bool {
        match self.peek_at(1) {
            Some(Token::Punct(p)) => p == "*" || p == "&" || p == "&&" || p == "(",
            Some(Token::Ident(scope)) => {
                scope.ends_with("::") && matches!(self.peek_at(2), Some(Token::Punct(p)) if p == "*")
            }
            _ => false,
        }
    }

    fn parse_params(&mut self) -> ParseResult<Vec<TypeSig>> {
        let mut params = Vec::new();
        if self.is_punct(")") {
            self.pos += 1;
            return Ok(params);
        }
        if self.is_ident("void") && matches!(self.peek_at(1), Some(Token::Punct(p)) if p == ")") {
            self.pos += 2;
            return Ok(params);
        }
        loop {
            params.push(self.parse_type()?);
            if self.is_punct(",") {
                self.pos += 1;
            } else {
                self.expect_punct(")")?;
                return Ok(params);
            }
        }
    }
}

fn apply_ops(base: TypeSig, ops: Vec<DeclOp>) -> TypeSig {
    ops.into_iter().fold(base, |ty, op| match op {
        DeclOp::Pointer { is_const } => {
            let ptr = TypeSig::Pointer(Box::new(ty));
            if is_const {
                ptr.constant()
            } else {
                ptr
            }
        }
        DeclOp::Reference { is_rvalue } => TypeSig::Reference {
            referent: Box::new(ty),
            is_rvalue,
        },
        DeclOp::MemberPointer { class, is_const } => {
            let ptr = TypeSig::MemberPointer {
                class,
                pointee: Box::new(ty),
            };
            if is_const {
                ptr.constant()
            } else {
                ptr
            }
        }
        DeclOp::Array(dim) => TypeSig::Array {
            element: Box::new(ty),
            dim,
        },
        DeclOp::Function(params) => TypeSig::Function {
            return_type: Box::new(ty),
            params,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TypeSig {
        TypeSig::parse(text).expect("type should parse")
    }

    #[test]
    fn test_parse_fundamentals() {
        assert_eq!(parse("int"), TypeSig::int());
        assert_eq!(parse("unsigned"), TypeSig::Int { signed: false });
        assert_eq!(parse("unsigned long long"), TypeSig::LongLong { signed: false });
        assert_eq!(parse("short int"), TypeSig::Short { signed: true });
        assert_eq!(parse("signed char"), TypeSig::Char { signed: Some(true) });
        assert_eq!(parse("double"), TypeSig::Double);
    }

    #[test]
    fn test_parse_qualifiers_and_references() {
        assert_eq!(
            parse("const Foo &"),
            TypeSig::named("Foo").constant().reference()
        );
        assert_eq!(parse("Foo const *"), TypeSig::named("Foo").constant().ptr());
        assert_eq!(
            parse("SwigClassWrapper const *farg1"),
            TypeSig::named("SwigClassWrapper").constant().ptr()
        );
        assert_eq!(parse("int *const"), TypeSig::int().ptr().constant());
    }

    #[test]
    fn test_parse_function_pointer() {
        let ty = parse("int (*)(double, const char *)");
        match &ty {
            TypeSig::Pointer(inner) => match inner.as_ref() {
                TypeSig::Function { return_type, params } => {
                    assert_eq!(**return_type, TypeSig::int());
                    assert_eq!(params.len(), 2);
                    assert_eq!(params[1], TypeSig::Char { signed: None }.constant().ptr());
                }
                other => panic!("expected function, got {:?}", other),
            },
            other => panic!("expected pointer, got {:?}", other),
        }
        assert!(ty.needs_typedef());
    }

    #[test]
    fn test_parse_arrays() {
        let ty = parse("double [2][3]");
        assert_eq!(
            ty.array_dims(),
            vec![Some("2".to_string()), Some("3".to_string())]
        );
        let ptr_to_array = parse("int (*)[4]");
        assert!(ptr_to_array.needs_typedef());
        assert!(!parse("int *").needs_typedef());
    }

    #[test]
    fn test_parse_templates_and_scopes() {
        assert_eq!(
            parse("std::vector<int> const &"),
            TypeSig::named("std::vector<int>").constant().reference()
        );
        assert_eq!(parse("enum Color"), TypeSig::Enum("Color".to_string()));
        assert_eq!(parse("struct ns::Point *"), TypeSig::named("ns::Point").ptr());
    }

    #[test]
    fn test_parse_varargs_in_function() {
        let ty = parse("int (*)(const char *, ...)");
        let TypeSig::Pointer(inner) = ty else {
            panic!("expected pointer")
        };
        let TypeSig::Function { params, .. } = *inner else {
            panic!("expected function")
        };
        assert!(params[1].is_varargs());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TypeSig::parse("").is_err());
        assert!(TypeSig::parse("int )").is_err());
    }

    #[test]
    fn test_render_inserts_name() {
        assert_eq!(parse("int").render("x"), "int x");
        assert_eq!(parse("const Foo &").render("other"), "const Foo &other");
        assert_eq!(parse("int (*)(int)").render("cb"), "int (*cb)(int)");
        assert_eq!(parse("double [3]").render("v"), "double v[3]");
        assert_eq!(parse("int (*)[4]").render("p"), "int (*p)[4]");
        assert_eq!(parse("Foo *const").render("p"), "Foo *const p");
        assert_eq!(parse("int (*)(void)").to_string(), "int (*)(void)");
    }

    #[test]
    fn test_render_round_trips_through_parse() {
        for text in ["const Foo *", "unsigned long", "int (*)(double)", "char *[8]"] {
            let ty = parse(text);
            assert_eq!(parse(&ty.to_string()), ty, "round trip of {}", text);
        }
    }

    #[test]
    fn test_base_and_ltype() {
        let ty = parse("const Foo &");
        assert_eq!(ty.base(), &TypeSig::named("Foo"));
        assert_eq!(ty.ltype(), TypeSig::named("Foo").constant().ptr());
        assert_eq!(parse("const int").ltype(), TypeSig::int());
        assert_eq!(parse("double [4]").ltype(), TypeSig::Double.ptr());
    }

    #[test]
    fn test_mangle() {
        assert_eq!(parse("Foo").mangle(), "_Foo");
        assert_eq!(parse("Foo *").mangle(), "_p_Foo");
        assert_eq!(parse("ns::Foo").mangle(), "_ns__Foo");
        assert_eq!(parse("std::vector<int>").mangle(), "_std__vectorT_int_t");
        assert_eq!(parse("unsigned int").mangle(), "_unsigned_int");
    }
}
