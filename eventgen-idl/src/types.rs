//! Parsed XPIDL declarations.
//!
//! These are the unresolved shapes produced by the parser: type names are
//! plain strings and constant values are still expressions. See [`crate::ir`]
//! for the resolved model.

/// A parsed XPIDL file.
#[derive(Debug, Clone, Default)]
pub struct IdlFile {
    /// File name (as passed to the parser).
    pub name: String,
    /// Top-level declarations in source order.
    pub productions: Vec<ProductionDecl>,
}

impl IdlFile {
    /// Creates an empty file.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            productions: Vec::new(),
        }
    }

    /// Returns the files named by `#include` directives, in order.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.productions.iter().filter_map(|p| match p {
            ProductionDecl::Include(file) => Some(file.as_str()),
            _ => None,
        })
    }

    /// Looks up a named declaration in this file only.
    ///
    /// Full interface definitions win over forward declarations of the same
    /// name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProductionDecl> {
        let mut forward = None;
        for production in &self.productions {
            if production.name() != Some(name) {
                continue;
            }
            if matches!(production, ProductionDecl::Forward(_)) {
                forward = forward.or(Some(production));
            } else {
                return Some(production);
            }
        }
        forward
    }
}

/// Top-level declaration.
#[derive(Debug, Clone)]
pub enum ProductionDecl {
    /// `#include "file.idl"`.
    Include(String),
    /// `interface Name : Base { ... };`.
    Interface(InterfaceDecl),
    /// `interface Name;`.
    Forward(String),
    /// `dictionary Name : Base { ... };`.
    Dictionary(DictionaryDecl),
    /// `typedef Type Name;`.
    Typedef(TypedefDecl),
    /// `[modifier] native Name(native text);`.
    Native(NativeDecl),
}

impl ProductionDecl {
    /// Returns the declared name, if the production declares one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Include(_) => None,
            Self::Interface(i) => Some(&i.name),
            Self::Forward(name) => Some(name),
            Self::Dictionary(d) => Some(&d.name),
            Self::Typedef(t) => Some(&t.name),
            Self::Native(n) => Some(&n.name),
        }
    }

    /// Returns a short description of the production kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Include(_) => "include",
            Self::Interface(_) => "interface",
            Self::Forward(_) => "forward declaration",
            Self::Dictionary(_) => "dictionary",
            Self::Typedef(_) => "typedef",
            Self::Native(_) => "native",
        }
    }
}

/// An XPIDL `[name]` or `[name(value)]` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlAttr {
    /// Annotation name.
    pub name: String,
    /// Raw parenthesized value, if any.
    pub value: Option<String>,
}

impl IdlAttr {
    /// Creates a flag annotation without a value.
    #[must_use]
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Returns true if the annotation list contains `name`.
#[must_use]
pub fn has_attr(attrs: &[IdlAttr], name: &str) -> bool {
    attrs.iter().any(|a| a.name == name)
}

/// Parsed interface.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    /// Interface name.
    pub name: String,
    /// Base interface name.
    pub base: Option<String>,
    /// Annotations (`scriptable`, `uuid(...)`, ...).
    pub attrs: Vec<IdlAttr>,
    /// Members in declaration order.
    pub members: Vec<MemberDecl>,
}

/// Parsed interface member.
#[derive(Debug, Clone)]
pub enum MemberDecl {
    /// `readonly attribute Type name;`.
    Attribute(AttributeDecl),
    /// `Type name(params);`.
    Method(MethodDecl),
    /// `const Type NAME = expr;`.
    Const(ConstDecl),
}

impl MemberDecl {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(a) => &a.name,
            Self::Method(m) => &m.name,
            Self::Const(c) => &c.name,
        }
    }
}

/// Parsed attribute or dictionary member.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Attribute name.
    pub name: String,
    /// Declared type token (`unsigned long`, `nsIDOMWindow`, ...).
    pub type_name: String,
    /// Whether the attribute is `readonly`.
    pub readonly: bool,
    /// Whether the type carries a `?` suffix.
    pub nullable: bool,
    /// Default value (dictionary members only).
    pub default: Option<DefaultValue>,
    /// Annotations.
    pub attrs: Vec<IdlAttr>,
}

/// Default value of a dictionary member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// A quoted string, stored without quotes.
    Str(String),
    /// Any other literal token text (`0`, `-1.5`, `true`, `null`, `-Infinity`).
    Literal(String),
}

impl DefaultValue {
    /// Returns the value text without quotes.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Str(s) | Self::Literal(s) => s,
        }
    }
}

/// Parsed method.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Return type token.
    pub return_type: String,
    /// Parameters.
    pub params: Vec<ParamDecl>,
    /// Annotations (`noscript`, `notxpcom`, ...).
    pub attrs: Vec<IdlAttr>,
    /// Exceptions named by a `raises(...)` clause.
    pub raises: Vec<String>,
}

/// Parameter direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    /// `in`.
    In,
    /// `out`.
    Out,
    /// `inout`.
    InOut,
}

/// Parsed method parameter.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    /// Parameter name.
    pub name: String,
    /// Declared type token.
    pub type_name: String,
    /// Direction.
    pub direction: ParamDirection,
    /// Annotations (`optional`, `array`, ...).
    pub attrs: Vec<IdlAttr>,
}

/// Parsed constant.
#[derive(Debug, Clone)]
pub struct ConstDecl {
    /// Constant name.
    pub name: String,
    /// Declared type token.
    pub type_name: String,
    /// Value expression.
    pub value: ConstExpr,
}

/// Constant value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstExpr {
    /// Integer literal.
    Int(u64),
    /// Reference to an earlier constant.
    Name(String),
    /// Unary minus.
    Neg(Box<ConstExpr>),
    /// Binary operation.
    Binary(Box<ConstExpr>, BinaryOp, Box<ConstExpr>),
}

/// Binary operator in a constant expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `|`.
    Or,
    /// `&`.
    And,
    /// `<<`.
    Shl,
    /// `>>`.
    Shr,
    /// `+`.
    Add,
    /// `-`.
    Sub,
    /// `*`.
    Mul,
}

/// Parsed dictionary.
#[derive(Debug, Clone)]
pub struct DictionaryDecl {
    /// Dictionary name.
    pub name: String,
    /// Base dictionary name.
    pub base: Option<String>,
    /// Members in declaration order.
    pub members: Vec<AttributeDecl>,
}

/// Parsed typedef.
#[derive(Debug, Clone)]
pub struct TypedefDecl {
    /// New type name.
    pub name: String,
    /// Aliased type token.
    pub target: String,
}

/// Parsed native declaration.
#[derive(Debug, Clone)]
pub struct NativeDecl {
    /// IDL-visible name.
    pub name: String,
    /// C++ type text between the parentheses.
    pub native: String,
    /// Annotations (`ptr`, `ref`, `domstring`, ...).
    pub attrs: Vec<IdlAttr>,
}
