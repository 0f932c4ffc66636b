//! Resolved representation of an XPIDL file.
//!
//! Every attribute carries its [`NativeType`] classification and every
//! constant its evaluated value, so code generators never look at raw type
//! names to decide how a value is stored or passed.

use crate::types::{DefaultValue, IdlAttr, ParamDecl, has_attr};
use std::path::PathBuf;
use std::rc::Rc;

/// Name of the interface bridged through the runtime variant converter.
pub const VARIANT_INTERFACE: &str = "nsIVariant";

/// Width of a string type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// UTF-16 strings (`nsAString`).
    Wide,
    /// 8-bit strings (`nsACString`).
    Narrow,
}

/// Native classification of an attribute type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Reference-counted pointer to the named interface or native type.
    Pointer(String),
    /// String type.
    Text(TextKind),
    /// `nsIVariant`, converted to and from script values at runtime.
    Variant,
    /// Raw opaque script value (`jsval`).
    ScriptValue,
    /// Plain value with the given C++ spelling.
    Scalar(String),
}

impl NativeType {
    /// Classifies a reference to an interface by name.
    #[must_use]
    pub fn for_interface(name: &str) -> Self {
        if name == VARIANT_INTERFACE {
            Self::Variant
        } else {
            Self::Pointer(name.to_string())
        }
    }

    /// Returns true for types held through an interface pointer.
    #[must_use]
    pub const fn is_pointer_like(&self) -> bool {
        matches!(self, Self::Pointer(_) | Self::Variant)
    }

    /// Returns true for string types.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns the pointed-to type name for pointer-like types.
    #[must_use]
    pub fn pointee(&self) -> Option<&str> {
        match self {
            Self::Pointer(name) => Some(name),
            Self::Variant => Some(VARIANT_INTERFACE),
            _ => None,
        }
    }
}

/// Maps an XPIDL builtin type name to its native classification.
#[must_use]
pub fn builtin_native(name: &str) -> Option<NativeType> {
    let scalar = |s: &str| Some(NativeType::Scalar(s.to_string()));
    match name {
        "boolean" => scalar("bool"),
        "octet" => scalar("uint8_t"),
        "short" => scalar("int16_t"),
        "long" => scalar("int32_t"),
        "long long" => scalar("int64_t"),
        "unsigned short" => scalar("uint16_t"),
        "unsigned long" => scalar("uint32_t"),
        "unsigned long long" => scalar("uint64_t"),
        "float" => scalar("float"),
        "double" => scalar("double"),
        "char" => scalar("char"),
        "wchar" => scalar("char16_t"),
        "string" => scalar("const char*"),
        "wstring" => scalar("const char16_t*"),
        "DOMString" | "AString" => Some(NativeType::Text(TextKind::Wide)),
        "ACString" | "AUTF8String" => Some(NativeType::Text(TextKind::Narrow)),
        "jsval" => Some(NativeType::ScriptValue),
        _ => None,
    }
}

/// Resolved attribute (interface attribute or dictionary member).
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Declared type token.
    pub type_name: String,
    /// Whether the attribute is `readonly`.
    pub readonly: bool,
    /// Whether the declared type is nullable.
    pub nullable: bool,
    /// Default value (dictionary members only).
    pub default: Option<DefaultValue>,
    /// Annotations.
    pub attrs: Vec<IdlAttr>,
    /// Native classification of the declared type.
    pub native: NativeType,
}

impl Attribute {
    /// Returns true if the declared type is the variant interface.
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.type_name == VARIANT_INTERFACE
    }
}

/// Resolved method.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Return type token.
    pub return_type: String,
    /// Parameters as declared.
    pub params: Vec<ParamDecl>,
    /// Annotations.
    pub attrs: Vec<IdlAttr>,
}

impl Method {
    /// Returns true if the method is reachable from script.
    #[must_use]
    pub fn is_script_visible(&self) -> bool {
        !has_attr(&self.attrs, "noscript") && !has_attr(&self.attrs, "notxpcom")
    }
}

/// Resolved constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    /// Constant name.
    pub name: String,
    /// Declared type token.
    pub type_name: String,
    /// Evaluated value, within the range of `type_name`.
    pub value: i128,
}

/// Resolved interface member.
#[derive(Debug, Clone)]
pub enum Member {
    /// Attribute.
    Attribute(Attribute),
    /// Method.
    Method(Method),
    /// Constant.
    Constant(Constant),
}

impl Member {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(a) => &a.name,
            Self::Method(m) => &m.name,
            Self::Constant(c) => &c.name,
        }
    }
}

/// Resolved interface.
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name.
    pub name: String,
    /// Base interface name, resolved on demand through the loader.
    pub base: Option<String>,
    /// Annotations.
    pub attrs: Vec<IdlAttr>,
    /// Members in declaration order.
    pub members: Vec<Member>,
    /// Name of the file that declares the interface.
    pub file: String,
}

impl Interface {
    /// Returns the attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.members.iter().filter_map(|m| match m {
            Member::Attribute(a) => Some(a),
            _ => None,
        })
    }

    /// Returns the constants in declaration order.
    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.members.iter().filter_map(|m| match m {
            Member::Constant(c) => Some(c),
            _ => None,
        })
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.members.iter().find_map(|m| match m {
            Member::Method(method) if method.name == name => Some(method),
            _ => None,
        })
    }

    /// Returns true if the interface is marked `scriptable`.
    #[must_use]
    pub fn is_scriptable(&self) -> bool {
        has_attr(&self.attrs, "scriptable")
    }
}

/// Resolved dictionary.
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// Dictionary name.
    pub name: String,
    /// Base dictionary name.
    pub base: Option<String>,
    /// Members in declaration order.
    pub members: Vec<Attribute>,
    /// Name of the file that declares the dictionary.
    pub file: String,
}

impl Dictionary {
    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Attribute> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Resolved top-level declaration.
#[derive(Debug, Clone)]
pub enum Production {
    /// Interface definition.
    Interface(Rc<Interface>),
    /// Forward declaration of an interface.
    Forward(String),
    /// Dictionary definition.
    Dictionary(Rc<Dictionary>),
    /// Typedef with its resolved target.
    Typedef {
        /// New type name.
        name: String,
        /// Classification of the aliased type.
        native: NativeType,
    },
    /// Native declaration.
    Native {
        /// IDL-visible name.
        name: String,
        /// Classification derived from its annotations.
        native: NativeType,
    },
}

impl Production {
    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Interface(i) => &i.name,
            Self::Forward(name) => name,
            Self::Dictionary(d) => &d.name,
            Self::Typedef { name, .. } | Self::Native { name, .. } => name,
        }
    }
}

/// A resolved XPIDL file together with the files it includes.
#[derive(Debug)]
pub struct Idl {
    /// File name used for lookup and caching.
    pub file: String,
    /// Path the file was read from.
    pub path: PathBuf,
    /// Declarations in source order.
    pub productions: Vec<Production>,
    /// Included files, in include order.
    pub includes: Vec<Rc<Idl>>,
}

impl Idl {
    /// Returns the interfaces declared in this file.
    pub fn interfaces(&self) -> impl Iterator<Item = &Rc<Interface>> {
        self.productions.iter().filter_map(|p| match p {
            Production::Interface(i) => Some(i),
            _ => None,
        })
    }

    /// Returns the dictionaries declared in this file.
    pub fn dictionaries(&self) -> impl Iterator<Item = &Rc<Dictionary>> {
        self.productions.iter().filter_map(|p| match p {
            Production::Dictionary(d) => Some(d),
            _ => None,
        })
    }

    /// Looks up a dictionary declared in this file (includes are not searched).
    #[must_use]
    pub fn dictionary(&self, name: &str) -> Option<&Rc<Dictionary>> {
        self.dictionaries().find(|d| d.name == name)
    }

    /// Finds an interface definition in this file or its include closure.
    #[must_use]
    pub fn find_interface(&self, name: &str) -> Option<Rc<Interface>> {
        if let Some(found) = self.interfaces().find(|i| i.name == name) {
            return Some(Rc::clone(found));
        }
        self.includes.iter().find_map(|idl| idl.find_interface(name))
    }

    /// Finds a dictionary definition in this file or its include closure.
    #[must_use]
    pub fn find_dictionary(&self, name: &str) -> Option<Rc<Dictionary>> {
        if let Some(found) = self.dictionary(name) {
            return Some(Rc::clone(found));
        }
        self.includes.iter().find_map(|idl| idl.find_dictionary(name))
    }

    /// Returns true if `name` is declared (forward or full) anywhere in scope.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.productions.iter().any(|p| p.name() == name)
            || self.includes.iter().any(|idl| idl.declares(name))
    }

    /// Classifies a type name declared in this file or its include closure.
    ///
    /// Builtins are not consulted here.
    #[must_use]
    pub fn lookup_type(&self, name: &str) -> Option<NativeType> {
        let own = self.productions.iter().find_map(|p| match p {
            Production::Interface(i) if i.name == name => Some(NativeType::for_interface(name)),
            Production::Forward(n) if n == name => Some(NativeType::for_interface(name)),
            Production::Typedef { name: n, native } | Production::Native { name: n, native }
                if n == name =>
            {
                Some(native.clone())
            }
            _ => None,
        });
        own.or_else(|| self.includes.iter().find_map(|idl| idl.lookup_type(name)))
    }
}
