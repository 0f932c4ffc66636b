//! Projections of classified attribute types into C++ and WebIDL spellings.
//!
//! Every emitter asks the [`TypeMapper`] how an attribute is stored, passed
//! and named; none of them inspects type names on its own.

use crate::config::TypeOverride;
use crate::error::CodegenError;
use eventgen_idl::ir::{Attribute, NativeType, TextKind, VARIANT_INTERFACE};

/// XPIDL base interface kept verbatim in WebIDL.
const SUPPORTS_INTERFACE: &str = "nsISupports";

/// Uppercases the first character (`detail` -> `Detail`).
#[must_use]
pub fn first_cap(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of the member variable holding an attribute (`mDetail`).
#[must_use]
pub fn member_name(attr: &Attribute) -> String {
    format!("m{}", first_cap(&attr.name))
}

/// Name of the parameter carrying an attribute (`aDetail`).
#[must_use]
pub fn arg_name(attr: &Attribute) -> String {
    format!("a{}", first_cap(&attr.name))
}

/// Maps attribute types to their storage, parameter and binding forms.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    overrides: &'a [TypeOverride],
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper over an override table.
    #[must_use]
    pub fn new(overrides: &'a [TypeOverride]) -> Self {
        Self { overrides }
    }

    /// Returns the first override entry for an XPIDL type name.
    #[must_use]
    pub fn lookup(&self, xpidl: &str) -> Option<&'a TypeOverride> {
        self.overrides.iter().find(|o| o.xpidl == xpidl)
    }

    /// Returns true if the type has an override entry.
    #[must_use]
    pub fn is_overridden(&self, xpidl: &str) -> bool {
        self.lookup(xpidl).is_some()
    }

    /// Returns the native class for a type, or the type itself.
    #[must_use]
    pub fn native_name<'n>(&self, xpidl: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.lookup(xpidl).map_or(xpidl, |o| o.native.as_str())
    }

    /// Returns the canonical interface for a type, or the type itself.
    #[must_use]
    pub fn canonical_name<'n>(&self, xpidl: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.lookup(xpidl).map_or(xpidl, |o| o.canonical.as_str())
    }

    /// Returns true if a pointer-like attribute's native class differs from
    /// its XPIDL type.
    #[must_use]
    pub fn needs_bridge(&self, attr: &Attribute) -> bool {
        match &attr.native {
            NativeType::Pointer(pointee) => self.native_name(pointee) != pointee,
            _ => false,
        }
    }

    /// Spelling of a scalar, honoring an override of its declared type.
    fn scalar<'s>(&self, attr: &'s Attribute, spelling: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.lookup(&attr.type_name)
            .map_or(spelling, |o| o.native.as_str())
    }

    /// Member storage type.
    #[must_use]
    pub fn storage(&self, attr: &Attribute) -> String {
        match &attr.native {
            NativeType::Pointer(pointee) => format!("nsCOMPtr<{pointee}>"),
            NativeType::Variant => format!("nsCOMPtr<{VARIANT_INTERFACE}>"),
            NativeType::Text(TextKind::Wide) => "nsString".to_string(),
            NativeType::Text(TextKind::Narrow) => "nsCString".to_string(),
            NativeType::ScriptValue => "JS::Value".to_string(),
            NativeType::Scalar(spelling) => self.scalar(attr, spelling).to_string(),
        }
    }

    /// Parameter type of the XPCOM initializer.
    #[must_use]
    pub fn xpcom_param(&self, attr: &Attribute) -> String {
        match &attr.native {
            NativeType::Pointer(pointee) => format!("{pointee}*"),
            NativeType::Variant => format!("{VARIANT_INTERFACE}*"),
            NativeType::Text(kind) => text_param(*kind).to_string(),
            NativeType::ScriptValue => "JS::Value".to_string(),
            NativeType::Scalar(spelling) => self.scalar(attr, spelling).to_string(),
        }
    }

    /// Parameter type of the native (WebIDL-facing) initializer.
    #[must_use]
    pub fn native_param(&self, attr: &Attribute) -> String {
        match &attr.native {
            NativeType::Pointer(pointee) => format!("{}*", self.native_name(pointee)),
            NativeType::Variant | NativeType::ScriptValue => "JS::Value".to_string(),
            NativeType::Text(kind) => text_param(*kind).to_string(),
            NativeType::Scalar(spelling) => self.scalar(attr, spelling).to_string(),
        }
    }

    /// Out-parameter declaration of the XPCOM getter (`uint32_t* aDetail`).
    #[must_use]
    pub fn getter_out_param(&self, attr: &Attribute) -> String {
        let arg = arg_name(attr);
        match &attr.native {
            NativeType::Pointer(pointee) => format!("{pointee}** {arg}"),
            NativeType::Variant => format!("{VARIANT_INTERFACE}** {arg}"),
            NativeType::Text(TextKind::Wide) => format!("nsAString& {arg}"),
            NativeType::Text(TextKind::Narrow) => format!("nsACString& {arg}"),
            NativeType::ScriptValue => format!("JS::MutableHandle<JS::Value> {arg}"),
            NativeType::Scalar(spelling) => format!("{}* {arg}", self.scalar(attr, spelling)),
        }
    }

    /// Zero-equivalent initializer used by generated constructors.
    ///
    /// # Errors
    /// Returns `CodegenError::InvalidDefault` for raw script values.
    pub fn zero_default(&self, attr: &Attribute) -> Result<&'static str, CodegenError> {
        match &attr.native {
            NativeType::Pointer(_) | NativeType::Variant => Ok("nullptr"),
            NativeType::Text(_) => Ok(""),
            NativeType::Scalar(spelling) if spelling == "bool" => Ok("false"),
            NativeType::Scalar(_) => Ok("0"),
            NativeType::ScriptValue => Err(CodegenError::invalid_default(
                &attr.name,
                &attr.type_name,
            )),
        }
    }

    /// Type as named in a WebIDL file.
    ///
    /// Interface names lose their `nsIDOM` or `nsI` prefix. Pointer and
    /// string types are nullable unless `interface_only` is set.
    #[must_use]
    pub fn binding(&self, attr: &Attribute, interface_only: bool) -> String {
        let nullable = if interface_only { "" } else { "?" };
        match &attr.native {
            NativeType::Variant => "any".to_string(),
            NativeType::Pointer(_) => format!("{}{nullable}", webidl_interface(&attr.type_name)),
            NativeType::Text(_) => format!("{}{nullable}", attr.type_name),
            NativeType::ScriptValue | NativeType::Scalar(_) => attr.type_name.clone(),
        }
    }
}

fn text_param(kind: TextKind) -> &'static str {
    match kind {
        TextKind::Wide => "const nsAString&",
        TextKind::Narrow => "const nsACString&",
    }
}

fn webidl_interface(name: &str) -> &str {
    if name == SUPPORTS_INTERFACE {
        return name;
    }
    name.strip_prefix("nsIDOM")
        .or_else(|| name.strip_prefix("nsI"))
        .unwrap_or(name)
}
