//! C++ code generation modules.

pub mod classes;
pub mod header;
pub mod source;

pub use classes::ClassDeclarationGenerator;
pub use header::HeaderGenerator;
pub use source::SourceGenerator;

use crate::type_map::{TypeMapper, arg_name};
use eventgen_idl::ir::Attribute;

/// Leading parameters shared by every `Init{E}` signature.
const INIT_PARAMS: &str = "const nsAString& aType, bool aCanBubble, bool aCancelable";

/// Extra leading parameter for initializers that convert variants.
fn context_param(has_variant: bool) -> &'static str {
    if has_variant { "JSContext* aCx, " } else { "" }
}

/// Trailing `, T aName` parameters in native (WebIDL-facing) form.
fn native_params<'b>(
    mapper: &TypeMapper<'_>,
    attrs: impl Iterator<Item = &'b Attribute>,
) -> String {
    attrs
        .map(|a| format!(", {} {}", mapper.native_param(a), arg_name(a)))
        .collect()
}

/// Trailing `, T aName` parameters in XPCOM form.
fn xpcom_params<'b>(
    mapper: &TypeMapper<'_>,
    attrs: impl Iterator<Item = &'b Attribute>,
) -> String {
    attrs
        .map(|a| format!(", {} {}", mapper.xpcom_param(a), arg_name(a)))
        .collect()
}
