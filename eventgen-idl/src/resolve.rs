//! Resolution of parsed declarations into the [`crate::ir`] model.

use crate::error::IdlError;
use crate::ir::{
    Attribute, Constant, Dictionary, Idl, Interface, Member, Method, NativeType, Production,
    TextKind, builtin_native,
};
use crate::types::{
    AttributeDecl, BinaryOp, ConstExpr, IdlFile, MemberDecl, NativeDecl, ProductionDecl, has_attr,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Longest typedef chain followed before giving up.
const MAX_TYPEDEF_DEPTH: usize = 32;

/// Resolves a parsed file against its already-resolved includes.
///
/// # Arguments
/// * `file` - Parsed declarations
/// * `path` - Path the file was read from
/// * `includes` - Resolved included files, in include order
///
/// # Errors
/// Returns `IdlError::UnknownType` for type names with no definition in
/// scope and `IdlError::Resolution` for undefined constants, overflowing
/// constant expressions and typedef cycles.
pub fn resolve_file(
    file: &IdlFile,
    path: PathBuf,
    includes: Vec<Rc<Idl>>,
) -> Result<Idl, IdlError> {
    let scope = TypeScope {
        file,
        includes: &includes,
    };

    let mut productions = Vec::new();
    for decl in &file.productions {
        let production = match decl {
            ProductionDecl::Include(_) => continue,
            ProductionDecl::Forward(name) => Production::Forward(name.clone()),
            ProductionDecl::Interface(iface) => {
                let mut members = Vec::with_capacity(iface.members.len());
                let mut constants: HashMap<&str, i128> = HashMap::new();
                for member in &iface.members {
                    members.push(match member {
                        MemberDecl::Attribute(attr) => {
                            Member::Attribute(scope.attribute(attr, &iface.name)?)
                        }
                        MemberDecl::Method(method) => Member::Method(Method {
                            name: method.name.clone(),
                            return_type: method.return_type.clone(),
                            params: method.params.clone(),
                            attrs: method.attrs.clone(),
                        }),
                        MemberDecl::Const(c) => {
                            let value = evaluate(&c.value, &constants, &c.name)?;
                            check_range(&c.type_name, value, &c.name)?;
                            constants.insert(&c.name, value);
                            Member::Constant(Constant {
                                name: c.name.clone(),
                                type_name: c.type_name.clone(),
                                value,
                            })
                        }
                    });
                }
                Production::Interface(Rc::new(Interface {
                    name: iface.name.clone(),
                    base: iface.base.clone(),
                    attrs: iface.attrs.clone(),
                    members,
                    file: file.name.clone(),
                }))
            }
            ProductionDecl::Dictionary(dict) => {
                let members = dict
                    .members
                    .iter()
                    .map(|m| scope.attribute(m, &dict.name))
                    .collect::<Result<Vec<_>, _>>()?;
                Production::Dictionary(Rc::new(Dictionary {
                    name: dict.name.clone(),
                    base: dict.base.clone(),
                    members,
                    file: file.name.clone(),
                }))
            }
            ProductionDecl::Typedef(def) => Production::Typedef {
                name: def.name.clone(),
                native: scope.resolve(&def.target, &def.name, 0)?,
            },
            ProductionDecl::Native(native) => Production::Native {
                name: native.name.clone(),
                native: classify_native(native),
            },
        };
        productions.push(production);
    }

    Ok(Idl {
        file: file.name.clone(),
        path,
        productions,
        includes,
    })
}

/// Classifies a `native` declaration from its annotations.
#[must_use]
pub fn classify_native(decl: &NativeDecl) -> NativeType {
    let attrs = &decl.attrs;
    if has_attr(attrs, "domstring") || has_attr(attrs, "astring") {
        NativeType::Text(TextKind::Wide)
    } else if has_attr(attrs, "cstring") || has_attr(attrs, "utf8string") {
        NativeType::Text(TextKind::Narrow)
    } else if has_attr(attrs, "jsval") {
        NativeType::ScriptValue
    } else if has_attr(attrs, "ptr") {
        NativeType::Pointer(decl.native.clone())
    } else if has_attr(attrs, "ref") {
        NativeType::Scalar(format!("{}&", decl.native))
    } else {
        NativeType::Scalar(decl.native.clone())
    }
}

/// Names visible from one file: its own declarations, then its includes,
/// then the builtins.
struct TypeScope<'a> {
    file: &'a IdlFile,
    includes: &'a [Rc<Idl>],
}

impl TypeScope<'_> {
    fn attribute(&self, decl: &AttributeDecl, owner: &str) -> Result<Attribute, IdlError> {
        let member = format!("{owner}::{}", decl.name);
        Ok(Attribute {
            name: decl.name.clone(),
            type_name: decl.type_name.clone(),
            readonly: decl.readonly,
            nullable: decl.nullable,
            default: decl.default.clone(),
            attrs: decl.attrs.clone(),
            native: self.resolve(&decl.type_name, &member, 0)?,
        })
    }

    fn resolve(&self, type_name: &str, member: &str, depth: usize) -> Result<NativeType, IdlError> {
        if depth > MAX_TYPEDEF_DEPTH {
            return Err(IdlError::resolution(
                type_name,
                format!("typedef chain deeper than {MAX_TYPEDEF_DEPTH} (cycle?)"),
            ));
        }

        if let Some(decl) = self.file.get(type_name) {
            return match decl {
                ProductionDecl::Interface(_) | ProductionDecl::Forward(_) => {
                    Ok(NativeType::for_interface(type_name))
                }
                ProductionDecl::Typedef(def) => self.resolve(&def.target, member, depth + 1),
                ProductionDecl::Native(native) => Ok(classify_native(native)),
                ProductionDecl::Dictionary(_) => Err(IdlError::resolution(
                    type_name,
                    format!("dictionary used as the type of '{member}'"),
                )),
                ProductionDecl::Include(_) => {
                    Err(IdlError::unknown_type(type_name, member, &self.file.name))
                }
            };
        }

        self.includes
            .iter()
            .find_map(|idl| idl.lookup_type(type_name))
            .or_else(|| builtin_native(type_name))
            .ok_or_else(|| IdlError::unknown_type(type_name, member, &self.file.name))
    }
}

/// Evaluates a constant expression against the constants declared before it.
fn evaluate(
    expr: &ConstExpr,
    known: &HashMap<&str, i128>,
    constant: &str,
) -> Result<i128, IdlError> {
    let overflow = || IdlError::resolution(constant, "constant expression overflows");
    match expr {
        ConstExpr::Int(value) => Ok(i128::from(*value)),
        ConstExpr::Name(name) => known.get(name.as_str()).copied().ok_or_else(|| {
            IdlError::resolution(constant, format!("undefined constant '{name}'"))
        }),
        ConstExpr::Neg(inner) => evaluate(inner, known, constant)?
            .checked_neg()
            .ok_or_else(overflow),
        ConstExpr::Binary(lhs, op, rhs) => {
            let lhs = evaluate(lhs, known, constant)?;
            let rhs = evaluate(rhs, known, constant)?;
            let value = match op {
                BinaryOp::Or => Some(lhs | rhs),
                BinaryOp::And => Some(lhs & rhs),
                BinaryOp::Shl => u32::try_from(rhs).ok().and_then(|s| lhs.checked_shl(s)),
                BinaryOp::Shr => u32::try_from(rhs).ok().and_then(|s| lhs.checked_shr(s)),
                BinaryOp::Add => lhs.checked_add(rhs),
                BinaryOp::Sub => lhs.checked_sub(rhs),
                BinaryOp::Mul => lhs.checked_mul(rhs),
            };
            value.ok_or_else(overflow)
        }
    }
}

/// Rejects a constant value outside the range of its integer type.
fn check_range(type_name: &str, value: i128, constant: &str) -> Result<(), IdlError> {
    let (min, max) = match type_name {
        "octet" => (i128::from(u8::MIN), i128::from(u8::MAX)),
        "short" => (i128::from(i16::MIN), i128::from(i16::MAX)),
        "unsigned short" => (i128::from(u16::MIN), i128::from(u16::MAX)),
        "long" => (i128::from(i32::MIN), i128::from(i32::MAX)),
        "unsigned long" => (i128::from(u32::MIN), i128::from(u32::MAX)),
        "long long" => (i128::from(i64::MIN), i128::from(i64::MAX)),
        "unsigned long long" => (i128::from(u64::MIN), i128::from(u64::MAX)),
        _ => return Ok(()),
    };
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(IdlError::resolution(
            constant,
            format!("value {value} does not fit in {type_name}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_idl;

    fn resolve(source: &str) -> Result<Idl, IdlError> {
        let file = parse_idl(source, "test.idl").expect("Failed to parse");
        resolve_file(&file, PathBuf::from("./test.idl"), Vec::new())
    }

    #[test]
    fn test_resolve_attribute_natives() {
        let idl = resolve(
            r#"
interface nsIDOMWindow;
interface nsIVariant;
typedef unsigned long long DOMTimeStamp;
[ptr] native WidgetPtr(mozilla::Widget);
[cstring] native ACStringAlias(ignored);

interface nsIDOMFooEvent : nsIDOMEvent {
  readonly attribute nsIDOMWindow view;
  readonly attribute nsIVariant data;
  readonly attribute DOMTimeStamp when;
  readonly attribute WidgetPtr widget;
  readonly attribute ACStringAlias origin;
  readonly attribute boolean flag;
  readonly attribute jsval detail;
};
"#,
        )
        .expect("Failed to resolve");

        let iface = idl.find_interface("nsIDOMFooEvent").expect("interface");
        let natives: Vec<_> = iface.attributes().map(|a| a.native.clone()).collect();
        assert_eq!(
            natives,
            vec![
                NativeType::Pointer("nsIDOMWindow".to_string()),
                NativeType::Variant,
                NativeType::Scalar("uint64_t".to_string()),
                NativeType::Pointer("mozilla::Widget".to_string()),
                NativeType::Text(TextKind::Narrow),
                NativeType::Scalar("bool".to_string()),
                NativeType::ScriptValue,
            ]
        );
        assert_eq!(iface.file, "test.idl");
    }

    #[test]
    fn test_resolve_unknown_type() {
        let err = resolve("interface nsIFoo : nsISupports { readonly attribute Mystery m; };")
            .expect_err("should fail");
        match err {
            IdlError::UnknownType {
                type_name, member, ..
            } => {
                assert_eq!(type_name, "Mystery");
                assert_eq!(member, "nsIFoo::m");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_typedef_cycle() {
        let err = resolve("typedef B A; typedef A B;").expect_err("should fail");
        assert!(matches!(err, IdlError::Resolution { .. }));
    }

    #[test]
    fn test_evaluate_constants() {
        let idl = resolve(
            r#"
interface nsIFoo : nsISupports {
  const long A = 0x10;
  const long B = A | 1;
  const long C = (B << 2) - 4;
  const long D = -C;
};
"#,
        )
        .expect("Failed to resolve");
        let iface = idl.find_interface("nsIFoo").expect("interface");
        let values: Vec<_> = iface.constants().map(|c| c.value).collect();
        assert_eq!(values, vec![16, 17, 64, -64]);
    }

    #[test]
    fn test_constant_ranges() {
        let idl = resolve(
            r#"
interface nsIFoo : nsISupports {
  const unsigned long long ALL = 0xFFFFFFFFFFFFFFFF;
  const long long LOW = -0x7FFFFFFFFFFFFFFF - 1;
  const unsigned short TOP = 0xFFFF;
};
"#,
        )
        .expect("Failed to resolve");
        let iface = idl.find_interface("nsIFoo").expect("interface");
        let values: Vec<_> = iface.constants().map(|c| c.value).collect();
        assert_eq!(values, vec![i128::from(u64::MAX), i128::from(i64::MIN), 65535]);

        let err = resolve("interface nsIFoo : nsISupports { const unsigned short X = 0x10000; };")
            .expect_err("should fail");
        assert!(err.to_string().contains("does not fit in unsigned short"));

        let err = resolve("interface nsIFoo : nsISupports { const unsigned long X = -1; };")
            .expect_err("should fail");
        assert!(matches!(err, IdlError::Resolution { .. }));
    }

    #[test]
    fn test_evaluate_undefined_constant() {
        let err = resolve("interface nsIFoo : nsISupports { const long A = B; };")
            .expect_err("should fail");
        assert!(err.to_string().contains("undefined constant 'B'"));
    }

    #[test]
    fn test_resolve_through_include() {
        let base_file = parse_idl(
            "typedef unsigned long long DOMTimeStamp; interface nsIDOMEventTarget;",
            "base.idl",
        )
        .expect("Failed to parse");
        let base = Rc::new(
            resolve_file(&base_file, PathBuf::from("./base.idl"), Vec::new())
                .expect("Failed to resolve"),
        );

        let leaf_file = parse_idl(
            "interface nsIDOMBarEvent : nsIDOMEvent { readonly attribute DOMTimeStamp at; \
             readonly attribute nsIDOMEventTarget relatedTarget; };",
            "leaf.idl",
        )
        .expect("Failed to parse");
        let leaf = resolve_file(&leaf_file, PathBuf::from("./leaf.idl"), vec![base])
            .expect("Failed to resolve");

        let iface = leaf.find_interface("nsIDOMBarEvent").expect("interface");
        let natives: Vec<_> = iface.attributes().map(|a| a.native.clone()).collect();
        assert_eq!(
            natives,
            vec![
                NativeType::Scalar("uint64_t".to_string()),
                NativeType::Pointer("nsIDOMEventTarget".to_string()),
            ]
        );
    }
}
