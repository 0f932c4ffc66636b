//! Structural checks on a parsed XPIDL file.

use crate::error::IdlError;
use crate::types::{IdlFile, ProductionDecl};
use std::collections::HashSet;

/// Validates a parsed file for duplicate declarations.
///
/// A forward declaration may be repeated and may coexist with the full
/// definition of the same interface; any other repeated name is an error.
///
/// # Errors
/// Returns `IdlError::Duplicate` naming the first repeated declaration.
pub fn validate_file(file: &IdlFile) -> Result<(), IdlError> {
    let mut defined = HashSet::new();

    for production in &file.productions {
        let Some(name) = production.name() else {
            continue;
        };
        if matches!(production, ProductionDecl::Forward(_)) {
            continue;
        }
        if !defined.insert(name) {
            return Err(IdlError::duplicate(production.kind(), name, &file.name));
        }

        match production {
            ProductionDecl::Interface(iface) => {
                validate_unique(iface.members.iter().map(|m| m.name()), "member", &iface.name)?;
            }
            ProductionDecl::Dictionary(dict) => {
                validate_unique(
                    dict.members.iter().map(|m| m.name.as_str()),
                    "dictionary member",
                    &dict.name,
                )?;
            }
            _ => {}
        }
    }

    Ok(())
}

fn validate_unique<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
    scope: &str,
) -> Result<(), IdlError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(IdlError::duplicate(kind, name, scope));
        }
    }
    Ok(())
}
