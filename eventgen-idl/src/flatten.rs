//! Inheritance flattening for event interfaces.

use crate::error::IdlError;
use crate::ir::{Attribute, Dictionary, Interface};
use crate::loader::{EVENT_INTERFACE_PREFIX, SchemaLoader};
use std::collections::HashSet;
use std::rc::Rc;

/// Interface every event interface ultimately derives from.
pub const ROOT_INTERFACE: &str = "nsIDOMEvent";

/// Strips the event interface prefix (`nsIDOMUIEvent` -> `UIEvent`).
#[must_use]
pub fn class_name(interface: &str) -> &str {
    interface
        .strip_prefix(EVENT_INTERFACE_PREFIX)
        .unwrap_or(interface)
}

/// An event interface together with its ancestors below the root.
#[derive(Debug, Clone)]
pub struct FlattenedInterface {
    /// The event interface itself.
    pub leaf: Rc<Interface>,
    /// Ancestors between the root and the leaf, root-adjacent first.
    pub ancestors: Vec<Rc<Interface>>,
}

impl FlattenedInterface {
    /// Returns the attributes declared on the leaf.
    pub fn own_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.leaf.attributes()
    }

    /// Returns the attributes inherited from the ancestors, in chain order.
    pub fn base_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.ancestors.iter().flat_map(|iface| iface.attributes())
    }

    /// Returns inherited attributes followed by the leaf's own.
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.base_attributes().chain(self.own_attributes())
    }

    /// Returns true if any flattened attribute is a variant.
    #[must_use]
    pub fn has_variant(&self) -> bool {
        self.all_attributes().any(Attribute::is_variant)
    }

    /// Returns the C++ class name of the direct base (`Event`, `UIEvent`, ...).
    #[must_use]
    pub fn base_class(&self) -> &str {
        let base = self
            .ancestors
            .last()
            .map_or(ROOT_INTERFACE, |iface| iface.name.as_str());
        class_name(base)
    }
}

/// Walks the base chain of `leaf` up to [`ROOT_INTERFACE`].
///
/// # Errors
/// Returns `IdlError::Resolution` if the leaf has no base, a base cannot be
/// resolved, the chain reaches an interface without a base before the root,
/// or the chain loops.
pub fn flatten(loader: &SchemaLoader, leaf: Rc<Interface>) -> Result<FlattenedInterface, IdlError> {
    let mut ancestors = Vec::new();
    let mut seen = HashSet::from([leaf.name.clone()]);
    let mut current = Rc::clone(&leaf);

    loop {
        let Some(base) = loader.resolve_base(&current)? else {
            return Err(IdlError::resolution(
                &leaf.name,
                format!(
                    "base chain ends at '{}' without reaching {ROOT_INTERFACE}",
                    current.name
                ),
            ));
        };
        if base.name == ROOT_INTERFACE {
            break;
        }
        if !seen.insert(base.name.clone()) {
            return Err(IdlError::resolution(
                &leaf.name,
                format!("inheritance cycle through '{}'", base.name),
            ));
        }
        ancestors.push(Rc::clone(&base));
        current = base;
    }

    ancestors.reverse();
    tracing::trace!(
        "flattened {} over {} ancestor(s)",
        leaf.name,
        ancestors.len()
    );
    Ok(FlattenedInterface { leaf, ancestors })
}

/// Returns every interface from the top of the hierarchy down to `iface`.
///
/// Unlike [`flatten`] the walk does not stop at the root event interface;
/// it continues until an interface without a base.
///
/// # Errors
/// Returns `IdlError::Resolution` if a base cannot be resolved or the chain
/// loops.
pub fn interface_lineage(
    loader: &SchemaLoader,
    iface: &Rc<Interface>,
) -> Result<Vec<Rc<Interface>>, IdlError> {
    let mut lineage = vec![Rc::clone(iface)];
    let mut seen = HashSet::from([iface.name.clone()]);
    let mut current = Rc::clone(iface);

    while let Some(base) = loader.resolve_base(&current)? {
        if !seen.insert(base.name.clone()) {
            return Err(IdlError::resolution(
                &iface.name,
                format!("inheritance cycle through '{}'", base.name),
            ));
        }
        lineage.push(Rc::clone(&base));
        current = base;
    }

    lineage.reverse();
    Ok(lineage)
}

/// Returns every dictionary from the top of the hierarchy down to `dict`.
///
/// # Errors
/// Returns `IdlError::Resolution` if a base cannot be resolved or the chain
/// loops.
pub fn dictionary_lineage(
    loader: &SchemaLoader,
    dict: &Rc<Dictionary>,
) -> Result<Vec<Rc<Dictionary>>, IdlError> {
    let mut lineage = vec![Rc::clone(dict)];
    let mut seen = HashSet::from([dict.name.clone()]);
    let mut current = Rc::clone(dict);

    while let Some(base) = loader.resolve_dictionary_base(&current)? {
        if !seen.insert(base.name.clone()) {
            return Err(IdlError::resolution(
                &dict.name,
                format!("inheritance cycle through '{}'", base.name),
            ));
        }
        lineage.push(Rc::clone(&base));
        current = base;
    }

    lineage.reverse();
    Ok(lineage)
}
