//! # eventgen IDL
//!
//! XPIDL front end for the event class generator.
//!
//! This crate provides:
//! - Lexing and parsing of XPIDL files (interfaces, dictionaries, typedefs, natives)
//! - Duplicate-declaration validation
//! - Type resolution into a closed native classification
//! - Include-path schema loading with memoization and dependency tracking
//! - Inheritance flattening for event interfaces

pub mod error;
pub mod flatten;
pub mod ir;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod resolve;
pub mod types;
pub mod validation;

pub use error::{IdlError, ParseError};
pub use flatten::{
    FlattenedInterface, ROOT_INTERFACE, class_name, dictionary_lineage, flatten,
    interface_lineage,
};
pub use ir::{
    Attribute, Constant, Dictionary, Idl, Interface, Member, Method, NativeType, Production,
    TextKind, VARIANT_INTERFACE,
};
pub use loader::{EVENT_INTERFACE_PREFIX, SchemaLoader, event_file_name, event_interface_name};
pub use parser::parse_idl;
pub use types::{DefaultValue, IdlAttr, IdlFile};
