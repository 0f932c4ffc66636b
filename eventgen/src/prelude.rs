//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use eventgen::prelude::*;
//! ```

// Schema types
pub use eventgen_idl::{
    Attribute, FlattenedInterface, Idl, IdlError, Interface, NativeType, ParseError,
    SchemaLoader, TextKind,
};

// Generation types
pub use eventgen_codegen::{
    CodegenError, Configuration, EventSchema, GenerationSession, GenerationSummary, Generator,
    OutputPaths, TypeMapper, TypeOverride,
};

pub use std::path::{Path, PathBuf};
