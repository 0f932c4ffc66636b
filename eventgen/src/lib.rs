//! # eventgen
//!
//! Generates DOM event classes and their WebIDL bindings from XPIDL event
//! interfaces.
//!
//! A configuration file lists event names. For each name `E` the generator
//! loads `nsIDOM{E}.idl` from the include path, flattens the interface's
//! inheritance chain and emits:
//!
//! - a header with one `NS_NewDOM{E}` factory prototype per event
//! - a header declaring one C++ class per event
//! - the C++ implementation of those classes
//! - one `{E}.webidl` file per event (never overwritten)
//! - an optional make dependency file listing every schema read
//!
//! ## Quick Start
//!
//! ```ignore
//! use eventgen::prelude::*;
//!
//! let config = Configuration::from_file(Path::new("event_impl_gen.toml"))?;
//! let session = GenerationSession::open(config, SchemaLoader::new(["."]))?;
//! let outputs = OutputPaths {
//!     stub: Some("GeneratedEvents.cpp".into()),
//!     ..OutputPaths::default()
//! };
//! Generator::new(&session).write(&outputs)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`idl`] - XPIDL lexing, parsing, resolution, loading and flattening
//! - [`codegen`] - Configuration, type mapping and artifact emitters

pub mod prelude;

/// XPIDL front end.
pub mod idl {
    pub use eventgen_idl::*;
}

/// Artifact generation.
pub mod codegen {
    pub use eventgen_codegen::*;
}

// Re-export commonly used items at the crate root
pub use eventgen_codegen::{
    CodegenError, Configuration, GenerationSession, Generator, OutputPaths, generate,
    generate_from_file,
};
pub use eventgen_idl::{IdlError, SchemaLoader};
