//! # eventgen Codegen
//!
//! C++ and WebIDL generation for DOM event classes.
//!
//! This crate provides:
//! - TOML configuration with a type override table
//! - Type projections (storage, parameter and binding forms)
//! - A generation session holding the per-run include and name sets
//! - Header, class declaration, implementation, WebIDL and dependency emitters

pub mod config;
pub mod cpp;
pub mod depend;
pub mod error;
pub mod generator;
pub mod session;
pub mod type_map;
pub mod webidl;

pub use config::{Configuration, TypeOverride};
pub use error::CodegenError;
pub use generator::{Artifact, GenerationSummary, Generator, OutputPaths};
pub use session::{EventSchema, GenerationSession};
pub use type_map::TypeMapper;

use eventgen_idl::SchemaLoader;
use std::path::{Path, PathBuf};

/// Loads the configured events and writes every requested artifact.
///
/// # Arguments
/// * `config` - Generator configuration
/// * `include_dirs` - Schema search path, in order
/// * `outputs` - Requested output locations
///
/// # Errors
/// Returns `CodegenError` if any schema fails to load or any artifact fails
/// to render or write. Nothing is written in the render failure case.
pub fn generate(
    config: Configuration,
    include_dirs: Vec<PathBuf>,
    outputs: &OutputPaths,
) -> Result<GenerationSummary, CodegenError> {
    let session = GenerationSession::open(config, SchemaLoader::new(include_dirs))?;
    Generator::new(&session).write(outputs)
}

/// Reads a configuration file and generates every requested artifact.
///
/// # Errors
/// See [`generate`] and [`Configuration::from_file`].
pub fn generate_from_file(
    path: &Path,
    include_dirs: Vec<PathBuf>,
    outputs: &OutputPaths,
) -> Result<GenerationSummary, CodegenError> {
    let config = Configuration::from_file(path)?;
    generate(config, include_dirs, outputs)
}
