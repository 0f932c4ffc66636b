//! Error types for code generation.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema loading or resolution error.
    #[error("schema error: {0}")]
    Schema(#[from] eventgen_idl::IdlError),

    /// Malformed configuration file.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// An interface member the generator cannot emit.
    #[error("unsupported idl member {event}::{member}")]
    UnsupportedConstruct {
        /// Event being generated.
        event: String,
        /// Offending member.
        member: String,
    },

    /// A zero default was requested for a type that has none.
    #[error("cannot default attribute '{attribute}' of type {type_name}: script values are not supported in simple events")]
    InvalidDefault {
        /// Attribute name.
        attribute: String,
        /// Declared type.
        type_name: String,
    },

    /// The event's schema file does not declare the event interface.
    #[error("{file} does not declare interface {interface}")]
    MissingInterface {
        /// Expected interface name.
        interface: String,
        /// File that was loaded for the event.
        file: String,
    },

    /// IO error.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    /// Creates an unsupported construct error.
    pub fn unsupported(event: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            event: event.into(),
            member: member.into(),
        }
    }

    /// Creates an invalid default error.
    pub fn invalid_default(attribute: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::InvalidDefault {
            attribute: attribute.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates an IO error for the given path.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
