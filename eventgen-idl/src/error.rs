//! Error types for XPIDL parsing, loading and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for lexing and parsing a single XPIDL file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input that does not form any token.
    #[error("{file}:{line}:{column}: unrecognized input '{text}'")]
    InvalidToken {
        /// File being parsed.
        file: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// Offending source text.
        text: String,
    },

    /// A token other than the one the grammar requires.
    #[error("{file}:{line}:{column}: expected {expected}, found {found}")]
    Unexpected {
        /// File being parsed.
        file: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// What the parser was looking for.
        expected: String,
        /// What it got instead.
        found: String,
    },

    /// Input ended inside a declaration.
    #[error("{file}: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// File being parsed.
        file: String,
        /// What the parser was looking for.
        expected: String,
    },
}

/// Error type for schema loading and name resolution.
#[derive(Debug, Error)]
pub enum IdlError {
    /// A schema file is not present in any include directory.
    #[error("no IDL file found for interface {file} in include path {search_path:?}")]
    Lookup {
        /// File name that was searched for.
        file: String,
        /// Every directory searched, in order.
        search_path: Vec<PathBuf>,
    },

    /// A referenced interface cannot be resolved, or its base chain is broken.
    #[error("cannot resolve interface '{name}': {reason}")]
    Resolution {
        /// Interface name.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A declared type name has no definition in scope.
    #[error("unknown type '{type_name}' used by '{member}' in {file}")]
    UnknownType {
        /// Declared type token.
        type_name: String,
        /// Member or declaration using the type.
        member: String,
        /// File containing the use.
        file: String,
    },

    /// A name declared twice in the same scope.
    #[error("duplicate {kind} '{name}' in {scope}")]
    Duplicate {
        /// Kind of declaration (interface, member, ...).
        kind: String,
        /// Duplicated name.
        name: String,
        /// File or interface in which the duplicate occurs.
        scope: String,
    },

    /// Files that include each other.
    #[error("include cycle: {path}")]
    IncludeCycle {
        /// Chain of files forming the cycle.
        path: String,
    },

    /// Parse error in a schema file.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO error while reading a schema file.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl IdlError {
    /// Creates a resolution error.
    pub fn resolution(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate definition error.
    pub fn duplicate(
        kind: impl Into<String>,
        name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
            scope: scope.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(
        type_name: impl Into<String>,
        member: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            member: member.into(),
            file: file.into(),
        }
    }
}
