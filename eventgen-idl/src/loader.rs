//! Schema loading: include-path search, memoized parsing and dependency
//! recording.

use crate::error::IdlError;
use crate::ir::{Dictionary, Idl, Interface};
use crate::parser::parse_idl;
use crate::resolve::resolve_file;
use crate::validation::validate_file;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Prefix shared by every event interface name.
pub const EVENT_INTERFACE_PREFIX: &str = "nsIDOM";

/// Returns the interface name for an event (`MouseEvent` -> `nsIDOMMouseEvent`).
#[must_use]
pub fn event_interface_name(event: &str) -> String {
    format!("{EVENT_INTERFACE_PREFIX}{event}")
}

/// Returns the schema file name for an event (`MouseEvent` -> `nsIDOMMouseEvent.idl`).
#[must_use]
pub fn event_file_name(event: &str) -> String {
    format!("{}.idl", event_interface_name(event))
}

/// Loads XPIDL files from an ordered list of include directories.
///
/// Each file is parsed and resolved once per loader; loading the same name
/// again returns the same handle. Every file read is recorded, in first-read
/// order, for dependency output.
#[derive(Debug)]
pub struct SchemaLoader {
    include_dirs: Vec<PathBuf>,
    cache: HashMap<String, Rc<Idl>>,
    loading: Vec<String>,
    dependencies: Vec<PathBuf>,
}

impl SchemaLoader {
    /// Creates a loader searching `include_dirs` in order.
    #[must_use]
    pub fn new<I, P>(include_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            include_dirs: include_dirs.into_iter().map(Into::into).collect(),
            cache: HashMap::new(),
            loading: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Returns the include directories in search order.
    #[must_use]
    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// Returns every schema file read so far, in first-read order.
    #[must_use]
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Returns an already-loaded file.
    #[must_use]
    pub fn get(&self, file: &str) -> Option<&Rc<Idl>> {
        self.cache.get(file)
    }

    /// Locates a file in the include directories; the first match wins.
    ///
    /// The returned path always joins directory and file with `/`, so it can
    /// be written verbatim to dependency files.
    ///
    /// # Errors
    /// Returns `IdlError::Lookup` naming the file and every searched directory.
    pub fn find(&self, file: &str) -> Result<PathBuf, IdlError> {
        self.include_dirs
            .iter()
            .map(|dir| PathBuf::from(format!("{}/{}", dir.display(), file)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| IdlError::Lookup {
                file: file.to_string(),
                search_path: self.include_dirs.clone(),
            })
    }

    /// Loads the schema file of a configured event.
    ///
    /// # Errors
    /// See [`SchemaLoader::load`].
    pub fn load_event(&mut self, event: &str) -> Result<Rc<Idl>, IdlError> {
        self.load(&event_file_name(event))
    }

    /// Loads, parses and resolves a file and, recursively, its includes.
    ///
    /// # Errors
    /// Returns `IdlError` if the file or one of its includes cannot be
    /// found, read, parsed, validated or resolved, or if includes form a
    /// cycle.
    pub fn load(&mut self, file: &str) -> Result<Rc<Idl>, IdlError> {
        if let Some(idl) = self.cache.get(file) {
            tracing::trace!("schema cache hit: {}", file);
            return Ok(Rc::clone(idl));
        }

        if self.loading.iter().any(|f| f == file) {
            let mut path = self.loading.clone();
            path.push(file.to_string());
            return Err(IdlError::IncludeCycle {
                path: path.join(" -> "),
            });
        }

        let path = self.find(file)?;
        self.record_dependency(&path);
        tracing::debug!("loading schema {}", path.display());

        let source = std::fs::read_to_string(&path).map_err(|source| IdlError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_idl(&source, file)?;
        validate_file(&parsed)?;

        self.loading.push(file.to_string());
        let includes = parsed
            .includes()
            .map(|include| self.load(include))
            .collect::<Result<Vec<_>, _>>();
        self.loading.pop();

        let idl = Rc::new(resolve_file(&parsed, path, includes?)?);
        self.cache.insert(file.to_string(), Rc::clone(&idl));
        Ok(idl)
    }

    /// Resolves the base interface of `iface` from the file that declares it.
    ///
    /// Returns `None` for an interface without a base.
    ///
    /// # Errors
    /// Returns `IdlError::Resolution` if the base is not defined in that
    /// file's include closure (including the case of a base that is only
    /// forward-declared).
    pub fn resolve_base(&self, iface: &Interface) -> Result<Option<Rc<Interface>>, IdlError> {
        let Some(base) = iface.base.as_deref() else {
            return Ok(None);
        };
        let scope = self.scope_of(&iface.file, base)?;
        match scope.find_interface(base) {
            Some(found) => Ok(Some(found)),
            None => Err(undefined(base, &iface.name, scope.declares(base))),
        }
    }

    /// Resolves the base dictionary of `dict` from the file that declares it.
    ///
    /// # Errors
    /// Returns `IdlError::Resolution` if the base is not defined in scope.
    pub fn resolve_dictionary_base(
        &self,
        dict: &Dictionary,
    ) -> Result<Option<Rc<Dictionary>>, IdlError> {
        let Some(base) = dict.base.as_deref() else {
            return Ok(None);
        };
        let scope = self.scope_of(&dict.file, base)?;
        match scope.find_dictionary(base) {
            Some(found) => Ok(Some(found)),
            None => Err(undefined(base, &dict.name, scope.declares(base))),
        }
    }

    fn scope_of(&self, file: &str, name: &str) -> Result<&Rc<Idl>, IdlError> {
        self.cache.get(file).ok_or_else(|| {
            IdlError::resolution(name, format!("declaring file {file} is not loaded"))
        })
    }

    fn record_dependency(&mut self, path: &Path) {
        if !self.dependencies.iter().any(|p| p == path) {
            self.dependencies.push(path.to_path_buf());
        }
    }
}

fn undefined(base: &str, derived: &str, forward_only: bool) -> IdlError {
    let reason = if forward_only {
        format!("base of '{derived}' is only forward-declared")
    } else {
        format!("base of '{derived}' is not declared")
    };
    IdlError::resolution(base, reason)
}
