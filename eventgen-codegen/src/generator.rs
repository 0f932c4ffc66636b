//! Orchestration of all artifacts for one generator run.

use crate::cpp::{ClassDeclarationGenerator, HeaderGenerator, SourceGenerator};
use crate::depend::DependGenerator;
use crate::error::CodegenError;
use crate::session::GenerationSession;
use crate::webidl::WebIdlGenerator;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Requested output locations. Artifacts without a path are not generated.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    /// Factory prototype header.
    pub header: Option<PathBuf>,
    /// Class declarations header.
    pub class_declarations: Option<PathBuf>,
    /// Implementation file.
    pub stub: Option<PathBuf>,
    /// Dependency file; only written together with `stub`.
    pub makedepend: Option<PathBuf>,
    /// Directory receiving one `{E}.webidl` per event.
    pub webidl_dir: Option<PathBuf>,
}

/// A rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Destination path.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Files produced by [`Generator::write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// WebIDL files left untouched because they already existed.
    pub skipped: Vec<PathBuf>,
}

/// Renders and writes every requested artifact.
pub struct Generator<'a> {
    session: &'a GenerationSession,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(session: &'a GenerationSession) -> Self {
        Self { session }
    }

    /// Renders every requested artifact in memory.
    ///
    /// WebIDL files that already exist are not rendered and are returned in
    /// the second list instead.
    ///
    /// # Errors
    /// Returns the first `CodegenError` raised by any emitter.
    pub fn render(
        &self,
        outputs: &OutputPaths,
    ) -> Result<(Vec<Artifact>, Vec<PathBuf>), CodegenError> {
        let mut artifacts = Vec::new();
        let mut skipped = Vec::new();

        if let Some(path) = &outputs.header {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: HeaderGenerator::new(self.session).generate(),
            });
        }

        if let Some(path) = &outputs.class_declarations {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: ClassDeclarationGenerator::new(self.session).generate(),
            });
        }

        if let Some(path) = &outputs.stub {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: SourceGenerator::new(self.session).generate()?,
            });
            if let Some(depend) = &outputs.makedepend {
                artifacts.push(Artifact {
                    path: depend.clone(),
                    contents: DependGenerator::new(path, self.session.dependencies()).generate(),
                });
            }
        } else if outputs.makedepend.is_some() {
            tracing::warn!("dependency output requested without a stub output; skipping");
        }

        if let Some(dir) = &outputs.webidl_dir {
            let webidl = WebIdlGenerator::new(self.session);
            for event in self.session.events() {
                let path = dir.join(crate::webidl::webidl_file_name(&event.name));
                if path.exists() {
                    skipped.push(path);
                    continue;
                }
                artifacts.push(Artifact {
                    path,
                    contents: webidl.generate_event(event)?,
                });
            }
        }

        Ok((artifacts, skipped))
    }

    /// Renders every requested artifact, then writes them.
    ///
    /// Each artifact is first staged in a temporary file next to its
    /// destination. Nothing is moved into place unless every artifact
    /// rendered and staged, so a failure leaves no partial output.
    ///
    /// # Errors
    /// Returns `CodegenError` if rendering fails, a destination directory
    /// is missing, or a file cannot be written.
    pub fn write(&self, outputs: &OutputPaths) -> Result<GenerationSummary, CodegenError> {
        let (artifacts, skipped) = self.render(outputs)?;
        let mut summary = GenerationSummary {
            written: Vec::with_capacity(artifacts.len()),
            skipped,
        };

        for path in &summary.skipped {
            tracing::debug!("{} exists, not overwriting", path.display());
        }

        for artifact in &artifacts {
            let dir = target_dir(&artifact.path);
            if !dir.is_dir() {
                return Err(CodegenError::io(
                    &artifact.path,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("directory {} does not exist", dir.display()),
                    ),
                ));
            }
        }

        let mut staged = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let file = stage(&artifact)?;
            staged.push((file, artifact.path));
        }

        for (file, path) in staged {
            file.persist(&path).map_err(|e| CodegenError::io(&path, e.error))?;
            tracing::info!("wrote {}", path.display());
            summary.written.push(path);
        }

        Ok(summary)
    }
}

/// Directory an output path is written into.
fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Writes an artifact to a temporary file in its destination directory.
fn stage(artifact: &Artifact) -> Result<NamedTempFile, CodegenError> {
    let mut file = NamedTempFile::new_in(target_dir(&artifact.path))
        .map_err(|e| CodegenError::io(&artifact.path, e))?;
    file.write_all(artifact.contents.as_bytes())
        .map_err(|e| CodegenError::io(&artifact.path, e))?;
    // Temporary files are private; outputs are ordinary build files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| CodegenError::io(&artifact.path, e))?;
    }
    tracing::trace!("staged {} at {}", artifact.path.display(), file.path().display());
    Ok(file)
}
