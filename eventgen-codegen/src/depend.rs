//! Make-style dependency file generation.

use std::path::{Path, PathBuf};

/// Generator for a dependency file listing every schema file read.
pub struct DependGenerator<'a> {
    target: &'a Path,
    dependencies: &'a [PathBuf],
}

impl<'a> DependGenerator<'a> {
    /// Creates a generator for `target` depending on `dependencies`.
    #[must_use]
    pub fn new(target: &'a Path, dependencies: &'a [PathBuf]) -> Self {
        Self {
            target,
            dependencies,
        }
    }

    /// Generates the target rule followed by an empty rule per dependency.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = format!("{}:", make_quote(self.target));
        for dep in self.dependencies {
            output.push_str(&format!(" \\\n  {}", make_quote(dep)));
        }
        output.push_str("\n\n");
        for dep in self.dependencies {
            output.push_str(&format!("{}:\n", make_quote(dep)));
        }
        output
    }
}

fn make_quote(path: &Path) -> String {
    path.display().to_string().replace(' ', "\\ ")
}
