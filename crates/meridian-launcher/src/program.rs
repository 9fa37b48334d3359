//! Program handles.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identifier of an executable unit, e.g. `"default.analytics.wordcount"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(String);

impl ProgramId {
    /// Create a program ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProgramId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to an already-built executable unit.
///
/// Immutable: the staging step produces a *new* handle whose artifact
/// points at a local copy; the handle it was derived from is never
/// touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHandle {
    id: ProgramId,
    name: String,
    artifact: PathBuf,
}

impl ProgramHandle {
    /// Create a handle for a program whose binary lives at `artifact`.
    #[must_use]
    pub fn new(id: ProgramId, name: impl Into<String>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            artifact: artifact.into(),
        }
    }

    /// Program identifier.
    #[must_use]
    pub const fn id(&self) -> &ProgramId {
        &self.id
    }

    /// Human-readable program name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the program's binary artifact.
    #[must_use]
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }
}
