//! Local staging: everything a launch prepares before submission.
//!
//! Staging owns a fresh per-launch working directory and fills it with the
//! artifacts the cluster localizes: config snapshots, the plugin archive,
//! and a private copy of the program binary.

mod bundle;
mod snapshot;
mod stage;

pub use bundle::{bundle_plugins, PLUGIN_ARCHIVE_RESOURCE, PLUGIN_DIR_RESOURCE};
pub use snapshot::{snapshot_configs, CLUSTER_CONF_RESOURCE, PLATFORM_CONF_RESOURCE};
pub use stage::{resolve_logging_resource, stage_program, StagedProgram, LOGGING_FILE_NAME};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LaunchError, LaunchResult};

/// A process-local scratch directory owned by a single launch call.
///
/// Created fresh per call under the platform's staging root and destroyed
/// exactly once: by the cleanup guard after a lifecycle signal, or
/// synchronously by the orchestrator if the launch fails before the
/// cluster accepts it. Never shared across concurrent launches.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create a fresh, uniquely named working directory under `root`.
    pub fn create(root: &Path) -> LaunchResult<Self> {
        std::fs::create_dir_all(root)
            .map_err(|e| LaunchError::staging("failed to create staging root", e))?;

        let path = root.join(format!(
            "launch-{}",
            ulid::Ulid::new().to_string().to_lowercase()
        ));
        std::fs::create_dir(&path)
            .map_err(|e| LaunchError::staging("failed to create working directory", e))?;

        debug!(path = %path.display(), "created working directory");
        Ok(Self { path })
    }

    /// Path of the working directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the working directory.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Create a subdirectory and return its path.
    pub fn subdir(&self, name: &str) -> LaunchResult<PathBuf> {
        let dir = self.path.join(name);
        std::fs::create_dir_all(&dir)
            .map_err(|e| LaunchError::staging("failed to create staging subdirectory", e))?;
        Ok(dir)
    }

    /// Delete the working directory, logging failures instead of raising.
    pub fn remove_logged(&self) {
        remove_dir_logged(&self.path);
    }

    /// Consume the working directory, returning its path.
    ///
    /// Transfers deletion responsibility to the caller.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Delete a directory recursively. Cleanup is best effort; failures are
/// logged and never propagate into the launch control path.
pub(crate) fn remove_dir_logged(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!(path = %path.display(), "removed working directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove working directory");
        }
    }
}
