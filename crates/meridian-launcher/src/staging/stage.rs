//! Program staging.
//!
//! The program's binary artifact is copied byte for byte into the working
//! directory and a new handle pointing at the copy is produced. Submission
//! then depends only on the local copy: the original artifact can move or
//! be deleted without affecting the launch, and remote cleanup never
//! touches it.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tokio::task::spawn_blocking;
use tracing::debug;

use crate::config::PlatformConfig;
use crate::error::{LaunchError, LaunchResult};
use crate::program::ProgramHandle;
use crate::staging::WorkDir;

/// File name of a container logging configuration, both inside program
/// bundles and in the working directory.
pub const LOGGING_FILE_NAME: &str = "logging.toml";

/// A program staged into the working directory.
#[derive(Debug)]
pub struct StagedProgram {
    handle: ProgramHandle,
    unpack_dir: PathBuf,
}

impl StagedProgram {
    /// Handle whose artifact points at the local copy.
    #[must_use]
    pub const fn handle(&self) -> &ProgramHandle {
        &self.handle
    }

    /// Directory the program bundle was unpacked into.
    ///
    /// Empty when the artifact is an opaque binary rather than an archive.
    #[must_use]
    pub fn unpack_dir(&self) -> &Path {
        &self.unpack_dir
    }

    /// File name of the staged binary, used as its logical resource name.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        self.handle
            .artifact()
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or(self.handle.name())
    }
}

/// Copy the program artifact into the working directory.
///
/// The copy gets a fresh unique name, and the bundle is unpacked (when it
/// is an archive) so bundled resource files can be discovered. Artifacts
/// that are not archives unpack to nothing; that is not an error.
pub async fn stage_program(
    program: &ProgramHandle,
    workdir: &WorkDir,
) -> LaunchResult<StagedProgram> {
    let src = program.artifact().to_path_buf();
    let staged_name = staged_file_name(&src, program.name());
    let dest = workdir.file(&staged_name);

    tokio::fs::copy(&src, &dest)
        .await
        .map_err(|e| LaunchError::staging("failed to copy program artifact", e))?;

    let unpack_dir = workdir.subdir("program")?;
    let unpacked = {
        let dest = dest.clone();
        let unpack_dir = unpack_dir.clone();
        spawn_blocking(move || unpack_archive(&dest, &unpack_dir))
            .await
            .map_err(|e| LaunchError::staging("program unpack task failed", e.into()))?
    };

    debug!(
        program_id = %program.id(),
        staged = %dest.display(),
        unpacked,
        "staged program artifact"
    );

    Ok(StagedProgram {
        handle: ProgramHandle::new(program.id().clone(), program.name(), dest),
        unpack_dir,
    })
}

/// Resolve the logging configuration shipped with the launch.
///
/// Prefers a configuration bundled in the program itself; falls back to
/// the platform's template, copied into the working directory. Neither
/// existing means the launch proceeds without one.
pub fn resolve_logging_resource(
    platform: &PlatformConfig,
    staged: &StagedProgram,
    workdir: &WorkDir,
) -> LaunchResult<Option<PathBuf>> {
    let bundled = staged.unpack_dir().join(LOGGING_FILE_NAME);
    if bundled.is_file() {
        debug!(path = %bundled.display(), "using program-bundled logging configuration");
        return Ok(Some(bundled));
    }

    let Some(template) = &platform.container_log_config else {
        return Ok(None);
    };

    let dest = workdir.file(LOGGING_FILE_NAME);
    std::fs::copy(template, &dest)
        .map_err(|e| LaunchError::staging("failed to copy logging template", e))?;
    debug!(path = %dest.display(), "using platform logging template");
    Ok(Some(dest))
}

fn staged_file_name(artifact: &Path, fallback_name: &str) -> String {
    let stem = artifact
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or(fallback_name);
    let suffix = ulid::Ulid::new().to_string().to_lowercase();

    match artifact.extension().and_then(std::ffi::OsStr::to_str) {
        Some(ext) => format!("{stem}-{suffix}.{ext}"),
        None => format!("{stem}-{suffix}"),
    }
}

/// Unpack a staged bundle for resource discovery. Returns whether anything
/// was unpacked; artifacts that are not archives yield `false`.
fn unpack_archive(src: &Path, dest: &Path) -> bool {
    let data = match std::fs::read(src) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %src.display(), error = %e, "could not read staged artifact");
            return false;
        }
    };

    let decompressed = match zstd::decode_all(Cursor::new(&data)) {
        Ok(decompressed) => decompressed,
        Err(_) => {
            debug!(path = %src.display(), "program artifact is not an archive");
            return false;
        }
    };

    match tar::Archive::new(Cursor::new(decompressed)).unpack(dest) {
        Ok(()) => true,
        Err(e) => {
            debug!(path = %src.display(), error = %e, "program bundle did not unpack");
            false
        }
    }
}
