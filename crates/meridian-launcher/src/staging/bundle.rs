//! Plugin artifact bundling.
//!
//! A launch may carry a directory of plugin artifacts. The directory is
//! packed into a single archive and registered twice in the resource set:
//! once expanded into a directory (the classpath view) and once as the
//! whole archive (for later re-distribution). The plugin arguments are
//! rewritten to the logical resource names, since the remote side resolves
//! names, not local paths.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use meridian_cluster::{LocalizeResource, ResourceSet};
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::error::{LaunchError, LaunchResult};
use crate::options::{LaunchOptions, PLUGIN_ARCHIVE_ARG, PLUGIN_DIR_ARG};
use crate::staging::WorkDir;

/// Logical name of the expanded plugin directory resource.
///
/// Resource names are fixed by the container runtime contract.
pub const PLUGIN_DIR_RESOURCE: &str = "artifacts";

/// Logical name of the whole-archive plugin resource.
pub const PLUGIN_ARCHIVE_RESOURCE: &str = "artifacts_archive.jar";

/// Local file the plugin archive is staged to.
const PLUGIN_ARCHIVE_FILE: &str = "plugins.tar.zst";

const COMPRESSION_LEVEL: i32 = 3;

/// Bundle the plugin directory named by the launch options, if any.
///
/// Options without a plugin-directory argument are returned unchanged and
/// contribute no resources. Otherwise the directory contents are archived
/// into the working directory, registered under [`PLUGIN_DIR_RESOURCE`]
/// (expanded) and [`PLUGIN_ARCHIVE_RESOURCE`] (single file), and a new
/// options value is returned with both plugin arguments rewritten to those
/// names.
pub async fn bundle_plugins(
    options: &LaunchOptions,
    workdir: &WorkDir,
    resources: &mut ResourceSet,
) -> LaunchResult<LaunchOptions> {
    let Some(plugin_dir) = options.system().get(PLUGIN_DIR_ARG) else {
        return Ok(options.clone());
    };

    let plugin_dir = PathBuf::from(plugin_dir);
    let archive_path = workdir.file(PLUGIN_ARCHIVE_FILE);

    let archive = {
        let src = plugin_dir.clone();
        spawn_blocking(move || archive_directory(&src))
            .await
            .map_err(|e| LaunchError::staging("plugin bundling task failed", e.into()))?
            .map_err(|e| LaunchError::staging("failed to bundle plugin directory", e))?
    };

    tokio::fs::write(&archive_path, &archive)
        .await
        .map_err(|e| LaunchError::staging("failed to write plugin archive", e))?;

    info!(
        plugin_dir = %plugin_dir.display(),
        archive = %archive_path.display(),
        size = archive.len(),
        "bundled plugin directory"
    );

    resources.insert(
        PLUGIN_DIR_RESOURCE,
        LocalizeResource::new(&archive_path, true),
    );
    resources.insert(
        PLUGIN_ARCHIVE_RESOURCE,
        LocalizeResource::new(&archive_path, false),
    );

    let system = options
        .system()
        .with(PLUGIN_DIR_ARG, PLUGIN_DIR_RESOURCE)
        .with(PLUGIN_ARCHIVE_ARG, PLUGIN_ARCHIVE_RESOURCE);
    Ok(options.rewrite_system_args(system))
}

/// Pack a directory's contents into a tar.zst archive held in memory.
fn archive_directory(src: &Path) -> std::io::Result<Vec<u8>> {
    let mut tar_data = Vec::new();

    {
        let mut tar_builder = tar::Builder::new(&mut tar_data);
        tar_builder.follow_symlinks(false);

        for entry in walkdir(src)? {
            let path = entry?;
            if path == src {
                continue;
            }

            let relative_path = path
                .strip_prefix(src)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

            if path.is_file() {
                tar_builder.append_path_with_name(&path, relative_path)?;
            } else if path.is_dir() {
                tar_builder.append_dir(relative_path, &path)?;
            }
        }

        tar_builder.finish()?;
    }

    debug!(uncompressed_size = tar_data.len(), "created plugin archive");

    zstd::encode_all(Cursor::new(&tar_data), COMPRESSION_LEVEL)
}

fn walkdir(path: &Path) -> std::io::Result<impl Iterator<Item = std::io::Result<PathBuf>>> {
    let entries = std::fs::read_dir(path)?;
    let mut paths = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        paths.push(Ok(path.clone()));

        if path.is_dir() {
            for subpath in walkdir(&path)? {
                paths.push(subpath);
            }
        }
    }

    Ok(paths.into_iter())
}
