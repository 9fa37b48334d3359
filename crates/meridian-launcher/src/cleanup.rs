//! Exactly-once cleanup of launch working directories.
//!
//! Once the cluster accepts a submission it keeps its own copy of the
//! localized resources, so the local working directory can go as soon as
//! the application is running or finished. Both notifications originate
//! from independent backend channels and may fire concurrently; the
//! deletion must happen at most once.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use meridian_cluster::RemoteHandle;
use tracing::debug;

use crate::staging::{remove_dir_logged, WorkDir};

/// One-shot deletion shared by both lifecycle registrations.
///
/// The compare-and-set transition is the only synchronization: the first
/// invocation wins, every concurrent or later one observes the flag and
/// returns without touching disk. Lock-free, so it is safe on any backend
/// callback thread.
#[derive(Clone)]
struct CleanupOnce {
    fired: Arc<AtomicBool>,
    path: Arc<PathBuf>,
    app_id: Arc<str>,
}

impl CleanupOnce {
    fn new(path: PathBuf, app_id: &str) -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            path: Arc::new(path),
            app_id: Arc::from(app_id),
        }
    }

    fn run(&self) {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        debug!(
            app_id = %self.app_id,
            path = %self.path.display(),
            "cleaning up launch working directory"
        );
        remove_dir_logged(&self.path);
    }
}

/// Tie the working directory's lifetime to the handle's lifecycle.
///
/// The same cleanup action is registered against both the "entered
/// running" and the "entered terminal state" notification; whichever fires
/// first deletes the directory, exactly once. Deletion failures are
/// logged, never raised. Returns the handle unchanged so callers observe
/// no interface difference.
pub fn install_cleanup(handle: Box<dyn RemoteHandle>, workdir: WorkDir) -> Box<dyn RemoteHandle> {
    let cleanup = CleanupOnce::new(workdir.into_path(), handle.app_id());

    let on_running = cleanup.clone();
    handle.on_running(Box::new(move || on_running.run()));
    handle.on_terminated(Box::new(move || cleanup.run()));
    handle
}
