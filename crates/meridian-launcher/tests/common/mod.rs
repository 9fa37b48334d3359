//! Shared fixtures for launcher integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use meridian_cluster::MockCluster;
use meridian_launcher::{
    ClusterBackedLauncher, ClusterConfig, PlatformConfig, ProgramHandle, ProgramId, ProgramRunner,
};
use tempfile::TempDir;

/// Initialise test logging once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A runner wired to a mock cluster, with all local state under one
/// temporary root.
pub struct TestHarness {
    pub cluster: Arc<MockCluster>,
    pub runner: ProgramRunner,
    pub root: TempDir,
}

impl TestHarness {
    /// Harness with default configuration.
    pub fn new() -> Self {
        Self::custom(|_, _| {})
    }

    /// Harness with configuration adjusted by the caller.
    pub fn custom(configure: impl FnOnce(&mut PlatformConfig, &mut ClusterConfig)) -> Self {
        init_tracing();

        let root = TempDir::new().expect("create harness root");
        let mut platform = PlatformConfig {
            local_data_dir: root.path().join("data"),
            ..PlatformConfig::default()
        };
        let mut cluster_config = ClusterConfig::default();
        configure(&mut platform, &mut cluster_config);

        let cluster = Arc::new(MockCluster::new());
        let runner = ProgramRunner::new(
            platform,
            cluster_config,
            Arc::new(ClusterBackedLauncher::new(Arc::clone(&cluster))),
        );

        Self {
            cluster,
            runner,
            root,
        }
    }

    /// Root under which per-launch working directories are created.
    pub fn staging_root(&self) -> PathBuf {
        self.root.path().join("data").join("tmp")
    }

    /// Working directories currently present under the staging root.
    pub fn workdirs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.staging_root()) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect()
    }

    /// Write a program artifact under the harness root and hand back its
    /// handle.
    pub fn write_program(&self, file_name: &str, bytes: &[u8]) -> ProgramHandle {
        let repo = self.root.path().join("repo");
        std::fs::create_dir_all(&repo).expect("create program repo");
        let artifact = repo.join(file_name);
        std::fs::write(&artifact, bytes).expect("write program artifact");

        let name = file_name.split('.').next().unwrap_or(file_name);
        ProgramHandle::new(
            ProgramId::new(format!("default.analytics.{name}")),
            name,
            artifact,
        )
    }

    /// Create a plugin directory containing the given files.
    pub fn plugin_dir(&self, files: &[(&str, &[u8])]) -> PathBuf {
        let dir = self.root.path().join("plugins");
        std::fs::create_dir_all(&dir).expect("create plugin dir");
        for (name, bytes) in files {
            std::fs::write(dir.join(name), bytes).expect("write plugin file");
        }
        dir
    }
}
