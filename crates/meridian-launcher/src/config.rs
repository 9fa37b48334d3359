//! Platform and host-cluster configuration.
//!
//! Two configuration objects travel with every launch: the platform's own
//! configuration and the configuration of the underlying cluster the
//! platform runs on. Both are snapshotted into the resource set so remote
//! containers see exactly the submitter's view.

use std::collections::BTreeMap;
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{LaunchError, LaunchResult};

/// Platform configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Root directory for the platform's local state.
    #[serde(default = "default_local_data_dir")]
    pub local_data_dir: PathBuf,

    /// Name of the staging scratch directory under `local_data_dir`.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Forward container logs back to the submitter.
    #[serde(default)]
    pub collect_container_logs: bool,

    /// Extra classpath entries appended to every launched container.
    #[serde(default)]
    pub extra_classpath: Vec<String>,

    /// Template for the container logging configuration.
    ///
    /// Used when a program does not bundle its own; absent means programs
    /// without a bundled configuration launch without one.
    #[serde(default)]
    pub container_log_config: Option<PathBuf>,
}

fn default_local_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/meridian")
}

fn default_temp_dir() -> String {
    "tmp".to_owned()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            local_data_dir: default_local_data_dir(),
            temp_dir: default_temp_dir(),
            collect_container_logs: false,
            extra_classpath: Vec::new(),
            container_log_config: None,
        }
    }
}

impl PlatformConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. `meridian.toml` in the current directory (if present)
    /// 3. Environment variables with `MERIDIAN_` prefix
    pub fn load() -> LaunchResult<Self> {
        Figment::new()
            .merge(Toml::file("meridian.toml"))
            .merge(Env::prefixed("MERIDIAN_").split("__"))
            .extract()
            .map_err(|e| LaunchError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LaunchResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MERIDIAN_").split("__"))
            .extract()
            .map_err(|e| LaunchError::Config(e.to_string()))
    }

    /// Root under which per-launch working directories are created.
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.local_data_dir.join(&self.temp_dir)
    }

    /// Flatten into the property view consumed by remote containers.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        properties.insert(
            "local.data.dir".to_owned(),
            self.local_data_dir.display().to_string(),
        );
        properties.insert("temp.dir".to_owned(), self.temp_dir.clone());
        properties.insert(
            "collect.container.logs".to_owned(),
            self.collect_container_logs.to_string(),
        );
        if !self.extra_classpath.is_empty() {
            properties.insert(
                "extra.classpath".to_owned(),
                self.extra_classpath.join(","),
            );
        }
        properties
    }
}

/// Configuration of the underlying host cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Scheduler queue submissions go to when no override is given.
    #[serde(default)]
    pub scheduler_queue: Option<String>,

    /// Classpath entries the cluster provides to every application.
    #[serde(default)]
    pub application_classpath: Vec<String>,

    /// The platform's home location on the cluster filesystem.
    #[serde(default = "default_home_dir")]
    pub home_dir: PathBuf,

    /// Security posture of the cluster.
    #[serde(default)]
    pub security: SecurityConfig,
}

fn default_home_dir() -> PathBuf {
    PathBuf::from("/meridian")
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            scheduler_queue: None,
            application_classpath: Vec::new(),
            home_dir: default_home_dir(),
            security: SecurityConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Load configuration from the default sources.
    ///
    /// Reads `cluster.toml` in the current directory (if present), then
    /// environment variables with `MERIDIAN_CLUSTER_` prefix.
    pub fn load() -> LaunchResult<Self> {
        Figment::new()
            .merge(Toml::file("cluster.toml"))
            .merge(Env::prefixed("MERIDIAN_CLUSTER_").split("__"))
            .extract()
            .map_err(|e| LaunchError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LaunchResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MERIDIAN_CLUSTER_").split("__"))
            .extract()
            .map_err(|e| LaunchError::Config(e.to_string()))
    }

    /// Flatten into the property view consumed by remote containers.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        if let Some(queue) = &self.scheduler_queue {
            properties.insert("scheduler.queue".to_owned(), queue.clone());
        }
        if !self.application_classpath.is_empty() {
            properties.insert(
                "application.classpath".to_owned(),
                self.application_classpath.join(","),
            );
        }
        properties.insert(
            "home.dir".to_owned(),
            self.home_dir.display().to_string(),
        );
        properties.insert(
            "security.cluster.enabled".to_owned(),
            self.security.cluster_auth_enabled.to_string(),
        );
        properties.insert(
            "security.storage.enabled".to_owned(),
            self.security.storage_auth_enabled.to_string(),
        );
        properties.insert(
            "security.location.kind".to_owned(),
            self.security.location.as_str().to_owned(),
        );
        properties
    }
}

/// Security posture of the cluster, gating the token providers.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Cluster authentication is enabled.
    #[serde(default)]
    pub cluster_auth_enabled: bool,

    /// Storage-service authentication is enabled.
    #[serde(default)]
    pub storage_auth_enabled: bool,

    /// Which filesystem abstraction backs the cluster's locations.
    #[serde(default)]
    pub location: LocationKind,

    /// Principal allowed to renew delegation tokens.
    #[serde(default)]
    pub token_renewer: Option<String>,

    /// Shared secret used to mint cluster and filesystem tokens.
    #[serde(default)]
    pub cluster_secret_path: Option<PathBuf>,

    /// Shared secret used to mint storage tokens.
    #[serde(default)]
    pub storage_secret_path: Option<PathBuf>,

    /// Lifetime of minted tokens in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

const fn default_token_ttl_secs() -> u64 {
    86_400
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cluster_auth_enabled: false,
            storage_auth_enabled: false,
            location: LocationKind::default(),
            token_renewer: None,
            cluster_secret_path: None,
            storage_secret_path: None,
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// Filesystem abstraction backing the cluster's locations.
///
/// Different backends expose delegation tokens through different
/// protocols, so token acquisition dispatches on this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Plain local filesystem; no delegation needed.
    #[default]
    Local,

    /// Distributed cluster filesystem.
    Distributed,

    /// S3-compatible object store.
    ObjectStore,
}

impl LocationKind {
    /// Stable name for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Distributed => "distributed",
            Self::ObjectStore => "object_store",
        }
    }
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
