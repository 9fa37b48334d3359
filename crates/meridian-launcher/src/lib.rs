//! Meridian distributed launch orchestrator.
//!
//! Takes an already-built, already-validated program together with its
//! runtime options and gets it running on a remote cluster-wide execution
//! platform, in one logical operation:
//!
//! - stage mutable local artifacts (config snapshots, plugin bundles, the
//!   program binary) into an immutable resource set the cluster can fetch
//! - conditionally acquire delegation tokens from pluggable providers,
//!   without coupling the core to any single credential source
//! - delegate the actual submission through the [`ApplicationLauncher`]
//!   extension point, so concrete cluster backends are swappable
//! - tie the working directory's lifetime to the remote lifecycle, with
//!   exactly-once cleanup no matter which notification arrives first
//! - fail safely: any error before the cluster accepts the submission
//!   cleans local state synchronously and propagates
//!
//! # Launch states
//!
//! ```text
//! STAGING ──▶ SUBMITTING ──▶ SUBMITTED
//!    │             │
//!    ▼             ▼
//!  failed (working directory cleaned synchronously)
//! ```
//!
//! `STAGING` and `SUBMITTING` have no externally observable intermediate
//! states; `SUBMITTED` is the only state from which the cleanup guard can
//! eventually fire. Retry policy, if any, belongs to the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use meridian_cluster::MockCluster;
//! use meridian_launcher::{
//!     ClusterBackedLauncher, ClusterConfig, LaunchOptions, PlatformConfig,
//!     ProgramHandle, ProgramId, ProgramRunner,
//! };
//!
//! let cluster = Arc::new(MockCluster::new());
//! let runner = ProgramRunner::new(
//!     PlatformConfig::load()?,
//!     ClusterConfig::load()?,
//!     Arc::new(ClusterBackedLauncher::new(cluster)),
//! );
//!
//! let program = ProgramHandle::new(
//!     ProgramId::new("default.analytics.wordcount"),
//!     "wordcount",
//!     "/repo/wordcount.bin",
//! );
//! let handle = runner.run(&program, &LaunchOptions::new("wordcount")).await?;
//! ```

#![forbid(unsafe_code)]

mod cleanup;
pub mod config;
pub mod credentials;
pub mod error;
pub mod options;
pub mod program;
pub mod runner;
pub mod staging;

pub use cleanup::install_cleanup;
pub use config::{ClusterConfig, LocationKind, PlatformConfig, SecurityConfig};
pub use credentials::{CredentialCollector, TokenProvider};
pub use error::{LaunchError, LaunchResult};
pub use options::{Arguments, LaunchOptions, PLUGIN_ARCHIVE_ARG, PLUGIN_DIR_ARG};
pub use program::{ProgramHandle, ProgramId};
pub use runner::{
    ApplicationDescriptor, ApplicationLauncher, ClusterBackedLauncher, LaunchContext,
    ProgramRunner,
};
pub use staging::{
    StagedProgram, WorkDir, CLUSTER_CONF_RESOURCE, PLATFORM_CONF_RESOURCE,
    PLUGIN_ARCHIVE_RESOURCE, PLUGIN_DIR_RESOURCE,
};
