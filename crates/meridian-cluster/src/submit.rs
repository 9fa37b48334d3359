//! Submission API for cluster backends.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::credentials::CredentialSet;
use crate::error::ClusterResult;
use crate::handle::RemoteHandle;
use crate::resources::ResourceSet;

/// Everything a cluster backend needs to accept an application.
///
/// Built by the launch layer; the backend folds it into whatever native
/// request its platform expects.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    /// Application name shown by the cluster.
    pub app_name: String,
    /// Resources to localize before the application starts.
    pub resources: ResourceSet,
    /// Arguments handed to the application entry point.
    pub app_args: Vec<String>,
    /// Start the application with debugging enabled.
    pub debug: bool,
    /// Scheduler queue to submit into, when overridden.
    pub scheduler_queue: Option<String>,
    /// Logging configuration shipped alongside the resources.
    pub logging_resource: Option<PathBuf>,
    /// Classpath entries appended for the application's containers.
    pub classpath: Vec<String>,
    /// Forward container logs back to the submitter.
    pub collect_logs: bool,
    /// Delegation tokens attached to the submission.
    ///
    /// `None` when no security is in effect; backends must not attach an
    /// empty secure store.
    pub credentials: Option<CredentialSet>,
}

impl SubmissionRequest {
    /// Create a request for an application with its resource set.
    #[must_use]
    pub fn new(app_name: impl Into<String>, resources: ResourceSet) -> Self {
        Self {
            app_name: app_name.into(),
            resources,
            ..Self::default()
        }
    }

    /// Set the application arguments.
    #[must_use]
    pub fn with_app_args(mut self, args: Vec<String>) -> Self {
        self.app_args = args;
        self
    }

    /// Enable or disable debugging.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the scheduler queue.
    #[must_use]
    pub fn with_scheduler_queue(mut self, queue: impl Into<String>) -> Self {
        self.scheduler_queue = Some(queue.into());
        self
    }

    /// Set the logging resource.
    #[must_use]
    pub fn with_logging_resource(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging_resource = Some(path.into());
        self
    }

    /// Set the container classpath entries.
    #[must_use]
    pub fn with_classpath(mut self, classpath: Vec<String>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Enable forwarding of container logs.
    #[must_use]
    pub const fn with_collect_logs(mut self, collect: bool) -> Self {
        self.collect_logs = collect;
        self
    }

    /// Attach a credential set.
    ///
    /// Callers skip this entirely when the set is empty.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialSet) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Client interface to a cluster-wide execution platform.
///
/// Implementations are backend specific; the launch layer only depends on
/// this trait.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Submit an application for execution.
    ///
    /// Returns once the cluster has accepted the submission; the returned
    /// handle reports subsequent lifecycle transitions.
    async fn submit(&self, request: SubmissionRequest) -> ClusterResult<Box<dyn RemoteHandle>>;
}
