//! Distributed program launch sequencing.
//!
//! [`ProgramRunner::run`] takes an already-built program and its options,
//! stages everything the cluster needs into a fresh working directory,
//! hands the staged launch to a backend-specific [`ApplicationLauncher`],
//! and ties the working directory's lifetime to the returned handle. The
//! call returns as soon as the cluster accepts the submission; it never
//! blocks on the program's execution.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use meridian_cluster::{
    ClusterClient, LocalizeResource, RemoteHandle, ResourceSet, SubmissionRequest,
};
use tracing::{debug, info};

use crate::cleanup::install_cleanup;
use crate::config::{ClusterConfig, PlatformConfig};
use crate::credentials::CredentialCollector;
use crate::error::LaunchResult;
use crate::options::LaunchOptions;
use crate::program::{ProgramHandle, ProgramId};
use crate::staging::{
    bundle_plugins, resolve_logging_resource, snapshot_configs, stage_program, WorkDir,
};

/// Description of the application a backend is asked to start.
#[derive(Debug, Clone)]
pub struct ApplicationDescriptor {
    /// Program identity.
    pub program_id: ProgramId,
    /// Application name shown by the cluster.
    pub app_name: String,
    /// Logical resource name of the staged program binary.
    pub binary_resource: String,
    /// Start with debugging enabled.
    pub debug: bool,
}

/// Everything a backend needs to build its native submission.
///
/// Passed explicitly to [`ApplicationLauncher::launch`]; backends fold it
/// into whatever request their platform expects.
pub struct LaunchContext<'a> {
    /// The application to start.
    pub descriptor: &'a ApplicationDescriptor,
    /// Resources to localize before the application starts.
    pub resources: &'a ResourceSet,
    /// Encoded launch options, round-trippable via
    /// [`LaunchOptions::decode`].
    pub encoded_options: &'a str,
    /// Logging configuration resolved during staging, if any.
    pub logging_resource: Option<&'a Path>,
    /// Scheduler-queue override for this launch, if any.
    pub scheduler_queue: Option<&'a str>,
    /// Classpath entries the orchestrator appends for containers.
    pub extra_classpath: &'a [String],
    /// Forward container logs back to the submitter.
    pub collect_logs: bool,
    /// Per-launch view of the cluster configuration.
    pub cluster_config: &'a ClusterConfig,
    /// Collector backends use to gather delegation tokens.
    pub credentials: &'a CredentialCollector,
}

/// Backend extension point turning a staged launch into a running remote
/// application.
///
/// Implementations collect delegation tokens through `ctx.credentials`,
/// attach the set when it is non-empty, submit, and return the cluster's
/// handle.
#[async_trait]
pub trait ApplicationLauncher: Send + Sync {
    /// Submit the staged application to the cluster.
    async fn launch(&self, ctx: LaunchContext<'_>) -> LaunchResult<Box<dyn RemoteHandle>>;
}

/// Launches programs onto a remote cluster.
///
/// One runner serves many concurrent launches; each `run` call owns its
/// working directory and per-launch config view, and the only shared state
/// is the immutable configuration.
pub struct ProgramRunner {
    platform: PlatformConfig,
    cluster: ClusterConfig,
    collector: CredentialCollector,
    launcher: Arc<dyn ApplicationLauncher>,
}

impl ProgramRunner {
    /// Create a runner over a backend launcher.
    #[must_use]
    pub fn new(
        platform: PlatformConfig,
        cluster: ClusterConfig,
        launcher: Arc<dyn ApplicationLauncher>,
    ) -> Self {
        Self {
            platform,
            cluster,
            collector: CredentialCollector::new(),
            launcher,
        }
    }

    /// Replace the credential collector.
    #[must_use]
    pub fn with_collector(mut self, collector: CredentialCollector) -> Self {
        self.collector = collector;
        self
    }

    /// Launch a program.
    ///
    /// Stages the program's resources locally, submits through the backend
    /// launcher, and returns the remote handle with the cleanup guard
    /// installed. Any failure before the cluster accepts the submission
    /// cleans the working directory synchronously and propagates.
    pub async fn run(
        &self,
        program: &ProgramHandle,
        options: &LaunchOptions,
    ) -> LaunchResult<Box<dyn RemoteHandle>> {
        // Per-launch view of the cluster config; the shared one is never
        // mutated.
        let mut cluster = self.cluster.clone();
        let queue_override = options.scheduler_queue().map(ToOwned::to_owned);
        if let Some(queue) = &queue_override {
            info!(program_id = %program.id(), queue = %queue, "applying scheduler queue override");
            cluster.scheduler_queue = Some(queue.clone());
        }

        let workdir = WorkDir::create(&self.platform.staging_root())?;

        match self
            .stage_and_launch(program, options, &cluster, queue_override.as_deref(), &workdir)
            .await
        {
            Ok(handle) => {
                info!(
                    program_id = %program.id(),
                    app_id = handle.app_id(),
                    "program submitted"
                );
                Ok(install_cleanup(handle, workdir))
            }
            Err(e) => {
                // No handle exists yet, so local cleanup is still ours.
                workdir.remove_logged();
                Err(e)
            }
        }
    }

    async fn stage_and_launch(
        &self,
        program: &ProgramHandle,
        options: &LaunchOptions,
        cluster: &ClusterConfig,
        queue_override: Option<&str>,
        workdir: &WorkDir,
    ) -> LaunchResult<Box<dyn RemoteHandle>> {
        let mut resources = ResourceSet::new();

        let options = bundle_plugins(options, workdir, &mut resources).await?;
        snapshot_configs(&self.platform, cluster, workdir, &mut resources)?;

        let staged = stage_program(program, workdir).await?;
        let binary_resource = staged.binary_name().to_owned();
        resources.insert(
            binary_resource.clone(),
            LocalizeResource::file(staged.handle().artifact()),
        );

        let logging_resource = resolve_logging_resource(&self.platform, &staged, workdir)?;
        let encoded_options = options.encode()?;

        if options.debug() {
            info!(
                program_id = %program.id(),
                options = %encoded_options,
                logging = ?logging_resource,
                "starting program with debugging enabled"
            );
        }

        debug!(
            program_id = %program.id(),
            resources = resources.len(),
            "staging complete, submitting"
        );

        let descriptor = ApplicationDescriptor {
            program_id: program.id().clone(),
            app_name: options.name().to_owned(),
            binary_resource,
            debug: options.debug(),
        };

        self.launcher
            .launch(LaunchContext {
                descriptor: &descriptor,
                resources: &resources,
                encoded_options: &encoded_options,
                logging_resource: logging_resource.as_deref(),
                scheduler_queue: queue_override,
                extra_classpath: &self.platform.extra_classpath,
                collect_logs: self.platform.collect_container_logs,
                cluster_config: cluster,
                credentials: &self.collector,
            })
            .await
    }
}

impl std::fmt::Debug for ProgramRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramRunner").finish_non_exhaustive()
    }
}

/// [`ApplicationLauncher`] over any [`ClusterClient`].
///
/// Collects credentials, merges the container classpath, and maps the
/// launch context onto a [`SubmissionRequest`].
pub struct ClusterBackedLauncher<C> {
    client: Arc<C>,
}

impl<C> ClusterBackedLauncher<C> {
    /// Create a launcher submitting through `client`.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ClusterClient> ApplicationLauncher for ClusterBackedLauncher<C> {
    async fn launch(&self, ctx: LaunchContext<'_>) -> LaunchResult<Box<dyn RemoteHandle>> {
        let credentials = ctx
            .credentials
            .collect(&ctx.cluster_config.security)
            .await?;

        let mut classpath = ctx.extra_classpath.to_vec();
        classpath.extend(ctx.cluster_config.application_classpath.iter().cloned());

        let mut request = SubmissionRequest::new(ctx.descriptor.app_name.clone(), ctx.resources.clone())
            .with_app_args(vec![
                "--binary".to_owned(),
                ctx.descriptor.binary_resource.clone(),
                "--options".to_owned(),
                ctx.encoded_options.to_owned(),
            ])
            .with_debug(ctx.descriptor.debug)
            .with_classpath(classpath)
            .with_collect_logs(ctx.collect_logs);

        if let Some(queue) = ctx.scheduler_queue {
            request = request.with_scheduler_queue(queue);
        }
        if let Some(logging) = ctx.logging_resource {
            request = request.with_logging_resource(logging);
        }
        if !credentials.is_empty() {
            request = request.with_credentials(credentials);
        }

        Ok(self.client.submit(request).await?)
    }
}

impl<C> std::fmt::Debug for ClusterBackedLauncher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBackedLauncher").finish_non_exhaustive()
    }
}
