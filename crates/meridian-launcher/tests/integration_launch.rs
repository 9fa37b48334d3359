//! End-to-end launch scenarios against the mock cluster.

mod common;

use common::TestHarness;
use meridian_launcher::{
    Arguments, LaunchError, LaunchOptions, CLUSTER_CONF_RESOURCE, PLATFORM_CONF_RESOURCE,
    PLUGIN_ARCHIVE_ARG, PLUGIN_ARCHIVE_RESOURCE, PLUGIN_DIR_ARG, PLUGIN_DIR_RESOURCE,
};

fn staged_binary_name<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    names.into_iter().find(|name| name.starts_with("job-") && name.ends_with(".jar"))
}

#[tokio::test]
async fn plain_launch_stages_exactly_three_resources() {
    let harness = TestHarness::new();
    let program = harness.write_program("job.jar", b"ten bytes!");
    let options = LaunchOptions::new("wordcount")
        .with_user_args(Arguments::new().with("k", "v"));

    let handle = harness.runner.run(&program, &options).await.unwrap();

    let submissions = harness.cluster.submissions();
    assert_eq!(submissions.len(), 1);
    let request = &submissions[0];

    assert_eq!(request.app_name, "wordcount");
    assert_eq!(request.resources.len(), 3);
    assert!(request.resources.contains(CLUSTER_CONF_RESOURCE));
    assert!(request.resources.contains(PLATFORM_CONF_RESOURCE));
    assert!(staged_binary_name(request.resources.names()).is_some());

    // Security is disabled, so no secure store is attached; no logging
    // template is configured either.
    assert!(request.credentials.is_none());
    assert!(request.logging_resource.is_none());
    assert!(!request.debug);

    // The options reaching the backend are identical to the input: no
    // plugin directory means no rewriting.
    let encoded = request
        .app_args
        .iter()
        .position(|arg| arg == "--options")
        .map(|i| request.app_args[i + 1].as_str())
        .unwrap();
    assert_eq!(LaunchOptions::decode(encoded).unwrap(), options);

    // The working directory holds both snapshots and the staged copy
    // until a lifecycle notification reclaims it.
    let workdirs = harness.workdirs();
    assert_eq!(workdirs.len(), 1);
    assert!(workdirs[0].join(CLUSTER_CONF_RESOURCE).is_file());
    assert!(workdirs[0].join(PLATFORM_CONF_RESOURCE).is_file());

    let mock = harness.cluster.handle(0).unwrap();
    mock.signal_running();
    assert!(harness.workdirs().is_empty());
    mock.signal_terminated();

    assert_eq!(handle.app_id(), "mock-app-0000");
}

#[tokio::test]
async fn plugin_launch_stages_five_resources_and_rewrites_options() {
    let harness = TestHarness::new();
    let program = harness.write_program("job.jar", b"ten bytes!");
    let plugins = harness.plugin_dir(&[("foo.jar", b"plugin")]);

    let options = LaunchOptions::new("wordcount").with_system_args(
        Arguments::new().with(PLUGIN_DIR_ARG, plugins.display().to_string()),
    );

    harness.runner.run(&program, &options).await.unwrap();

    let request = &harness.cluster.submissions()[0];
    assert_eq!(request.resources.len(), 5);
    assert!(request.resources.contains(CLUSTER_CONF_RESOURCE));
    assert!(request.resources.contains(PLATFORM_CONF_RESOURCE));
    assert!(request.resources.contains(PLUGIN_DIR_RESOURCE));
    assert!(request.resources.contains(PLUGIN_ARCHIVE_RESOURCE));
    assert!(staged_binary_name(request.resources.names()).is_some());

    assert!(request.resources.get(PLUGIN_DIR_RESOURCE).unwrap().expand());
    assert!(!request
        .resources
        .get(PLUGIN_ARCHIVE_RESOURCE)
        .unwrap()
        .expand());

    let encoded = request
        .app_args
        .iter()
        .position(|arg| arg == "--options")
        .map(|i| request.app_args[i + 1].as_str())
        .unwrap();
    let delivered = LaunchOptions::decode(encoded).unwrap();
    assert_eq!(
        delivered.system().get(PLUGIN_DIR_ARG),
        Some(PLUGIN_DIR_RESOURCE)
    );
    assert_eq!(
        delivered.system().get(PLUGIN_ARCHIVE_ARG),
        Some(PLUGIN_ARCHIVE_RESOURCE)
    );

    // The caller's options still reference the local path.
    assert_eq!(
        options.system().get(PLUGIN_DIR_ARG),
        Some(plugins.display().to_string().as_str())
    );
}

#[tokio::test]
async fn staging_failure_cleans_up_and_never_reaches_the_backend() {
    let harness = TestHarness::new();
    let program = harness.write_program("job.jar", b"ten bytes!");
    let options = LaunchOptions::new("wordcount").with_system_args(
        Arguments::new().with(PLUGIN_DIR_ARG, "/nonexistent/plugins"),
    );

    let result = harness.runner.run(&program, &options).await;

    assert!(matches!(result, Err(LaunchError::Staging { .. })));
    assert_eq!(harness.cluster.submission_count(), 0);
    assert!(harness.workdirs().is_empty());
}

#[tokio::test]
async fn missing_program_artifact_cleans_up_and_never_reaches_the_backend() {
    let harness = TestHarness::new();
    let program = harness.write_program("job.jar", b"ten bytes!");
    std::fs::remove_file(program.artifact()).unwrap();

    let result = harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await;

    assert!(matches!(result, Err(LaunchError::Staging { .. })));
    assert_eq!(harness.cluster.submission_count(), 0);
    assert!(harness.workdirs().is_empty());
}

#[tokio::test]
async fn submission_failure_cleans_up_the_working_directory() {
    let harness = TestHarness::new();
    harness.cluster.reject_submissions("queue does not exist");
    let program = harness.write_program("job.jar", b"ten bytes!");

    let result = harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await;

    assert!(matches!(result, Err(LaunchError::Submission(_))));
    assert!(harness.workdirs().is_empty());
}

#[tokio::test]
async fn queue_override_applies_to_this_launch_only() {
    let harness = TestHarness::new();
    let program = harness.write_program("job.jar", b"ten bytes!");

    let overridden = LaunchOptions::new("wordcount").with_scheduler_queue("analytics");
    harness.runner.run(&program, &overridden).await.unwrap();

    let request = &harness.cluster.submissions()[0];
    assert_eq!(request.scheduler_queue.as_deref(), Some("analytics"));

    // The override is folded into this launch's cluster-config snapshot.
    let snapshot = std::fs::read_to_string(
        request.resources.get(CLUSTER_CONF_RESOURCE).unwrap().path(),
    )
    .unwrap();
    assert!(snapshot.contains("<name>scheduler.queue</name>"));
    assert!(snapshot.contains("<value>analytics</value>"));

    // A later launch without an override sees the shared config untouched.
    harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await
        .unwrap();
    let request = &harness.cluster.submissions()[1];
    assert!(request.scheduler_queue.is_none());
    let snapshot = std::fs::read_to_string(
        request.resources.get(CLUSTER_CONF_RESOURCE).unwrap().path(),
    )
    .unwrap();
    assert!(!snapshot.contains("scheduler.queue"));
}

#[tokio::test]
async fn security_enabled_attaches_collected_tokens() {
    let secrets = tempfile::TempDir::new().unwrap();
    let secret_path = secrets.path().join("cluster.secret");
    std::fs::write(&secret_path, b"shared-secret").unwrap();

    let harness = TestHarness::custom(|_, cluster| {
        cluster.security.cluster_auth_enabled = true;
        cluster.security.location = meridian_launcher::LocationKind::Distributed;
        cluster.security.cluster_secret_path = Some(secret_path.clone());
    });
    let program = harness.write_program("job.jar", b"ten bytes!");

    harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await
        .unwrap();

    let request = &harness.cluster.submissions()[0];
    let credentials = request.credentials.as_ref().unwrap();
    assert_eq!(
        credentials.services(),
        vec!["cluster", "filesystem.distributed"]
    );
}

#[tokio::test]
async fn credential_failure_aborts_before_submission() {
    let harness = TestHarness::custom(|_, cluster| {
        cluster.security.cluster_auth_enabled = true;
        // Enabled but no secret configured: acquisition must fail.
    });
    let program = harness.write_program("job.jar", b"ten bytes!");

    let result = harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await;

    assert!(matches!(result, Err(LaunchError::Credential(_))));
    assert_eq!(harness.cluster.submission_count(), 0);
    assert!(harness.workdirs().is_empty());
}

#[tokio::test]
async fn debug_and_log_collection_reach_the_submission() {
    let harness = TestHarness::custom(|platform, _| {
        platform.collect_container_logs = true;
    });
    let program = harness.write_program("job.jar", b"ten bytes!");

    harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount").with_debug(true))
        .await
        .unwrap();

    let request = &harness.cluster.submissions()[0];
    assert!(request.debug);
    assert!(request.collect_logs);
}

#[tokio::test]
async fn classpath_merges_extra_entries_before_application_classpath() {
    let harness = TestHarness::custom(|platform, cluster| {
        platform.extra_classpath = vec!["/opt/meridian/ext/*".to_owned()];
        cluster.application_classpath = vec!["/opt/cluster/lib/*".to_owned()];
    });
    let program = harness.write_program("job.jar", b"ten bytes!");

    harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await
        .unwrap();

    let request = &harness.cluster.submissions()[0];
    assert_eq!(
        request.classpath,
        vec!["/opt/meridian/ext/*", "/opt/cluster/lib/*"]
    );
}

#[tokio::test]
async fn logging_template_is_shipped_when_configured() {
    let templates = tempfile::TempDir::new().unwrap();
    let template = templates.path().join("logging.toml");
    std::fs::write(&template, "[filter]\ndefault = \"info\"\n").unwrap();

    let harness = TestHarness::custom(|platform, _| {
        platform.container_log_config = Some(template.clone());
    });
    let program = harness.write_program("job.jar", b"ten bytes!");

    harness
        .runner
        .run(&program, &LaunchOptions::new("wordcount"))
        .await
        .unwrap();

    let request = &harness.cluster.submissions()[0];
    let logging = request.logging_resource.as_ref().unwrap();
    assert!(logging.is_file());
    assert!(logging.starts_with(harness.staging_root()));
}

#[tokio::test]
async fn concurrent_launches_use_distinct_working_directories() {
    let harness = TestHarness::new();
    let first = harness.write_program("job.jar", b"ten bytes!");
    let second = harness.write_program("other.jar", b"other bytes");

    let first_opts = LaunchOptions::new("first");
    let second_opts = LaunchOptions::new("second");
    let (a, b) = tokio::join!(
        harness.runner.run(&first, &first_opts),
        harness.runner.run(&second, &second_opts),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(harness.cluster.submission_count(), 2);
    assert_eq!(harness.workdirs().len(), 2);

    // Each guard reclaims only its own directory.
    harness.cluster.handle(0).unwrap().signal_terminated();
    assert_eq!(harness.workdirs().len(), 1);
    harness.cluster.handle(1).unwrap().signal_terminated();
    assert!(harness.workdirs().is_empty());
}
