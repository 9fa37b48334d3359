//! Configuration snapshots.
//!
//! Remote containers consume the submitter's configuration as property-list
//! XML documents. Both configuration objects are serialized into the
//! working directory under fixed logical names and registered in the
//! resource set.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use meridian_cluster::{LocalizeResource, ResourceSet};
use tracing::debug;

use crate::config::{ClusterConfig, PlatformConfig};
use crate::error::{LaunchError, LaunchResult};
use crate::staging::WorkDir;

/// Logical name of the host-cluster configuration snapshot.
///
/// Fixed by the container runtime contract, as is
/// [`PLATFORM_CONF_RESOURCE`].
pub const CLUSTER_CONF_RESOURCE: &str = "hConf.xml";

/// Logical name of the platform configuration snapshot.
pub const PLATFORM_CONF_RESOURCE: &str = "cConf.xml";

/// Serialize both configurations into the working directory and register
/// the snapshots in the resource set.
///
/// Write failures are fatal and abort the launch before submission; local
/// disk failures are not treated as transient, so there are no retries.
pub fn snapshot_configs(
    platform: &PlatformConfig,
    cluster: &ClusterConfig,
    workdir: &WorkDir,
    resources: &mut ResourceSet,
) -> LaunchResult<()> {
    let cluster_path = workdir.file(CLUSTER_CONF_RESOURCE);
    write_properties(&cluster_path, &cluster.properties())
        .map_err(|e| LaunchError::staging("failed to snapshot cluster configuration", e))?;

    let platform_path = workdir.file(PLATFORM_CONF_RESOURCE);
    write_properties(&platform_path, &platform.properties())
        .map_err(|e| LaunchError::staging("failed to snapshot platform configuration", e))?;

    debug!(
        cluster = %cluster_path.display(),
        platform = %platform_path.display(),
        "snapshotted configurations"
    );

    resources.insert(CLUSTER_CONF_RESOURCE, LocalizeResource::file(cluster_path));
    resources.insert(
        PLATFORM_CONF_RESOURCE,
        LocalizeResource::file(platform_path),
    );
    Ok(())
}

/// Write a property map as the XML document the container runtime parses.
fn write_properties(path: &Path, properties: &BTreeMap<String, String>) -> std::io::Result<()> {
    let mut out = Vec::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, "<configuration>")?;
    for (name, value) in properties {
        writeln!(
            out,
            "  <property><name>{}</name><value>{}</value></property>",
            escape_xml(name),
            escape_xml(value)
        )?;
    }
    writeln!(out, "</configuration>")?;

    std::fs::write(path, out)
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snapshot_registers_both_fixed_names() {
        let root = TempDir::new().unwrap();
        let workdir = WorkDir::create(root.path()).unwrap();
        let mut resources = ResourceSet::new();

        snapshot_configs(
            &PlatformConfig::default(),
            &ClusterConfig::default(),
            &workdir,
            &mut resources,
        )
        .unwrap();

        assert_eq!(resources.len(), 2);
        for name in [CLUSTER_CONF_RESOURCE, PLATFORM_CONF_RESOURCE] {
            let resource = resources.get(name).unwrap();
            assert!(!resource.expand());
            assert!(resource.path().is_file());
        }
    }

    #[test]
    fn snapshot_lists_every_property() {
        let root = TempDir::new().unwrap();
        let workdir = WorkDir::create(root.path()).unwrap();
        let mut resources = ResourceSet::new();

        let cluster = ClusterConfig {
            scheduler_queue: Some("analytics".to_owned()),
            ..ClusterConfig::default()
        };

        snapshot_configs(&PlatformConfig::default(), &cluster, &workdir, &mut resources).unwrap();

        let content =
            std::fs::read_to_string(workdir.file(CLUSTER_CONF_RESOURCE)).unwrap();
        for (name, value) in &cluster.properties() {
            assert!(content.contains(&format!("<name>{name}</name>")));
            assert!(content.contains(&format!("<value>{value}</value>")));
        }
    }

    #[test]
    fn properties_escape_reserved_characters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("props.xml");

        let mut properties = BTreeMap::new();
        properties.insert("query".to_owned(), "a < b && c > \"d\"".to_owned());
        write_properties(&path, &properties).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("a &lt; b &amp;&amp; c &gt; &quot;d&quot;"));
        assert!(!content.contains("a < b"));
    }
}
