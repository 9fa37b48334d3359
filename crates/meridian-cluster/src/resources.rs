//! Localizable resources shipped to the cluster ahead of a launch.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named local artifact to be localized into the remote execution
/// environment before the application starts.
///
/// The cluster fetches the artifact from `path` and materializes it under
/// the resource's logical name. When `expand` is set the artifact is an
/// archive that the remote side unpacks into a directory of that name;
/// otherwise it is shipped as a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeResource {
    path: PathBuf,
    expand: bool,
}

impl LocalizeResource {
    /// Create a resource with an explicit expand flag.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, expand: bool) -> Self {
        Self {
            path: path.into(),
            expand,
        }
    }

    /// Create a plain file resource (shipped as-is, never expanded).
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false)
    }

    /// Local path of the artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the remote side expands this artifact into a directory.
    #[must_use]
    pub const fn expand(&self) -> bool {
        self.expand
    }
}

/// Mapping from unique logical resource name to a [`LocalizeResource`].
///
/// Names are unique; inserting an existing name replaces the previous
/// entry. The writers in the launch pipeline use disjoint name spaces, so
/// replacement never occurs in practice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    entries: BTreeMap<String, LocalizeResource>,
}

impl ResourceSet {
    /// Create an empty resource set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under a logical name.
    ///
    /// Returns the previously registered resource for that name, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        resource: LocalizeResource,
    ) -> Option<LocalizeResource> {
        self.entries.insert(name.into(), resource)
    }

    /// Look up a resource by logical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LocalizeResource> {
        self.entries.get(name)
    }

    /// Whether a logical name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, resource)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocalizeResource)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the registered logical names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = (&'a String, &'a LocalizeResource);
    type IntoIter = btree_map::Iter<'a, String, LocalizeResource>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
