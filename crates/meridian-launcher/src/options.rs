//! Launch options carried alongside a program.
//!
//! Options are immutable values: the one mutation the pipeline performs —
//! rewriting the plugin arguments after bundling — produces a new
//! [`LaunchOptions`] and leaves the original intact for any retry path the
//! caller keeps.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LaunchResult;

/// System argument naming the local plugin directory to bundle.
pub const PLUGIN_DIR_ARG: &str = "pluginDir";

/// System argument naming the plugin archive resource.
pub const PLUGIN_ARCHIVE_ARG: &str = "pluginArchive";

/// An immutable string-to-string argument map.
///
/// Keys are unique; insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, String>);

impl Arguments {
    /// Create an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Derived copy with one argument added or replaced.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = self.0.clone();
        map.insert(key.into(), value.into());
        Self(map)
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Immutable options for one launch of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduler_queue: Option<String>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    system: Arguments,
    #[serde(default)]
    user: Arguments,
}

impl LaunchOptions {
    /// Create options for a named launch with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduler_queue: None,
            debug: false,
            system: Arguments::new(),
            user: Arguments::new(),
        }
    }

    /// Set the scheduler-queue override.
    #[must_use]
    pub fn with_scheduler_queue(mut self, queue: impl Into<String>) -> Self {
        self.scheduler_queue = Some(queue.into());
        self
    }

    /// Enable or disable debugging.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the system arguments.
    #[must_use]
    pub fn with_system_args(mut self, system: Arguments) -> Self {
        self.system = system;
        self
    }

    /// Set the user-supplied arguments.
    #[must_use]
    pub fn with_user_args(mut self, user: Arguments) -> Self {
        self.user = user;
        self
    }

    /// Launch name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scheduler-queue override, if any.
    #[must_use]
    pub fn scheduler_queue(&self) -> Option<&str> {
        self.scheduler_queue.as_deref()
    }

    /// Whether the program starts with debugging enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// System arguments.
    #[must_use]
    pub const fn system(&self) -> &Arguments {
        &self.system
    }

    /// User-supplied arguments.
    #[must_use]
    pub const fn user(&self) -> &Arguments {
        &self.user
    }

    /// Derived copy with replaced system arguments.
    ///
    /// The original options remain valid.
    #[must_use]
    pub fn rewrite_system_args(&self, system: Arguments) -> Self {
        Self {
            system,
            ..self.clone()
        }
    }

    /// Encode to the transport-neutral form shipped to containers.
    pub fn encode(&self) -> LaunchResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode options previously produced by [`LaunchOptions::encode`].
    pub fn decode(encoded: &str) -> LaunchResult<Self> {
        Ok(serde_json::from_str(encoded)?)
    }
}
