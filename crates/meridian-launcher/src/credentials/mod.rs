//! Delegation-token collection.
//!
//! A launch may need tokens for several independent secured services. Each
//! service contributes a [`TokenProvider`] gated by its own precondition;
//! providers whose precondition does not hold are never consulted, so no
//! unnecessary credential-service calls are made.

mod providers;

pub use providers::{
    ClusterAuthProvider, DistributedFsDelegation, FilesystemDelegation,
    FilesystemDelegationProvider, ObjectStoreDelegation, StorageDelegationProvider,
};

use std::sync::Arc;

use async_trait::async_trait;
use meridian_cluster::{CredentialSet, DelegationToken};
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::error::LaunchResult;

/// A pluggable source of delegation tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Whether this provider applies under the given security posture.
    ///
    /// Providers returning `false` are not invoked at all.
    fn enabled(&self, security: &SecurityConfig) -> bool;

    /// Acquire this provider's tokens.
    ///
    /// Only called when [`TokenProvider::enabled`] holds. Failures are
    /// fatal to the launch; a partial credential set is never attached.
    async fn obtain(&self, security: &SecurityConfig) -> LaunchResult<Vec<DelegationToken>>;
}

/// Fans out over the registered token providers.
#[derive(Clone)]
pub struct CredentialCollector {
    providers: Vec<Arc<dyn TokenProvider>>,
}

impl Default for CredentialCollector {
    fn default() -> Self {
        Self {
            providers: vec![
                Arc::new(ClusterAuthProvider),
                Arc::new(StorageDelegationProvider),
                Arc::new(FilesystemDelegationProvider::default()),
            ],
        }
    }
}

impl CredentialCollector {
    /// Create a collector with the built-in provider set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector with no providers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider to the fan-out.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Gather tokens from every applicable provider.
    ///
    /// An empty result means the caller skips attaching a secure store;
    /// "security disabled" and "security enabled but zero tokens" are not
    /// distinguished.
    pub async fn collect(&self, security: &SecurityConfig) -> LaunchResult<CredentialSet> {
        let mut set = CredentialSet::new();

        for provider in &self.providers {
            if !provider.enabled(security) {
                debug!(provider = provider.name(), "token provider not applicable");
                continue;
            }

            let tokens = provider.obtain(security).await?;
            debug!(
                provider = provider.name(),
                count = tokens.len(),
                "collected delegation tokens"
            );
            set.extend(tokens);
        }

        if !set.is_empty() {
            info!(count = set.len(), services = ?set.services(), "credential set assembled");
        }
        Ok(set)
    }
}

impl std::fmt::Debug for CredentialCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCollector")
            .field("providers", &self.providers.len())
            .finish()
    }
}
