//! Built-in token providers.
//!
//! Tokens are HMAC-SHA256 signatures over a `service:renewer:expiry`
//! claim, keyed by a shared secret read from disk. Each provider signs
//! with its own service's secret.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use meridian_cluster::DelegationToken;
use secrecy::SecretString;
use sha2::Sha256;
use tracing::debug;

use crate::config::{LocationKind, SecurityConfig};
use crate::credentials::TokenProvider;
use crate::error::{LaunchError, LaunchResult};

type HmacSha256 = Hmac<Sha256>;

/// Provider for the cluster's own authentication token.
pub struct ClusterAuthProvider;

#[async_trait]
impl TokenProvider for ClusterAuthProvider {
    fn name(&self) -> &'static str {
        "cluster-auth"
    }

    fn enabled(&self, security: &SecurityConfig) -> bool {
        security.cluster_auth_enabled
    }

    async fn obtain(&self, security: &SecurityConfig) -> LaunchResult<Vec<DelegationToken>> {
        let secret = read_secret(
            security.cluster_secret_path.as_ref(),
            self.name(),
        )
        .await?;
        Ok(vec![mint_token(&secret, "cluster", security)?])
    }
}

/// Provider for the storage service's delegation token.
pub struct StorageDelegationProvider;

#[async_trait]
impl TokenProvider for StorageDelegationProvider {
    fn name(&self) -> &'static str {
        "storage-delegation"
    }

    fn enabled(&self, security: &SecurityConfig) -> bool {
        security.storage_auth_enabled
    }

    async fn obtain(&self, security: &SecurityConfig) -> LaunchResult<Vec<DelegationToken>> {
        let secret = read_secret(
            security.storage_secret_path.as_ref(),
            self.name(),
        )
        .await?;
        Ok(vec![mint_token(&secret, "storage", security)?])
    }
}

/// Capability for acquiring delegation tokens from one filesystem backend.
///
/// Different storage backends expose delegation through different
/// protocols, so there is one implementation per [`LocationKind`].
#[async_trait]
pub trait FilesystemDelegation: Send + Sync {
    /// Acquire the backend's delegation tokens.
    async fn delegation_tokens(&self, security: &SecurityConfig)
        -> LaunchResult<Vec<DelegationToken>>;
}

/// Provider for filesystem delegation tokens.
///
/// Dispatches through a registry keyed on the configured location kind.
/// Kinds with no registered capability contribute no tokens; that is not
/// an error.
pub struct FilesystemDelegationProvider {
    registry: HashMap<LocationKind, Arc<dyn FilesystemDelegation>>,
}

impl Default for FilesystemDelegationProvider {
    fn default() -> Self {
        let mut registry: HashMap<LocationKind, Arc<dyn FilesystemDelegation>> = HashMap::new();
        registry.insert(LocationKind::Distributed, Arc::new(DistributedFsDelegation));
        registry.insert(LocationKind::ObjectStore, Arc::new(ObjectStoreDelegation));
        // Local filesystems need no delegation, so no entry for them.
        Self { registry }
    }
}

impl FilesystemDelegationProvider {
    /// Create a provider with the built-in backend registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the capability for a location kind.
    #[must_use]
    pub fn with_backend(
        mut self,
        kind: LocationKind,
        delegation: Arc<dyn FilesystemDelegation>,
    ) -> Self {
        self.registry.insert(kind, delegation);
        self
    }
}

#[async_trait]
impl TokenProvider for FilesystemDelegationProvider {
    fn name(&self) -> &'static str {
        "filesystem-delegation"
    }

    fn enabled(&self, security: &SecurityConfig) -> bool {
        security.cluster_auth_enabled
    }

    async fn obtain(&self, security: &SecurityConfig) -> LaunchResult<Vec<DelegationToken>> {
        match self.registry.get(&security.location) {
            Some(delegation) => delegation.delegation_tokens(security).await,
            None => {
                debug!(
                    location = %security.location,
                    "no delegation support for location kind"
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Delegation for the distributed cluster filesystem.
pub struct DistributedFsDelegation;

#[async_trait]
impl FilesystemDelegation for DistributedFsDelegation {
    async fn delegation_tokens(
        &self,
        security: &SecurityConfig,
    ) -> LaunchResult<Vec<DelegationToken>> {
        let secret = read_secret(
            security.cluster_secret_path.as_ref(),
            "filesystem-delegation",
        )
        .await?;
        Ok(vec![mint_token(&secret, "filesystem.distributed", security)?])
    }
}

/// Delegation for S3-compatible object stores.
pub struct ObjectStoreDelegation;

#[async_trait]
impl FilesystemDelegation for ObjectStoreDelegation {
    async fn delegation_tokens(
        &self,
        security: &SecurityConfig,
    ) -> LaunchResult<Vec<DelegationToken>> {
        let secret = read_secret(
            security.cluster_secret_path.as_ref(),
            "filesystem-delegation",
        )
        .await?;
        Ok(vec![mint_token(
            &secret,
            "filesystem.object_store",
            security,
        )?])
    }
}

async fn read_secret(path: Option<&PathBuf>, provider: &str) -> LaunchResult<Vec<u8>> {
    let Some(path) = path else {
        return Err(LaunchError::credential(format!(
            "{provider} is enabled but no secret is configured"
        )));
    };

    tokio::fs::read(path).await.map_err(|e| {
        LaunchError::credential(format!(
            "{provider} failed to read secret {}: {e}",
            path.display()
        ))
    })
}

fn mint_token(
    secret: &[u8],
    service: &str,
    security: &SecurityConfig,
) -> LaunchResult<DelegationToken> {
    let renewer = security.token_renewer.as_deref().unwrap_or("-");
    let expires = chrono::Utc::now()
        + chrono::Duration::seconds(i64::try_from(security.token_ttl_secs).unwrap_or(i64::MAX));
    let claim = format!("{service}:{renewer}:{}", expires.timestamp());

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| LaunchError::credential("invalid signing secret"))?;
    mac.update(claim.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(DelegationToken::new(
        service,
        SecretString::from(format!("{claim}.{signature}")),
    ))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::*;

    fn secured_config(dir: &TempDir) -> SecurityConfig {
        let secret_path = dir.path().join("cluster.secret");
        std::fs::write(&secret_path, b"shared-secret").unwrap();

        SecurityConfig {
            cluster_auth_enabled: true,
            location: LocationKind::Distributed,
            token_renewer: Some("meridian".to_owned()),
            cluster_secret_path: Some(secret_path),
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn providers_are_gated_by_their_own_flags() {
        let security = SecurityConfig::default();
        assert!(!ClusterAuthProvider.enabled(&security));
        assert!(!StorageDelegationProvider.enabled(&security));
        assert!(!FilesystemDelegationProvider::default().enabled(&security));

        let secured = SecurityConfig {
            storage_auth_enabled: true,
            ..SecurityConfig::default()
        };
        assert!(StorageDelegationProvider.enabled(&secured));
        assert!(!ClusterAuthProvider.enabled(&secured));
    }

    #[tokio::test]
    async fn cluster_provider_mints_a_signed_token() {
        let dir = TempDir::new().unwrap();
        let security = secured_config(&dir);

        let tokens = ClusterAuthProvider.obtain(&security).await.unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].service(), "cluster");
        let value = tokens[0].token().expose_secret();
        assert!(value.starts_with("cluster:meridian:"));
        assert!(value.contains('.'));
    }

    #[tokio::test]
    async fn enabled_provider_without_secret_is_fatal() {
        let security = SecurityConfig {
            cluster_auth_enabled: true,
            ..SecurityConfig::default()
        };

        let result = ClusterAuthProvider.obtain(&security).await;
        assert!(matches!(result, Err(LaunchError::Credential(_))));
    }

    #[tokio::test]
    async fn unreadable_secret_is_fatal() {
        let security = SecurityConfig {
            cluster_auth_enabled: true,
            cluster_secret_path: Some(PathBuf::from("/nonexistent/secret")),
            ..SecurityConfig::default()
        };

        let result = ClusterAuthProvider.obtain(&security).await;
        assert!(matches!(result, Err(LaunchError::Credential(_))));
    }

    #[tokio::test]
    async fn unsupported_location_kind_contributes_no_tokens() {
        let dir = TempDir::new().unwrap();
        let security = SecurityConfig {
            location: LocationKind::Local,
            ..secured_config(&dir)
        };

        let tokens = FilesystemDelegationProvider::default()
            .obtain(&security)
            .await
            .unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn registry_dispatches_on_location_kind() {
        let dir = TempDir::new().unwrap();

        let distributed = FilesystemDelegationProvider::default()
            .obtain(&secured_config(&dir))
            .await
            .unwrap();
        assert_eq!(distributed[0].service(), "filesystem.distributed");

        let object_store = FilesystemDelegationProvider::default()
            .obtain(&SecurityConfig {
                location: LocationKind::ObjectStore,
                ..secured_config(&dir)
            })
            .await
            .unwrap();
        assert_eq!(object_store[0].service(), "filesystem.object_store");
    }
}
