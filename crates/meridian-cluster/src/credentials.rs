//! Delegation tokens attached to a submission.
//!
//! Token values are wrapped in [`SecretString`] so they are redacted from
//! `Debug` output and zeroized on drop.

use secrecy::SecretString;

/// A single delegation token: an opaque secret scoped to one service.
#[derive(Debug, Clone)]
pub struct DelegationToken {
    service: String,
    token: SecretString,
}

impl DelegationToken {
    /// Create a token for a service.
    #[must_use]
    pub fn new(service: impl Into<String>, token: SecretString) -> Self {
        Self {
            service: service.into(),
            token,
        }
    }

    /// Identifier of the service this token grants access to.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The secret token value.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

/// Append-only collection of delegation tokens.
///
/// Empty unless security is enabled for at least one token provider.
/// Attaching an empty set to a submission is a no-op, so callers skip the
/// attach entirely when [`CredentialSet::is_empty`] holds.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    tokens: Vec<DelegationToken>,
}

impl CredentialSet {
    /// Create an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token.
    pub fn add(&mut self, token: DelegationToken) {
        self.tokens.push(token);
    }

    /// Append every token from an iterator.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = DelegationToken>) {
        self.tokens.extend(tokens);
    }

    /// Whether the set holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &DelegationToken> {
        self.tokens.iter()
    }

    /// Service identifiers of all tokens, in insertion order.
    #[must_use]
    pub fn services(&self) -> Vec<&str> {
        self.tokens.iter().map(DelegationToken::service).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_by_default() {
        let set = CredentialSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut set = CredentialSet::new();
        set.add(DelegationToken::new("cluster", SecretString::from("t1")));
        set.add(DelegationToken::new("storage", SecretString::from("t2")));

        assert_eq!(set.services(), vec!["cluster", "storage"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn debug_output_redacts_token_values() {
        let mut set = CredentialSet::new();
        set.add(DelegationToken::new(
            "cluster",
            SecretString::from("super-secret-value"),
        ));

        let rendered = format!("{set:?}");
        assert!(rendered.contains("cluster"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
