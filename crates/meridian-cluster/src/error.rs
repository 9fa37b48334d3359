//! Error types for the cluster client API.

/// Result type alias using [`ClusterError`].
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors raised by a cluster backend.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// The cluster rejected the submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// The cluster could not be reached.
    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    /// A referenced application does not exist on the cluster.
    #[error("application not found: {0}")]
    ApplicationNotFound(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClusterError {
    /// Create a rejection error.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create an unavailability error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
