//! Error types for the launch layer.

use meridian_cluster::ClusterError;

/// Result type alias using [`LaunchError`].
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Errors that can occur while launching a program.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// I/O failure while preparing local artifacts for submission.
    ///
    /// Always raised before the cluster sees the submission; the working
    /// directory is cleaned up synchronously before this propagates.
    #[error("staging failed: {message}")]
    Staging {
        /// What was being staged.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failure acquiring a required delegation token.
    #[error("credential acquisition failed: {0}")]
    Credential(String),

    /// The cluster backend rejected or failed to accept the submission.
    #[error("submission failed: {0}")]
    Submission(#[from] ClusterError),

    /// Launch options could not be encoded or decoded.
    #[error("failed to encode launch options: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LaunchError {
    /// Create a staging error.
    #[must_use]
    pub fn staging(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            message: message.into(),
            source,
        }
    }

    /// Create a credential error.
    #[must_use]
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
