//! Error types for e-SUS client operations.
//!
//! The transport layer reports failures as [`ClientError`]. The public
//! operations of [`crate::SessionContextManager`] log these and collapse them
//! into `false`, `None`, or an empty list, so callers only ever see a
//! `ClientError` when they use [`crate::GraphQLTransport`] directly.

/// Errors that can occur while talking to the GraphQL endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never completed, returned a non-2xx status, or its body
    /// could not be decoded.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response arrived but carried a non-empty `errors` array.
    #[error("GraphQL error in {operation}: {}", .messages.join("; "))]
    Application {
        /// Operation name that produced the errors.
        operation: String,
        /// Messages reported by the service.
        messages: Vec<String>,
    },

    /// Login did not produce a usable session.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An operation that needs a session was called before login.
    #[error("Not authenticated: call authenticate() first")]
    NotAuthenticated,
}

impl ClientError {
    /// Returns `true` for errors reported by the service itself.
    #[must_use]
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type ClientResult<T> = Result<T, ClientError>;
