//! Normalized client error.
//!
//! DESIGN
//! ======
//! Transport failures, non-2xx statuses and `success:false` envelopes all
//! collapse into [`ClientError`], whose `Display` output is the text a view
//! shows to the user. Local validation failures share the type so callers
//! handle one error channel, but they never reach the network.

/// Errors produced by the API client, session store and resource hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The server answered 2xx but the envelope reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// A 2xx body did not match the expected schema.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Input failed a local check before any request was sent.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// An operation that needs a signed-in user ran without one.
    #[error("No user logged in")]
    NotAuthenticated,

    /// The persisted auth token could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),

    /// Configuration was unusable (bad URL, HTTP client build failure).
    #[error("client config invalid: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// HTTP status when the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller could reasonably try the same request again.
    ///
    /// Nothing in this crate retries on its own.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// True for failures raised locally before a request was issued.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotAuthenticated)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
