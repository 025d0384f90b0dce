//! Feed error types.

/// Errors from fetching or parsing the upstream station feed.
///
/// Cloneable so a single failed fetch can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (connection refused, DNS, TLS, ...)
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Request did not complete within the configured timeout
    #[error("feed request timed out")]
    Timeout,

    /// Upstream returned an error status
    #[error("feed returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Reading a local feed file failed
    #[error("failed to read feed file: {message}")]
    Io { message: String },

    /// Document is not a usable station feed
    #[error("malformed feed: {message}")]
    Malformed { message: String },
}

impl FeedError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FeedError::Malformed {
            message: message.into(),
        }
    }

    /// Whether the document itself was bad, as opposed to the transport.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Malformed { .. })
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Http {
                message: err.to_string(),
            }
        }
    }
}
