//! Impact narrator error types.

/// Errors from an impact narrator.
#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The narrator did not answer in time
    #[error("narrator timed out")]
    Timeout,

    /// Model endpoint returned an error status
    #[error("narrator API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response, or the JSON embedded in the model's text, did not parse
    #[error("could not parse narrator response: {message}")]
    Json { message: String },

    /// The model answered but produced no usable examples
    #[error("narrator returned no examples")]
    NoExamples,
}

impl From<reqwest::Error> for NarrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NarrationError::Timeout
        } else {
            NarrationError::Http(err)
        }
    }
}
