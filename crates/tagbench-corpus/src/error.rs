//! Error types for corpus access
//!
//! - [`GatewayError`]: a single call to the corpus service failed
//! - [`QueueError`]: a queue operation was refused or its load failed

/// Corpus service call failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Connection, DNS, or other transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("corpus service returned status {status}")]
    Status { status: u16 },

    /// Response body was not the expected JSON
    #[error("malformed response: {0}")]
    Decode(String),

    /// Base URL or path does not form a valid URL
    #[error("invalid corpus url '{0}'")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Queue errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Page request failed; the window was left unchanged
    #[error("failed to load sentences at offset {offset}: {source}")]
    PageLoad {
        offset: usize,
        #[source]
        source: GatewayError,
    },

    /// Custom sentence was blank after trimming
    #[error("custom sentence is empty")]
    EmptySentence,
}

impl QueueError {
    /// Create page load error
    pub fn page_load(offset: usize, source: GatewayError) -> Self {
        Self::PageLoad { offset, source }
    }
}
