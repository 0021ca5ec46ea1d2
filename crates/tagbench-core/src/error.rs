//! Error types for the workbench session
//!
//! [`SessionError`] is the single error surface of [`crate::AnnotationSession`];
//! it wraps the annotation and corpus errors so callers match on one type.

use std::path::PathBuf;
use tagbench_annotation::{AnnotationError, LedgerError, TaxonomyError};
use tagbench_corpus::{GatewayError, QueueError};

/// Session operation failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Rejected annotation transition
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// Save rejected or export failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Page load or custom-sentence insert failed
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Corpus service could not be set up
    #[error("corpus gateway: {0}")]
    Gateway(#[from] GatewayError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No active sentence to operate on
    #[error("no active sentence")]
    NoActiveSentence,
}

impl SessionError {
    /// The session can continue after this error
    ///
    /// Only configuration problems are fatal; everything else leaves the
    /// session state unchanged and the operator may retry or correct.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or invalid value
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `page_size` must be at least 1
    #[error("page_size must be at least 1")]
    InvalidPageSize,

    /// `api_base` is not an http(s) URL
    #[error("api_base '{0}' is not an http(s) URL")]
    InvalidApiBase(String),

    /// Taxonomy rejected outside of deserialization
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}
