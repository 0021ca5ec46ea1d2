//! Corpus service seam
//!
//! The annotation workbench only consumes two operations from the backend:
//! paged sentence retrieval and sentence insertion.

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote corpus of raw sentences
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CorpusGateway: Send + Sync {
    /// Fetch up to `limit` sentences starting at absolute position `offset`
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<String>, GatewayError>;

    /// Persist new sentences at the end of the corpus
    async fn insert_sentences(&self, sentences: Vec<String>) -> Result<(), GatewayError>;
}

/// Wire body shared by `GET` responses and `POST` requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBatch {
    #[serde(default)]
    pub sentences: Vec<String>,
}

impl SentenceBatch {
    #[inline]
    #[must_use]
    pub fn new(sentences: Vec<String>) -> Self {
        Self { sentences }
    }
}
