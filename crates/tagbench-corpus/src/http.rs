//! HTTP corpus gateway
//!
//! `GET {endpoint}?limit=&offset=` returns `{ "sentences": [...] }`;
//! `POST {endpoint}` with the same body shape inserts sentences. The POST
//! response body is ignored, only the status matters.

use crate::error::GatewayError;
use crate::gateway::{CorpusGateway, SentenceBatch};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Default path of the sentence resource
pub const DEFAULT_SENTENCES_PATH: &str = "/manual/sentences";

/// reqwest-backed [`CorpusGateway`]
#[derive(Debug, Clone)]
pub struct HttpCorpusGateway {
    client: Client,
    endpoint: Url,
}

impl HttpCorpusGateway {
    /// Create a gateway for `api_base` + `sentences_path`
    ///
    /// The path is appended to the base, so a base with its own path prefix
    /// (`https://host/api`) keeps it.
    ///
    /// # Errors
    /// `GatewayError::InvalidUrl` if the joined URL does not parse.
    pub fn new(api_base: &str, sentences_path: &str) -> Result<Self, GatewayError> {
        Ok(Self::with_client(Client::new(), endpoint_url(api_base, sentences_path)?))
    }

    /// Create with a preconfigured client
    #[inline]
    #[must_use]
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Resolved sentence endpoint
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Join a base URL and a resource path
///
/// # Errors
/// `GatewayError::InvalidUrl` if the result is not an absolute URL.
pub fn endpoint_url(api_base: &str, path: &str) -> Result<Url, GatewayError> {
    let joined = format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|_| GatewayError::InvalidUrl(joined))
}

#[async_trait]
impl CorpusGateway for HttpCorpusGateway {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<String>, GatewayError> {
        tracing::debug!(url = %self.endpoint, offset, limit, "fetching sentence page");

        let batch: SentenceBatch = self
            .client
            .get(self.endpoint.clone())
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(batch.sentences)
    }

    async fn insert_sentences(&self, sentences: Vec<String>) -> Result<(), GatewayError> {
        tracing::debug!(url = %self.endpoint, count = sentences.len(), "inserting sentences");

        self.client
            .post(self.endpoint.clone())
            .json(&SentenceBatch::new(sentences))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = endpoint_url("https://host.example/api/", "/manual/sentences").unwrap();
        assert_eq!(url.as_str(), "https://host.example/api/manual/sentences");
    }

    #[test]
    fn endpoint_without_slashes() {
        let url = endpoint_url("http://127.0.0.1:8000", "manual/sentences").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/manual/sentences");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            endpoint_url("not a url", DEFAULT_SENTENCES_PATH),
            Err(GatewayError::InvalidUrl(_))
        ));
    }
}
