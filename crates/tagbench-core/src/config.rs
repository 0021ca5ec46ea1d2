//! Workbench configuration
//!
//! Loaded from an optional TOML file. Every key has a default, so an empty
//! file (or no file) gives a working setup against a local corpus service.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagbench_annotation::{TagTaxonomy, TaxonomyError, DEFAULT_EXPORT_FILE};
use tagbench_corpus::{
    endpoint_url, QueueSettings, DEFAULT_LOW_WATER_MARK, DEFAULT_PAGE_SIZE, DEFAULT_SENTENCES_PATH,
};

/// Corpus service address used when none is configured
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Workbench configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagbenchConfig {
    /// Base URL of the corpus service
    pub api_base: String,
    /// Sentence resource path under `api_base`
    pub sentences_path: String,
    /// Sentences per page
    pub page_size: usize,
    /// Prefetch when this many sentences or fewer remain
    pub prefetch_low_water: usize,
    /// Default export file
    pub export_file: PathBuf,
    /// Category → tag codes
    pub taxonomy: TagTaxonomy,
}

impl Default for TagbenchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            sentences_path: DEFAULT_SENTENCES_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_low_water: DEFAULT_LOW_WATER_MARK,
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            taxonomy: TagTaxonomy::dogri(),
        }
    }
}

impl TagbenchConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed TOML, unknown keys or an invalid
    /// `[taxonomy]` table; any error from [`Self::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check values serde cannot
    ///
    /// # Errors
    /// - `ConfigError::InvalidPageSize` if `page_size` is 0
    /// - `ConfigError::Taxonomy` for an empty taxonomy
    /// - `ConfigError::InvalidApiBase` unless `api_base` + `sentences_path`
    ///   form an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if self.taxonomy.is_empty() {
            return Err(ConfigError::Taxonomy(TaxonomyError::Empty));
        }
        let url = endpoint_url(&self.api_base, &self.sentences_path)
            .map_err(|_| ConfigError::InvalidApiBase(self.api_base.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiBase(self.api_base.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_sentences_path(mut self, path: impl Into<String>) -> Self {
        self.sentences_path = path.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_prefetch_low_water(mut self, low_water: usize) -> Self {
        self.prefetch_low_water = low_water;
        self
    }

    #[must_use]
    pub fn with_export_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_file = path.into();
        self
    }

    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: TagTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    /// Paging parameters for the sentence queue
    #[inline]
    #[must_use]
    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings::new(self.page_size, self.prefetch_low_water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        let config = TagbenchConfig::from_toml_str("").unwrap();
        assert_eq!(config, TagbenchConfig::default());
        assert_eq!(config.queue_settings(), QueueSettings::new(25, 3));
        assert_eq!(config.export_file, PathBuf::from("dogri_tagged_sentences.txt"));
        assert_eq!(config.taxonomy.len(), 11);
    }

    #[test]
    fn full_document_overrides_everything() {
        let config = TagbenchConfig::from_toml_str(
            r#"
            api_base = "https://corpus.example/api"
            sentences_path = "/v2/sentences"
            page_size = 10
            prefetch_low_water = 2
            export_file = "out.txt"

            [taxonomy]
            Noun = ["N_NC", "N_NP"]
            Punctuation = ["PU_PU"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base, "https://corpus.example/api");
        assert_eq!(config.sentences_path, "/v2/sentences");
        assert_eq!(config.queue_settings(), QueueSettings::new(10, 2));
        assert_eq!(config.export_file, PathBuf::from("out.txt"));
        assert_eq!(config.taxonomy.categories().collect::<Vec<_>>(), ["Noun", "Punctuation"]);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = TagbenchConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageSize));
    }

    #[test]
    fn non_http_api_base_is_rejected() {
        for base in ["not a url", "ftp://corpus.example"] {
            let err = TagbenchConfig::default().with_api_base(base).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidApiBase(_)), "{base}: {err:?}");
        }
    }

    #[test]
    fn duplicate_tag_in_taxonomy_fails_to_parse() {
        let err = TagbenchConfig::from_toml_str(
            r#"
            [taxonomy]
            Noun = ["N_NC"]
            Other = ["N_NC"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("N_NC"), "{err}");
    }

    #[test]
    fn unknown_key_fails_to_parse() {
        let err = TagbenchConfig::from_toml_str("page-size = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagbench.toml");
        std::fs::write(&path, "page_size = 5\n").unwrap();

        assert_eq!(TagbenchConfig::load(&path).unwrap().page_size, 5);

        let err = TagbenchConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builder_overrides_chain() {
        let config = TagbenchConfig::default()
            .with_api_base("http://10.0.0.2:9000")
            .with_page_size(50)
            .with_prefetch_low_water(5);
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_settings(), QueueSettings::new(50, 5));
    }
}
