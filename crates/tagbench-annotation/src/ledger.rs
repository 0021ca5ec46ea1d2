//! Session ledger
//!
//! Append-only list of completed annotations for the current process, plus
//! the plain-text export artifact. Nothing here is persisted on its own.

use crate::annotator::Annotator;
use crate::error::LedgerError;
use crate::taxonomy::TagCode;
use crate::tokenizer::Token;
use std::path::Path;

/// Default name for the export artifact
pub const DEFAULT_EXPORT_FILE: &str = "dogri_tagged_sentences.txt";

/// A saved sentence and its `token/tag` serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedAnnotation {
    sentence: String,
    tagged: String,
}

impl CompletedAnnotation {
    /// Original sentence text
    #[inline]
    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Space-separated `token/tag` pairs
    #[inline]
    #[must_use]
    pub fn tagged(&self) -> &str {
        &self.tagged
    }
}

/// Completed annotations for this session
#[derive(Debug, Default)]
pub struct SessionLedger {
    entries: Vec<CompletedAnnotation>,
}

impl SessionLedger {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the annotator's current sentence
    ///
    /// # Errors
    /// `LedgerError::Incomplete` unless the annotator is complete.
    pub fn record(&mut self, annotator: &Annotator) -> Result<&CompletedAnnotation, LedgerError> {
        if !annotator.is_complete() {
            return Err(LedgerError::Incomplete {
                tagged: annotator.tagged_count(),
                total: annotator.token_count(),
            });
        }
        self.record_parts(annotator.sentence(), annotator.tokens(), annotator.tags())
    }

    /// Record a sentence from its parallel token and tag slices
    ///
    /// # Errors
    /// - `LedgerError::LengthMismatch` if the slices differ in length
    /// - `LedgerError::Incomplete` if there are no tokens or a tag is unset
    pub fn record_parts(
        &mut self,
        sentence: &str,
        tokens: &[Token],
        tags: &[Option<TagCode>],
    ) -> Result<&CompletedAnnotation, LedgerError> {
        if tokens.len() != tags.len() {
            return Err(LedgerError::LengthMismatch {
                tokens: tokens.len(),
                tags: tags.len(),
            });
        }

        let pairs: Option<Vec<String>> = tokens
            .iter()
            .zip(tags)
            .map(|(token, tag)| tag.as_ref().map(|tag| format!("{token}/{tag}")))
            .collect();
        let pairs = match pairs {
            Some(pairs) if !pairs.is_empty() => pairs,
            _ => {
                return Err(LedgerError::Incomplete {
                    tagged: tags.iter().filter(|t| t.is_some()).count(),
                    total: tokens.len(),
                })
            }
        };

        self.entries.push(CompletedAnnotation {
            sentence: sentence.to_string(),
            tagged: pairs.join(" "),
        });
        tracing::info!(saved = self.entries.len(), "recorded annotation");

        Ok(&self.entries[self.entries.len() - 1])
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[CompletedAnnotation] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the export artifact
    ///
    /// One block per entry, `Sentence i:\n<text>\nTagged: <pairs>\n`, blocks
    /// separated by a blank line. `None` while the ledger is empty.
    #[must_use]
    pub fn export_text(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let blocks: Vec<String> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                format!(
                    "Sentence {}:\n{}\nTagged: {}\n",
                    idx + 1,
                    entry.sentence,
                    entry.tagged
                )
            })
            .collect();
        Some(blocks.join("\n"))
    }

    /// Write the export artifact to `path`
    ///
    /// Returns the number of sentences written, or `None` (no file touched)
    /// when the ledger is empty.
    ///
    /// # Errors
    /// `LedgerError::Io` if the file cannot be written.
    pub fn write_export(&self, path: impl AsRef<Path>) -> Result<Option<usize>, LedgerError> {
        let path = path.as_ref();
        let Some(text) = self.export_text() else {
            return Ok(None);
        };
        std::fs::write(path, text).map_err(|e| LedgerError::io_error(path, e))?;
        tracing::info!(path = %path.display(), sentences = self.entries.len(), "exported ledger");
        Ok(Some(self.entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TagTaxonomy;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn tagged_example() -> Annotator {
        let mut a = Annotator::new(Arc::new(TagTaxonomy::dogri()));
        a.prepare("राम घर गया।");
        for (index, (category, code)) in [
            ("Noun", "N_NP"),
            ("Postposition", "PP_PP"),
            ("Verb", "V_VM"),
            ("Punctuation", "PU_PU"),
        ]
        .into_iter()
        .enumerate()
        {
            a.select_token(index).unwrap();
            a.choose_category(category).unwrap();
            a.choose_type(code).unwrap();
            a.assign().unwrap();
        }
        a
    }

    #[test]
    fn record_serializes_token_tag_pairs() {
        let mut ledger = SessionLedger::new();
        let entry = ledger.record(&tagged_example()).unwrap();
        assert_eq!(entry.tagged(), "राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU");
        assert_eq!(entry.sentence(), "राम घर गया।");
    }

    #[test]
    fn incomplete_sentence_is_refused() {
        let mut a = Annotator::new(Arc::new(TagTaxonomy::dogri()));
        a.prepare("राम घर");
        let mut ledger = SessionLedger::new();

        let err = ledger.record(&a).unwrap_err();
        assert!(matches!(err, LedgerError::Incomplete { tagged: 0, total: 2 }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_sentence_is_refused() {
        let mut ledger = SessionLedger::new();
        let err = ledger.record_parts("", &[], &[]).unwrap_err();
        assert!(matches!(err, LedgerError::Incomplete { tagged: 0, total: 0 }));
    }

    #[test]
    fn mismatched_parts_are_refused() {
        let mut ledger = SessionLedger::new();
        let tokens = tokenize("राम घर");
        let tags = vec![Some(TagCode::new("N_NP").unwrap())];
        let err = ledger.record_parts("राम घर", &tokens, &tags).unwrap_err();
        assert!(matches!(err, LedgerError::LengthMismatch { tokens: 2, tags: 1 }));
    }

    #[test]
    fn export_is_none_when_empty() {
        assert_eq!(SessionLedger::new().export_text(), None);
    }

    #[test]
    fn export_numbers_blocks_and_separates_with_blank_line() {
        let mut ledger = SessionLedger::new();
        let a = tagged_example();
        ledger.record(&a).unwrap();
        ledger.record(&a).unwrap();

        let expected = "Sentence 1:\nराम घर गया।\nTagged: राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU\n\
                        \n\
                        Sentence 2:\nराम घर गया।\nTagged: राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU\n";
        assert_eq!(ledger.export_text().unwrap(), expected);
    }

    #[test]
    fn write_export_skips_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        assert_eq!(SessionLedger::new().write_export(&path).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn write_export_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let mut ledger = SessionLedger::new();
        ledger.record(&tagged_example()).unwrap();

        assert_eq!(ledger.write_export(&path).unwrap(), Some(1));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Sentence 1:\n"));
    }
}
