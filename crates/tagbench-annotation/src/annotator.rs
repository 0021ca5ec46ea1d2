//! Per-sentence annotation state machine
//!
//! Holds the active sentence's tokens and their tag slots, the selected
//! token, and the category → type cascade. The token and tag vectors are
//! rebuilt together on every [`Annotator::prepare`], so they always have the
//! same length.
//!
//! Rejected operations return an [`AnnotationError`] and leave every field
//! exactly as it was.

use crate::error::AnnotationError;
use crate::taxonomy::{TagCode, TagTaxonomy};
use crate::tokenizer::{tokenize, Token};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Sentence-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationState {
    /// No tokens loaded
    Idle,
    /// Tokens loaded, some tags still unset
    Prepared,
    /// Every token tagged
    Complete,
}

/// Orthogonal selection sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoCategory,
    CategoryChosen,
    TypeChosen,
}

/// The part of the selection `assign` was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSelection {
    Token,
    Category,
    Type,
}

impl Display for MissingSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => f.write_str("no token selected"),
            Self::Category => f.write_str("no category chosen"),
            Self::Type => f.write_str("no type chosen"),
        }
    }
}

/// Annotation state for the active sentence
#[derive(Debug, Clone)]
pub struct Annotator {
    taxonomy: Arc<TagTaxonomy>,
    sentence: String,
    tokens: Vec<Token>,
    tags: Vec<Option<TagCode>>,
    selected: Option<usize>,
    category: Option<String>,
    tag_type: Option<TagCode>,
}

impl Annotator {
    /// Create an idle annotator over `taxonomy`
    #[must_use]
    pub fn new(taxonomy: Arc<TagTaxonomy>) -> Self {
        Self {
            taxonomy,
            sentence: String::new(),
            tokens: Vec::new(),
            tags: Vec::new(),
            selected: None,
            category: None,
            tag_type: None,
        }
    }

    /// Load a sentence: tokenize, reset every tag, select token 0, clear the
    /// category/type choice
    ///
    /// Calling it twice with the same sentence leaves the same state.
    pub fn prepare(&mut self, sentence: &str) {
        self.tokens = tokenize(sentence);
        self.tags = vec![None; self.tokens.len()];
        self.sentence = sentence.to_string();
        self.selected = if self.tokens.is_empty() { None } else { Some(0) };
        self.category = None;
        self.tag_type = None;

        tracing::debug!(tokens = self.tokens.len(), "prepared sentence");
    }

    /// Drop the active sentence
    pub fn clear(&mut self) {
        self.sentence.clear();
        self.tokens.clear();
        self.tags.clear();
        self.selected = None;
        self.category = None;
        self.tag_type = None;
    }

    /// Move the token cursor
    ///
    /// # Errors
    /// `AnnotationError::TokenOutOfRange` if `index >= token_count()`.
    pub fn select_token(&mut self, index: usize) -> Result<(), AnnotationError> {
        if index >= self.tokens.len() {
            return Err(AnnotationError::TokenOutOfRange {
                index,
                count: self.tokens.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Choose a category; clears any chosen type
    ///
    /// # Errors
    /// `AnnotationError::UnknownCategory` if the taxonomy has no such key.
    pub fn choose_category(&mut self, category: &str) -> Result<(), AnnotationError> {
        if !self.taxonomy.has_category(category) {
            return Err(AnnotationError::UnknownCategory(category.to_string()));
        }
        self.category = Some(category.to_string());
        self.tag_type = None;
        Ok(())
    }

    /// Return to the no-category selection state
    pub fn clear_category(&mut self) {
        self.category = None;
        self.tag_type = None;
    }

    /// Choose a type within the chosen category
    ///
    /// # Errors
    /// - `AnnotationError::NoCategoryChosen` without a category
    /// - `AnnotationError::TagNotInCategory` if `code` is not in its list
    pub fn choose_type(&mut self, code: &str) -> Result<(), AnnotationError> {
        let category = self
            .category
            .as_deref()
            .ok_or(AnnotationError::NoCategoryChosen)?;
        let tag = self.taxonomy.resolve(category, code)?.clone();
        self.tag_type = Some(tag);
        Ok(())
    }

    /// Write the chosen type into the selected token's slot
    ///
    /// Returns the index that was tagged.
    ///
    /// # Errors
    /// `AnnotationError::AssignBlocked` naming the first missing piece of
    /// the selection; nothing is written.
    pub fn assign(&mut self) -> Result<usize, AnnotationError> {
        match (self.selected, &self.category, &self.tag_type) {
            (Some(index), Some(_), Some(tag)) if index < self.tokens.len() => {
                tracing::debug!(index, tag = %tag, "assigned tag");
                self.tags[index] = Some(tag.clone());
                Ok(index)
            }
            _ => Err(AnnotationError::AssignBlocked(
                self.missing_selection().unwrap_or(MissingSelection::Token),
            )),
        }
    }

    fn missing_selection(&self) -> Option<MissingSelection> {
        if !matches!(self.selected, Some(i) if i < self.tokens.len()) {
            Some(MissingSelection::Token)
        } else if self.category.is_none() {
            Some(MissingSelection::Category)
        } else if self.tag_type.is_none() {
            Some(MissingSelection::Type)
        } else {
            None
        }
    }

    /// Whether `assign` would succeed
    #[inline]
    #[must_use]
    pub fn can_assign(&self) -> bool {
        self.missing_selection().is_none()
    }

    /// At least one token and no unset tag
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.tokens.is_empty()
            && self.tags.len() == self.tokens.len()
            && self.tags.iter().all(Option::is_some)
    }

    /// Sentence-level state
    #[must_use]
    pub fn state(&self) -> AnnotationState {
        if self.tokens.is_empty() {
            AnnotationState::Idle
        } else if self.is_complete() {
            AnnotationState::Complete
        } else {
            AnnotationState::Prepared
        }
    }

    /// Selection sub-state
    #[must_use]
    pub fn selection_state(&self) -> SelectionState {
        match (&self.category, &self.tag_type) {
            (None, _) => SelectionState::NoCategory,
            (Some(_), None) => SelectionState::CategoryChosen,
            (Some(_), Some(_)) => SelectionState::TypeChosen,
        }
    }

    /// Raw text of the active sentence
    #[inline]
    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[Option<TagCode>] {
        &self.tags
    }

    #[inline]
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens with a tag
    #[must_use]
    pub fn tagged_count(&self) -> usize {
        self.tags.iter().filter(|t| t.is_some()).count()
    }

    /// Selected token index
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Chosen category
    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Chosen type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> Option<&TagCode> {
        self.tag_type.as_ref()
    }

    /// Codes offered for the chosen category (empty without a category)
    #[must_use]
    pub fn available_types(&self) -> &[TagCode] {
        self.category
            .as_deref()
            .and_then(|c| self.taxonomy.tags_for(c).ok())
            .unwrap_or(&[])
    }

    #[inline]
    #[must_use]
    pub fn taxonomy(&self) -> &TagTaxonomy {
        &self.taxonomy
    }
}
