//! Error types for the annotation core
//!
//! Every error here is a local validation rejection: the operation that
//! produced it left all state untouched.

use crate::annotator::MissingSelection;

/// Rejected state-machine transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// Token index outside the active sentence
    #[error("token index {index} out of range (sentence has {count} tokens)")]
    TokenOutOfRange { index: usize, count: usize },

    /// Category is not a key of the taxonomy
    #[error("unknown category: '{0}'")]
    UnknownCategory(String),

    /// Type chosen before any category
    #[error("choose a category before choosing a type")]
    NoCategoryChosen,

    /// Type does not belong to the chosen category
    #[error("tag '{tag}' is not allowed in category '{category}'")]
    TagNotInCategory { category: String, tag: String },

    /// Assign attempted without a full selection
    #[error("cannot assign: {0}")]
    AssignBlocked(MissingSelection),
}

/// Taxonomy configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// No categories at all
    #[error("taxonomy has no categories")]
    Empty,

    /// Blank category name
    #[error("taxonomy contains a blank category name")]
    BlankCategory,

    /// Category with no tag codes
    #[error("category '{0}' has no tag codes")]
    EmptyCategory(String),

    /// Tag code that cannot appear in `token/tag` output
    #[error("invalid tag code '{0}': must be non-empty without whitespace or '/'")]
    InvalidTagCode(String),

    /// Same code listed twice
    #[error("tag code '{tag}' listed under both '{first}' and '{second}'")]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },
}

/// Ledger errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Sentence still has untagged tokens (or no tokens)
    #[error("sentence incomplete: {tagged}/{total} tokens tagged")]
    Incomplete { tagged: usize, total: usize },

    /// Tokens and tags differ in length
    #[error("token/tag length mismatch: {tokens} tokens, {tags} tags")]
    LengthMismatch { tokens: usize, tags: usize },

    /// Export file could not be written
    #[error("failed to write export to {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
