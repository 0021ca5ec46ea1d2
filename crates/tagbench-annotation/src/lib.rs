//! Tagbench Annotation
//!
//! The synchronous core of the sentence-annotation workbench:
//! - [`tokenize`]: pure tokenizer for Devanagari / ASCII text
//! - [`TagTaxonomy`]: validated two-level category → tag-code configuration
//! - [`Annotator`]: per-sentence token/tag state machine
//! - [`SessionLedger`]: append-only record of completed annotations
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagbench_annotation::{Annotator, SessionLedger, TagTaxonomy};
//!
//! let taxonomy = Arc::new(TagTaxonomy::dogri());
//! let mut annotator = Annotator::new(taxonomy);
//! annotator.prepare("राम घर");
//!
//! for (index, (category, code)) in [("Noun", "N_NP"), ("Postposition", "PP_PP")].into_iter().enumerate() {
//!     annotator.select_token(index).unwrap();
//!     annotator.choose_category(category).unwrap();
//!     annotator.choose_type(code).unwrap();
//!     annotator.assign().unwrap();
//! }
//!
//! let mut ledger = SessionLedger::new();
//! ledger.record(&annotator).unwrap();
//! assert_eq!(ledger.entries()[0].tagged(), "राम/N_NP घर/PP_PP");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod annotator;
pub mod error;
pub mod ledger;
pub mod taxonomy;
pub mod tokenizer;

pub use annotator::{AnnotationState, Annotator, MissingSelection, SelectionState};
pub use error::{AnnotationError, LedgerError, TaxonomyError};
pub use ledger::{CompletedAnnotation, SessionLedger, DEFAULT_EXPORT_FILE};
pub use taxonomy::{TagCode, TagTaxonomy};
pub use tokenizer::{tokenize, tokenize_text, Token};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
