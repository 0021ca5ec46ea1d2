//! Tagbench Corpus
//!
//! Access to the remote sentence corpus:
//! - [`CorpusGateway`]: the two calls the workbench makes to the backend
//! - [`HttpCorpusGateway`]: reqwest implementation of the gateway
//! - [`SentenceQueue`]: paged window with low-water prefetch and
//!   generation-checked page loads

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod gateway;
pub mod http;
pub mod queue;

pub use error::{GatewayError, QueueError};
pub use gateway::{CorpusGateway, SentenceBatch};
pub use http::{endpoint_url, HttpCorpusGateway, DEFAULT_SENTENCES_PATH};
pub use queue::{
    InsertOutcome, PageOutcome, PageTicket, QueueSettings, QueueUpdate, QueueWindow,
    SentenceQueue, DEFAULT_LOW_WATER_MARK, DEFAULT_PAGE_SIZE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
