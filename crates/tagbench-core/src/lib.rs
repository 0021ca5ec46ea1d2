//! Tagbench Core
//!
//! The annotation workbench as one explicit, caller-owned object:
//! - [`AnnotationSession`]: queue, annotator and ledger behind operator actions
//! - [`TagbenchConfig`]: TOML configuration with defaults for every key
//! - [`SessionError`]: single error surface for session operations
//! - [`SessionNotice`]: background results (page loads, persistence)
//!
//! # Example
//!
//! ```rust,no_run
//! use tagbench_core::{AnnotationSession, TagbenchConfig};
//!
//! # async fn run() -> Result<(), tagbench_core::SessionError> {
//! let mut session = AnnotationSession::connect(TagbenchConfig::default())?;
//! session.start().await?;
//! session.tag(0, "Noun", "N_NP")?;
//! println!("{}", session.progress());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod session;

pub use config::{TagbenchConfig, DEFAULT_API_BASE};
pub use error::{ConfigError, SessionError};
pub use session::{AnnotationSession, Progress, SessionNotice};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
