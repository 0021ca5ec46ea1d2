//! Testing utilities for the tagbench workspace
//!
//! Shared fixtures and an in-memory corpus gateway with failure switches and
//! per-request gates for ordering page responses.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tagbench_corpus::{CorpusGateway, GatewayError};
use tokio::sync::oneshot;

pub const EXAMPLE_SENTENCE: &str = "राम घर गया।";

/// Category/type per token of [`EXAMPLE_SENTENCE`]
pub const EXAMPLE_PLAN: [(&str, &str); 4] = [
    ("Noun", "N_NP"),
    ("Postposition", "PP_PP"),
    ("Verb", "V_VM"),
    ("Punctuation", "PU_PU"),
];

pub const EXAMPLE_TAGGED: &str = "राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU";

/// `n` numbered two-token sentences: `वाक्य 0`, `वाक्य 1`, ...
pub fn numbered_sentences(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("वाक्य {i}")).collect()
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Fetch { offset: usize, limit: usize },
    Insert { sentences: Vec<String> },
}

/// Corpus held in memory behind the [`CorpusGateway`] trait
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    corpus: Mutex<Vec<String>>,
    calls: Mutex<Vec<GatewayCall>>,
    fail_fetch: AtomicBool,
    fail_insert: AtomicBool,
    /// `Some` while holding fetch responses; one slot per held fetch
    gates: Mutex<Option<Vec<Option<oneshot::Sender<()>>>>>,
}

impl InMemoryCorpus {
    pub fn new(sentences: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            corpus: Mutex::new(sentences),
            ..Self::default()
        })
    }

    pub fn with_numbered(n: usize) -> Arc<Self> {
        Self::new(numbered_sentences(n))
    }

    /// Make every following fetch fail (or succeed again)
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every following insert fail (or succeed again)
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    /// Hold fetch responses until released with [`Self::release`]
    pub fn hold_fetches(&self) {
        self.gates.lock().get_or_insert_with(Vec::new);
    }

    /// Let the `n`-th held fetch (0-based, in arrival order) respond
    pub fn release(&self, n: usize) {
        if let Some(gates) = self.gates.lock().as_mut() {
            if let Some(tx) = gates.get_mut(n).and_then(Option::take) {
                let _ = tx.send(());
            }
        }
    }

    /// Number of fetches currently registered as held
    pub fn held(&self) -> usize {
        self.gates.lock().as_ref().map_or(0, Vec::len)
    }

    /// Yield until `n` fetches are held
    pub async fn wait_for_held(&self, n: usize) {
        while self.held() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Offsets of every fetch so far
    pub fn fetch_offsets(&self) -> Vec<usize> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Fetch { offset, .. } => Some(*offset),
                GatewayCall::Insert { .. } => None,
            })
            .collect()
    }

    pub fn corpus(&self) -> Vec<String> {
        self.corpus.lock().clone()
    }
}

#[async_trait]
impl CorpusGateway for InMemoryCorpus {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<String>, GatewayError> {
        self.calls.lock().push(GatewayCall::Fetch { offset, limit });

        let gate = self.gates.lock().as_mut().map(|gates| {
            let (tx, rx) = oneshot::channel();
            gates.push(Some(tx));
            rx
        });
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(self
            .corpus
            .lock()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_sentences(&self, sentences: Vec<String>) -> Result<(), GatewayError> {
        self.calls.lock().push(GatewayCall::Insert {
            sentences: sentences.clone(),
        });
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(GatewayError::Status { status: 500 });
        }
        self.corpus.lock().extend(sentences);
        Ok(())
    }
}
