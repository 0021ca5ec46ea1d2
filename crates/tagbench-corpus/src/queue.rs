//! Sentence queue
//!
//! A bounded window over a much larger remote corpus, fetched lazily in
//! fixed-size pages. Page loads and custom-sentence persistence run on
//! spawned tokio tasks; their results come back through
//! [`SentenceQueue::next_update`] / [`SentenceQueue::try_next_update`], so
//! the caller never blocks on the network.
//!
//! Every page request is stamped with a generation number. Only the
//! response carrying the latest generation is applied; anything older is
//! dropped as stale, success or failure.
//!
//! The queue spawns tasks, so it must be driven from inside a tokio runtime.

use crate::error::{GatewayError, QueueError};
use crate::gateway::CorpusGateway;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// Sentences requested per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Remaining-sentence count at or below which the next page is prefetched
pub const DEFAULT_LOW_WATER_MARK: usize = 3;

/// Paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Sentences per page (`limit` query parameter)
    pub page_size: usize,
    /// Prefetch threshold
    pub low_water_mark: usize,
}

impl QueueSettings {
    #[inline]
    #[must_use]
    pub fn new(page_size: usize, low_water_mark: usize) -> Self {
        Self {
            page_size,
            low_water_mark,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_LOW_WATER_MARK)
    }
}

/// Identity of one page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    /// Monotonically increasing per queue
    pub generation: u64,
    /// Absolute corpus offset requested
    pub offset: usize,
    /// Append to the window instead of replacing it
    pub append: bool,
}

/// In-memory slice of the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueWindow {
    sentences: Vec<String>,
    base_offset: usize,
    /// Sentences in the window that came from the corpus (custom ones excluded)
    fetched: usize,
    cursor: usize,
}

impl QueueWindow {
    /// Window over `sentences` fetched from `base_offset`, cursor at 0
    #[must_use]
    pub fn new(sentences: Vec<String>, base_offset: usize) -> Self {
        let fetched = sentences.len();
        Self {
            sentences,
            base_offset,
            fetched,
            cursor: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Absolute corpus position of `sentences()[0]`
    #[inline]
    #[must_use]
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Index of the active sentence; equals `len()` once exhausted
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Sentences from the cursor to the end, the active one included
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sentences.len() - self.cursor
    }

    /// Active sentence, if the cursor is inside the window
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.sentences.get(self.cursor).map(String::as_str)
    }

    /// Absolute position of the next unfetched corpus sentence
    #[inline]
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.base_offset + self.fetched
    }
}

/// What happened when a spawned task finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueUpdate {
    /// Latest page applied
    PageApplied {
        ticket: PageTicket,
        received: usize,
        /// The active sentence is a different one than before
        active_changed: bool,
    },
    /// Latest page failed; window unchanged
    PageFailed {
        ticket: PageTicket,
        error: QueueError,
    },
    /// A superseded page response was dropped
    Stale { ticket: PageTicket },
    /// Custom sentence acknowledged by the corpus service
    Persisted { text: String },
    /// Custom sentence kept locally but not acknowledged
    PersistFailed { text: String, error: GatewayError },
    /// Background task panicked or was cancelled
    TaskFailed { reason: String },
}

/// Result of applying a page response directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied {
        received: usize,
        active_changed: bool,
    },
    Stale,
}

/// Result of a custom-sentence insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Window index of the inserted sentence
    pub index: usize,
    /// The insert filled an exhausted window and became the active sentence
    pub active_changed: bool,
}

enum TaskResult {
    Page {
        ticket: PageTicket,
        result: Result<Vec<String>, GatewayError>,
    },
    Persist {
        text: String,
        result: Result<(), GatewayError>,
    },
}

/// Paged sentence window with prefetch
pub struct SentenceQueue {
    gateway: Arc<dyn CorpusGateway>,
    settings: QueueSettings,
    window: QueueWindow,
    generation: u64,
    /// Latest generation whose response has been handled
    resolved: u64,
    /// Most recently issued page request
    latest: Option<PageTicket>,
    tasks: JoinSet<TaskResult>,
}

impl std::fmt::Debug for SentenceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceQueue")
            .field("settings", &self.settings)
            .field("window", &self.window)
            .field("generation", &self.generation)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl SentenceQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new(gateway: Arc<dyn CorpusGateway>, settings: QueueSettings) -> Self {
        Self {
            gateway,
            settings,
            window: QueueWindow::default(),
            generation: 0,
            resolved: 0,
            latest: None,
            tasks: JoinSet::new(),
        }
    }

    fn issue(&mut self, offset: usize, append: bool) -> PageTicket {
        self.generation += 1;
        let ticket = PageTicket {
            generation: self.generation,
            offset,
            append,
        };
        self.latest = Some(ticket);
        ticket
    }

    /// Latest page request, while it is still unanswered
    #[must_use]
    pub fn pending(&self) -> Option<PageTicket> {
        self.latest.filter(|_| self.is_loading())
    }

    /// Request one page starting at `offset` in the background
    ///
    /// Returns the ticket stamped on the request. Any earlier request still
    /// in flight becomes stale.
    pub fn load(&mut self, offset: usize, append: bool) -> PageTicket {
        let ticket = self.issue(offset, append);
        let gateway = Arc::clone(&self.gateway);
        let limit = self.settings.page_size;

        tracing::info!(offset, append, generation = ticket.generation, "requesting sentence page");
        self.tasks.spawn(async move {
            let result = gateway.fetch_page(offset, limit).await;
            TaskResult::Page { ticket, result }
        });
        ticket
    }

    /// Request one page and apply it before returning
    ///
    /// # Errors
    /// `QueueError::PageLoad` if the request fails and is still the latest.
    pub async fn load_now(&mut self, offset: usize, append: bool) -> Result<PageOutcome, QueueError> {
        let ticket = self.issue(offset, append);
        tracing::info!(offset, append, generation = ticket.generation, "loading sentence page");
        let result = self.gateway.fetch_page(offset, self.settings.page_size).await;
        self.apply_page(ticket, result)
    }

    /// Apply a page response for `ticket`
    ///
    /// Responses whose generation is not the latest issued are discarded
    /// without touching the window.
    ///
    /// # Errors
    /// `QueueError::PageLoad` for a failed response to the latest request.
    pub fn apply_page(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<String>, GatewayError>,
    ) -> Result<PageOutcome, QueueError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                generation = ticket.generation,
                latest = self.generation,
                offset = ticket.offset,
                "discarding stale page response"
            );
            return Ok(PageOutcome::Stale);
        }
        self.resolved = ticket.generation;

        let sentences = match result {
            Ok(sentences) => sentences,
            Err(error) => {
                tracing::warn!(offset = ticket.offset, %error, "sentence page failed");
                return Err(QueueError::page_load(ticket.offset, error));
            }
        };
        let received = sentences.len();

        let active_changed = if ticket.append {
            let was_exhausted = self.window.active().is_none();
            self.window.sentences.extend(sentences);
            self.window.fetched += received;
            was_exhausted && self.window.active().is_some()
        } else {
            self.window = QueueWindow::new(sentences, ticket.offset);
            true
        };

        tracing::debug!(
            offset = ticket.offset,
            append = ticket.append,
            received,
            window = self.window.len(),
            "applied sentence page"
        );
        Ok(PageOutcome::Applied {
            received,
            active_changed,
        })
    }

    /// Move to the next sentence, then prefetch if running low
    ///
    /// The cursor stops at `len()`. Returns the prefetch ticket, if one was
    /// issued.
    pub fn advance(&mut self) -> Option<PageTicket> {
        self.window.cursor = (self.window.cursor + 1).min(self.window.len());
        self.prefetch_check()
    }

    /// Issue exactly one append load when `remaining() <= low_water_mark`
    ///
    /// Nothing is issued while a replace load is pending (it resets the
    /// window, and the next advance checks again) or while an append for the
    /// same offset is already in flight.
    pub fn prefetch_check(&mut self) -> Option<PageTicket> {
        if self.window.remaining() > self.settings.low_water_mark {
            return None;
        }
        let offset = self.window.next_offset();
        if let Some(pending) = self.pending() {
            if !pending.append || pending.offset == offset {
                tracing::debug!(
                    generation = pending.generation,
                    offset = pending.offset,
                    append = pending.append,
                    "prefetch deferred to pending load"
                );
                return None;
            }
        }
        tracing::debug!(remaining = self.window.remaining(), offset, "prefetching next page");
        Some(self.load(offset, true))
    }

    /// Append an operator-typed sentence and persist it in the background
    ///
    /// The local insert is never rolled back; a failed persistence comes
    /// back as [`QueueUpdate::PersistFailed`].
    ///
    /// # Errors
    /// `QueueError::EmptySentence` for blank input.
    pub fn insert_custom(&mut self, text: &str) -> Result<InsertOutcome, QueueError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueueError::EmptySentence);
        }

        let was_exhausted = self.window.active().is_none();
        self.window.sentences.push(text.to_string());
        let index = self.window.len() - 1;

        let gateway = Arc::clone(&self.gateway);
        let text = text.to_string();
        tracing::info!(index, "queued custom sentence");
        self.tasks.spawn(async move {
            let result = gateway.insert_sentences(vec![text.clone()]).await;
            TaskResult::Persist { text, result }
        });

        Ok(InsertOutcome {
            index,
            active_changed: was_exhausted,
        })
    }

    fn handle(&mut self, joined: Result<TaskResult, JoinError>) -> QueueUpdate {
        match joined {
            Ok(TaskResult::Page { ticket, result }) => match self.apply_page(ticket, result) {
                Ok(PageOutcome::Applied {
                    received,
                    active_changed,
                }) => QueueUpdate::PageApplied {
                    ticket,
                    received,
                    active_changed,
                },
                Ok(PageOutcome::Stale) => QueueUpdate::Stale { ticket },
                Err(error) => QueueUpdate::PageFailed { ticket, error },
            },
            Ok(TaskResult::Persist { text, result: Ok(()) }) => QueueUpdate::Persisted { text },
            Ok(TaskResult::Persist {
                text,
                result: Err(error),
            }) => {
                tracing::warn!(%error, "custom sentence not persisted");
                QueueUpdate::PersistFailed { text, error }
            }
            Err(err) => {
                tracing::warn!(%err, "corpus task failed");
                QueueUpdate::TaskFailed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Wait for the next background task and apply its result
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_update(&mut self) -> Option<QueueUpdate> {
        let joined = self.tasks.join_next().await?;
        Some(self.handle(joined))
    }

    /// Apply one finished background task, if any, without waiting
    pub fn try_next_update(&mut self) -> Option<QueueUpdate> {
        let joined = self.tasks.try_join_next()?;
        Some(self.handle(joined))
    }

    /// Wait for every in-flight task
    pub async fn settle(&mut self) -> Vec<QueueUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &QueueWindow {
        &self.window
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.window.active()
    }

    /// 1-based position of the active sentence and window length
    ///
    /// Stays on the last sentence once exhausted; `(0, 0)` for an empty window.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        let len = self.window.len();
        ((self.window.cursor + 1).min(len), len)
    }

    /// Cursor has run past the last sentence (or the window is empty)
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.window.active().is_none()
    }

    /// The latest page request has not been answered yet
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.resolved < self.generation
    }

    /// Background tasks not yet collected
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Generation of the most recently issued page request
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> QueueSettings {
        self.settings
    }
}
