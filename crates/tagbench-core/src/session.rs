//! Annotation session
//!
//! [`AnnotationSession`] owns the sentence queue, the annotator for the
//! active sentence and the ledger of saved sentences. Operator actions are
//! synchronous methods; network work runs in the background and its results
//! are folded back in through [`AnnotationSession::pump`],
//! [`AnnotationSession::next_notice`] or [`AnnotationSession::settle`].
//!
//! Whenever the active sentence changes the annotator is re-prepared, which
//! discards any tags on the previous one. Pages appended behind the active
//! sentence leave its tags alone.

use crate::config::TagbenchConfig;
use crate::error::SessionError;
use std::path::Path;
use std::sync::Arc;
use tagbench_annotation::{AnnotationError, Annotator, CompletedAnnotation, SessionLedger};
use tagbench_corpus::{
    CorpusGateway, GatewayError, HttpCorpusGateway, PageOutcome, PageTicket, QueueError,
    QueueUpdate, QueueWindow, SentenceQueue,
};

/// Background result surfaced to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// A page was applied to the window
    PageLoaded {
        offset: usize,
        received: usize,
        append: bool,
    },
    /// A superseded page response was dropped
    StaleDiscarded { offset: usize, generation: u64 },
    /// The latest page load failed; the window is unchanged
    NetworkError { error: QueueError },
    /// A custom sentence stays in the window but was not stored remotely
    PersistenceWarning { text: String, error: GatewayError },
    /// A custom sentence was stored remotely
    Persisted { text: String },
    /// A background task panicked or was cancelled
    TaskFailed { reason: String },
}

impl std::fmt::Display for SessionNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageLoaded {
                offset,
                received,
                append: true,
            } => write!(f, "appended {received} sentences from offset {offset}"),
            Self::PageLoaded {
                offset, received, ..
            } => write!(f, "loaded {received} sentences from offset {offset}"),
            Self::StaleDiscarded { offset, .. } => {
                write!(f, "ignored outdated page for offset {offset}")
            }
            Self::NetworkError { error } => write!(f, "network error: {error}"),
            Self::PersistenceWarning { text, error } => {
                write!(f, "'{text}' kept locally but not saved to the corpus: {error}")
            }
            Self::Persisted { text } => write!(f, "'{text}' added to the corpus"),
            Self::TaskFailed { reason } => write!(f, "background task failed: {reason}"),
        }
    }
}

/// Progress indicators for the active sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the active sentence in the window
    pub position: usize,
    /// Sentences in the window
    pub window_len: usize,
    /// Tagged tokens of the active sentence
    pub tagged: usize,
    /// Tokens of the active sentence
    pub tokens: usize,
    /// Sentences saved this session
    pub saved: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sentence {} / {} | Words: {}/{} | Saved: {}",
            self.position, self.window_len, self.tagged, self.tokens, self.saved
        )
    }
}

/// One operator's annotation session
pub struct AnnotationSession {
    config: TagbenchConfig,
    queue: SentenceQueue,
    annotator: Annotator,
    ledger: SessionLedger,
}

impl std::fmt::Debug for AnnotationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationSession")
            .field("queue", &self.queue)
            .field("saved", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

impl AnnotationSession {
    /// Create a session over `gateway`
    ///
    /// Nothing is loaded until [`Self::start`].
    ///
    /// # Errors
    /// `SessionError::Config` if the configuration does not validate.
    pub fn new(config: TagbenchConfig, gateway: Arc<dyn CorpusGateway>) -> Result<Self, SessionError> {
        config.validate()?;
        let queue = SentenceQueue::new(gateway, config.queue_settings());
        let annotator = Annotator::new(Arc::new(config.taxonomy.clone()));
        Ok(Self {
            config,
            queue,
            annotator,
            ledger: SessionLedger::new(),
        })
    }

    /// Create a session against the configured HTTP corpus service
    ///
    /// # Errors
    /// `SessionError::Config` or `SessionError::Gateway` for a bad address.
    pub fn connect(config: TagbenchConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let gateway = HttpCorpusGateway::new(&config.api_base, &config.sentences_path)?;
        tracing::info!(endpoint = %gateway.endpoint(), "using corpus service");
        Self::new(config, Arc::new(gateway))
    }

    /// Load the first page and prepare its first sentence
    ///
    /// # Errors
    /// `SessionError::Queue` if the page cannot be fetched.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if let PageOutcome::Applied { received, .. } = self.queue.load_now(0, false).await? {
            tracing::info!(received, "session started");
            self.sync_annotator();
        }
        Ok(())
    }

    fn sync_annotator(&mut self) {
        match self.queue.active() {
            Some(sentence) => self.annotator.prepare(sentence),
            None => self.annotator.clear(),
        }
    }

    fn advance(&mut self) {
        self.queue.advance();
        self.sync_annotator();
    }

    fn require_active(&self) -> Result<(), SessionError> {
        if self.queue.is_exhausted() {
            return Err(SessionError::NoActiveSentence);
        }
        Ok(())
    }

    /// # Errors
    /// `SessionError::Annotation` for an index past the last token.
    pub fn select_token(&mut self, index: usize) -> Result<(), SessionError> {
        Ok(self.annotator.select_token(index)?)
    }

    /// # Errors
    /// `SessionError::Annotation` for a category outside the taxonomy.
    pub fn choose_category(&mut self, category: &str) -> Result<(), SessionError> {
        Ok(self.annotator.choose_category(category)?)
    }

    pub fn clear_category(&mut self) {
        self.annotator.clear_category();
    }

    /// # Errors
    /// `SessionError::Annotation` without a category or for a foreign code.
    pub fn choose_type(&mut self, code: &str) -> Result<(), SessionError> {
        Ok(self.annotator.choose_type(code)?)
    }

    /// Tag the selected token with the chosen type
    ///
    /// Returns the tagged token index.
    ///
    /// # Errors
    /// `SessionError::Annotation` naming the missing selection.
    pub fn assign(&mut self) -> Result<usize, SessionError> {
        Ok(self.annotator.assign()?)
    }

    /// Select, choose and assign in one step
    ///
    /// Everything is checked before anything changes, so a rejected call
    /// leaves the selection as it was.
    ///
    /// # Errors
    /// `SessionError::Annotation` for a bad index, category or code.
    pub fn tag(&mut self, index: usize, category: &str, code: &str) -> Result<usize, SessionError> {
        let count = self.annotator.token_count();
        if index >= count {
            return Err(AnnotationError::TokenOutOfRange { index, count }.into());
        }
        self.annotator.taxonomy().resolve(category, code)?;

        self.annotator.select_token(index)?;
        self.annotator.choose_category(category)?;
        self.annotator.choose_type(code)?;
        self.assign()
    }

    /// Record the active sentence and move to the next one
    ///
    /// # Errors
    /// - `SessionError::NoActiveSentence` when the window is exhausted
    /// - `SessionError::Ledger` if a token is still untagged
    pub fn save(&mut self) -> Result<CompletedAnnotation, SessionError> {
        self.require_active()?;
        let saved = self.ledger.record(&self.annotator)?.clone();
        tracing::info!(saved = self.ledger.len(), "saved sentence");
        self.advance();
        Ok(saved)
    }

    /// Move to the next sentence without recording
    ///
    /// # Errors
    /// `SessionError::NoActiveSentence` when the window is exhausted.
    pub fn skip(&mut self) -> Result<(), SessionError> {
        self.require_active()?;
        tracing::debug!(position = self.queue.window().cursor(), "skipped sentence");
        self.advance();
        Ok(())
    }

    /// Reload the corpus from offset 0 in the background
    ///
    /// The window is replaced once the page arrives; any load still in
    /// flight is superseded.
    pub fn reload(&mut self) -> PageTicket {
        self.queue.load(0, false)
    }

    /// Append an operator-typed sentence and store it remotely
    ///
    /// Returns its window index. If the window was exhausted it becomes the
    /// active sentence.
    ///
    /// # Errors
    /// `SessionError::Queue` for blank text.
    pub fn add_custom(&mut self, text: &str) -> Result<usize, SessionError> {
        let outcome = self.queue.insert_custom(text)?;
        if outcome.active_changed {
            self.sync_annotator();
        }
        Ok(outcome.index)
    }

    fn apply(&mut self, update: QueueUpdate) -> SessionNotice {
        match update {
            QueueUpdate::PageApplied {
                ticket,
                received,
                active_changed,
            } => {
                if active_changed {
                    self.sync_annotator();
                }
                SessionNotice::PageLoaded {
                    offset: ticket.offset,
                    received,
                    append: ticket.append,
                }
            }
            QueueUpdate::PageFailed { error, .. } => SessionNotice::NetworkError { error },
            QueueUpdate::Stale { ticket } => SessionNotice::StaleDiscarded {
                offset: ticket.offset,
                generation: ticket.generation,
            },
            QueueUpdate::Persisted { text } => SessionNotice::Persisted { text },
            QueueUpdate::PersistFailed { text, error } => {
                SessionNotice::PersistenceWarning { text, error }
            }
            QueueUpdate::TaskFailed { reason } => SessionNotice::TaskFailed { reason },
        }
    }

    /// Apply every background result that is already available
    pub fn pump(&mut self) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        while let Some(update) = self.queue.try_next_update() {
            notices.push(self.apply(update));
        }
        notices
    }

    /// Wait for the next background result
    ///
    /// Returns `None` at once when nothing is in flight. Cancel safe.
    pub async fn next_notice(&mut self) -> Option<SessionNotice> {
        let update = self.queue.next_update().await?;
        Some(self.apply(update))
    }

    /// Wait for every background task
    pub async fn settle(&mut self) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        while let Some(notice) = self.next_notice().await {
            notices.push(notice);
        }
        notices
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        let (position, window_len) = self.queue.position();
        Progress {
            position,
            window_len,
            tagged: self.annotator.tagged_count(),
            tokens: self.annotator.token_count(),
            saved: self.ledger.len(),
        }
    }

    /// Export artifact for everything saved, `None` if nothing was
    #[must_use]
    pub fn export_text(&self) -> Option<String> {
        self.ledger.export_text()
    }

    /// Write the export artifact; `Ok(None)` when nothing was saved
    ///
    /// # Errors
    /// `SessionError::Ledger` if the file cannot be written.
    pub fn write_export(&self, path: impl AsRef<Path>) -> Result<Option<usize>, SessionError> {
        let path = path.as_ref();
        let written = self.ledger.write_export(path)?;
        if let Some(count) = written {
            tracing::info!(path = %path.display(), count, "exported tagged sentences");
        }
        Ok(written)
    }

    #[inline]
    #[must_use]
    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &QueueWindow {
        self.queue.window()
    }

    /// Active sentence, `None` once the window is exhausted
    #[inline]
    #[must_use]
    pub fn active_sentence(&self) -> Option<&str> {
        self.queue.active()
    }

    /// A page request is outstanding
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.queue.is_loading()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &TagbenchConfig {
        &self.config
    }
}
