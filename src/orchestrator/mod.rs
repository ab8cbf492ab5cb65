//! Query lifecycle driver.
//!
//! A [`QueryOrchestrator`] owns one [`ConversationStore`] and at most one
//! in-flight query. Each accepted submission moves through
//! `Idle → AwaitingResponse → Settled`:
//!
//! - the user message and a pending assistant placeholder are appended
//! - the backend is called once
//! - the placeholder is replaced in place by the classified answer, or by a
//!   low-confidence apology when the call fails for any reason
//!
//! The lifecycle can be driven end to end with [`QueryOrchestrator::submit`],
//! or split with [`QueryOrchestrator::begin`] and
//! [`QueryOrchestrator::settle`] when the caller owns the network call.
//! There is no cancellation or timeout at this layer: until `settle` runs the
//! placeholder stays pending and further submissions are rejected.

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{QueryBackend, RawResponse};
use crate::classify::{classify, Tier};
use crate::conversation::{ConversationStore, Message, MessageContent, MessageId};
use crate::error::BackendResult;

/// Lifecycle state of the most recent query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No query submitted yet.
    Idle,
    /// A placeholder is pending and the backend has not answered.
    AwaitingResponse,
    /// The last query resolved; a new one may be submitted.
    Settled,
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::Idle => write!(f, "idle"),
            QueryState::AwaitingResponse => write!(f, "awaiting_response"),
            QueryState::Settled => write!(f, "settled"),
        }
    }
}

/// Why a submission was turned away. Rejections leave the conversation
/// untouched and never reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("query text is empty")]
    EmptyQuery,

    #[error("a query is already awaiting a response")]
    Busy,
}

/// Handle for an accepted query whose answer has not been applied yet.
///
/// Only [`QueryOrchestrator::begin`] creates one, and
/// [`QueryOrchestrator::settle`] consumes it.
#[derive(Debug)]
pub struct PendingQuery {
    session_id: Uuid,
    text: String,
    pending_id: MessageId,
}

impl PendingQuery {
    /// Query text to send to the backend.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Id of the placeholder message awaiting this answer.
    pub fn pending_id(&self) -> MessageId {
        self.pending_id
    }
}

/// How a settled query was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The backend answered and the answer was classified.
    Answered(Tier),
    /// The backend failed; the apology response was substituted.
    Recovered,
}

/// Result of [`QueryOrchestrator::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    Settled {
        message_id: MessageId,
        resolution: Resolution,
    },
}

/// Drives queries against a backend and records them in a conversation.
pub struct QueryOrchestrator<B> {
    backend: B,
    store: ConversationStore,
    state: QueryState,
    in_flight: Option<MessageId>,
}

impl<B: QueryBackend> QueryOrchestrator<B> {
    /// Create an orchestrator with an empty conversation.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            store: ConversationStore::new(),
            state: QueryState::Idle,
            in_flight: None,
        }
    }

    /// Create an orchestrator that takes ownership of an existing store.
    ///
    /// Returns `None` when the store still holds a pending placeholder: no
    /// handle exists to settle it, so it would stay pending forever.
    pub fn with_store(backend: B, store: ConversationStore) -> Option<Self> {
        if let Some(pending_id) = store.pending_id() {
            warn!(
                session_id = %store.session_id(),
                pending_id = %pending_id,
                "Refusing store with an unsettled placeholder"
            );
            return None;
        }

        let settled = !store.is_empty();
        Some(Self {
            backend,
            store,
            state: if settled {
                QueryState::Settled
            } else {
                QueryState::Idle
            },
            in_flight: None,
        })
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Whether a query is awaiting its answer.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Current conversation in order.
    pub fn snapshot(&self) -> &[Message] {
        self.store.snapshot()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit a query and wait for it to settle.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        let pending = match self.begin(text) {
            Ok(pending) => pending,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };

        let outcome = self.backend.query(pending.text()).await;

        SubmitOutcome::Settled {
            message_id: pending.pending_id,
            resolution: self.resolve(pending.pending_id, outcome),
        }
    }

    /// Accept a query: append the user message and a pending placeholder.
    ///
    /// Rejects whitespace-only text and any submission while another query
    /// is awaiting its answer.
    pub fn begin(&mut self, text: &str) -> Result<PendingQuery, Rejection> {
        if text.trim().is_empty() {
            debug!(session_id = %self.store.session_id(), "Rejected empty query");
            return Err(Rejection::EmptyQuery);
        }

        if let Some(pending_id) = self.in_flight.or(self.store.pending_id()) {
            debug!(
                session_id = %self.store.session_id(),
                pending_id = %pending_id,
                "Rejected query while another is in flight"
            );
            return Err(Rejection::Busy);
        }

        let Some(user_id) = self.store.append(MessageContent::Query(text.to_string())) else {
            return Err(Rejection::Busy);
        };
        let Some(pending_id) = self.store.append(MessageContent::Pending) else {
            return Err(Rejection::Busy);
        };
        self.in_flight = Some(pending_id);
        self.state = QueryState::AwaitingResponse;

        info!(
            session_id = %self.store.session_id(),
            user_id = %user_id,
            pending_id = %pending_id,
            "Query accepted"
        );

        Ok(PendingQuery {
            session_id: self.store.session_id(),
            text: text.to_string(),
            pending_id,
        })
    }

    /// Apply the backend outcome to the pending placeholder.
    ///
    /// Any error (status, transport, timeout or decoding) resolves the
    /// placeholder to the apology response. Returns `None` when `pending`
    /// does not belong to the query this orchestrator is waiting on.
    pub fn settle(
        &mut self,
        pending: PendingQuery,
        outcome: BackendResult<RawResponse>,
    ) -> Option<Resolution> {
        if pending.session_id != self.store.session_id()
            || self.in_flight != Some(pending.pending_id)
        {
            warn!(
                session_id = %self.store.session_id(),
                pending_id = %pending.pending_id,
                "Ignoring answer for a query that is not in flight"
            );
            return None;
        }

        Some(self.resolve(pending.pending_id, outcome))
    }

    fn resolve(
        &mut self,
        pending_id: MessageId,
        outcome: BackendResult<RawResponse>,
    ) -> Resolution {
        let (classified, recovered) = match outcome {
            Ok(raw) => (classify(raw), false),
            Err(e) => {
                warn!(
                    session_id = %self.store.session_id(),
                    pending_id = %pending_id,
                    error = %e,
                    kind = e.kind(),
                    "Query failed, substituting apology"
                );
                (classify(RawResponse::apology()), true)
            }
        };

        let tier = classified.tier();
        let resolution = if recovered {
            Resolution::Recovered
        } else {
            Resolution::Answered(tier)
        };
        self.store.replace(pending_id, |_| MessageContent::response(classified));
        self.in_flight = None;
        self.state = QueryState::Settled;

        info!(
            session_id = %self.store.session_id(),
            message_id = %pending_id,
            tier = %tier,
            recovered,
            "Query settled"
        );

        resolution
    }
}
