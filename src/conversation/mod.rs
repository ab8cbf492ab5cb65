//! In-memory conversation log.
//!
//! [`ConversationStore`] exclusively owns the ordered message sequence for a
//! session. Messages are appended at the end and mutated in place by id;
//! they are never removed. Ids are assigned by the store from a strictly
//! increasing counter, so they are unique and follow insertion order.
//!
//! The store also owns the assistant lifecycle. An assistant message enters
//! as a pending placeholder directly after a user query, at most one
//! placeholder exists at a time, and a placeholder turns final exactly once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::classify::ClassifiedResponse;

/// Identifier of a message within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle phase of an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pending,
    Final,
}

/// Message payload. The variant determines role and phase, so a pending
/// user message cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum MessageContent {
    /// Raw query text typed by the user.
    Query(String),
    /// Placeholder shown while the backend is thinking.
    Pending,
    /// Classified backend answer.
    Response(Box<ClassifiedResponse>),
}

impl MessageContent {
    /// Final assistant content for a classified answer.
    pub fn response(classified: ClassifiedResponse) -> Self {
        Self::Response(Box::new(classified))
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub created_at: DateTime<Utc>,
    pub content: MessageContent,
}

impl Message {
    pub fn role(&self) -> Role {
        match self.content {
            MessageContent::Query(_) => Role::User,
            MessageContent::Pending | MessageContent::Response(_) => Role::Assistant,
        }
    }

    /// Phase of an assistant message; `None` for user messages.
    pub fn phase(&self) -> Option<Phase> {
        match self.content {
            MessageContent::Query(_) => None,
            MessageContent::Pending => Some(Phase::Pending),
            MessageContent::Response(_) => Some(Phase::Final),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.content, MessageContent::Pending)
    }

    /// Query text for user messages.
    pub fn query(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Query(text) => Some(text),
            _ => None,
        }
    }

    /// Classified answer for final assistant messages.
    pub fn response(&self) -> Option<&ClassifiedResponse> {
        match &self.content {
            MessageContent::Response(classified) => Some(classified),
            _ => None,
        }
    }
}

/// Ordered, append-only log of messages for one session.
#[derive(Debug)]
pub struct ConversationStore {
    session_id: Uuid,
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationStore {
    /// Create an empty conversation with a fresh session id.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            messages: Vec::new(),
            next_id: 1,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append a message at the end and return its assigned id.
    ///
    /// Returns `None` (and changes nothing) when the message would break the
    /// assistant lifecycle: a final answer appended directly, or a placeholder
    /// that does not follow a user query or would be the second one pending.
    pub fn append(&mut self, content: MessageContent) -> Option<MessageId> {
        let accepted = match content {
            MessageContent::Query(_) => true,
            MessageContent::Pending => {
                self.pending_id().is_none()
                    && matches!(
                        self.messages.last().map(|m| &m.content),
                        Some(MessageContent::Query(_))
                    )
            }
            MessageContent::Response(_) => false,
        };
        if !accepted {
            debug!(session_id = %self.session_id, "Refused out-of-order append");
            return None;
        }

        let id = MessageId(self.next_id);
        self.next_id += 1;

        self.messages.push(Message {
            id,
            created_at: Utc::now(),
            content,
        });

        debug!(
            session_id = %self.session_id,
            message_id = %id,
            total = self.messages.len(),
            "Message appended"
        );
        Some(id)
    }

    /// Resolve pending message `id` in place with the content `updater`
    /// produces, keeping its position, id and creation time.
    ///
    /// Returns `false` (and changes nothing) when no such message exists,
    /// when it is not pending, or when the new content is not a final answer.
    pub fn replace<F>(&mut self, id: MessageId, updater: F) -> bool
    where
        F: FnOnce(&Message) -> MessageContent,
    {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if !message.is_pending() {
            debug!(
                session_id = %self.session_id,
                message_id = %id,
                "Refused replace of settled message"
            );
            return false;
        }

        match updater(message) {
            content @ MessageContent::Response(_) => {
                message.content = content;
                debug!(
                    session_id = %self.session_id,
                    message_id = %id,
                    "Message replaced"
                );
                true
            }
            _ => false,
        }
    }

    /// Read-only view of the conversation in insertion order.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Id of the pending assistant message, if one exists.
    pub fn pending_id(&self) -> Option<MessageId> {
        self.messages.iter().find(|m| m.is_pending()).map(|m| m.id)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
