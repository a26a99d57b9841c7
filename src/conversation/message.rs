//! Transcript entries and the transcript itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::LeadResult;

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Bot,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub origin: Origin,
    /// Display text. Empty on a pending placeholder.
    pub body: String,
    /// Placeholder shown while a backend call is outstanding.
    #[serde(default)]
    pub pending: bool,
    /// Selectable labels offered by this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_result: Option<LeadResult>,
    /// The next free-text input is a lead-generation URL.
    #[serde(default)]
    pub awaits_freeform_url: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(origin: Origin, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            body: body.into(),
            pending: false,
            options: Vec::new(),
            lead_result: None,
            awaits_freeform_url: false,
            created_at: Utc::now(),
        }
    }

    pub fn user(body: impl Into<String>) -> Self {
        Self::new(Origin::User, body)
    }

    pub fn bot(body: impl Into<String>) -> Self {
        Self::new(Origin::Bot, body)
    }

    /// An empty bot placeholder awaiting a server response.
    pub fn pending() -> Self {
        Self {
            pending: true,
            ..Self::new(Origin::Bot, "")
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_leads(mut self, leads: LeadResult) -> Self {
        self.lead_result = Some(leads);
        self
    }

    pub fn awaiting_url(mut self) -> Self {
        self.awaits_freeform_url = true;
        self
    }

    pub fn is_bot(&self) -> bool {
        self.origin == Origin::Bot
    }
}

/// Ordered conversation history.
///
/// Holds at most one pending placeholder, and it is always the last entry.
/// Messages pushed while a placeholder is outstanding land just before it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The most recent message that is not a placeholder.
    pub fn last_settled(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| !m.pending)
    }

    pub fn has_pending(&self) -> bool {
        self.messages.last().is_some_and(|m| m.pending)
    }

    /// Append a settled message, keeping any placeholder last.
    ///
    /// A message flagged `pending` is rejected here; use
    /// [`Transcript::begin_pending`].
    pub fn push(&mut self, message: Message) {
        if message.pending {
            self.begin_pending();
            return;
        }
        if self.has_pending() {
            let at = self.messages.len() - 1;
            self.messages.insert(at, message);
        } else {
            self.messages.push(message);
        }
    }

    /// Append a placeholder. Returns `false` if one is already outstanding.
    pub fn begin_pending(&mut self) -> bool {
        if self.has_pending() {
            return false;
        }
        self.messages.push(Message::pending());
        true
    }

    /// Replace the placeholder with the real response.
    ///
    /// Without a placeholder the response is simply appended.
    pub fn resolve_pending(&mut self, response: Message) {
        self.discard_pending();
        self.push(response);
    }

    /// Remove the placeholder, if any.
    pub fn discard_pending(&mut self) -> bool {
        if self.has_pending() {
            self.messages.pop();
            true
        } else {
            false
        }
    }
}
