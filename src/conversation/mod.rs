//! Conversation flow: what the widget says next.
//!
//! The [`ConversationController`] owns the transcript, the lead-capture
//! wizard, and the voice-note capture. User actions come in as free-text
//! submissions, menu selections, or recording start/stop; each one updates
//! the transcript, possibly calls the backend, and leaves the controller in a
//! state the view can render directly via [`ConversationController::snapshot`].

pub mod controller;
pub mod message;
pub mod prompts;
pub mod schedule;
pub mod state;
pub mod step;

pub use controller::ConversationController;
pub use message::{Message, Origin, Transcript};
pub use state::{ContactDraft, ConversationView, SessionFlags, WidgetEvent};
pub use step::{FollowUp, MenuOption, WizardStep};
