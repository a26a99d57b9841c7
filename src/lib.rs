//! Lead widget: conversation flow for an embeddable lead-capture chat.

pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod navigate;
pub mod recording;

pub use conversation::ConversationController;
pub use error::{Error, Result};
