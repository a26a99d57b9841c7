//! Backend collaborators.
//!
//! The widget has no logic of its own for chat replies, lead scraping,
//! contact persistence or speech-to-text. It delegates all four to a backend
//! through [`WidgetApi`]; [`HttpWidgetApi`] is the JSON-over-POST
//! implementation.

pub mod http;
pub mod types;

use async_trait::async_trait;

pub use http::HttpWidgetApi;
pub use types::{ChatReply, LeadResult, LeadsResponse};

use crate::conversation::ContactDraft;
use crate::error::ApiError;
use crate::recording::AudioClip;

/// The four backend calls the conversation flow depends on.
#[async_trait]
pub trait WidgetApi: Send + Sync {
    /// Free-text chat. `POST /chat`.
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError>;

    /// Persist a completed contact form. `POST /form`.
    async fn submit_form(&self, contact: &ContactDraft) -> Result<(), ApiError>;

    /// Scrape contact data from a website. `POST /generate-leads`.
    ///
    /// Returns the raw reply; judging it (empty lists, `success: false`) is
    /// left to [`LeadsResponse::into_leads`].
    async fn generate_leads(&self, url: &str) -> Result<LeadsResponse, ApiError>;

    /// Speech-to-text for a voice note. `POST /transcribe`.
    async fn transcribe(&self, clip: AudioClip) -> Result<String, ApiError>;
}
