//! reqwest-backed [`WidgetApi`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::WidgetApi;
use super::types::{ChatReply, ChatRequest, ErrorBody, LeadsRequest, LeadsResponse, TranscribeResponse};
use crate::config::WidgetConfig;
use crate::conversation::ContactDraft;
use crate::error::ApiError;
use crate::recording::AudioClip;

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const CHAT: &str = "/chat";
    pub const FORM: &str = "/form";
    pub const GENERATE_LEADS: &str = "/generate-leads";
    pub const TRANSCRIBE: &str = "/transcribe";
}

/// Multipart field carrying the voice note.
const AUDIO_FIELD: &str = "audio";

/// Talks to the widget backend over HTTP.
pub struct HttpWidgetApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpWidgetApi {
    /// Build a client honouring the configured base URL and timeout.
    pub fn new(config: &WidgetConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self::with_client(&config.api_base_url, client))
    }

    /// Use an existing reqwest client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn post_json<B>(&self, endpoint: &str, body: &B) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        debug!(endpoint, "POST");
        let resp = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        ensure_success(endpoint, resp).await
    }
}

fn transport(endpoint: &str, err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

/// Turn a non-2xx response into [`ApiError::Status`], preferring the
/// server's own `{"error": ...}` text as the detail.
async fn ensure_success(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    warn!(endpoint, status = status.as_u16(), %detail, "Backend returned an error status");
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    })
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl WidgetApi for HttpWidgetApi {
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        let resp = self.post_json(endpoints::CHAT, &body).await?;
        let value: serde_json::Value = read_json(endpoints::CHAT, resp).await?;
        Ok(ChatReply::from_value(value))
    }

    async fn submit_form(&self, contact: &ContactDraft) -> Result<(), ApiError> {
        // Only the status matters; the body is ignored.
        self.post_json(endpoints::FORM, contact).await?;
        Ok(())
    }

    async fn generate_leads(&self, url: &str) -> Result<LeadsResponse, ApiError> {
        let body = LeadsRequest {
            url: url.to_string(),
        };
        let resp = self.post_json(endpoints::GENERATE_LEADS, &body).await?;
        read_json(endpoints::GENERATE_LEADS, resp).await
    }

    async fn transcribe(&self, clip: AudioClip) -> Result<String, ApiError> {
        let endpoint = endpoints::TRANSCRIBE;
        debug!(endpoint, bytes = clip.bytes.len(), "POST multipart");

        let part = Part::bytes(clip.bytes)
            .file_name(clip.file_name)
            .mime_str(&clip.mime_type)
            .map_err(|e| ApiError::Client(format!("invalid audio mime type: {e}")))?;
        let form = Form::new().part(AUDIO_FIELD, part);

        let resp = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        let resp = ensure_success(endpoint, resp).await?;

        let parsed: TranscribeResponse = read_json(endpoint, resp).await?;
        match parsed.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: parsed
                    .error
                    .unwrap_or_else(|| "response carried no transcription text".to_string()),
            }),
        }
    }
}
