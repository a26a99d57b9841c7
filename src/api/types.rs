//! Wire types for the widget backend.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply from `POST /chat`, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatReply {
    Text { message: String },
    Redirect { url: String },
    /// Any `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl ChatReply {
    /// Interpret a decoded chat body. A missing, non-string or unrecognised
    /// `type`, or a known type missing its field, is [`ChatReply::Unknown`].
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::Unknown)
    }
}

/// Body of `POST /generate-leads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadsRequest {
    pub url: String,
}

/// Contact data scraped from a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadResult {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl LeadResult {
    /// True when all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.locations.is_empty()
    }

    pub fn total(&self) -> usize {
        self.emails.len() + self.phones.len() + self.locations.len()
    }

    /// Render every non-empty list as a titled section, for "copy all".
    pub fn to_clipboard_text(&self) -> String {
        [
            ("Emails", &self.emails),
            ("Phone Numbers", &self.phones),
            ("Locations", &self.locations),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(title, items)| format!("{title}:\n{}", items.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

/// Raw reply from `POST /generate-leads`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leads: Option<LeadResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LeadsResponse {
    pub fn found(leads: LeadResult) -> Self {
        Self {
            success: true,
            leads: Some(leads),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            leads: None,
            error: Some(error.into()),
        }
    }

    /// Usable leads, or why there are none.
    ///
    /// A successful reply whose lists are all empty counts as a failure.
    pub fn into_leads(self) -> Result<LeadResult, ApiError> {
        if !self.success {
            return Err(ApiError::NoLeads {
                reason: self
                    .error
                    .unwrap_or_else(|| "server reported failure".to_string()),
            });
        }
        match self.leads {
            Some(leads) if !leads.is_empty() => Ok(leads),
            _ => Err(ApiError::NoLeads {
                reason: self.error.unwrap_or_else(|| "No leads found".to_string()),
            }),
        }
    }
}

/// Reply from `POST /transcribe`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body some endpoints send alongside a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
