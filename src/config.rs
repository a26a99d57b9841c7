//! Configuration types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default backend the widget talks to.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Widget configuration, fixed at construction time.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Base URL of the backend serving `/chat`, `/form`, `/generate-leads`
    /// and `/transcribe`.
    pub api_base_url: String,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
    pub timings: FlowTimings,
    pub appearance: Appearance,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            timings: FlowTimings::default(),
            appearance: Appearance::default(),
        }
    }
}

/// Fixed delays used by the conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimings {
    /// Delay before following a redirect returned by `/chat`.
    pub chat_redirect_delay: Duration,
    /// Delay before following a services/pricing redirect from the menu.
    pub menu_redirect_delay: Duration,
    /// Delay before a canned reply to a non-wizard menu option appears.
    pub canned_reply_delay: Duration,
    /// Delay between showing transcribed text and submitting it.
    pub auto_submit_delay: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            chat_redirect_delay: Duration::from_millis(1000),
            menu_redirect_delay: Duration::from_millis(1500),
            canned_reply_delay: Duration::from_millis(1000),
            auto_submit_delay: Duration::from_millis(800),
        }
    }
}

impl FlowTimings {
    /// All delays zero. Handy for tests and headless drivers.
    pub fn immediate() -> Self {
        Self {
            chat_redirect_delay: Duration::ZERO,
            menu_redirect_delay: Duration::ZERO,
            canned_reply_delay: Duration::ZERO,
            auto_submit_delay: Duration::ZERO,
        }
    }
}

/// Corner of the page the floating button is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl fmt::Display for WidgetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        };
        write!(f, "{s}")
    }
}

impl FromStr for WidgetPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom-right" => Ok(Self::BottomRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "top-right" => Ok(Self::TopRight),
            "top-left" => Ok(Self::TopLeft),
            other => Err(format!(
                "unknown position '{other}' (expected bottom-right, bottom-left, top-right or top-left)"
            )),
        }
    }
}

/// Presentation parameters handed to whatever renders the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub accent_color: String,
    pub secondary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub position: WidgetPosition,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            accent_color: "#6366F1".to_string(),
            secondary_color: "#FFFFFF".to_string(),
            logo: None,
            position: WidgetPosition::default(),
        }
    }
}

/// Environment variable names read by [`WidgetConfig::from_env`].
pub mod env_keys {
    pub const API_URL: &str = "LEAD_WIDGET_API_URL";
    pub const TIMEOUT_SECS: &str = "LEAD_WIDGET_TIMEOUT_SECS";
    pub const ACCENT_COLOR: &str = "LEAD_WIDGET_ACCENT_COLOR";
    pub const SECONDARY_COLOR: &str = "LEAD_WIDGET_SECONDARY_COLOR";
    pub const LOGO: &str = "LEAD_WIDGET_LOGO";
    pub const POSITION: &str = "LEAD_WIDGET_POSITION";
}

impl WidgetConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(env_keys::API_URL) {
            config.api_base_url = validate_base_url(env_keys::API_URL, &url)?;
        }

        if let Some(raw) = get(env_keys::TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: env_keys::TIMEOUT_SECS.to_string(),
                message: format!("'{raw}' is not a whole number of seconds"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: env_keys::TIMEOUT_SECS.to_string(),
                    message: "timeout must be at least one second".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(color) = get(env_keys::ACCENT_COLOR) {
            config.appearance.accent_color = validate_color(env_keys::ACCENT_COLOR, &color)?;
        }
        if let Some(color) = get(env_keys::SECONDARY_COLOR) {
            config.appearance.secondary_color =
                validate_color(env_keys::SECONDARY_COLOR, &color)?;
        }

        config.appearance.logo = get(env_keys::LOGO).map(|s| s.trim().to_string());

        if let Some(pos) = get(env_keys::POSITION) {
            config.appearance.position =
                pos.parse().map_err(|message| ConfigError::InvalidValue {
                    key: env_keys::POSITION.to_string(),
                    message,
                })?;
        }

        Ok(config)
    }
}

fn validate_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{trimmed}' is not a valid URL: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn validate_color(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let valid = trimmed
        .strip_prefix('#')
        .filter(|hex| matches!(hex.len(), 3 | 6))
        .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{trimmed}' is not a #rgb or #rrggbb colour"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_widget() {
        let config = WidgetConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.timings.chat_redirect_delay, Duration::from_millis(1000));
        assert_eq!(config.timings.menu_redirect_delay, Duration::from_millis(1500));
        assert_eq!(config.timings.auto_submit_delay, Duration::from_millis(800));
        assert_eq!(config.appearance.accent_color, "#6366F1");
        assert_eq!(config.appearance.position, WidgetPosition::BottomRight);
        assert!(config.appearance.logo.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = WidgetConfig::from_lookup(lookup(&[
            (env_keys::API_URL, "https://api.example.com/widget/"),
            (env_keys::TIMEOUT_SECS, "5"),
            (env_keys::ACCENT_COLOR, "#0af"),
            (env_keys::LOGO, " /static/logo.png "),
            (env_keys::POSITION, "Top-Left"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/widget");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.appearance.accent_color, "#0af");
        assert_eq!(config.appearance.logo.as_deref(), Some("/static/logo.png"));
        assert_eq!(config.appearance.position, WidgetPosition::TopLeft);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            WidgetConfig::from_lookup(lookup(&[(env_keys::API_URL, "  "), (env_keys::LOGO, "")]))
                .unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert!(config.appearance.logo.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            (env_keys::API_URL, "not a url"),
            (env_keys::API_URL, "ftp://files.example.com"),
            (env_keys::TIMEOUT_SECS, "soon"),
            (env_keys::TIMEOUT_SECS, "0"),
            (env_keys::ACCENT_COLOR, "indigo"),
            (env_keys::SECONDARY_COLOR, "#12345"),
            (env_keys::POSITION, "center"),
        ];
        for (key, value) in cases {
            let err = WidgetConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            let ConfigError::InvalidValue { key: reported, .. } = err;
            assert_eq!(reported, key, "{key}={value} should be rejected");
        }
    }

    #[test]
    fn position_display_matches_serde() {
        for pos in [
            WidgetPosition::BottomRight,
            WidgetPosition::BottomLeft,
            WidgetPosition::TopRight,
            WidgetPosition::TopLeft,
        ] {
            let json = serde_json::to_string(&pos).unwrap();
            assert_eq!(json, format!("\"{pos}\""));
            assert_eq!(pos.to_string().parse::<WidgetPosition>().unwrap(), pos);
        }
    }
}
