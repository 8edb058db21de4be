//! Configuration types
//!
//! Console configuration: backend addresses and session tuning.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_COMMUNITY_BASE_URL: &str = "http://127.0.0.1:8001";
pub const DEFAULT_FALLBACK_PRESET_LABEL: &str = "Unknown Preset";

/// A configured backend address that cannot be used
#[derive(Debug, Error)]
#[error("invalid backend address '{url}': {reason}")]
pub struct InvalidUrl {
    pub url: String,
    pub reason: String,
}

/// Console configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Local backend serving presets, models and inference
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Community catalog used for preset import/export
    #[serde(default = "default_community_base_url")]
    pub community_base_url: String,
    /// How long a reply may stream before input is unlocked anyway
    #[serde(default = "default_watchdog_ms")]
    pub watchdog_ms: u64,
    /// Chat header shown when the preset name cannot be fetched
    #[serde(default = "default_fallback_label")]
    pub fallback_preset_label: String,
    /// Timeout for individual REST requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_community_base_url() -> String {
    DEFAULT_COMMUNITY_BASE_URL.to_string()
}

fn default_watchdog_ms() -> u64 {
    10_000
}

fn default_fallback_label() -> String {
    DEFAULT_FALLBACK_PRESET_LABEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            community_base_url: default_community_base_url(),
            watchdog_ms: default_watchdog_ms(),
            fallback_preset_label: default_fallback_label(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ConsoleConfig {
    /// Repair values that would leave the console unusable
    pub fn validate(&mut self) {
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        if self.community_base_url.trim().is_empty() {
            self.community_base_url = default_community_base_url();
        }

        self.watchdog_ms = self.watchdog_ms.clamp(1_000, 600_000);

        if self.fallback_preset_label.trim().is_empty() {
            self.fallback_preset_label = default_fallback_label();
        }

        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
    }

    pub fn watchdog_deadline(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// WebSocket endpoint of the inference stream, derived from the API base
    ///
    /// `http://host:8000` becomes `ws://host:8000/inference/ws`.
    pub fn inference_ws_url(&self) -> Result<Url, InvalidUrl> {
        let raw = self.api_base_url.trim();
        let invalid = |reason: String| InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        };
        url.set_scheme(scheme)
            .map_err(|_| invalid(format!("cannot switch to {}", scheme)))?;

        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/inference/ws", base_path));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.watchdog_ms, 10_000);
        assert_eq!(config.fallback_preset_label, "Unknown Preset");
    }

    #[test]
    fn test_validate_repairs_values() {
        let mut config = ConsoleConfig {
            api_base_url: "  ".into(),
            watchdog_ms: 5,
            fallback_preset_label: String::new(),
            request_timeout_secs: 0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.watchdog_ms, 1_000);
        assert_eq!(config.fallback_preset_label, DEFAULT_FALLBACK_PRESET_LABEL);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_ws_url_from_http_base() {
        let config = ConsoleConfig::default();
        let url = config.inference_ws_url().unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:8000/inference/ws");
    }

    #[test]
    fn test_ws_url_keeps_prefix_and_tls() {
        let config = ConsoleConfig {
            api_base_url: "https://llm.local/api/".into(),
            ..Default::default()
        };
        let url = config.inference_ws_url().unwrap();
        assert_eq!(url.as_str(), "wss://llm.local/api/inference/ws");
    }

    #[test]
    fn test_ws_url_rejects_unknown_scheme() {
        let config = ConsoleConfig {
            api_base_url: "ftp://127.0.0.1".into(),
            ..Default::default()
        };
        assert!(config.inference_ws_url().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"watchdog_ms": 2500}"#).expect("Failed to deserialize");
        assert_eq!(config.watchdog_ms, 2500);
        assert_eq!(config.community_base_url, DEFAULT_COMMUNITY_BASE_URL);
    }
}
