//! Application settings: translation API endpoint, request limits, and the
//! input-error policy.
//!
//! Loaded from a JSON file so a packaged binary can ship a template the user
//! edits in place.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The sentinel the settings template ships with; translation refuses to run
/// until it has been replaced.
pub const API_KEY_PLACEHOLDER: &str =
    "Put your API key here and edit url and model to match yours.";

/// Endpoint settings for the chat-completions translation API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    pub url: String,
    pub model: String,
    pub api_key: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            url: String::new(),
            model: String::new(),
            api_key: API_KEY_PLACEHOLDER.to_string(),
        }
    }
}

/// Limits applied to translation requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Maximum number of in-flight API calls per file.
    pub max_concurrent_requests: usize,

    /// Per-request timeout; a timed-out call drops only its own batch.
    pub timeout_seconds: u64,

    /// Maximum number of lines sent in one API call.
    pub max_length_of_requests: usize,
}

impl Default for RequestSettings {
    fn default() -> Self {
        RequestSettings {
            max_concurrent_requests: 1,
            timeout_seconds: 60,
            max_length_of_requests: 100,
        }
    }
}

/// What the translation run does when a file cannot be read or carries an
/// invalid language header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputErrorPolicy {
    /// Abort the whole run on the first bad file.
    #[default]
    Abort,

    /// Skip the bad file, record the error, keep going.
    Skip,
}

/// Everything the services need to run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub requests: RequestSettings,
    pub input_error_policy: InputErrorPolicy,
}

impl AppSettings {
    /// Loads settings from a JSON file. Missing fields fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Whether the API key has been set to something other than the template
    /// sentinel.
    pub fn api_key_is_configured(&self) -> bool {
        !self.api.api_key.is_empty() && self.api.api_key != API_KEY_PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.requests.max_concurrent_requests, 1);
        assert_eq!(settings.requests.timeout_seconds, 60);
        assert_eq!(settings.requests.max_length_of_requests, 100);
        assert_eq!(settings.input_error_policy, InputErrorPolicy::Abort);
        assert!(!settings.api_key_is_configured());
    }

    #[test]
    fn test_api_key_is_configured() {
        let mut settings = AppSettings::default();
        settings.api.api_key = "sk-real-key".to_string();
        assert!(settings.api_key_is_configured());

        settings.api.api_key = String::new();
        assert!(!settings.api_key_is_configured());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"api": {"model": "gpt-4o-mini"}}"#).unwrap();
        assert_eq!(settings.api.model, "gpt-4o-mini");
        assert_eq!(settings.api.api_key, API_KEY_PLACEHOLDER);
        assert_eq!(settings.requests.max_concurrent_requests, 1);
    }

    #[test]
    fn test_input_error_policy_from_json() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"input_error_policy": "skip"}"#).unwrap();
        assert_eq!(settings.input_error_policy, InputErrorPolicy::Skip);
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdxloc.json");

        let mut settings = AppSettings::default();
        settings.api.url = "https://api.example.com/v1/chat/completions".to_string();
        settings.api.api_key = "sk-test".to_string();
        settings.requests.max_concurrent_requests = 4;

        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = AppSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppSettings::load("/nonexistent/pdxloc.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
