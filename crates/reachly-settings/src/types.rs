//! Settings type definitions.
//!
//! Field names are camelCase on disk. Every section has `#[serde(default)]`, so a
//! partial `settings.json` only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReachlySettings {
    /// Local generation endpoint.
    pub ollama: OllamaSettings,
    /// Profile fetching.
    pub scraping: ScrapingSettings,
    /// Database and archive locations.
    pub storage: StorageSettings,
    /// Generation pipeline knobs.
    pub generation: GenerationSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl ReachlySettings {
    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.ollama.base_url.trim().is_empty() {
            return Err(SettingsError::InvalidValue("ollama.baseUrl is empty".into()));
        }
        if self.ollama.model.trim().is_empty() {
            return Err(SettingsError::InvalidValue("ollama.model is empty".into()));
        }
        if self.ollama.timeout_secs == 0 {
            return Err(SettingsError::InvalidValue("ollama.timeoutSecs must be > 0".into()));
        }
        if self.ollama.max_prompt_chars < 256 {
            return Err(SettingsError::InvalidValue(
                "ollama.maxPromptChars must be at least 256".into(),
            ));
        }
        if self.generation.similar_limit == 0 {
            return Err(SettingsError::InvalidValue(
                "generation.similarLimit must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Ollama endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OllamaSettings {
    /// Base URL, without a trailing `/api`.
    pub base_url: String,
    /// Model tag that must be present on the endpoint.
    pub model: String,
    /// Per-request timeout for generation calls.
    pub timeout_secs: u64,
    /// Timeout for the readiness probe.
    pub health_timeout_secs: u64,
    /// Character budget for the user instruction; longer input is cut with a marker.
    pub max_prompt_chars: usize,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3:latest".to_string(),
            timeout_secs: 120,
            health_timeout_secs: 10,
            max_prompt_chars: 8000,
        }
    }
}

/// Profile fetching settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapingSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Character budget for fetched profile text.
    pub max_profile_chars: usize,
    /// LinkedIn `li_at` session cookie, captured manually once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_cookie: Option<String>,
}

impl Default for ScrapingSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0"
                .to_string(),
            timeout_secs: 25,
            max_profile_chars: 12_000,
            linkedin_cookie: None,
        }
    }
}

/// Storage locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Data directory. Defaults to `~/.reachly/data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database file name inside the data directory.
    pub database_file: String,
    /// Write every ingested profile to `<data_dir>/profiles/`.
    pub archive_profiles: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "memory.db".to_string(),
            archive_profiles: true,
        }
    }
}

impl StorageSettings {
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => crate::loader::reachly_home().join("data"),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.database_file)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir().join("profiles")
    }
}

/// Generation pipeline settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    /// Issue independent calls (persona sub-analyses, channel pipelines) concurrently.
    /// Only enable when the endpoint serves parallel requests.
    pub concurrent_requests: bool,
    /// How many similar past prospects feed the memory context.
    pub similar_limit: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            concurrent_requests: false,
            similar_limit: 3,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` wins when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ReachlySettings::default();
        assert_eq!(s.ollama.base_url, "http://localhost:11434");
        assert_eq!(s.ollama.model, "llama3:latest");
        assert_eq!(s.ollama.timeout_secs, 120);
        assert_eq!(s.ollama.max_prompt_chars, 8000);
        assert_eq!(s.scraping.max_profile_chars, 12_000);
        assert_eq!(s.generation.similar_limit, 3);
        assert!(!s.generation.concurrent_requests);
        assert!(s.storage.archive_profiles);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn storage_paths_derive_from_data_dir() {
        let storage = StorageSettings {
            data_dir: Some("/var/lib/reachly".into()),
            ..Default::default()
        };
        assert_eq!(storage.database_path(), PathBuf::from("/var/lib/reachly/memory.db"));
        assert_eq!(storage.profiles_dir(), PathBuf::from("/var/lib/reachly/profiles"));
    }

    #[test]
    fn camel_case_wire_format() {
        let json = serde_json::to_value(ReachlySettings::default()).unwrap();
        assert!(json["ollama"]["baseUrl"].is_string());
        assert!(json["ollama"]["maxPromptChars"].is_number());
        assert!(json["generation"]["concurrentRequests"].is_boolean());
        assert!(json["scraping"].get("linkedinCookie").is_none());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut s = ReachlySettings::default();
        s.ollama.model = " ".into();
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));

        let mut s = ReachlySettings::default();
        s.ollama.timeout_secs = 0;
        assert!(s.validate().is_err());

        let mut s = ReachlySettings::default();
        s.generation.similar_limit = 0;
        assert!(s.validate().is_err());
    }
}
