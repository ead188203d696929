//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ReachlySettings::default()`]
//! 2. If `~/.reachly/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ReachlySettings;

/// `~/.reachly`, or `/tmp/.reachly` when `HOME` is unset.
pub fn reachly_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".reachly")
}

/// Resolve the path to the settings file (`~/.reachly/settings.json`).
pub fn settings_path() -> PathBuf {
    reachly_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ReachlySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid final value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ReachlySettings> {
    load_with_env(path, |name| std::env::var(name).ok())
}

fn load_with_env(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<ReachlySettings> {
    let defaults = serde_json::to_value(ReachlySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ReachlySettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides read through `env`. Invalid values are logged and ignored.
fn apply_overrides(settings: &mut ReachlySettings, env: impl Fn(&str) -> Option<String>) {
    let vars = EnvReader { env };

    // ── Ollama ──────────────────────────────────────────────────────
    if let Some(v) = vars.string("OLLAMA_BASE_URL") {
        settings.ollama.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = vars.string("OLLAMA_MODEL") {
        settings.ollama.model = v;
    }
    if let Some(v) = vars.u64("OLLAMA_TIMEOUT", 1, 3600) {
        settings.ollama.timeout_secs = v;
    }
    if let Some(v) = vars.usize("REACHLY_MAX_PROMPT_CHARS", 256, 1_000_000) {
        settings.ollama.max_prompt_chars = v;
    }

    // ── Scraping ────────────────────────────────────────────────────
    if let Some(v) = vars.usize("REACHLY_MAX_PROFILE_CHARS", 256, 1_000_000) {
        settings.scraping.max_profile_chars = v;
    }
    if let Some(v) = vars.string("REACHLY_USER_AGENT") {
        settings.scraping.user_agent = v;
    }
    if let Some(v) = vars.string("LINKEDIN_COOKIE") {
        settings.scraping.linkedin_cookie = Some(v);
    }

    // ── Storage / generation ────────────────────────────────────────
    if let Some(v) = vars.string("REACHLY_DATA_DIR") {
        settings.storage.data_dir = Some(v);
    }
    if let Some(v) = vars.bool("REACHLY_CONCURRENT_REQUESTS") {
        settings.generation.concurrent_requests = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = vars.string("REACHLY_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = vars.bool("REACHLY_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    env: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|v| !v.trim().is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.env)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.env)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, min, max, "invalid u64 env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.env)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, min, max, "invalid usize env var, ignoring");
        }
        result
    }
}
