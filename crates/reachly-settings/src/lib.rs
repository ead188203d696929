//! # reachly-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ReachlySettings::default()`]
//! 2. **User file**: `~/.reachly/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `OLLAMA_*` / `REACHLY_*` overrides (highest priority)
//!
//! The loaded value is handed to the engine explicitly; there is no global instance.

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, reachly_home, settings_path};
pub use types::*;
