use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use reachly_core::ProspectSource;

use crate::error::EngineError;

/// Write ingested profile text to `<dir>/{source}_{YYYYmmdd_HHMMSS}.txt`.
///
/// A second archive within the same second gets a numeric suffix instead of
/// overwriting the first.
pub fn archive_profile(dir: &Path, source: ProspectSource, text: &str) -> Result<PathBuf, EngineError> {
    fs::create_dir_all(dir).map_err(|e| EngineError::Io(format!("{}: {e}", dir.display())))?;

    let stem = format!("{source}_{}", Utc::now().format("%Y%m%d_%H%M%S"));
    let mut path = dir.join(format!("{stem}.txt"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.txt"));
        n += 1;
    }

    fs::write(&path, text).map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "profile archived");
    Ok(path)
}
