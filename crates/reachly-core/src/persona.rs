use serde::{Deserialize, Serialize};

/// A required persona or prospect field was empty.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("required field `{0}` is empty")]
pub struct PersonaError(pub &'static str);

/// The three generated text blocks describing one profile.
///
/// Only constructible through [`Persona::new`], which rejects blank fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    summary: String,
    style: String,
    raw_analysis: String,
}

impl Persona {
    pub fn new(
        summary: impl Into<String>,
        style: impl Into<String>,
        raw_analysis: impl Into<String>,
    ) -> Result<Self, PersonaError> {
        let summary = require("summary", summary.into())?;
        let style = require("style", style.into())?;
        let raw_analysis = require("raw_analysis", raw_analysis.into())?;
        Ok(Self {
            summary,
            style,
            raw_analysis,
        })
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn raw_analysis(&self) -> &str {
        &self.raw_analysis
    }

    /// Canonical block handed to generators when the full analysis is available.
    pub fn block(&self) -> String {
        format!(
            "SUMMARY:\n{}\n\nSTYLE:\n{}\n\nANALYSIS:\n{}",
            self.summary, self.style, self.raw_analysis
        )
    }
}

/// Trim and reject empty values.
pub(crate) fn require(field: &'static str, value: String) -> Result<String, PersonaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PersonaError(field));
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}
