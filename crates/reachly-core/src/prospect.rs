use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelLabel;
use crate::ids::{MessageId, ProspectId};
use crate::persona::{require, Persona, PersonaError};

/// Where a prospect's raw profile text came from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectSource {
    Linkedin,
    RawText,
    Web,
}

impl fmt::Display for ProspectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linkedin => write!(f, "linkedin"),
            Self::RawText => write!(f, "raw_text"),
            Self::Web => write!(f, "web"),
        }
    }
}

impl FromStr for ProspectSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linkedin" => Ok(Self::Linkedin),
            "raw_text" => Ok(Self::RawText),
            "web" => Ok(Self::Web),
            other => Err(format!("unknown prospect source: {other}")),
        }
    }
}

/// Attributes for a prospect that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProspect {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub seniority: Option<String>,
    summary: String,
    style: String,
    raw_profile: String,
    source: ProspectSource,
}

impl NewProspect {
    /// `raw_profile` is kept byte-for-byte; `summary` and `style` are trimmed.
    pub fn new(
        raw_profile: impl Into<String>,
        summary: impl Into<String>,
        style: impl Into<String>,
        source: ProspectSource,
    ) -> Result<Self, PersonaError> {
        let raw_profile = raw_profile.into();
        if raw_profile.trim().is_empty() {
            return Err(PersonaError("raw_profile"));
        }
        Ok(Self {
            name: None,
            role: None,
            company: None,
            industry: None,
            seniority: None,
            summary: require("summary", summary.into())?,
            style: require("style", style.into())?,
            raw_profile,
            source,
        })
    }

    pub fn from_persona(
        persona: &Persona,
        raw_profile: impl Into<String>,
        source: ProspectSource,
    ) -> Result<Self, PersonaError> {
        Self::new(raw_profile, persona.summary(), persona.style(), source)
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = non_blank(name);
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = non_blank(role);
        self
    }

    pub fn with_company(mut self, company: Option<String>) -> Self {
        self.company = non_blank(company);
        self
    }

    pub fn with_industry(mut self, industry: Option<String>) -> Self {
        self.industry = non_blank(industry);
        self
    }

    pub fn with_seniority(mut self, seniority: Option<String>) -> Self {
        self.seniority = non_blank(seniority);
        self
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn raw_profile(&self) -> &str {
        &self.raw_profile
    }

    pub fn source(&self) -> ProspectSource {
        self.source
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A stored prospect with every field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: ProspectId,
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub seniority: Option<String>,
    pub summary: String,
    pub style: String,
    pub raw_profile: String,
    pub source: ProspectSource,
    pub created_at: String,
}

impl Prospect {
    /// Persona block used for outreach and follow-up generation.
    ///
    /// The recipient name is passed literally so the email salutation can use it.
    pub fn persona_block(&self) -> String {
        format!(
            "RECIPIENT NAME:\n{}\n\nPERSONA DETAILS:\nSUMMARY:\n{}\n\nSTYLE:\n{}",
            self.name.as_deref().unwrap_or("Unknown"),
            self.summary,
            self.style
        )
    }

    /// `"Name | Role | Company"` with absent parts omitted.
    pub fn short_label(&self) -> String {
        short_label(&self.name, &self.role, &self.company)
    }
}

/// Lightweight listing row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectSummary {
    pub id: ProspectId,
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub created_at: String,
}

impl ProspectSummary {
    pub fn short_label(&self) -> String {
        short_label(&self.name, &self.role, &self.company)
    }
}

fn short_label(name: &Option<String>, role: &Option<String>, company: &Option<String>) -> String {
    [name, role, company]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One persisted outreach message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub prospect_id: ProspectId,
    pub label: ChannelLabel,
    pub content: String,
    pub created_at: String,
}

impl StoredMessage {
    /// Content cut at a word boundary with a trailing ellipsis.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            return self.content.clone();
        }
        let cut: String = self.content.chars().take(max_chars).collect();
        let head = match cut.rsplit_once(' ') {
            Some((head, _)) if !head.is_empty() => head,
            _ => cut.as_str(),
        };
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;

    fn prospect() -> Prospect {
        Prospect {
            id: ProspectId::new(),
            name: Some("Jalaja Utekar".into()),
            role: Some("Software Testing Intern".into()),
            company: None,
            industry: None,
            seniority: None,
            summary: "- QA intern".into(),
            style: "- Tone: formal".into(),
            raw_profile: "raw".into(),
            source: ProspectSource::Linkedin,
            created_at: "2026-01-01T00:00:00.000000Z".into(),
        }
    }

    #[test]
    fn source_roundtrip() {
        for s in [ProspectSource::Linkedin, ProspectSource::RawText, ProspectSource::Web] {
            assert_eq!(s.to_string().parse::<ProspectSource>().unwrap(), s);
        }
        assert!("fax".parse::<ProspectSource>().is_err());
    }

    #[test]
    fn new_prospect_requires_fields() {
        assert_eq!(
            NewProspect::new("  ", "s", "s", ProspectSource::Web).unwrap_err(),
            PersonaError("raw_profile")
        );
        assert_eq!(
            NewProspect::new("raw", "", "s", ProspectSource::Web).unwrap_err(),
            PersonaError("summary")
        );
        assert_eq!(
            NewProspect::new("raw", "s", " ", ProspectSource::Web).unwrap_err(),
            PersonaError("style")
        );
    }

    #[test]
    fn raw_profile_kept_verbatim() {
        let raw = "  Name | LinkedIn\n\n  body  \n";
        let p = NewProspect::new(raw, "s", "t", ProspectSource::Linkedin).unwrap();
        assert_eq!(p.raw_profile(), raw);
    }

    #[test]
    fn blank_attributes_become_none() {
        let p = NewProspect::new("raw", "s", "t", ProspectSource::Web)
            .unwrap()
            .with_role(Some("  ".into()))
            .with_company(Some("Acme".into()));
        assert!(p.role.is_none());
        assert_eq!(p.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn persona_block_uses_literal_name() {
        let block = prospect().persona_block();
        assert!(block.starts_with("RECIPIENT NAME:\nJalaja Utekar"));
        assert!(block.contains("SUMMARY:\n- QA intern"));
        assert!(block.contains("STYLE:\n- Tone: formal"));
    }

    #[test]
    fn short_label_skips_missing_parts() {
        assert_eq!(prospect().short_label(), "Jalaja Utekar | Software Testing Intern");
    }

    #[test]
    fn preview_cuts_at_word_boundary() {
        let msg = StoredMessage {
            id: MessageId::new(),
            prospect_id: ProspectId::new(),
            label: Channel::Email.into(),
            content: "hello there general kenobi".into(),
            created_at: String::new(),
        };
        assert_eq!(msg.preview(100), "hello there general kenobi");
        assert_eq!(msg.preview(14), "hello there...");
    }
}
