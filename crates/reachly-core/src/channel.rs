use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An outreach medium. Ordering follows declaration order, which is also the
/// order channels are generated and displayed in.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Formal cold email.
    Email,
    /// Concise chat message (WhatsApp / SMS).
    Chat,
    /// Professional direct message (LinkedIn).
    ProfessionalDm,
    /// Casual direct message (Instagram).
    CasualDm,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Email,
        Channel::Chat,
        Channel::ProfessionalDm,
        Channel::CasualDm,
    ];

    /// Stable storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Chat => "whatsapp",
            Self::ProfessionalDm => "linkedin_dm",
            Self::CasualDm => "instagram_dm",
        }
    }

    /// Human-facing name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Chat => "WhatsApp",
            Self::ProfessionalDm => "LinkedIn DM",
            Self::CasualDm => "Instagram DM",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.label() == s)
            .ok_or_else(|| format!("unknown channel: {s}"))
    }
}

/// Follow-up ordinal; selects the tone of a continuation message.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FollowUpStage {
    /// Gentle nudge; assumes the first message was missed.
    Nudge,
    /// Adds a new value-bearing angle.
    ValueAdd,
    /// Polite close-the-loop message.
    CloseOut,
}

impl FollowUpStage {
    pub const ALL: [FollowUpStage; 3] = [Self::Nudge, Self::ValueAdd, Self::CloseOut];

    pub fn number(self) -> u8 {
        match self {
            Self::Nudge => 1,
            Self::ValueAdd => 2,
            Self::CloseOut => 3,
        }
    }
}

impl TryFrom<u8> for FollowUpStage {
    type Error = String;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::Nudge),
            2 => Ok(Self::ValueAdd),
            3 => Ok(Self::CloseOut),
            other => Err(format!("follow-up stage must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<FollowUpStage> for u8 {
    fn from(stage: FollowUpStage) -> Self {
        stage.number()
    }
}

impl fmt::Display for FollowUpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A channel plus an optional follow-up stage. Rendered as `"Email"` or
/// `"Email Follow-up 2"` only at the presentation boundary.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelLabel {
    pub channel: Channel,
    pub stage: Option<FollowUpStage>,
}

impl ChannelLabel {
    pub fn initial(channel: Channel) -> Self {
        Self { channel, stage: None }
    }

    pub fn follow_up(channel: Channel, stage: FollowUpStage) -> Self {
        Self {
            channel,
            stage: Some(stage),
        }
    }

    pub fn is_follow_up(&self) -> bool {
        self.stage.is_some()
    }
}

impl From<Channel> for ChannelLabel {
    fn from(channel: Channel) -> Self {
        Self::initial(channel)
    }
}

impl fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            None => write!(f, "{}", self.channel),
            Some(stage) => write!(f, "{} Follow-up {}", self.channel, stage),
        }
    }
}
