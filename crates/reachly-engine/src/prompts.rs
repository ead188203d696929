//! Instruction text sent to the generation endpoint.
//!
//! System prompts are fixed; user prompts are assembled by the `*_prompt` builders.

use reachly_core::{Channel, FollowUpStage};

macro_rules! system_base {
    () => {
        "You are a highly skilled human copywriter and behavioral analyst.
You write natural, non-generic outreach that sounds human.
You do NOT use corporate buzzwords.
You do NOT sound like an AI assistant.
You match tone precisely.
"
    };
}

pub const SYSTEM_ANALYSIS: &str = concat!(
    system_base!(),
    "
Your task is to analyze a person's public profile text and infer:
- role
- seniority
- industry
- interests
- communication style
- language / tone markers

Return structured, factual insights only.
"
);

pub const SYSTEM_GENERATION: &str = concat!(
    system_base!(),
    "
Your task is to write cold outreach messages.
They must feel personal, relevant, and respectful.
No emojis unless the persona clearly uses them.
Clear CTA. No filler.
"
);

pub const EMAIL_SYSTEM: &str = "You are an expert cold outreach strategist.

STRICT RULES:
- You MUST use the exact RECIPIENT NAME provided.
- Do NOT invent or substitute names.
- Do NOT hallucinate identity details.
- Maintain professional tone.
- Personalize using provided persona details only.
- No generic corporate AI phrasing.
";

pub const FOLLOWUP_SYSTEM: &str = "You are an expert outreach strategist.

Write natural, human, non-salesy follow-up messages.

Rules:
- Never repeat the original message.
- Never sound desperate.
- Keep it short and confident.
- Maintain tone consistency with the persona style.
- No generic corporate AI phrasing.
";

pub fn persona_analysis_prompt(profile_text: &str) -> String {
    format!(
        "PROFILE TEXT:
{profile_text}

Analyze the person above and return:

1. Name (if available)
2. Current role
3. Company
4. Industry
5. Seniority level
6. Interests or focus areas
7. Communication style (formal / casual / mixed)
8. Writing traits (short sentences, emojis, slang, etc.)

Respond in clean bullet points."
    )
}

pub fn style_prompt(text: &str) -> String {
    format!(
        "TEXT SAMPLE:
{text}

Infer the communication style:

Return:
- Tone: formal / casual / mixed
- Emoji usage: none / low / high
- Slang or abbreviations: yes / no
- Sentence length: short / medium / long
- Overall vibe: professional / friendly / direct / expressive

Respond in bullet points only."
    )
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "PROFILE TEXT:
{text}

Create a concise factual summary including:
- Name (if available)
- Current role and company
- Industry
- Seniority
- Core interests or focus areas

Max 6 bullet points.
No speculation."
    )
}

pub fn cta_prompt(persona: &str, channel: Channel) -> String {
    format!(
        "PERSONA:
{persona}

CHANNEL:
{channel}

Generate ONE short call-to-action:
- Appropriate for cold outreach
- Low pressure
- Fits their seniority and tone
- Fits the norms of the channel above
Examples:
- \"Open to a quick 15-min chat?\"
- \"Worth a short conversation?\"

Return only the CTA sentence."
    )
}

/// System instruction for a channel's full message.
pub fn message_system(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => EMAIL_SYSTEM,
        Channel::Chat | Channel::ProfessionalDm | Channel::CasualDm => SYSTEM_GENERATION,
    }
}

/// User instruction for a channel's full message, embedding an already generated CTA.
pub fn message_prompt(persona: &str, channel: Channel, cta: &str) -> String {
    match channel {
        Channel::Email => format!(
            "{persona}

Write a highly personalized cold email.
Start with: Dear <RECIPIENT NAME>

Include a clear subject line at the top in format:
Subject: <your subject>

CTA:
{cta}"
        ),
        Channel::Chat => format!(
            "PERSONA:
{persona}

Write a WhatsApp/SMS message:
- Very concise
- Friendly but respectful
- One clear CTA

CTA:
{cta}"
        ),
        Channel::ProfessionalDm => format!(
            "PERSONA:
{persona}

Write a LinkedIn DM:
- Professional but human
- Not salesy
- Ends with a soft CTA

CTA:
{cta}"
        ),
        Channel::CasualDm => format!(
            "PERSONA:
{persona}

Write an Instagram DM:
- Casual
- Matches their likely tone
- No forced slang
- Short CTA

CTA:
{cta}"
        ),
    }
}

pub fn stage_tone(stage: FollowUpStage) -> &'static str {
    match stage {
        FollowUpStage::Nudge => "Gentle nudge. Assume they missed the first message.",
        FollowUpStage::ValueAdd => "Value-add follow-up. Add new insight or angle.",
        FollowUpStage::CloseOut => "Final follow-up. Polite close-the-loop message.",
    }
}

/// `previous_message` is passed through verbatim.
pub fn followup_prompt(
    channel: Channel,
    persona: &str,
    previous_message: &str,
    stage: FollowUpStage,
) -> String {
    format!(
        "CHANNEL:
{channel}

PERSONA:
{persona}

PREVIOUS MESSAGE:
{previous_message}

FOLLOW-UP TYPE:
{tone}

Write the follow-up message now.",
        tone = stage_tone(stage)
    )
}
