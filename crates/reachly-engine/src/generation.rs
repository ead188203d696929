use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use reachly_core::{Channel, GenerationClient, GenerationError, GenerationRequest};
use reachly_store::ContextStore;

use crate::error::EngineError;
use crate::extract::{extract_subject, find_subject_line, DEFAULT_SUBJECT};
use crate::memory::{build_memory_context, enrich};
use crate::prompts;

const CTA_TEMPERATURE: f64 = 0.4;

/// Sampling temperature per channel. The formal channel is the most conservative.
pub fn channel_temperature(channel: Channel) -> f64 {
    match channel {
        Channel::Email => 0.5,
        Channel::ProfessionalDm => 0.55,
        Channel::Chat => 0.7,
        Channel::CasualDm => 0.75,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GenerationOptions {
    /// Maximum number of similar prospects folded into the memory context.
    pub similar_limit: u32,
    /// Run the per-channel pipelines concurrently.
    pub concurrent: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            similar_limit: 3,
            concurrent: false,
        }
    }
}

/// One message per channel for `persona_block`.
///
/// The memory context for `role`/`industry` is appended to the persona block once,
/// uniformly for every channel. Each channel generates its CTA first, then the
/// message embedding it.
#[instrument(skip(client, store, persona_block))]
pub async fn generate_messages(
    client: &dyn GenerationClient,
    store: &dyn ContextStore,
    persona_block: &str,
    role: Option<&str>,
    industry: Option<&str>,
    options: GenerationOptions,
) -> Result<BTreeMap<Channel, String>, EngineError> {
    let memory = build_memory_context(store, role, industry, options.similar_limit)?;
    let enriched = enrich(persona_block, &memory);

    let messages = if options.concurrent {
        let texts = try_join_all(
            Channel::ALL
                .into_iter()
                .map(|channel| generate_channel(client, &enriched, channel)),
        )
        .await?;
        Channel::ALL.into_iter().zip(texts).collect()
    } else {
        let mut out = BTreeMap::new();
        for channel in Channel::ALL {
            out.insert(channel, generate_channel(client, &enriched, channel).await?);
        }
        out
    };

    info!(channels = messages.len(), with_memory = !memory.is_empty(), "outreach generated");
    Ok(messages)
}

/// CTA then message for a single channel.
#[instrument(skip(client, persona), fields(channel = %channel))]
pub async fn generate_channel(
    client: &dyn GenerationClient,
    persona: &str,
    channel: Channel,
) -> Result<String, EngineError> {
    let cta = generate_cta(client, persona, channel).await?;
    debug!(cta = %cta, "cta ready");

    let request = GenerationRequest::new(
        prompts::message_system(channel),
        prompts::message_prompt(persona, channel, &cta),
        channel_temperature(channel),
    );
    let text = non_empty(client.generate(&request).await?, channel, "message")?;

    Ok(match channel {
        Channel::Email => ensure_subject_line(&text),
        _ => text,
    })
}

pub async fn generate_cta(
    client: &dyn GenerationClient,
    persona: &str,
    channel: Channel,
) -> Result<String, EngineError> {
    let request = GenerationRequest::new(
        prompts::SYSTEM_GENERATION,
        prompts::cta_prompt(persona, channel),
        CTA_TEMPERATURE,
    );
    non_empty(client.generate(&request).await?, channel, "CTA")
}

fn non_empty(text: String, channel: Channel, what: &str) -> Result<String, EngineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::InvalidResponse(format!("empty {channel} {what}")).into());
    }
    Ok(trimmed.to_string())
}

/// Normalize the first subject header to a plain `Subject: <text>` line, or
/// prepend a fallback subject when the model left it out.
pub fn ensure_subject_line(email: &str) -> String {
    let Some((index, _)) = find_subject_line(email) else {
        return format!("Subject: {DEFAULT_SUBJECT}\n\n{email}");
    };
    let header = format!("Subject: {}", extract_subject(email));
    email
        .lines()
        .enumerate()
        .map(|(i, line)| if i == index { header.as_str() } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
