use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use reachly_core::{Channel, FollowUpStage, GenerationClient, GenerationError, GenerationRequest, ProspectId};
use reachly_store::ContextStore;

use crate::error::EngineError;
use crate::prompts;

const FOLLOWUP_TEMPERATURE: f64 = 0.7;

/// One follow-up per channel that already has a message on record for this prospect.
///
/// The previous message is the most recent one of any stage on that channel and is
/// passed to the model verbatim. Channels never messaged are skipped. The first
/// failing channel aborts the whole operation.
#[instrument(skip(client, store, persona_block), fields(prospect_id = %prospect_id, stage = %stage))]
pub async fn generate_followups(
    client: &dyn GenerationClient,
    store: &dyn ContextStore,
    prospect_id: &ProspectId,
    persona_block: &str,
    stage: FollowUpStage,
) -> Result<BTreeMap<Channel, String>, EngineError> {
    let previous = store.latest_per_channel(prospect_id)?;
    if previous.is_empty() {
        debug!("no prior messages, nothing to follow up");
        return Ok(BTreeMap::new());
    }

    let mut out = BTreeMap::new();
    for (channel, message) in previous {
        let request = GenerationRequest::new(
            prompts::FOLLOWUP_SYSTEM,
            prompts::followup_prompt(channel, persona_block, &message.content, stage),
            FOLLOWUP_TEMPERATURE,
        );
        let text = client.generate(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(
                GenerationError::InvalidResponse(format!("empty {channel} follow-up {stage}")).into(),
            );
        }
        debug!(channel = %channel, "follow-up ready");
        out.insert(channel, text.to_string());
    }

    info!(channels = out.len(), "follow-ups generated");
    Ok(out)
}
