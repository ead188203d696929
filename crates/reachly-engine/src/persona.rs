use tracing::{info, instrument};

use reachly_core::{GenerationClient, GenerationError, GenerationRequest, Persona};

use crate::error::EngineError;
use crate::prompts;

const ANALYSIS_TEMPERATURE: f64 = 0.2;
const STYLE_TEMPERATURE: f64 = 0.3;
const SUMMARY_TEMPERATURE: f64 = 0.2;

/// Infer a persona with three independent generation calls over the same text:
/// a structured analysis, a style description and a factual summary.
///
/// All three must succeed. A blank output counts as an invalid response.
#[instrument(skip(client, profile_text), fields(chars = profile_text.len()))]
pub async fn infer_persona(
    client: &dyn GenerationClient,
    profile_text: &str,
    concurrent: bool,
) -> Result<Persona, EngineError> {
    let analysis_req = GenerationRequest::new(
        prompts::SYSTEM_ANALYSIS,
        prompts::persona_analysis_prompt(profile_text),
        ANALYSIS_TEMPERATURE,
    );
    let style_req = GenerationRequest::new(
        prompts::SYSTEM_ANALYSIS,
        prompts::style_prompt(profile_text),
        STYLE_TEMPERATURE,
    );
    let summary_req = GenerationRequest::new(
        prompts::SYSTEM_ANALYSIS,
        prompts::summary_prompt(profile_text),
        SUMMARY_TEMPERATURE,
    );

    let (analysis, style, summary) = if concurrent {
        tokio::try_join!(
            client.generate(&analysis_req),
            client.generate(&style_req),
            client.generate(&summary_req),
        )?
    } else {
        let analysis = client.generate(&analysis_req).await?;
        let style = client.generate(&style_req).await?;
        let summary = client.generate(&summary_req).await?;
        (analysis, style, summary)
    };

    let persona = Persona::new(summary, style, analysis)
        .map_err(|e| GenerationError::InvalidResponse(format!("model returned {e}")))?;
    info!("persona inferred");
    Ok(persona)
}
