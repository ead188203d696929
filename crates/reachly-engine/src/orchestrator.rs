//! `Reachly`: the application facade wiring a generation client, a context store and
//! profile sources into ingest, persona and outreach operations.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use reachly_core::{
    Channel, ChannelLabel, FollowUpStage, GenerationClient, NewProspect, Persona, ProfileSource,
    Prospect, ProspectId, ProspectSource, ProspectSummary, StoredMessage,
};
use reachly_settings::ReachlySettings;
use reachly_store::ContextStore;

use crate::archive::archive_profile;
use crate::error::EngineError;
use crate::extract::{extract_name, extract_role_company};
use crate::followup;
use crate::generation::{self, GenerationOptions};
use crate::locks::ProspectLocks;
use crate::persona::infer_persona;

#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub generation: GenerationOptions,
    /// Where ingested profile text is archived. `None` disables archiving.
    pub archive_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_settings(settings: &ReachlySettings) -> Self {
        Self {
            generation: GenerationOptions {
                similar_limit: settings.generation.similar_limit,
                concurrent: settings.generation.concurrent_requests,
            },
            archive_dir: settings
                .storage
                .archive_profiles
                .then(|| settings.storage.profiles_dir()),
        }
    }
}

/// Profile text as fetched, plus where it came from.
#[derive(Clone, Debug)]
pub struct Ingested {
    pub text: String,
    pub source: ProspectSource,
    pub archived: Option<PathBuf>,
}

pub struct Reachly {
    client: Arc<dyn GenerationClient>,
    store: Arc<dyn ContextStore>,
    config: EngineConfig,
    locks: ProspectLocks,
}

impl Reachly {
    /// Probe the generation endpoint and refuse to start when it is not ready.
    pub async fn new(
        client: Arc<dyn GenerationClient>,
        store: Arc<dyn ContextStore>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        client.health().await.map_err(EngineError::Unhealthy)?;
        info!(client = client.name(), model = client.model(), "generation endpoint ready");
        Ok(Self {
            client,
            store,
            config,
            locks: ProspectLocks::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch profile text and archive it when configured.
    ///
    /// A failed archive write is logged and does not fail ingestion.
    #[instrument(skip(self, source, locator), fields(kind = %source.kind()))]
    pub async fn ingest(
        &self,
        source: &dyn ProfileSource,
        locator: &str,
    ) -> Result<Ingested, EngineError> {
        let text = source.fetch(locator).await?;
        let kind = source.kind();
        let archived = match &self.config.archive_dir {
            Some(dir) => match archive_profile(dir, kind, &text) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "profile archive failed");
                    None
                }
            },
            None => None,
        };
        Ok(Ingested {
            text,
            source: kind,
            archived,
        })
    }

    pub async fn analyze_persona(&self, profile_text: &str) -> Result<Persona, EngineError> {
        infer_persona(
            self.client.as_ref(),
            profile_text,
            self.config.generation.concurrent,
        )
        .await
    }

    /// Store a prospect for `persona`, filling name, role and company from the raw text
    /// when they can be extracted.
    #[instrument(skip(self, persona, raw_profile))]
    pub fn save_persona(
        &self,
        persona: &Persona,
        raw_profile: &str,
        source: ProspectSource,
    ) -> Result<ProspectId, EngineError> {
        let name = extract_name(raw_profile);
        let (role, company) = extract_role_company(raw_profile);
        let prospect = NewProspect::from_persona(persona, raw_profile, source)?
            .with_name(name)
            .with_role(role)
            .with_company(company);
        let id = self.store.save_prospect(&prospect)?;
        info!(prospect_id = %id, "prospect saved");
        Ok(id)
    }

    /// Ingest, analyze and save in one step.
    pub async fn add_profile(
        &self,
        source: &dyn ProfileSource,
        locator: &str,
    ) -> Result<(ProspectId, Persona), EngineError> {
        let ingested = self.ingest(source, locator).await?;
        let persona = self.analyze_persona(&ingested.text).await?;
        let id = self.save_persona(&persona, &ingested.text, ingested.source)?;
        Ok((id, persona))
    }

    pub fn list_prospects(&self) -> Result<Vec<ProspectSummary>, EngineError> {
        Ok(self.store.list_prospects()?)
    }

    pub fn get_prospect(&self, id: &ProspectId) -> Result<Option<Prospect>, EngineError> {
        Ok(self.store.get_prospect(id)?)
    }

    /// Like [`Reachly::get_prospect`], but absence is an error.
    pub fn prospect(&self, id: &ProspectId) -> Result<Prospect, EngineError> {
        self.get_prospect(id)?
            .ok_or_else(|| EngineError::ProspectNotFound(id.clone()))
    }

    pub fn message_history(&self, id: &ProspectId) -> Result<Vec<StoredMessage>, EngineError> {
        Ok(self.store.message_history(id)?)
    }

    /// Latest content per label, e.g. `Email` and `Email Follow-up 1` separately.
    pub fn latest_messages(
        &self,
        id: &ProspectId,
    ) -> Result<BTreeMap<ChannelLabel, String>, EngineError> {
        Ok(self.store.get_messages_for_prospect(id)?)
    }

    /// Generate one message per channel for a stored prospect and persist them.
    ///
    /// Nothing is persisted unless every channel succeeded.
    #[instrument(skip(self), fields(prospect_id = %id))]
    pub async fn generate_outreach(
        &self,
        id: &ProspectId,
    ) -> Result<BTreeMap<Channel, StoredMessage>, EngineError> {
        let prospect = self.prospect(id)?;
        let _guard = self.locks.acquire(id).await;

        let messages = generation::generate_messages(
            self.client.as_ref(),
            self.store.as_ref(),
            &prospect.persona_block(),
            prospect.role.as_deref(),
            prospect.industry.as_deref(),
            self.config.generation,
        )
        .await?;

        self.persist(id, messages, ChannelLabel::initial)
    }

    /// Generate and persist follow-ups for every channel already contacted.
    #[instrument(skip(self), fields(prospect_id = %id, stage = %stage))]
    pub async fn generate_followups(
        &self,
        id: &ProspectId,
        stage: FollowUpStage,
    ) -> Result<BTreeMap<Channel, StoredMessage>, EngineError> {
        let prospect = self.prospect(id)?;
        let _guard = self.locks.acquire(id).await;

        let followups = followup::generate_followups(
            self.client.as_ref(),
            self.store.as_ref(),
            id,
            &prospect.persona_block(),
            stage,
        )
        .await?;

        self.persist(id, followups, |channel| ChannelLabel::follow_up(channel, stage))
    }

    fn persist(
        &self,
        id: &ProspectId,
        texts: BTreeMap<Channel, String>,
        label: impl Fn(Channel) -> ChannelLabel,
    ) -> Result<BTreeMap<Channel, StoredMessage>, EngineError> {
        let mut saved = BTreeMap::new();
        for (channel, text) in texts {
            let message = self.store.save_message(id, label(channel), &text)?;
            saved.insert(channel, message);
        }
        Ok(saved)
    }
}
