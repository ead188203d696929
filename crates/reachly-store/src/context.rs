//! The persistence seam the engine depends on.
//!
//! Every write is a single-row insert committed immediately. Reads never observe
//! partially written operations.

use std::collections::BTreeMap;
use std::path::Path;

use reachly_core::{
    Channel, ChannelLabel, NewProspect, Prospect, ProspectId, ProspectSummary, StoredMessage,
};

use crate::database::Database;
use crate::error::StoreError;
use crate::messages::MessageRepo;
use crate::prospects::ProspectRepo;

pub trait ContextStore: Send + Sync {
    fn save_prospect(&self, prospect: &NewProspect) -> Result<ProspectId, StoreError>;

    /// Newest first, without persona text or raw profile.
    fn list_prospects(&self) -> Result<Vec<ProspectSummary>, StoreError>;

    fn get_prospect(&self, id: &ProspectId) -> Result<Option<Prospect>, StoreError>;

    /// Fails with [`StoreError::NotFound`] when the prospect does not exist.
    fn save_message(
        &self,
        prospect_id: &ProspectId,
        label: ChannelLabel,
        content: &str,
    ) -> Result<StoredMessage, StoreError>;

    /// Latest content per distinct label ever used for this prospect.
    fn get_messages_for_prospect(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<ChannelLabel, String>, StoreError>;

    /// Latest message of any stage per channel.
    fn latest_per_channel(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<Channel, StoredMessage>, StoreError>;

    /// Every message for this prospect, oldest first.
    fn message_history(&self, prospect_id: &ProspectId) -> Result<Vec<StoredMessage>, StoreError>;

    /// Industry-or-role matches, newest first, at most `limit`. Empty when both filters are absent.
    fn find_similar_prospects(
        &self,
        industry: Option<&str>,
        role: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Prospect>, StoreError>;
}

/// SQLite-backed [`ContextStore`].
pub struct SqliteStore {
    db: Database,
    prospects: ProspectRepo,
    messages: MessageRepo,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            prospects: ProspectRepo::new(db.clone()),
            messages: MessageRepo::new(db.clone()),
            db,
        }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::in_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl ContextStore for SqliteStore {
    fn save_prospect(&self, prospect: &NewProspect) -> Result<ProspectId, StoreError> {
        self.prospects.save(prospect)
    }

    fn list_prospects(&self) -> Result<Vec<ProspectSummary>, StoreError> {
        self.prospects.list()
    }

    fn get_prospect(&self, id: &ProspectId) -> Result<Option<Prospect>, StoreError> {
        self.prospects.get(id)
    }

    fn save_message(
        &self,
        prospect_id: &ProspectId,
        label: ChannelLabel,
        content: &str,
    ) -> Result<StoredMessage, StoreError> {
        self.messages.save(prospect_id, label, content)
    }

    fn get_messages_for_prospect(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<ChannelLabel, String>, StoreError> {
        self.messages.latest_per_label(prospect_id)
    }

    fn latest_per_channel(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<Channel, StoredMessage>, StoreError> {
        self.messages.latest_per_channel(prospect_id)
    }

    fn message_history(&self, prospect_id: &ProspectId) -> Result<Vec<StoredMessage>, StoreError> {
        self.messages.history(prospect_id)
    }

    fn find_similar_prospects(
        &self,
        industry: Option<&str>,
        role: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Prospect>, StoreError> {
        self.prospects.find_similar(industry, role, limit)
    }
}
