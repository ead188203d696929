use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument};

use reachly_core::{Channel, ChannelLabel, FollowUpStage, MessageId, ProspectId, StoredMessage};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, get, get_opt, parse_enum};
use crate::schema::MESSAGE_COLUMNS;

const TABLE: &str = "messages";

pub struct MessageRepo {
    db: Database,
}

impl MessageRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a message. Fails with `NotFound` if the prospect does not exist.
    #[instrument(skip(self, content), fields(prospect_id = %prospect_id, label = %label))]
    pub fn save(
        &self,
        prospect_id: &ProspectId,
        label: ChannelLabel,
        content: &str,
    ) -> Result<StoredMessage, StoreError> {
        let id = MessageId::new();
        let now = row_helpers::now_timestamp();
        self.db.with_conn(|conn| {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM prospects WHERE id = ?1",
                    [prospect_id.as_str()],
                    |_| Ok(()),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::NotFound(format!("prospect {prospect_id}")));
            }

            conn.execute(
                "INSERT INTO messages (id, prospect_id, channel, followup_stage, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    prospect_id.as_str(),
                    label.channel.as_str(),
                    label.stage.map(FollowUpStage::number),
                    content,
                    now,
                ],
            )?;
            Ok(())
        })?;
        debug!(message_id = %id, "message saved");

        Ok(StoredMessage {
            id,
            prospect_id: prospect_id.clone(),
            label,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// All messages for a prospect, oldest first.
    #[instrument(skip(self), fields(prospect_id = %prospect_id))]
    pub fn history(&self, prospect_id: &ProspectId) -> Result<Vec<StoredMessage>, StoreError> {
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE prospect_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([prospect_id.as_str()])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(message_from_row(row)?);
            }
            Ok(out)
        })
    }

    /// Content of the most recent message for each distinct label ever used.
    pub fn latest_per_label(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<ChannelLabel, String>, StoreError> {
        // History is chronological, so later inserts overwrite earlier ones.
        Ok(self
            .history(prospect_id)?
            .into_iter()
            .map(|m| (m.label, m.content))
            .collect())
    }

    /// Most recent message of any stage for each channel the prospect was contacted on.
    pub fn latest_per_channel(
        &self,
        prospect_id: &ProspectId,
    ) -> Result<BTreeMap<Channel, StoredMessage>, StoreError> {
        Ok(self
            .history(prospect_id)?
            .into_iter()
            .map(|m| (m.label.channel, m))
            .collect())
    }
}

fn message_from_row(row: &Row<'_>) -> Result<StoredMessage, StoreError> {
    let channel: String = get(row, 2, TABLE, "channel")?;
    let stage = match get_opt::<u8>(row, 3, TABLE, "followup_stage")? {
        Some(n) => Some(FollowUpStage::try_from(n).map_err(|detail| StoreError::CorruptRow {
            table: TABLE,
            column: "followup_stage",
            detail,
        })?),
        None => None,
    };
    Ok(StoredMessage {
        id: MessageId::from_raw(get::<String>(row, 0, TABLE, "id")?),
        prospect_id: ProspectId::from_raw(get::<String>(row, 1, TABLE, "prospect_id")?),
        label: ChannelLabel {
            channel: parse_enum(&channel, TABLE, "channel")?,
            stage,
        },
        content: get(row, 4, TABLE, "content")?,
        created_at: get(row, 5, TABLE, "created_at")?,
    })
}
