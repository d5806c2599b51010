//! CRUD operations for [`ChatParticipant`] records.

use rusqlite::{params, OptionalExtension, Row};
use taskhub_shared::{ChatParticipant, EntityKind};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::rows::{fmt_ts, invalid_row, parse_ts, parse_uuid};

const SELECT_PARTICIPANT: &str =
    "SELECT id, chat_id, user_id, joined_at, role, status FROM chat_participant";

impl Database {
    pub fn add_participant(&self, participant: &ChatParticipant) -> Result<()> {
        self.run(EntityKind::ChatParticipant, "add", |conn| {
            conn.execute(
                "INSERT INTO chat_participant (id, chat_id, user_id, joined_at, role, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    participant.id().to_string(),
                    participant.chat_id().to_string(),
                    participant.user_id(),
                    fmt_ts(&participant.joined_at()),
                    participant.role().as_str(),
                    participant.status().as_str(),
                ],
            )
        })?;

        tracing::debug!(
            chat_id = %participant.chat_id(),
            user_id = participant.user_id(),
            role = %participant.role(),
            "participant added"
        );
        Ok(())
    }

    pub fn get_participant(&self, id: Uuid) -> Result<Option<ChatParticipant>> {
        self.run(EntityKind::ChatParticipant, "get", |conn| {
            conn.query_row(
                &format!("{SELECT_PARTICIPANT} WHERE id = ?1"),
                params![id.to_string()],
                row_to_participant,
            )
            .optional()
        })
    }

    pub fn get_participant_by_user(
        &self,
        chat_id: Uuid,
        user_id: i64,
    ) -> Result<Option<ChatParticipant>> {
        self.run(EntityKind::ChatParticipant, "get_by_user", |conn| {
            conn.query_row(
                &format!("{SELECT_PARTICIPANT} WHERE chat_id = ?1 AND user_id = ?2"),
                params![chat_id.to_string(), user_id],
                row_to_participant,
            )
            .optional()
        })
    }

    /// Participants of a chat in join order.
    pub fn list_participants(&self, chat_id: Uuid) -> Result<Vec<ChatParticipant>> {
        self.run(EntityKind::ChatParticipant, "list", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_PARTICIPANT} WHERE chat_id = ?1 ORDER BY joined_at ASC"
            ))?;
            let rows = stmt.query_map(params![chat_id.to_string()], row_to_participant)?;
            rows.collect()
        })
    }

    /// Persist role and status. Returns `false` if the participant is gone.
    pub fn update_participant(&self, participant: &ChatParticipant) -> Result<bool> {
        let affected = self.run(EntityKind::ChatParticipant, "update", |conn| {
            conn.execute(
                "UPDATE chat_participant SET role = ?2, status = ?3 WHERE id = ?1",
                params![
                    participant.id().to_string(),
                    participant.role().as_str(),
                    participant.status().as_str(),
                ],
            )
        })?;
        Ok(affected > 0)
    }

    pub fn remove_participant(&self, chat_id: Uuid, user_id: i64) -> Result<bool> {
        let affected = self.run(EntityKind::ChatParticipant, "remove", |conn| {
            conn.execute(
                "DELETE FROM chat_participant WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id.to_string(), user_id],
            )
        })?;
        Ok(affected > 0)
    }
}

fn row_to_participant(row: &Row<'_>) -> rusqlite::Result<ChatParticipant> {
    let id_str: String = row.get(0)?;
    let chat_str: String = row.get(1)?;
    let joined_str: String = row.get(3)?;
    let role: String = row.get(4)?;
    let status: String = row.get(5)?;

    ChatParticipant::restore(
        parse_uuid(0, &id_str)?,
        parse_uuid(1, &chat_str)?,
        row.get(2)?,
        parse_ts(3, &joined_str)?,
        &role,
        &status,
    )
    .map_err(|e| invalid_row(4, e))
}
