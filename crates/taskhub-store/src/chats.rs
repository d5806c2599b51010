//! CRUD operations for [`Chat`] records.

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskhub_shared::{Chat, EntityKind};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::rows::{fmt_ts, invalid_row, parse_ts, parse_uuid};

const SELECT_CHAT: &str = "SELECT id, type, usergroup_id, container_id, created_at FROM chat";

impl Database {
    pub fn create_chat(&self, chat: &Chat) -> Result<()> {
        self.run(EntityKind::Chat, "create", |conn| {
            conn.execute(
                "INSERT INTO chat (id, type, usergroup_id, container_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    chat.id().to_string(),
                    chat.chat_type().as_str(),
                    chat.usergroup_id(),
                    chat.container_id().map(|c| c.to_string()),
                    fmt_ts(&chat.created_at()),
                ],
            )
        })?;

        tracing::debug!(chat_id = %chat.id(), chat_type = %chat.chat_type(), "chat created");
        Ok(())
    }

    pub fn get_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        self.run(EntityKind::Chat, "get", |conn| {
            conn.query_row(
                &format!("{SELECT_CHAT} WHERE id = ?1"),
                params![id.to_string()],
                row_to_chat,
            )
            .optional()
        })
    }

    /// List all chats, newest first.
    pub fn list_chats(&self) -> Result<Vec<Chat>> {
        self.run(EntityKind::Chat, "list", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_CHAT} ORDER BY created_at DESC"))?;
            let rows = stmt.query_map([], row_to_chat)?;
            rows.collect()
        })
    }

    /// Every chat owned by a group, including its container chats.
    pub fn list_chats_by_group(&self, usergroup_id: i64) -> Result<Vec<Chat>> {
        self.run(EntityKind::Chat, "list_by_group", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_CHAT} WHERE usergroup_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![usergroup_id], row_to_chat)?;
            rows.collect()
        })
    }

    /// The group-wide chat of a group, if one was opened.
    pub fn get_chat_by_group(&self, usergroup_id: i64) -> Result<Option<Chat>> {
        self.run(EntityKind::Chat, "get_by_group", |conn| {
            conn.query_row(
                &format!("{SELECT_CHAT} WHERE type = 'group' AND usergroup_id = ?1"),
                params![usergroup_id],
                row_to_chat,
            )
            .optional()
        })
    }

    pub fn get_chat_by_container(&self, container_id: Uuid) -> Result<Option<Chat>> {
        self.run(EntityKind::Chat, "get_by_container", |conn| {
            conn.query_row(
                &format!("{SELECT_CHAT} WHERE type = 'container' AND container_id = ?1"),
                params![container_id.to_string()],
                row_to_chat,
            )
            .optional()
        })
    }

    /// Delete a chat and its participants in one transaction. Returns `false`
    /// if the chat did not exist.
    pub fn delete_chat(&self, id: Uuid) -> Result<bool> {
        let deleted = self.transact(EntityKind::Chat, "delete", |tx| {
            let id = id.to_string();
            tx.execute("DELETE FROM chat_participant WHERE chat_id = ?1", params![id])?;
            let affected = tx.execute("DELETE FROM chat WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })?;

        if deleted {
            tracing::debug!(chat_id = %id, "chat deleted");
        }
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn purge_chats_for_group(
    conn: &Connection,
    usergroup_id: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM chat_participant
         WHERE chat_id IN (SELECT id FROM chat WHERE usergroup_id = ?1)",
        params![usergroup_id],
    )?;
    conn.execute("DELETE FROM chat WHERE usergroup_id = ?1", params![usergroup_id])
}

pub(crate) fn purge_chats_for_container(
    conn: &Connection,
    container_id: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM chat_participant
         WHERE chat_id IN (SELECT id FROM chat WHERE container_id = ?1)",
        params![container_id],
    )?;
    conn.execute("DELETE FROM chat WHERE container_id = ?1", params![container_id])
}

/// Map a `rusqlite::Row` to a [`Chat`], re-checking the variant shape.
fn row_to_chat(row: &Row<'_>) -> rusqlite::Result<Chat> {
    let id_str: String = row.get(0)?;
    let chat_type: String = row.get(1)?;
    let usergroup_id: Option<i64> = row.get(2)?;
    let container_id: Option<String> = row.get(3)?;
    let created_str: String = row.get(4)?;

    Chat::restore(
        parse_uuid(0, &id_str)?,
        &chat_type,
        usergroup_id,
        container_id.as_deref(),
        parse_ts(4, &created_str)?,
    )
    .map_err(|e| invalid_row(1, e))
}
