//! CRUD operations for [`TaskContainer`] records.

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskhub_shared::{EntityKind, TaskContainer};
use uuid::Uuid;

use crate::chats::purge_chats_for_container;
use crate::database::Database;
use crate::error::Result;
use crate::rows::parse_uuid;

const SELECT_CONTAINER: &str =
    "SELECT id, name, description, type, is_active, activity_level, usergroup_id
     FROM taskcontainer";

impl Database {
    /// Insert a container. The owning group must already exist.
    pub fn create_container(&self, container: &TaskContainer) -> Result<()> {
        self.run(EntityKind::TaskContainer, "create", |conn| {
            conn.execute(
                "INSERT INTO taskcontainer
                     (id, name, description, type, is_active, activity_level, usergroup_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    container.id.to_string(),
                    container.name,
                    container.description,
                    container.container_type,
                    container.is_active,
                    container.activity_level,
                    container.usergroup_id,
                ],
            )
        })?;

        tracing::debug!(
            container_id = %container.id,
            usergroup_id = container.usergroup_id,
            "container created"
        );
        Ok(())
    }

    pub fn get_container(&self, id: Uuid) -> Result<Option<TaskContainer>> {
        self.run(EntityKind::TaskContainer, "get", |conn| {
            conn.query_row(
                &format!("{SELECT_CONTAINER} WHERE id = ?1"),
                params![id.to_string()],
                row_to_container,
            )
            .optional()
        })
    }

    pub fn list_containers(&self) -> Result<Vec<TaskContainer>> {
        self.run(EntityKind::TaskContainer, "list", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_CONTAINER} ORDER BY name ASC"))?;
            let rows = stmt.query_map([], row_to_container)?;
            rows.collect()
        })
    }

    pub fn list_containers_by_group(&self, usergroup_id: i64) -> Result<Vec<TaskContainer>> {
        self.run(EntityKind::TaskContainer, "list_by_group", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_CONTAINER} WHERE usergroup_id = ?1 ORDER BY name ASC"
            ))?;
            let rows = stmt.query_map(params![usergroup_id], row_to_container)?;
            rows.collect()
        })
    }

    /// Persist name, description, type, active flag and activity level. The
    /// owning group cannot change.
    pub fn update_container(&self, container: &TaskContainer) -> Result<bool> {
        let affected = self.run(EntityKind::TaskContainer, "update", |conn| {
            conn.execute(
                "UPDATE taskcontainer
                 SET name = ?2, description = ?3, type = ?4, is_active = ?5, activity_level = ?6
                 WHERE id = ?1",
                params![
                    container.id.to_string(),
                    container.name,
                    container.description,
                    container.container_type,
                    container.is_active,
                    container.activity_level,
                ],
            )
        })?;
        Ok(affected > 0)
    }

    /// Delete a container in one transaction: its chats, its task join rows,
    /// every task no other container references, then the container row.
    /// Returns `false` if the container did not exist.
    pub fn delete_container(&self, id: Uuid) -> Result<bool> {
        let deleted =
            self.transact(EntityKind::TaskContainer, "delete", |tx| purge_container(tx, id))?;
        if deleted {
            tracing::info!(container_id = %id, "container deleted");
        }
        Ok(deleted)
    }

    /// Delete every container of a group. Returns how many were removed.
    pub fn delete_containers_by_group(&self, usergroup_id: i64) -> Result<usize> {
        let removed = self.transact(EntityKind::TaskContainer, "delete_by_group", |tx| {
            let ids = {
                let mut stmt = tx.prepare("SELECT id FROM taskcontainer WHERE usergroup_id = ?1")?;
                let rows = stmt.query_map(params![usergroup_id], |row| row.get::<_, String>(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            };

            let mut removed = 0;
            for raw in &ids {
                if purge_container(tx, parse_uuid(0, raw)?)? {
                    removed += 1;
                }
            }
            Ok(removed)
        })?;

        tracing::info!(usergroup_id, removed, "containers deleted for group");
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Child-first removal of one container. Must run inside a transaction.
pub(crate) fn purge_container(conn: &Connection, id: Uuid) -> rusqlite::Result<bool> {
    let id = id.to_string();

    purge_chats_for_container(conn, &id)?;

    let task_ids = {
        let mut stmt =
            conn.prepare("SELECT task_id FROM taskcontainer_task WHERE taskcontainer_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    conn.execute("DELETE FROM taskcontainer_task WHERE taskcontainer_id = ?1", params![id])?;

    for task_id in &task_ids {
        conn.execute(
            "DELETE FROM task
             WHERE id = ?1
               AND NOT EXISTS (SELECT 1 FROM taskcontainer_task WHERE task_id = ?1)",
            params![task_id],
        )?;
    }

    let affected = conn.execute("DELETE FROM taskcontainer WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

/// Map a `rusqlite::Row` to a [`TaskContainer`].
fn row_to_container(row: &Row<'_>) -> rusqlite::Result<TaskContainer> {
    let id_str: String = row.get(0)?;

    Ok(TaskContainer {
        id: parse_uuid(0, &id_str)?,
        name: row.get(1)?,
        description: row.get(2)?,
        container_type: row.get(3)?,
        is_active: row.get(4)?,
        activity_level: row.get(5)?,
        usergroup_id: row.get(6)?,
    })
}
