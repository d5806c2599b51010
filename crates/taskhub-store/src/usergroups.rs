//! CRUD operations for [`UserGroup`] records and `usergroup_user` membership
//! rows.

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskhub_shared::{EntityKind, UserGroup};

use crate::chats::purge_chats_for_group;
use crate::containers::purge_container;
use crate::database::Database;
use crate::error::Result;
use crate::rows::{fmt_ts, invalid_row, parse_uuid};

const SELECT_GROUP: &str = "SELECT ug.id, ug.name, ug.description, ug.type, ug.thumbnailurl,
        ug.is_active
     FROM usergroup ug";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a group and return its row id.
    pub fn create_usergroup(&self, group: &UserGroup) -> Result<i64> {
        let id = self.run(EntityKind::UserGroup, "create", |conn| insert_group(conn, group))?;
        tracing::debug!(usergroup_id = id, name = %group.name(), "usergroup created");
        Ok(id)
    }

    /// Insert a group together with its first member in one transaction.
    pub fn create_usergroup_with_owner(
        &self,
        group: &UserGroup,
        owner_user_id: i64,
    ) -> Result<i64> {
        let id = self.transact(EntityKind::UserGroup, "create_with_owner", |tx| {
            let id = insert_group(tx, group)?;
            tx.execute(
                "INSERT INTO usergroup_user (usergroup_id, user_id) VALUES (?1, ?2)",
                params![id, owner_user_id],
            )?;
            Ok(id)
        })?;

        tracing::debug!(usergroup_id = id, owner_user_id, "usergroup created with owner");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_usergroup(&self, id: i64) -> Result<Option<UserGroup>> {
        self.run(EntityKind::UserGroup, "get", |conn| {
            conn.query_row(
                &format!("{SELECT_GROUP} WHERE ug.id = ?1"),
                params![id],
                row_to_group,
            )
            .optional()
        })
    }

    pub fn list_usergroups(&self) -> Result<Vec<UserGroup>> {
        self.run(EntityKind::UserGroup, "list", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_GROUP} ORDER BY ug.id"))?;
            let rows = stmt.query_map([], row_to_group)?;
            rows.collect()
        })
    }

    /// Groups the user belongs to.
    pub fn list_usergroups_by_user(&self, user_id: i64) -> Result<Vec<UserGroup>> {
        self.run(EntityKind::UserGroup, "list_by_user", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_GROUP}
                 INNER JOIN usergroup_user ugu ON ugu.usergroup_id = ug.id
                 WHERE ugu.user_id = ?1
                 ORDER BY ug.id"
            ))?;
            let rows = stmt.query_map(params![user_id], row_to_group)?;
            rows.collect()
        })
    }

    pub fn is_member(&self, usergroup_id: i64, user_id: i64) -> Result<bool> {
        self.run(EntityKind::Membership, "exists", |conn| {
            conn.query_row(
                "SELECT EXISTS (
                     SELECT 1 FROM usergroup_user WHERE usergroup_id = ?1 AND user_id = ?2
                 )",
                params![usergroup_id, user_id],
                |row| row.get(0),
            )
        })
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Add a membership row. Returns `false` if the user was already a member.
    pub fn add_user_to_group(&self, usergroup_id: i64, user_id: i64) -> Result<bool> {
        let affected = self.run(EntityKind::Membership, "add", |conn| {
            conn.execute(
                "INSERT INTO usergroup_user (usergroup_id, user_id) VALUES (?1, ?2)
                 ON CONFLICT (usergroup_id, user_id) DO NOTHING",
                params![usergroup_id, user_id],
            )
        })?;
        Ok(affected > 0)
    }

    /// Remove a membership row. Returns `false` if there was none.
    pub fn remove_user_from_group(&self, usergroup_id: i64, user_id: i64) -> Result<bool> {
        let affected = self.run(EntityKind::Membership, "remove", |conn| {
            conn.execute(
                "DELETE FROM usergroup_user WHERE usergroup_id = ?1 AND user_id = ?2",
                params![usergroup_id, user_id],
            )
        })?;
        Ok(affected > 0)
    }

    /// Remove a membership row and, in the same transaction, clear the user's
    /// default-group pointer if it names this group. Returns `false` if the
    /// user was not a member.
    pub fn leave_usergroup(&self, usergroup_id: i64, user_id: i64) -> Result<bool> {
        let left = self.transact(EntityKind::Membership, "leave", |tx| {
            let removed = tx.execute(
                "DELETE FROM usergroup_user WHERE usergroup_id = ?1 AND user_id = ?2",
                params![usergroup_id, user_id],
            )?;
            if removed == 0 {
                return Ok(false);
            }

            let cleared = tx.execute(
                "UPDATE usersetting SET default_group_id = 0
                 WHERE user_id = ?2 AND default_group_id = ?1",
                params![usergroup_id, user_id],
            )?;
            if cleared > 0 {
                tx.execute(
                    "UPDATE user SET updated_at = ?2 WHERE id = ?1",
                    params![user_id, fmt_ts(&taskhub_shared::clock::now())],
                )?;
            }
            Ok(true)
        })?;

        if left {
            tracing::debug!(usergroup_id, user_id, "user left usergroup");
        }
        Ok(left)
    }

    pub fn update_usergroup(&self, group: &UserGroup) -> Result<bool> {
        let affected = self.run(EntityKind::UserGroup, "update", |conn| {
            conn.execute(
                "UPDATE usergroup
                 SET name = ?2, description = ?3, type = ?4, thumbnailurl = ?5, is_active = ?6
                 WHERE id = ?1",
                params![
                    group.id(),
                    group.name(),
                    group.description,
                    group.group_type(),
                    group.thumbnail,
                    group.is_active,
                ],
            )
        })?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a group and everything hanging off it, in one transaction.
    ///
    /// Order: chats of the group (participants first), each container (see
    /// [`Database::delete_container`]), membership rows, default-group
    /// pointers, then the group row. Returns `false` if the group did not exist.
    pub fn delete_usergroup(&self, id: i64) -> Result<bool> {
        let deleted = self.transact(EntityKind::UserGroup, "delete", |tx| {
            purge_chats_for_group(tx, id)?;

            let container_ids = {
                let mut stmt = tx.prepare("SELECT id FROM taskcontainer WHERE usergroup_id = ?1")?;
                let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            };
            for raw in &container_ids {
                purge_container(tx, parse_uuid(0, raw)?)?;
            }

            tx.execute("DELETE FROM usergroup_user WHERE usergroup_id = ?1", params![id])?;

            tx.execute(
                "UPDATE user SET updated_at = ?2
                 WHERE id IN (SELECT user_id FROM usersetting WHERE default_group_id = ?1)",
                params![id, fmt_ts(&taskhub_shared::clock::now())],
            )?;
            tx.execute(
                "UPDATE usersetting SET default_group_id = 0 WHERE default_group_id = ?1",
                params![id],
            )?;

            let affected = tx.execute("DELETE FROM usergroup WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })?;

        if deleted {
            tracing::info!(usergroup_id = id, "usergroup deleted");
        }
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn insert_group(conn: &Connection, group: &UserGroup) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO usergroup (name, description, type, thumbnailurl, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            group.name(),
            group.description,
            group.group_type(),
            group.thumbnail,
            group.is_active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Map a `rusqlite::Row` to a [`UserGroup`].
fn row_to_group(row: &Row<'_>) -> rusqlite::Result<UserGroup> {
    UserGroup::restore(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    )
    .map_err(|e| invalid_row(1, e))
}
