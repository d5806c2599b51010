//! CRUD operations for [`User`] records and their settings row.

use rusqlite::{params, OptionalExtension, Row};
use taskhub_shared::{EntityKind, User, UserProfile};

use crate::database::Database;
use crate::error::Result;
use crate::rows::{fmt_ts, invalid_row, parse_ts};

const SELECT_USER: &str = "SELECT u.id, u.user_id, u.username, u.first_name, u.last_name, u.email,
        u.is_active, u.created_at, u.updated_at, COALESCE(s.default_group_id, 0)
     FROM user u
     LEFT JOIN usersetting s ON s.user_id = u.id";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a user and its settings row in one transaction. Returns the new
    /// row id.
    pub fn create_user(&self, user: &User) -> Result<i64> {
        let id = self.transact(EntityKind::User, "create", |tx| {
            tx.execute(
                "INSERT INTO user (user_id, username, first_name, last_name, email,
                                   is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.external_id(),
                    user.username(),
                    user.profile().first_name,
                    user.profile().last_name,
                    user.email(),
                    user.is_active,
                    fmt_ts(&user.created_at()),
                    fmt_ts(&user.updated_at()),
                ],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO usersetting (user_id, default_group_id) VALUES (?1, ?2)",
                params![id, user.default_group_id()],
            )?;
            Ok(id)
        })?;

        tracing::debug!(user_id = id, external_id = %user.external_id(), "user created");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.run(EntityKind::User, "get", |conn| {
            conn.query_row(&format!("{SELECT_USER} WHERE u.id = ?1"), params![id], row_to_user)
                .optional()
        })
    }

    /// Look a user up by the id the auth provider assigned.
    pub fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        self.run(EntityKind::User, "get_by_external_id", |conn| {
            conn.query_row(
                &format!("{SELECT_USER} WHERE u.user_id = ?1"),
                params![external_id],
                row_to_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.run(EntityKind::User, "get_by_email", |conn| {
            conn.query_row(
                &format!("{SELECT_USER} WHERE u.email = ?1 ORDER BY u.id LIMIT 1"),
                params![email],
                row_to_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.run(EntityKind::User, "get_by_username", |conn| {
            conn.query_row(
                &format!("{SELECT_USER} WHERE u.username = ?1 ORDER BY u.id LIMIT 1"),
                params![username],
                row_to_user,
            )
            .optional()
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.run(EntityKind::User, "list", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY u.id"))?;
            let rows = stmt.query_map([], row_to_user)?;
            rows.collect()
        })
    }

    /// Members of a group, through `usergroup_user`.
    pub fn list_users_by_group(&self, usergroup_id: i64) -> Result<Vec<User>> {
        self.run(EntityKind::User, "list_by_group", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_USER}
                 INNER JOIN usergroup_user ugu ON ugu.user_id = u.id
                 WHERE ugu.usergroup_id = ?1
                 ORDER BY u.id"
            ))?;
            let rows = stmt.query_map(params![usergroup_id], row_to_user)?;
            rows.collect()
        })
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Persist profile fields, the active flag, `updated_at` and the default
    /// group pointer. Returns `false` if no such user exists.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let updated = self.transact(EntityKind::User, "update", |tx| {
            let affected = tx.execute(
                "UPDATE user
                 SET first_name = ?2, last_name = ?3, email = ?4, is_active = ?5, updated_at = ?6
                 WHERE id = ?1",
                params![
                    user.id(),
                    user.profile().first_name,
                    user.profile().last_name,
                    user.email(),
                    user.is_active,
                    fmt_ts(&user.updated_at()),
                ],
            )?;
            if affected == 0 {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO usersetting (user_id, default_group_id) VALUES (?1, ?2)
                 ON CONFLICT (user_id) DO UPDATE SET default_group_id = excluded.default_group_id",
                params![user.id(), user.default_group_id()],
            )?;
            Ok(true)
        })?;

        if updated {
            tracing::debug!(user_id = user.id(), "user updated");
        }
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let profile = UserProfile {
        external_id: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
    };
    let created_str: String = row.get(7)?;
    let updated_str: String = row.get(8)?;

    User::restore(
        row.get(0)?,
        profile,
        row.get(6)?,
        parse_ts(7, &created_str)?,
        parse_ts(8, &updated_str)?,
        row.get(9)?,
    )
    .map_err(|e| invalid_row(9, e))
}
