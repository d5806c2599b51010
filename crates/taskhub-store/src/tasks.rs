//! CRUD operations for [`Task`] records and their `taskcontainer_task` join
//! rows.

use rusqlite::{params, OptionalExtension, Row};
use taskhub_shared::{EntityKind, Task, TaskFilter};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::rows::{fmt_ts, parse_ts, parse_uuid};

const SELECT_TASK: &str = "SELECT t.id, t.name, t.description, t.type, t.created_at, t.updated_at,
        t.target_date, t.priority, t.category, t.is_completed, t.is_important
     FROM task t";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a task and its join row to `container_id` in one transaction.
    ///
    /// If the join row cannot be written (for example the container does not
    /// exist) the task row is rolled back as well.
    pub fn create_task(&self, container_id: Uuid, task: &Task) -> Result<()> {
        self.transact(EntityKind::Task, "create", |tx| {
            tx.execute(
                "INSERT INTO task (id, name, description, type, created_at, updated_at,
                                   target_date, priority, category, is_completed, is_important)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    task.id.to_string(),
                    task.name,
                    task.description,
                    task.task_type,
                    fmt_ts(&task.created_at),
                    fmt_ts(&task.updated_at),
                    task.target_date.as_ref().map(fmt_ts),
                    task.priority,
                    task.category,
                    task.is_completed,
                    task.is_important,
                ],
            )?;
            tx.execute(
                "INSERT INTO taskcontainer_task (taskcontainer_id, task_id) VALUES (?1, ?2)",
                params![container_id.to_string(), task.id.to_string()],
            )?;
            Ok(())
        })?;

        tracing::debug!(task_id = %task.id, container_id = %container_id, "task created");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        self.run(EntityKind::Task, "get", |conn| {
            conn.query_row(
                &format!("{SELECT_TASK} WHERE t.id = ?1"),
                params![id.to_string()],
                row_to_task,
            )
            .optional()
        })
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.run(EntityKind::Task, "list", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_TASK} ORDER BY t.created_at ASC"))?;
            let rows = stmt.query_map([], row_to_task)?;
            rows.collect()
        })
    }

    pub fn list_tasks_by_container(&self, container_id: Uuid) -> Result<Vec<Task>> {
        self.run(EntityKind::Task, "list_by_container", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_TASK}
                 INNER JOIN taskcontainer_task tct ON tct.task_id = t.id
                 WHERE tct.taskcontainer_id = ?1
                 ORDER BY t.created_at ASC"
            ))?;
            let rows = stmt.query_map(params![container_id.to_string()], row_to_task)?;
            rows.collect()
        })
    }

    /// Tasks in any container of the group.
    pub fn list_tasks_by_group(&self, usergroup_id: i64) -> Result<Vec<Task>> {
        self.list_tasks_by_group_filtered(usergroup_id, TaskFilter::All)
    }

    pub fn list_tasks_by_group_filtered(
        &self,
        usergroup_id: i64,
        filter: TaskFilter,
    ) -> Result<Vec<Task>> {
        self.run(EntityKind::Task, "list_by_group", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_TASK}
                 WHERE t.id IN (
                     SELECT tct.task_id
                     FROM taskcontainer_task tct
                     INNER JOIN taskcontainer tc ON tc.id = tct.taskcontainer_id
                     WHERE tc.usergroup_id = ?1
                 )
                 AND (?2 IS NULL OR t.is_important = ?2)
                 ORDER BY t.created_at ASC"
            ))?;
            let rows = stmt.query_map(params![usergroup_id, filter.importance()], row_to_task)?;
            rows.collect()
        })
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Persist every mutable field of the task. Returns `false` if no such
    /// task exists.
    pub fn update_task(&self, task: &Task) -> Result<bool> {
        let affected = self.run(EntityKind::Task, "update", |conn| {
            conn.execute(
                "UPDATE task
                 SET name = ?2, description = ?3, type = ?4, updated_at = ?5, target_date = ?6,
                     priority = ?7, category = ?8, is_completed = ?9, is_important = ?10
                 WHERE id = ?1",
                params![
                    task.id.to_string(),
                    task.name,
                    task.description,
                    task.task_type,
                    fmt_ts(&task.updated_at),
                    task.target_date.as_ref().map(fmt_ts),
                    task.priority,
                    task.category,
                    task.is_completed,
                    task.is_important,
                ],
            )
        })?;
        Ok(affected > 0)
    }

    pub fn set_task_completed(&self, id: Uuid, is_completed: bool) -> Result<bool> {
        let affected = self.run(EntityKind::Task, "set_completed", |conn| {
            conn.execute(
                "UPDATE task SET is_completed = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), is_completed, fmt_ts(&taskhub_shared::clock::now())],
            )
        })?;
        Ok(affected > 0)
    }

    pub fn set_task_important(&self, id: Uuid, is_important: bool) -> Result<bool> {
        let affected = self.run(EntityKind::Task, "set_important", |conn| {
            conn.execute(
                "UPDATE task SET is_important = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), is_important, fmt_ts(&taskhub_shared::clock::now())],
            )
        })?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a task's join rows and then the task, in one transaction.
    /// Returns `false` if the task did not exist.
    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let deleted = self.transact(EntityKind::Task, "delete", |tx| {
            let id = id.to_string();
            tx.execute("DELETE FROM taskcontainer_task WHERE task_id = ?1", params![id])?;
            let affected = tx.execute("DELETE FROM task WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })?;

        if deleted {
            tracing::debug!(task_id = %id, "task deleted");
        }
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Task`].
fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    let target_str: Option<String> = row.get(6)?;

    Ok(Task {
        id: parse_uuid(0, &id_str)?,
        name: row.get(1)?,
        description: row.get(2)?,
        task_type: row.get(3)?,
        created_at: parse_ts(4, &created_str)?,
        updated_at: parse_ts(5, &updated_str)?,
        target_date: target_str.map(|s| parse_ts(6, &s)).transpose()?,
        priority: row.get(7)?,
        category: row.get(8)?,
        is_completed: row.get(9)?,
        is_important: row.get(10)?,
    })
}
