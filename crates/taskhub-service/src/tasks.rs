use taskhub_shared::{EntityKind, Task, TaskFilter};
use taskhub_store::Database;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::groups::require_group;

/// Store a task and its link to `container_id`.
pub fn create_task(db: &Database, container_id: Uuid, task: Task) -> Result<Task> {
    if db.get_container(container_id)?.is_none() {
        return Err(ServiceError::not_found(EntityKind::TaskContainer, container_id));
    }

    db.create_task(container_id, &task)?;
    info!(task_id = %task.id, %container_id, "task created");
    Ok(task)
}

/// Tasks across every container of a group.
pub fn list_group_tasks(db: &Database, group_id: i64, filter: TaskFilter) -> Result<Vec<Task>> {
    require_group(db, group_id)?;
    Ok(db.list_tasks_by_group_filtered(group_id, filter)?)
}

pub fn toggle_important(db: &Database, task_id: Uuid) -> Result<Task> {
    let task = require_task(db, task_id)?;
    db.set_task_important(task_id, !task.is_important)?;
    require_task(db, task_id)
}

pub fn mark_done(db: &Database, task_id: Uuid) -> Result<Task> {
    let task = require_task(db, task_id)?;
    if !task.is_completed {
        db.set_task_completed(task_id, true)?;
    }
    require_task(db, task_id)
}

fn require_task(db: &Database, task_id: Uuid) -> Result<Task> {
    db.get_task(task_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Task, task_id))
}
