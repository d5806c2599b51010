use taskhub_shared::TaskContainer;
use taskhub_store::Database;
use tracing::info;

use crate::error::Result;
use crate::groups::require_group;

/// Create a container under an existing group.
pub fn create_container(
    db: &Database,
    group_id: i64,
    name: &str,
    description: &str,
    container_type: &str,
) -> Result<TaskContainer> {
    let container = TaskContainer::new(group_id, name, description, container_type)?;
    require_group(db, group_id)?;

    db.create_container(&container)?;
    info!(container_id = %container.id, usergroup_id = group_id, "container created");
    Ok(container)
}
