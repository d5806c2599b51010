use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_ACTIVITY_LEVEL;
use crate::error::ValidationError;

/// A board of tasks owned by exactly one user group.
///
/// The owning group must exist when the container is stored; callers resolve
/// it first and the store's foreign key backs that up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContainer {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub container_type: String,
    pub is_active: bool,
    pub activity_level: i64,
    pub usergroup_id: i64,
}

impl TaskContainer {
    pub fn new(
        usergroup_id: i64,
        name: &str,
        description: &str,
        container_type: &str,
    ) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            container_type: container_type.to_string(),
            is_active: true,
            activity_level: DEFAULT_ACTIVITY_LEVEL,
            usergroup_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_rejected() {
        assert_eq!(
            TaskContainer::new(1, "  ", "", "board"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn fresh_ids() {
        let a = TaskContainer::new(1, "Sprint1", "", "").unwrap();
        let b = TaskContainer::new(1, "Sprint1", "", "").unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.is_active);
    }
}
