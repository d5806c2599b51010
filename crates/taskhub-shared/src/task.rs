use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::constants::DEFAULT_TASK_PRIORITY;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub target_date: Option<DateTime<Utc>>,
    pub priority: String,
    pub category: String,
    pub is_completed: bool,
    pub is_important: bool,
}

impl Task {
    pub fn new(name: &str, description: &str, task_type: &str) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let now = clock::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            task_type: task_type.to_string(),
            created_at: now,
            updated_at: now,
            target_date: None,
            priority: DEFAULT_TASK_PRIORITY.to_string(),
            category: String::new(),
            is_completed: false,
            is_important: false,
        })
    }

    pub fn with_target_date(mut self, target: DateTime<Utc>) -> Self {
        self.target_date = Some(target);
        self
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.priority = priority.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn important(mut self, is_important: bool) -> Self {
        self.is_important = is_important;
        self
    }

    /// Refresh `updated_at` after editing fields in place.
    pub fn touch(&mut self) {
        self.updated_at = clock::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let t = Task::new("Fix bug", "", "bug").unwrap();
        assert_eq!(t.priority, DEFAULT_TASK_PRIORITY);
        assert!(!t.is_completed);
        assert!(!t.is_important);
        assert!(t.target_date.is_none());
    }

    #[test]
    fn empty_name_rejected() {
        assert_eq!(Task::new("", "d", "bug"), Err(ValidationError::EmptyName));
    }

    #[test]
    fn touch_advances() {
        let mut t = Task::new("a", "", "").unwrap().important(true);
        let before = t.updated_at;
        t.touch();
        assert!(t.updated_at > before);
        assert!(t.is_important);
    }
}
