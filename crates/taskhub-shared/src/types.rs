use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity families the system persists. Used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    UserGroup,
    Membership,
    TaskContainer,
    Task,
    Chat,
    ChatParticipant,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::UserGroup => "usergroup",
            EntityKind::Membership => "usergroup_user",
            EntityKind::TaskContainer => "taskcontainer",
            EntityKind::Task => "task",
            EntityKind::Chat => "chat",
            EntityKind::ChatParticipant => "chat_participant",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slice of a group's tasks to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Important,
    NotImportant,
}

impl TaskFilter {
    /// The `is_important` value to filter on, if any.
    pub fn importance(&self) -> Option<bool> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Important => Some(true),
            TaskFilter::NotImportant => Some(false),
        }
    }
}
