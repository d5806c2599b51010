//! Chats and their association shapes.
//!
//! A chat is one of three variants. The variant fixes which owning references
//! must be present:
//!
//! | variant     | group     | container |
//! |-------------|-----------|-----------|
//! | `private`   | forbidden | forbidden |
//! | `group`     | required  | forbidden |
//! | `container` | required  | required  |
//!
//! [`ChatKind`] carries the references inside the variant, so a [`Chat`] value
//! with the wrong shape cannot be represented. All construction goes through
//! [`Chat::new`] (or [`Chat::restore`] for persisted rows), which validates the
//! loosely typed inputs coming from callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Container,
}

impl ChatType {
    pub const ALL: [ChatType; 3] = [ChatType::Private, ChatType::Group, ChatType::Container];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
            ChatType::Container => "container",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ChatType::Private),
            "group" => Ok(ChatType::Group),
            "container" => Ok(ChatType::Container),
            other => Err(ValidationError::InvalidChatType(other.to_string())),
        }
    }
}

/// The variant of a chat together with the owning references it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group {
        usergroup_id: i64,
    },
    Container {
        usergroup_id: i64,
        container_id: Uuid,
    },
}

impl ChatKind {
    /// Check a (type, group, container) triple against the variant table.
    ///
    /// An empty or blank container reference counts as absent.
    pub fn from_parts(
        chat_type: ChatType,
        usergroup_id: Option<i64>,
        container_id: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let container_ref = container_id.map(str::trim).filter(|c| !c.is_empty());
        let violation = |reason| ValidationError::InvalidChatAssociation {
            chat_type: chat_type.as_str(),
            reason,
        };

        match (chat_type, usergroup_id, container_ref) {
            (ChatType::Private, None, None) => Ok(ChatKind::Private),
            (ChatType::Private, Some(_), _) => {
                Err(violation("private chats cannot have a user group"))
            }
            (ChatType::Private, None, Some(_)) => {
                Err(violation("private chats cannot have a container"))
            }

            (ChatType::Group, Some(usergroup_id), None) => Ok(ChatKind::Group { usergroup_id }),
            (ChatType::Group, None, _) => Err(violation("group chats must have a user group")),
            (ChatType::Group, Some(_), Some(_)) => {
                Err(violation("group chats cannot have a container"))
            }

            (ChatType::Container, Some(usergroup_id), Some(raw)) => {
                let container_id = Uuid::parse_str(raw)
                    .map_err(|_| violation("container reference is not a valid id"))?;
                Ok(ChatKind::Container {
                    usergroup_id,
                    container_id,
                })
            }
            (ChatType::Container, None, _) => {
                Err(violation("container chats must have a user group"))
            }
            (ChatType::Container, Some(_), None) => {
                Err(violation("container chats must have a container"))
            }
        }
    }

    pub fn chat_type(&self) -> ChatType {
        match self {
            ChatKind::Private => ChatType::Private,
            ChatKind::Group { .. } => ChatType::Group,
            ChatKind::Container { .. } => ChatType::Container,
        }
    }

    pub fn usergroup_id(&self) -> Option<i64> {
        match self {
            ChatKind::Private => None,
            ChatKind::Group { usergroup_id } | ChatKind::Container { usergroup_id, .. } => {
                Some(*usergroup_id)
            }
        }
    }

    pub fn container_id(&self) -> Option<Uuid> {
        match self {
            ChatKind::Container { container_id, .. } => Some(*container_id),
            _ => None,
        }
    }
}

/// A chat thread. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    id: Uuid,
    #[serde(flatten)]
    kind: ChatKind,
    created_at: DateTime<Utc>,
}

impl Chat {
    /// Build a new chat from caller input.
    ///
    /// Fails with [`ValidationError::InvalidChatType`] for an unknown type and
    /// with [`ValidationError::InvalidChatAssociation`] when the references do
    /// not match the variant exactly.
    pub fn new(
        chat_type: &str,
        usergroup_id: Option<i64>,
        container_id: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let chat_type: ChatType = chat_type.parse()?;
        let kind = ChatKind::from_parts(chat_type, usergroup_id, container_id)?;
        Ok(Self::from_kind(kind))
    }

    pub fn new_group_chat(usergroup_id: i64) -> Result<Self, ValidationError> {
        Self::new(ChatType::Group.as_str(), Some(usergroup_id), None)
    }

    pub fn new_container_chat(
        usergroup_id: i64,
        container_id: &str,
    ) -> Result<Self, ValidationError> {
        Self::new(ChatType::Container.as_str(), Some(usergroup_id), Some(container_id))
    }

    pub fn new_private_chat() -> Result<Self, ValidationError> {
        Self::new(ChatType::Private.as_str(), None, None)
    }

    /// Build a chat from an already typed variant. Always valid.
    pub fn from_kind(kind: ChatKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            created_at: clock::now(),
        }
    }

    /// Rebuild a persisted chat, re-running the same shape checks as [`Chat::new`].
    pub fn restore(
        id: Uuid,
        chat_type: &str,
        usergroup_id: Option<i64>,
        container_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let chat_type: ChatType = chat_type.parse()?;
        let kind = ChatKind::from_parts(chat_type, usergroup_id, container_id)?;
        Ok(Self {
            id,
            kind,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &ChatKind {
        &self.kind
    }

    pub fn chat_type(&self) -> ChatType {
        self.kind.chat_type()
    }

    pub fn usergroup_id(&self) -> Option<i64> {
        self.kind.usergroup_id()
    }

    pub fn container_id(&self) -> Option<Uuid> {
        self.kind.container_id()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_private_chat(&self) -> bool {
        matches!(self.kind, ChatKind::Private)
    }

    pub fn is_group_chat(&self) -> bool {
        matches!(self.kind, ChatKind::Group { .. })
    }

    pub fn is_container_chat(&self) -> bool {
        matches!(self.kind, ChatKind::Container { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_shape(chat_type: ChatType, group: bool, container: bool) -> bool {
        match chat_type {
            ChatType::Private => !group && !container,
            ChatType::Group => group && !container,
            ChatType::Container => group && container,
        }
    }

    #[test]
    fn shape_table_holds_for_every_combination() {
        let container = Uuid::new_v4().to_string();
        let groups = [None, Some(0), Some(7)];
        let containers = [None, Some(""), Some("   "), Some(container.as_str())];

        for chat_type in ChatType::ALL {
            for group in groups {
                for container_ref in containers {
                    let has_container = container_ref.is_some_and(|c| !c.trim().is_empty());
                    let result = Chat::new(chat_type.as_str(), group, container_ref);
                    let valid = expected_shape(chat_type, group.is_some(), has_container);

                    assert_eq!(
                        result.is_ok(),
                        valid,
                        "{chat_type} group={group:?} container={container_ref:?}"
                    );
                    match result {
                        Ok(chat) => {
                            assert_eq!(chat.chat_type(), chat_type);
                            assert_eq!(chat.usergroup_id(), group);
                            assert_eq!(chat.container_id().is_some(), has_container);
                        }
                        Err(e) => assert!(matches!(
                            e,
                            ValidationError::InvalidChatAssociation { .. }
                        )),
                    }
                }
            }
        }
    }

    #[test]
    fn unknown_type_is_rejected_before_shape() {
        for bad in ["", "Group", "channel", " private"] {
            assert_eq!(
                Chat::new(bad, None, None),
                Err(ValidationError::InvalidChatType(bad.to_string()))
            );
        }
    }

    #[test]
    fn container_chat_without_container_fails() {
        let err = Chat::new_container_chat(5, "").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidChatAssociation {
                chat_type: "container",
                ..
            }
        ));
    }

    #[test]
    fn container_chat_with_malformed_id_fails() {
        assert!(Chat::new_container_chat(5, "not-a-uuid").is_err());
    }

    #[test]
    fn convenience_constructors() {
        let container = Uuid::new_v4();

        assert!(Chat::new_private_chat().unwrap().is_private_chat());

        let group = Chat::new_group_chat(3).unwrap();
        assert!(group.is_group_chat());
        assert_eq!(group.usergroup_id(), Some(3));
        assert_eq!(group.container_id(), None);

        let scoped = Chat::new_container_chat(3, &container.to_string()).unwrap();
        assert!(scoped.is_container_chat());
        assert_eq!(scoped.container_id(), Some(container));
    }

    #[test]
    fn creation_times_are_ordered() {
        let first = Chat::new_private_chat().unwrap();
        let second = Chat::new_private_chat().unwrap();
        assert!(second.created_at() > first.created_at());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn restore_revalidates() {
        let now = Utc::now();
        assert!(Chat::restore(Uuid::new_v4(), "group", None, None, now).is_err());
        let chat = Chat::restore(Uuid::new_v4(), "group", Some(1), None, now).unwrap();
        assert_eq!(chat.created_at(), now);
    }

    #[test]
    fn serializes_with_type_tag() {
        let chat = Chat::new_group_chat(9).unwrap();
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["usergroup_id"], 9);

        let back: Chat = serde_json::from_value(json).unwrap();
        assert_eq!(back, chat);
    }
}
