//! Group and container chat threads and their membership.

use taskhub_shared::{Chat, ChatKind, ChatParticipant, EntityKind, Role};
use taskhub_store::Database;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::groups::require_group;
use crate::users::require_user;

/// Outcome of [`toggle_membership`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Joined(ChatParticipant),
    Left,
}

/// The group's chat, created on first use.
pub fn open_group_chat(db: &Database, group_id: i64) -> Result<Chat> {
    require_group(db, group_id)?;
    if let Some(chat) = db.get_chat_by_group(group_id)? {
        return Ok(chat);
    }

    let chat = Chat::new_group_chat(group_id)?;
    db.create_chat(&chat)?;
    info!(chat_id = %chat.id(), usergroup_id = group_id, "group chat opened");
    Ok(chat)
}

/// The container's chat, created on first use. The container must belong to
/// `group_id`.
pub fn open_container_chat(db: &Database, group_id: i64, container_id: Uuid) -> Result<Chat> {
    let container = db
        .get_container(container_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::TaskContainer, container_id))?;
    if container.usergroup_id != group_id {
        return Err(ServiceError::ContainerOutsideGroup {
            container_id,
            group_id,
        });
    }
    if let Some(chat) = db.get_chat_by_container(container_id)? {
        return Ok(chat);
    }

    let chat = Chat::new_container_chat(group_id, &container_id.to_string())?;
    db.create_chat(&chat)?;
    info!(chat_id = %chat.id(), %container_id, "container chat opened");
    Ok(chat)
}

/// Join the chat as a member if not in it, otherwise leave it.
///
/// Group and container chats are only open to members of the owning group.
pub fn toggle_membership(
    db: &Database,
    chat_id: Uuid,
    user_id: i64,
) -> Result<MembershipChange> {
    let chat = require_chat(db, chat_id)?;
    require_user(db, user_id)?;

    if db.get_participant_by_user(chat_id, user_id)?.is_some() {
        db.remove_participant(chat_id, user_id)?;
        info!(%chat_id, user_id, "left chat");
        return Ok(MembershipChange::Left);
    }

    match chat.kind() {
        ChatKind::Private => {}
        ChatKind::Group { usergroup_id } | ChatKind::Container { usergroup_id, .. } => {
            if !db.is_member(*usergroup_id, user_id)? {
                return Err(ServiceError::NotAMember {
                    user_id,
                    group_id: *usergroup_id,
                });
            }
        }
    }

    let participant = ChatParticipant::new(chat_id, user_id, Role::Member.as_str())?;
    db.add_participant(&participant)?;
    info!(%chat_id, user_id, "joined chat");
    Ok(MembershipChange::Joined(participant))
}

pub fn change_role(
    db: &Database,
    chat_id: Uuid,
    user_id: i64,
    role: &str,
) -> Result<ChatParticipant> {
    let mut participant = require_participant(db, chat_id, user_id)?;
    participant.update_role(role)?;
    save_participant(db, participant)
}

pub fn change_status(
    db: &Database,
    chat_id: Uuid,
    user_id: i64,
    status: &str,
) -> Result<ChatParticipant> {
    let mut participant = require_participant(db, chat_id, user_id)?;
    participant.update_status(status)?;
    save_participant(db, participant)
}

fn save_participant(db: &Database, participant: ChatParticipant) -> Result<ChatParticipant> {
    if !db.update_participant(&participant)? {
        return Err(participant_not_found(participant.chat_id(), participant.user_id()));
    }
    Ok(participant)
}

fn participant_not_found(chat_id: Uuid, user_id: i64) -> ServiceError {
    ServiceError::not_found(EntityKind::ChatParticipant, format!("{chat_id}/{user_id}"))
}

fn require_chat(db: &Database, chat_id: Uuid) -> Result<Chat> {
    db.get_chat(chat_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Chat, chat_id))
}

fn require_participant(db: &Database, chat_id: Uuid, user_id: i64) -> Result<ChatParticipant> {
    db.get_participant_by_user(chat_id, user_id)?
        .ok_or_else(|| participant_not_found(chat_id, user_id))
}
