use taskhub_shared::constants::NO_DEFAULT_GROUP;
use taskhub_shared::{EntityKind, IdentityClaims, User, UserProfile};
use taskhub_store::Database;
use tracing::info;

use crate::error::{Result, ServiceError};

/// Create the local user record for an authenticated caller.
///
/// The external id always comes from the claims, whatever `profile` says.
/// If the caller is already registered the stored user is returned as is.
pub fn register_user(
    db: &Database,
    claims: &impl IdentityClaims,
    mut profile: UserProfile,
) -> Result<User> {
    let external_id = claims.external_user_id()?;
    if let Some(existing) = db.get_user_by_external_id(external_id)? {
        return Ok(existing);
    }

    profile.external_id = external_id.to_string();
    let user = User::new(profile);
    let id = db.create_user(&user)?;

    info!(user_id = id, external_id, "user registered");
    Ok(user.with_id(id))
}

/// The stored user behind the claims.
pub fn current_user(db: &Database, claims: &impl IdentityClaims) -> Result<User> {
    let external_id = claims.external_user_id()?;
    db.get_user_by_external_id(external_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::User, external_id))
}

pub(crate) fn require_user(db: &Database, user_id: i64) -> Result<User> {
    db.get_user(user_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::User, user_id))
}

/// Point the user's default group at `group_id`.
///
/// Unlike [`User::update_default_group_id`], which only guards the value
/// itself, this requires the group to exist and the user to belong to it.
/// `NO_DEFAULT_GROUP` names no group; it goes through the same no-op check
/// and then clears the pointer like [`clear_default_group`].
pub fn set_default_group(db: &Database, user_id: i64, group_id: i64) -> Result<User> {
    let mut user = require_user(db, user_id)?;
    user.update_default_group_id(group_id)?;

    if group_id == NO_DEFAULT_GROUP {
        return save_user(db, user);
    }

    if db.get_usergroup(group_id)?.is_none() {
        return Err(ServiceError::not_found(EntityKind::UserGroup, group_id));
    }
    if !db.is_member(group_id, user_id)? {
        return Err(ServiceError::NotAMember { user_id, group_id });
    }

    let user = save_user(db, user)?;
    info!(user_id, group_id, "default group set");
    Ok(user)
}

pub fn clear_default_group(db: &Database, user_id: i64) -> Result<User> {
    let mut user = require_user(db, user_id)?;
    user.clear_default_group();
    save_user(db, user)
}

fn save_user(db: &Database, user: User) -> Result<User> {
    if !db.update_user(&user)? {
        return Err(ServiceError::not_found(EntityKind::User, user.id()));
    }
    Ok(user)
}
