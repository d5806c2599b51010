use taskhub_shared::{EntityKind, IdentityClaims, UserGroup};
use taskhub_store::Database;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::users::{current_user, require_user};

/// Create a group and make the caller its first member, atomically.
pub fn create_group_with_owner(
    db: &Database,
    claims: &impl IdentityClaims,
    name: &str,
    description: &str,
    group_type: &str,
) -> Result<UserGroup> {
    let group = UserGroup::new(name, description, group_type)?;
    let owner = current_user(db, claims)?;

    let id = db.create_usergroup_with_owner(&group, owner.id())?;
    info!(usergroup_id = id, owner_user_id = owner.id(), name, "group created");
    Ok(group.with_id(id))
}

pub(crate) fn require_group(db: &Database, group_id: i64) -> Result<UserGroup> {
    db.get_usergroup(group_id)?
        .ok_or_else(|| ServiceError::not_found(EntityKind::UserGroup, group_id))
}

/// Add a user to a group. Returns `false` if they were already a member.
pub fn join_group(db: &Database, group_id: i64, user_id: i64) -> Result<bool> {
    require_group(db, group_id)?;
    require_user(db, user_id)?;

    let joined = db.add_user_to_group(group_id, user_id)?;
    if joined {
        info!(usergroup_id = group_id, user_id, "user joined group");
    }
    Ok(joined)
}

/// Remove a user from a group. Returns `false` if they were not a member.
///
/// A default-group pointer at the group being left is cleared in the same
/// transaction.
pub fn leave_group(db: &Database, group_id: i64, user_id: i64) -> Result<bool> {
    require_user(db, user_id)?;

    let left = db.leave_usergroup(group_id, user_id)?;
    if left {
        info!(usergroup_id = group_id, user_id, "user left group");
    }
    Ok(left)
}
