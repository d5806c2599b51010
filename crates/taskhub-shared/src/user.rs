//! Users and their default-group pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::constants::NO_DEFAULT_GROUP;
use crate::error::ValidationError;

/// Profile fields supplied when a user signs up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity assigned by the auth provider. Never changes.
    pub external_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    /// Row id; `0` until the user has been persisted.
    id: i64,
    #[serde(flatten)]
    profile: UserProfile,
    pub is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    default_group_id: i64,
}

/// Wire shape of [`User`]; decoding goes through [`User::restore`].
#[derive(Deserialize)]
struct UserRecord {
    id: i64,
    #[serde(flatten)]
    profile: UserProfile,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    default_group_id: i64,
}

impl TryFrom<UserRecord> for User {
    type Error = ValidationError;

    fn try_from(raw: UserRecord) -> Result<Self, Self::Error> {
        User::restore(
            raw.id,
            raw.profile,
            raw.is_active,
            raw.created_at,
            raw.updated_at,
            raw.default_group_id,
        )
    }
}

impl User {
    pub fn new(profile: UserProfile) -> Self {
        let now = clock::now();
        Self {
            id: 0,
            profile,
            is_active: true,
            created_at: now,
            updated_at: now,
            default_group_id: NO_DEFAULT_GROUP,
        }
    }

    /// Rebuild a persisted user.
    pub fn restore(
        id: i64,
        profile: UserProfile,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        default_group_id: i64,
    ) -> Result<Self, ValidationError> {
        if default_group_id < 0 {
            return Err(ValidationError::NegativeGroupId(default_group_id));
        }
        Ok(Self {
            id,
            profile,
            is_active,
            created_at,
            updated_at,
            default_group_id,
        })
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Point the user at a new default group.
    ///
    /// Rejects negative ids and ids equal to the current value; neither case
    /// touches the user. The group is not checked for existence here.
    pub fn update_default_group_id(&mut self, group_id: i64) -> Result<(), ValidationError> {
        if group_id < 0 {
            return Err(ValidationError::NegativeGroupId(group_id));
        }
        if group_id == self.default_group_id {
            return Err(ValidationError::NoOpUpdate);
        }
        self.default_group_id = group_id;
        self.touch();
        Ok(())
    }

    /// Reset the default group. Always refreshes `updated_at`, even when no
    /// group was set.
    pub fn clear_default_group(&mut self) {
        self.default_group_id = NO_DEFAULT_GROUP;
        self.touch();
    }

    pub fn update_profile(&mut self, first_name: &str, last_name: &str, email: &str) {
        self.profile.first_name = first_name.to_string();
        self.profile.last_name = last_name.to_string();
        self.profile.email = email.to_string();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = clock::now();
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn external_id(&self) -> &str {
        &self.profile.external_id
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn default_group_id(&self) -> i64 {
        self.default_group_id
    }

    pub fn has_default_group(&self) -> bool {
        self.default_group_id != NO_DEFAULT_GROUP
    }
}
