//! Chat membership records.
//!
//! Role and status are closed enums. Any status may follow any other; the only
//! check is that the value is one of the known ones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    Left,
    Banned,
    Muted,
    Pending,
}

impl ParticipantStatus {
    pub const ALL: [ParticipantStatus; 5] = [
        ParticipantStatus::Active,
        ParticipantStatus::Left,
        ParticipantStatus::Banned,
        ParticipantStatus::Muted,
        ParticipantStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Left => "left",
            ParticipantStatus::Banned => "banned",
            ParticipantStatus::Muted => "muted",
            ParticipantStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ParticipantStatus::Active),
            "left" => Ok(ParticipantStatus::Left),
            "banned" => Ok(ParticipantStatus::Banned),
            "muted" => Ok(ParticipantStatus::Muted),
            "pending" => Ok(ParticipantStatus::Pending),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A user's membership in one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParticipantRecord")]
pub struct ChatParticipant {
    id: Uuid,
    chat_id: Uuid,
    user_id: i64,
    joined_at: DateTime<Utc>,
    role: Role,
    status: ParticipantStatus,
}

#[derive(Deserialize)]
struct ParticipantRecord {
    id: Uuid,
    chat_id: Uuid,
    user_id: i64,
    joined_at: DateTime<Utc>,
    role: String,
    status: String,
}

impl TryFrom<ParticipantRecord> for ChatParticipant {
    type Error = ValidationError;

    fn try_from(raw: ParticipantRecord) -> Result<Self, Self::Error> {
        ChatParticipant::restore(
            raw.id,
            raw.chat_id,
            raw.user_id,
            raw.joined_at,
            &raw.role,
            &raw.status,
        )
    }
}

impl ChatParticipant {
    /// New participants always start out [`ParticipantStatus::Active`].
    pub fn new(chat_id: Uuid, user_id: i64, role: &str) -> Result<Self, ValidationError> {
        let role: Role = role.parse()?;
        Ok(Self {
            id: Uuid::new_v4(),
            chat_id,
            user_id,
            joined_at: clock::now(),
            role,
            status: ParticipantStatus::Active,
        })
    }

    pub fn restore(
        id: Uuid,
        chat_id: Uuid,
        user_id: i64,
        joined_at: DateTime<Utc>,
        role: &str,
        status: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            chat_id,
            user_id,
            joined_at,
            role: role.parse()?,
            status: status.parse()?,
        })
    }

    /// Change the role. The participant is left untouched on error.
    pub fn update_role(&mut self, role: &str) -> Result<(), ValidationError> {
        self.role = role.parse()?;
        Ok(())
    }

    /// Change the status. The participant is left untouched on error.
    pub fn update_status(&mut self, status: &str) -> Result<(), ValidationError> {
        self.status = status.parse()?;
        Ok(())
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn set_status(&mut self, status: ParticipantStatus) {
        self.status = status;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chat_id(&self) -> Uuid {
        self.chat_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> ParticipantStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }
}
