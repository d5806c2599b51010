use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A group of users that owns task containers.
///
/// Name and type are fixed at construction and always non-empty. Names are
/// not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserGroupRecord")]
pub struct UserGroup {
    /// Row id; `0` until persisted.
    id: i64,
    name: String,
    pub description: String,
    #[serde(rename = "type")]
    group_type: String,
    pub thumbnail: String,
    pub is_active: bool,
}

#[derive(Deserialize)]
struct UserGroupRecord {
    id: i64,
    name: String,
    description: String,
    #[serde(rename = "type")]
    group_type: String,
    thumbnail: String,
    is_active: bool,
}

impl TryFrom<UserGroupRecord> for UserGroup {
    type Error = ValidationError;

    fn try_from(raw: UserGroupRecord) -> Result<Self, Self::Error> {
        UserGroup::restore(
            raw.id,
            raw.name,
            raw.description,
            raw.group_type,
            raw.thumbnail,
            raw.is_active,
        )
    }
}

impl UserGroup {
    pub fn new(name: &str, description: &str, group_type: &str) -> Result<Self, ValidationError> {
        validate(name, group_type)?;
        Ok(Self {
            id: 0,
            name: name.to_string(),
            description: description.to_string(),
            group_type: group_type.to_string(),
            thumbnail: String::new(),
            is_active: true,
        })
    }

    pub fn restore(
        id: i64,
        name: String,
        description: String,
        group_type: String,
        thumbnail: String,
        is_active: bool,
    ) -> Result<Self, ValidationError> {
        validate(&name, &group_type)?;
        Ok(Self {
            id,
            name,
            description,
            group_type,
            thumbnail,
            is_active,
        })
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_type(&self) -> &str {
        &self.group_type
    }
}

fn validate(name: &str, group_type: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if group_type.is_empty() {
        return Err(ValidationError::EmptyType);
    }
    Ok(())
}
