use taskhub_shared::{EntityKind, IdentityError, ValidationError};
use taskhub_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("user {user_id} is not a member of group {group_id}")]
    NotAMember { user_id: i64, group_id: i64 },

    #[error("container {container_id} does not belong to group {group_id}")]
    ContainerOutsideGroup { container_id: Uuid, group_id: i64 },
}

impl ServiceError {
    pub(crate) fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True when the caller asked for something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
