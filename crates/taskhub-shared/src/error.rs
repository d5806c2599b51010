use thiserror::Error;

/// Invariant violations raised by the entity constructors and mutators.
///
/// Every variant is produced before any store call is made, so the caller can
/// always fix the input and try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid chat type: {0:?}")]
    InvalidChatType(String),

    #[error("Invalid association for {chat_type} chat: {reason}")]
    InvalidChatAssociation {
        chat_type: &'static str,
        reason: &'static str,
    },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Type cannot be empty")]
    EmptyType,

    #[error("Group ID cannot be negative: {0}")]
    NegativeGroupId(i64),

    #[error("Value is already set to the requested one")]
    NoOpUpdate,

    #[error("Invalid participant role: {0:?}")]
    InvalidRole(String),

    #[error("Invalid participant status: {0:?}")]
    InvalidStatus(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Token carries no subject claim")]
    MissingSubject,

    #[error("Token has expired")]
    Expired,
}
