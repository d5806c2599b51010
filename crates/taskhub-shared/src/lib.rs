//! # taskhub-shared
//!
//! Domain entities for the task-management backend and the invariants that
//! keep each one valid on its own. Nothing in this crate performs I/O; the
//! store and service crates build on these types.

pub mod chat;
pub mod clock;
pub mod constants;
pub mod container;
pub mod error;
pub mod identity;
pub mod participant;
pub mod task;
pub mod types;
pub mod user;
pub mod usergroup;

pub use chat::{Chat, ChatKind, ChatType};
pub use container::TaskContainer;
pub use error::{IdentityError, ValidationError};
pub use identity::{IdentityClaims, VerifiedClaims};
pub use participant::{ChatParticipant, ParticipantStatus, Role};
pub use task::Task;
pub use types::{EntityKind, TaskFilter};
pub use user::{User, UserProfile};
pub use usergroup::UserGroup;
