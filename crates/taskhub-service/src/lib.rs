//! # taskhub-service
//!
//! Use cases built from the entity constructors in `taskhub-shared` and the
//! store operations in `taskhub-store`. Each function validates its input
//! before touching the database, resolves the parents it depends on, and
//! reports absence as [`ServiceError::NotFound`].
//!
//! Every function takes the [`Database`](taskhub_store::Database) it works
//! against; the embedding process owns the handle and its configuration.

pub mod chats;
pub mod containers;
pub mod error;
pub mod groups;
pub mod tasks;
pub mod telemetry;
pub mod users;

pub use error::{Result, ServiceError};
