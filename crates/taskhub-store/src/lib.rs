//! # taskhub-store
//!
//! Relational storage for the task-management backend, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD and association helpers for
//! every entity. Writes that touch more than one table run in a single
//! transaction and roll back as a unit; lookups report a missing row as
//! `None` rather than as an error.

pub mod chats;
pub mod config;
pub mod containers;
pub mod database;
pub mod migrations;
pub mod participants;
pub mod tasks;
pub mod usergroups;
pub mod users;

mod error;
mod rows;

pub use config::StoreConfig;
pub use database::Database;
pub use error::{Result, StoreError};
