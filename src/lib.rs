//! # marsdb - Mars mission database
//!
//! Data-access layer for a small relational schema of Mars exploration
//! missions: geographical objects, transports, stations, scientists,
//! statuses, users and the location join table, stored in SQLite.

pub mod cli;
pub mod core;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use crate::core::{Argon2Params, Gateway, MissionStatus, TaskStatus};
pub use crate::error::{Error, Result};

pub use crate::db::DbPath;
