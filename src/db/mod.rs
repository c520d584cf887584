//! Database layer for marsdb.
//!
//! Handles the SQLite connection, schema provisioning and seed data.

mod connection;
pub mod schema;
pub mod seed;

pub use connection::{Connection, DbPath};
pub use schema::{Schema, Snapshot, TableDump, TABLES};
