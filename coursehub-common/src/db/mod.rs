//! Database initialization and per-table queries
//!
//! Every function takes the pool (or an open transaction) explicitly; there is
//! no in-process cache in front of the database.

pub mod community;
pub mod courses;
pub mod enrollments;
pub mod init;
pub mod lessons;
pub mod progress;
pub mod sessions;
pub mod users;

pub use init::{create_schema, init_database, init_memory_database, SCHEMA_VERSION};
