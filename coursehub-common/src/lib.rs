//! # CourseHub Common Library
//!
//! Shared code for the CourseHub learning platform:
//! - Database initialization and per-table queries
//! - Domain models (users, courses, lessons, enrollments, progress, community content)
//! - Role and capability checks
//! - Password hashing and session tokens
//! - Configuration loading
//! - Course progress tracking and lesson re-scoring

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod progress;
pub mod roles;

pub use error::{Error, Result};
pub use roles::{Capability, Role};
