//! HTTP API handlers for coursehub-server

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod community;
pub mod enrollment;
pub mod health;
pub mod progress;

pub use accounts::account_routes;
pub use auth::AuthUser;
pub use catalog::catalog_routes;
pub use community::community_routes;
pub use enrollment::enrollment_routes;
pub use health::health_routes;
pub use progress::progress_routes;

use serde::Serialize;

/// `{"message": ...}` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
