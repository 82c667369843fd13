//! Roles and capabilities
//!
//! Handlers ask for a [`Capability`]; only this module knows which roles
//! grant it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse authorization tier stored on each user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Role {
    #[default]
    Free,
    Premium,
    Admin,
}

/// Actions gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, edit and delete courses and lessons
    ManageCourses,
    /// See who is enrolled in a course
    ViewEnrollments,
    /// Change roles and delete accounts
    ManageUsers,
    /// Edit or delete community content authored by someone else
    ModerateContent,
}

impl Capability {
    fn describe(self) -> &'static str {
        match self {
            Capability::ManageCourses => "manage courses",
            Capability::ViewEnrollments => "view enrollments",
            Capability::ManageUsers => "manage users",
            Capability::ModerateContent => "moderate content",
        }
    }
}

impl Role {
    /// Whether this role grants `capability`
    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ManageCourses
            | Capability::ViewEnrollments
            | Capability::ManageUsers
            | Capability::ModerateContent => self == Role::Admin,
        }
    }

    /// Like [`Role::can`], but returns `Error::Forbidden` when denied
    pub fn require(self, capability: Capability) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Role '{}' is not permitted to {}",
                self,
                capability.describe()
            )))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Free => "free",
            Role::Premium => "premium",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Role::Free),
            "premium" => Ok(Role::Premium),
            // legacy alias used by older clients
            "admin" | "staff" => Ok(Role::Admin),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}
