//! Directory users and operator roles.
//!
//! Users come from the inventory API's user directory; roles come from the
//! external identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user that assets can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Directory identifier.
    pub id: String,
    /// E-mail address; this is what asset ownership refers to.
    pub email: String,
    /// Display name, when the directory has one.
    #[serde(default)]
    pub name: Option<String>,
}

impl DirectoryUser {
    /// Returns the display name, falling back to the e-mail address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Role claim issued by the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages inventory: assigns, unassigns and changes asset status.
    Admin,
    /// Sees only their own assets.
    #[default]
    Employee,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Returns true if the role may mutate assets.
    pub fn can_manage_assets(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}
