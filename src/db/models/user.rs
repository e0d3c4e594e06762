//! User and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account roles, which select the dashboard a user lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Sees every project and the organisation-wide figures
    Admin,
    /// Sees the projects they created or belong to
    Manager,
    /// Sees the tasks assigned to them
    Member,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Manager, UserRole::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Member => "member",
        }
    }

    /// Whether the role may send broadcast notifications and invite members
    pub fn can_manage_team(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Member
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "member" => Ok(UserRole::Member),
            _ => Err(format!("Unknown user role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Partial update merged into the signed-in user
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<UserRole>,
}

impl User {
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// Persisted authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl AuthSession {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }
}
