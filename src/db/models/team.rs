//! Team member models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// Membership lifecycle of an invited collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Pending,
    Inactive,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Active => f.pad("active"),
            MemberStatus::Pending => f.pad("pending"),
            MemberStatus::Inactive => f.pad("inactive"),
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "pending" => Ok(MemberStatus::Pending),
            "inactive" => Ok(MemberStatus::Inactive),
            _ => Err(format!("Unknown member status: {}", s)),
        }
    }
}

/// A collaborator on the team. Distinct from [`super::User`]: invited members
/// have not necessarily signed in yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

/// Request to invite a member
#[derive(Debug, Clone)]
pub struct NewTeamMember {
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: UserRole,
}

/// Request to update a member
#[derive(Debug, Clone, Default)]
pub struct TeamMemberPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<MemberStatus>,
}

impl TeamMember {
    pub fn apply(&mut self, patch: TeamMemberPatch) {
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
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}
