//! User models and the role/permission table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role_group::RoleGroupSummary;

/// Account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    #[default]
    User,
}

/// Permissions granted to plain users. Admins and editors hold every permission.
const USER_PERMISSIONS: &[&str] = &["view_reports"];

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Check a named permission against the static role table.
    ///
    /// Unknown permission names are denied for plain users.
    pub fn has_permission(&self, permission: &str) -> bool {
        match self {
            Self::Admin | Self::Editor => true,
            Self::User => USER_PERMISSIONS.contains(&permission),
        }
    }

    /// Admins and editors see every report along with its Power BI id.
    pub fn sees_all_reports(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User stored in database.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub external_identity_id: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Get the role as enum. Unrecognised values fall back to the least privileged role.
    pub fn role_enum(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role_enum() == UserRole::Admin
    }

    /// A user is bound once its external id differs from the display-name placeholder.
    pub fn is_bound(&self) -> bool {
        match &self.external_identity_id {
            Some(ext) => ext != &self.display_name,
            None => false,
        }
    }
}

/// Minimal user form embedded in role group payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.display_name,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
        }
    }
}

/// User payload returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_bind: bool,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub role_groups: Vec<RoleGroupSummary>,
}

impl UserResponse {
    pub fn new(user: User, role_groups: Vec<RoleGroupSummary>) -> Self {
        Self {
            id: user.id,
            is_bind: user.is_bound(),
            name: user.display_name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login: user.last_login_at,
            role_groups,
        }
    }
}

/// Request body for pre-registering a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: Option<String>,
    /// admin, editor or user (default user)
    pub role: Option<String>,
    pub role_group_ids: Option<Vec<i32>>,
}

/// Partial update of a user.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    /// Replaces the membership set when present.
    pub role_group_ids: Option<Vec<i32>>,
}

/// Replace a user's role groups.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetUserRoleGroupsRequest {
    pub role_group_ids: Vec<i32>,
}
