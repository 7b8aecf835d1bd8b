//! Role group models.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserSummary;

/// Role group stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleGroup {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Simple form embedded in user payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleGroupSummary {
    pub id: i32,
    pub name: String,
}

impl From<RoleGroup> for RoleGroupSummary {
    fn from(g: RoleGroup) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

/// Full role group payload with members and visible report ids.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleGroupDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub users: Vec<UserSummary>,
    pub user_count: usize,
    pub visible_reports: Vec<i32>,
}

impl RoleGroupDetail {
    pub fn new(group: RoleGroup, users: Vec<UserSummary>, visible_reports: Vec<i32>) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            created_at: group.created_at,
            updated_at: group.updated_at,
            user_count: users.len(),
            users,
            visible_reports,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRoleGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Add members: either a single `user_id` or a `user_ids` list.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddGroupUsersRequest {
    pub user_id: Option<i32>,
    pub user_ids: Option<Vec<i32>>,
}

impl AddGroupUsersRequest {
    /// Requested ids, de-duplicated and in ascending order.
    pub fn ids(&self) -> BTreeSet<i32> {
        let mut ids: BTreeSet<i32> = self.user_id.into_iter().collect();
        if let Some(list) = &self.user_ids {
            ids.extend(list.iter().copied());
        }
        ids
    }
}

/// Replace the whole visible-report set of a group.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVisibleReportsRequest {
    pub report_ids: Vec<i32>,
}
