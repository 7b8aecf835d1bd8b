//! Domain models for the report access server.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub mod dingtalk;
pub mod report;
pub mod role_group;
pub mod tag;
pub mod user;

// Re-export commonly used types
pub use dingtalk::{AuthUrlResponse, CallbackRequest, ExternalIdentity, LoginResponse};
pub use report::{
    AddTagRequest, CreateReportRequest, Report, ReportResponse, UpdateReportRequest,
};
pub use role_group::{
    AddGroupUsersRequest, CreateRoleGroupRequest, RoleGroup, RoleGroupDetail, RoleGroupSummary,
    SetVisibleReportsRequest, UpdateRoleGroupRequest,
};
pub use tag::{CreateTagRequest, Tag, UpdateTagRequest, normalize_tag_names};
pub use user::{
    CreateUserRequest, SetUserRoleGroupsRequest, UpdateUserRequest, User, UserResponse,
    UserRole, UserSummary,
};

/// Column length limits.
pub mod limits {
    pub const USER_NAME: usize = 100;
    pub const USER_EMAIL: usize = 120;
    pub const GROUP_NAME: usize = 100;
    pub const GROUP_DESCRIPTION: usize = 500;
    pub const REPORT_NAME: usize = 100;
    pub const REPORT_EXTERNAL_ID: usize = 256;
    pub const TAG_NAME: usize = 30;
}

/// Plain `{message}` response.
#[derive(Debug, Serialize, ToSchema)]
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

/// Trim a required name and check it against a length limit.
pub fn required_name(field: &str, value: Option<&str>, max: usize) -> AppResult<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Reject values longer than `max` characters.
pub fn check_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("name", Some("  Sales "), 10).unwrap(), "Sales");
        assert!(matches!(
            required_name("name", Some("   "), 10),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            required_name("name", None, 10),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_length_counts_characters() {
        // Three CJK characters are nine bytes but three characters.
        assert!(check_length("name", "销售部", 3).is_ok());
        assert!(check_length("name", "销售部门", 3).is_err());
    }
}
