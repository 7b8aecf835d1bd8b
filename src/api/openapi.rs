//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Report Access Server",
        version = "0.3.0",
        description = "Access control for embedded Power BI reports: users, role groups, reports, tags and DingTalk login"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::root,
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::dingtalk_url,
        api::auth::dingtalk_callback,
        api::auth::logout,
        api::auth::current_user,
        // Report endpoints
        api::reports::list_reports,
        api::reports::get_report,
        api::reports::create_report,
        api::reports::update_report,
        api::reports::update_report_post,
        api::reports::delete_report,
        api::reports::delete_report_permanent,
        api::reports::add_report_tag,
        api::reports::remove_report_tag,
        // Tag endpoints
        api::tags::list_tags,
        api::tags::get_tag,
        api::tags::create_tag,
        api::tags::update_tag,
        api::tags::delete_tag,
        // Role group endpoints
        api::role_groups::list_role_groups,
        api::role_groups::get_role_group,
        api::role_groups::create_role_group,
        api::role_groups::update_role_group,
        api::role_groups::delete_role_group,
        api::role_groups::list_group_users,
        api::role_groups::add_group_users,
        api::role_groups::remove_group_user,
        api::role_groups::list_visible_reports,
        api::role_groups::set_visible_reports,
        api::role_groups::add_visible_report,
        api::role_groups::remove_visible_report,
        api::role_groups::list_available_reports,
        // User endpoints
        api::users::list_users,
        api::users::get_user,
        api::users::create_user,
        api::users::update_user,
        api::users::delete_user,
        api::users::list_user_role_groups,
        api::users::set_user_role_groups,
        api::users::remove_user_role_group,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            // Health
            api::health::StatusResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::AuthUrlResponse,
            models::CallbackRequest,
            models::LoginResponse,
            // Reports and tags
            models::ReportResponse,
            models::CreateReportRequest,
            models::UpdateReportRequest,
            models::AddTagRequest,
            models::Tag,
            models::CreateTagRequest,
            models::UpdateTagRequest,
            // Role groups
            models::RoleGroupDetail,
            models::RoleGroupSummary,
            models::CreateRoleGroupRequest,
            models::UpdateRoleGroupRequest,
            models::AddGroupUsersRequest,
            models::SetVisibleReportsRequest,
            // Users
            models::UserRole,
            models::UserResponse,
            models::UserSummary,
            models::CreateUserRequest,
            models::UpdateUserRequest,
            models::SetUserRoleGroupsRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "DingTalk login and sessions"),
        (name = "Reports", description = "Report management and visibility"),
        (name = "Tags", description = "Report tags"),
        (name = "Role Groups", description = "Role groups, membership and visible reports"),
        (name = "Users", description = "User administration")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session cookie security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new(
                            crate::config::SESSION_COOKIE,
                        ),
                    ),
                ),
            );
        }
    }
}
