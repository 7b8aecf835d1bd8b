//! Role group endpoints: CRUD, membership and report visibility.

use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

use crate::auth::{AccessGate, Permission};
use crate::db::DbPool;
use crate::db::{reports, role_groups, users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddGroupUsersRequest, CreateRoleGroupRequest, ReportResponse, RoleGroupDetail,
    SetVisibleReportsRequest, UpdateRoleGroupRequest, UserSummary, check_length, limits,
    required_name,
};

/// Configure role group routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_role_groups)
        .service(get_role_group)
        .service(create_role_group)
        .service(update_role_group)
        .service(delete_role_group)
        .service(list_group_users)
        .service(add_group_users)
        .service(remove_group_user)
        .service(list_visible_reports)
        .service(set_visible_reports)
        .service(add_visible_report)
        .service(remove_visible_report)
        .service(list_available_reports);
}

/// Full group payload: members and visible report ids.
async fn load_detail<C: ConnectionTrait>(db: &C, group_id: i32) -> AppResult<RoleGroupDetail> {
    let group = role_groups::find_by_id(db, group_id)
        .await?
        .ok_or_else(|| group_not_found(group_id))?;
    let members = role_groups::members(db, group_id).await?;
    let visible = role_groups::visible_report_ids(db, group_id).await?;

    Ok(RoleGroupDetail::new(
        group,
        members.into_iter().map(UserSummary::from).collect(),
        visible,
    ))
}

async fn ensure_group<C: ConnectionTrait>(db: &C, group_id: i32) -> AppResult<()> {
    match role_groups::find_by_id(db, group_id).await? {
        Some(_) => Ok(()),
        None => Err(group_not_found(group_id)),
    }
}

fn group_not_found(group_id: i32) -> AppError {
    AppError::NotFound(format!("Role group {}", group_id))
}

fn checked_description(value: Option<&str>) -> AppResult<Option<&str>> {
    if let Some(d) = value {
        check_length("description", d, limits::GROUP_DESCRIPTION)?;
    }
    Ok(value)
}

#[utoipa::path(
    get,
    path = "/api/role_groups",
    tag = "Role Groups",
    responses((status = 200, description = "All role groups", body = [RoleGroupDetail]))
)]
#[get("/role_groups", wrap = "AccessGate::permission(Permission::ViewRoleGroups)")]
pub async fn list_role_groups(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let db = pool.connection();
    let groups = role_groups::list_all(db).await?;

    let mut details = Vec::with_capacity(groups.len());
    for group in groups {
        let members = role_groups::members(db, group.id).await?;
        let visible = role_groups::visible_report_ids(db, group.id).await?;
        details.push(RoleGroupDetail::new(
            group,
            members.into_iter().map(UserSummary::from).collect(),
            visible,
        ));
    }

    Ok(HttpResponse::Ok().json(details))
}

#[utoipa::path(
    get,
    path = "/api/role_groups/{group_id}",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    responses(
        (status = 200, description = "Role group", body = RoleGroupDetail),
        (status = 404, description = "Role group not found")
    )
)]
#[get("/role_groups/{group_id}", wrap = "AccessGate::permission(Permission::ViewRoleGroups)")]
pub async fn get_role_group(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let detail = load_detail(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    post,
    path = "/api/role_groups",
    tag = "Role Groups",
    request_body = CreateRoleGroupRequest,
    responses(
        (status = 201, description = "Role group created", body = RoleGroupDetail),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Name already exists")
    )
)]
#[post("/role_groups", wrap = "AccessGate::permission(Permission::ManageRoleGroups)")]
pub async fn create_role_group(
    body: web::Json<CreateRoleGroupRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let name = required_name("name", Some(&body.name), limits::GROUP_NAME)?;
    let description = checked_description(body.description.as_deref())?;

    let txn = pool.connection().begin().await?;
    let group = role_groups::insert(&txn, &name, description).await?;
    txn.commit().await?;

    info!(group_id = group.id, name = %group.name, "Role group created");
    Ok(HttpResponse::Created().json(RoleGroupDetail::new(group, Vec::new(), Vec::new())))
}

#[utoipa::path(
    put,
    path = "/api/role_groups/{group_id}",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    request_body = UpdateRoleGroupRequest,
    responses(
        (status = 200, description = "Role group updated", body = RoleGroupDetail),
        (status = 404, description = "Role group not found"),
        (status = 409, description = "Name already exists")
    )
)]
#[put("/role_groups/{group_id}", wrap = "AccessGate::permission(Permission::ManageRoleGroups)")]
pub async fn update_role_group(
    path: web::Path<i32>,
    body: web::Json<UpdateRoleGroupRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();
    let name = match body.name.as_deref() {
        Some(n) => Some(required_name("name", Some(n), limits::GROUP_NAME)?),
        None => None,
    };
    let description = checked_description(body.description.as_deref())?;

    let txn = pool.connection().begin().await?;
    role_groups::update(&txn, group_id, name.as_deref(), description)
        .await?
        .ok_or_else(|| group_not_found(group_id))?;
    let detail = load_detail(&txn, group_id).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/role_groups/{group_id}",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    responses(
        (status = 204, description = "Role group deleted"),
        (status = 404, description = "Role group not found")
    )
)]
#[delete("/role_groups/{group_id}", wrap = "AccessGate::permission(Permission::ManageRoleGroups)")]
pub async fn delete_role_group(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();

    let txn = pool.connection().begin().await?;
    if !role_groups::delete(&txn, group_id).await? {
        return Err(group_not_found(group_id));
    }
    txn.commit().await?;

    info!(group_id, "Role group deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/role_groups/{group_id}/users",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    responses(
        (status = 200, description = "Group members", body = [UserSummary]),
        (status = 404, description = "Role group not found")
    )
)]
#[get(
    "/role_groups/{group_id}/users",
    wrap = "AccessGate::permission(Permission::ViewRoleGroups)"
)]
pub async fn list_group_users(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();
    let db = pool.connection();
    ensure_group(db, group_id).await?;

    let members: Vec<UserSummary> = role_groups::members(db, group_id)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();
    Ok(HttpResponse::Ok().json(members))
}

/// Add one (`user_id`) or several (`user_ids`) users to a group.
///
/// A user that is already a member is rejected with 409 and nothing is added.
#[utoipa::path(
    post,
    path = "/api/role_groups/{group_id}/users",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    request_body = AddGroupUsersRequest,
    responses(
        (status = 200, description = "Users added", body = RoleGroupDetail),
        (status = 400, description = "No user ids given"),
        (status = 404, description = "Role group or user not found"),
        (status = 409, description = "User already a member")
    )
)]
#[post(
    "/role_groups/{group_id}/users",
    wrap = "AccessGate::permission(Permission::ManageRoleGroups)"
)]
pub async fn add_group_users(
    path: web::Path<i32>,
    body: web::Json<AddGroupUsersRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();
    let user_ids = body.ids();
    if user_ids.is_empty() {
        return Err(AppError::InvalidInput(
            "user_id or user_ids is required".to_string(),
        ));
    }

    let txn = pool.connection().begin().await?;
    ensure_group(&txn, group_id).await?;
    for user_id in user_ids {
        if users::find_by_id(&txn, user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {}", user_id)));
        }
        users::add_membership(&txn, user_id, group_id).await?;
    }
    let detail = load_detail(&txn, group_id).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/role_groups/{group_id}/users/{user_id}",
    tag = "Role Groups",
    params(
        ("group_id" = i32, Path, description = "Role group ID"),
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User removed from group"),
        (status = 404, description = "Group not found or user not a member")
    )
)]
#[delete(
    "/role_groups/{group_id}/users/{user_id}",
    wrap = "AccessGate::permission(Permission::ManageRoleGroups)"
)]
pub async fn remove_group_user(
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (group_id, user_id) = path.into_inner();

    let txn = pool.connection().begin().await?;
    ensure_group(&txn, group_id).await?;
    if !users::remove_membership(&txn, user_id, group_id).await? {
        return Err(AppError::NotFound(format!(
            "User {} in role group {}",
            user_id, group_id
        )));
    }
    txn.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/role_groups/{group_id}/visible_reports",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    responses(
        (status = 200, description = "Reports visible to the group", body = [ReportResponse]),
        (status = 404, description = "Role group not found")
    )
)]
#[get(
    "/role_groups/{group_id}/visible_reports",
    wrap = "AccessGate::permission(Permission::ViewRoleGroups)"
)]
pub async fn list_visible_reports(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();
    let db = pool.connection();
    ensure_group(db, group_id).await?;

    let reports: Vec<ReportResponse> = role_groups::visible_reports(db, group_id)
        .await?
        .into_iter()
        .map(|r| ReportResponse::new(r, true))
        .collect();
    Ok(HttpResponse::Ok().json(reports))
}

/// Replace the group's visible-report set. Unknown report ids are ignored.
#[utoipa::path(
    post,
    path = "/api/role_groups/{group_id}/visible_reports",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    request_body = SetVisibleReportsRequest,
    responses(
        (status = 200, description = "Visible reports replaced", body = RoleGroupDetail),
        (status = 404, description = "Role group not found")
    )
)]
#[post(
    "/role_groups/{group_id}/visible_reports",
    wrap = "AccessGate::permission(Permission::ManageRoleGroups)"
)]
pub async fn set_visible_reports(
    path: web::Path<i32>,
    body: web::Json<SetVisibleReportsRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();

    let txn = pool.connection().begin().await?;
    ensure_group(&txn, group_id).await?;
    let linked = role_groups::set_visible_reports(&txn, group_id, &body.report_ids).await?;
    let detail = load_detail(&txn, group_id).await?;
    txn.commit().await?;

    info!(group_id, reports = linked.len(), "Visible reports replaced");
    Ok(HttpResponse::Ok().json(detail))
}

/// Link one report to the group. Linking an already visible report is a no-op.
#[utoipa::path(
    post,
    path = "/api/role_groups/{group_id}/visible_reports/{report_id}",
    tag = "Role Groups",
    params(
        ("group_id" = i32, Path, description = "Role group ID"),
        ("report_id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report linked", body = RoleGroupDetail),
        (status = 404, description = "Role group or report not found")
    )
)]
#[post(
    "/role_groups/{group_id}/visible_reports/{report_id}",
    wrap = "AccessGate::permission(Permission::ManageRoleGroups)"
)]
pub async fn add_visible_report(
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (group_id, report_id) = path.into_inner();

    let txn = pool.connection().begin().await?;
    ensure_group(&txn, group_id).await?;
    if reports::find_by_id(&txn, report_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Report {}", report_id)));
    }
    role_groups::add_visible_report(&txn, group_id, report_id).await?;
    let detail = load_detail(&txn, group_id).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/role_groups/{group_id}/visible_reports/{report_id}",
    tag = "Role Groups",
    params(
        ("group_id" = i32, Path, description = "Role group ID"),
        ("report_id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 204, description = "Report unlinked"),
        (status = 404, description = "Group not found or report not linked")
    )
)]
#[delete(
    "/role_groups/{group_id}/visible_reports/{report_id}",
    wrap = "AccessGate::permission(Permission::ManageRoleGroups)"
)]
pub async fn remove_visible_report(
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (group_id, report_id) = path.into_inner();

    let txn = pool.connection().begin().await?;
    ensure_group(&txn, group_id).await?;
    if !role_groups::remove_visible_report(&txn, group_id, report_id).await? {
        return Err(AppError::NotFound(format!(
            "Report {} in role group {}",
            report_id, group_id
        )));
    }
    txn.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Reports not yet visible to the group.
#[utoipa::path(
    get,
    path = "/api/role_groups/{group_id}/available_reports",
    tag = "Role Groups",
    params(("group_id" = i32, Path, description = "Role group ID")),
    responses(
        (status = 200, description = "Reports not linked to the group", body = [ReportResponse]),
        (status = 404, description = "Role group not found")
    )
)]
#[get(
    "/role_groups/{group_id}/available_reports",
    wrap = "AccessGate::permission(Permission::ViewRoleGroups)"
)]
pub async fn list_available_reports(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group_id = path.into_inner();
    let db = pool.connection();
    ensure_group(db, group_id).await?;

    let reports: Vec<ReportResponse> = role_groups::available_reports(db, group_id)
        .await?
        .into_iter()
        .map(|r| ReportResponse::new(r, true))
        .collect();
    Ok(HttpResponse::Ok().json(reports))
}
