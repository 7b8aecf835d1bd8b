//! User administration endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

use crate::auth::{AccessGate, CurrentUser, Permission};
use crate::db::DbPool;
use crate::db::users::{self, NewUser, UserChanges};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateUserRequest, RoleGroupSummary, SetUserRoleGroupsRequest, UpdateUserRequest,
    UserResponse, UserRole, check_length, limits, required_name,
};

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(list_user_role_groups)
        .service(set_user_role_groups)
        .service(remove_user_role_group);
}

async fn load_response<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<UserResponse> {
    let user = users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let groups = users::role_groups_of(db, user_id).await?;
    Ok(UserResponse::new(user, groups))
}

fn user_not_found(user_id: i32) -> AppError {
    AppError::NotFound(format!("User {}", user_id))
}

fn parse_role(raw: &str) -> AppResult<UserRole> {
    UserRole::parse(raw).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Invalid role '{}'. Must be admin, editor or user",
            raw
        ))
    })
}

fn checked_email(raw: Option<&str>) -> AppResult<Option<String>> {
    match raw.map(str::trim) {
        Some(email) => {
            check_length("email", email, limits::USER_EMAIL)?;
            Ok(Some(email.to_string()))
        }
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "All users", body = [UserResponse]))
)]
#[get("/users", wrap = "AccessGate::permission(Permission::ViewUsers)")]
pub async fn list_users(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = users::list_with_groups(pool.connection()).await?;
    let users: Vec<UserResponse> = rows
        .into_iter()
        .map(|(user, groups)| UserResponse::new(user, groups))
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "Users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
#[get("/users/{user_id}", wrap = "AccessGate::permission(Permission::ViewUsers)")]
pub async fn get_user(path: web::Path<i32>, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let user = load_response(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Pre-register a user. The account is bound on its first DingTalk login.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already taken")
    )
)]
#[post("/users", wrap = "AccessGate::permission(Permission::ManageUsers)")]
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let name = required_name("name", Some(&body.name), limits::USER_NAME)?;
    let email = checked_email(body.email.as_deref())?.unwrap_or_default();
    let role = match body.role.as_deref() {
        Some(r) => parse_role(r)?,
        None => UserRole::default(),
    };

    let txn = pool.connection().begin().await?;
    if users::find_by_display_name(&txn, &name).await?.is_some() {
        return Err(AppError::Conflict(format!("User '{}' already exists", name)));
    }
    if users::find_by_external_id(&txn, &name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "External identity '{}' is already in use",
            name
        )));
    }

    let user = users::insert(
        &txn,
        NewUser {
            external_identity_id: Some(name.clone()),
            display_name: name,
            email,
            role,
            last_login_at: None,
        },
    )
    .await?;
    if let Some(group_ids) = &body.role_group_ids {
        users::grant_memberships(&txn, user.id, group_ids).await?;
    }
    let response = load_response(&txn, user.id).await?;
    txn.commit().await?;

    info!(user_id = response.id, "User pre-registered");
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    tag = "Users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Name already taken")
    )
)]
#[put("/users/{user_id}", wrap = "AccessGate::permission(Permission::ManageUsers)")]
pub async fn update_user(
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let body = body.into_inner();
    let name = match body.name.as_deref() {
        Some(n) => Some(required_name("name", Some(n), limits::USER_NAME)?),
        None => None,
    };
    let role = body.role.as_deref().map(parse_role).transpose()?;
    let email = checked_email(body.email.as_deref())?;

    let txn = pool.connection().begin().await?;
    let existing = users::find_by_id(&txn, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    // Renaming an unbound account moves its placeholder along with the name.
    let mut external_identity_id = None;
    if let Some(new_name) = name.as_deref() {
        if new_name != existing.display_name {
            if let Some(other) = users::find_by_display_name(&txn, new_name).await? {
                if other.id != user_id {
                    return Err(AppError::Conflict(format!(
                        "User '{}' already exists",
                        new_name
                    )));
                }
            }
            if !existing.is_bound() && existing.external_identity_id.is_some() {
                if let Some(other) = users::find_by_external_id(&txn, new_name).await? {
                    if other.id != user_id {
                        return Err(AppError::Conflict(format!(
                            "External identity '{}' is already in use",
                            new_name
                        )));
                    }
                }
                external_identity_id = Some(new_name.to_string());
            }
        }
    }

    let changes = UserChanges {
        external_identity_id,
        display_name: name,
        email,
        role,
        is_active: body.is_active,
        last_login_at: None,
    };
    users::update(&txn, user_id, changes)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    if let Some(group_ids) = &body.role_group_ids {
        users::replace_memberships(&txn, user_id, group_ids).await?;
    }
    let response = load_response(&txn, user_id).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Delete a user together with memberships and sessions.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    tag = "Users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 404, description = "User not found")
    )
)]
#[delete("/users/{user_id}", wrap = "AccessGate::permission(Permission::ManageUsers)")]
pub async fn delete_user(
    caller: CurrentUser,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    if user_id == caller.id {
        return Err(AppError::InvalidInput(
            "Cannot delete your own account".to_string(),
        ));
    }

    let txn = pool.connection().begin().await?;
    if !users::delete(&txn, user_id).await? {
        return Err(user_not_found(user_id));
    }
    txn.commit().await?;

    info!(user_id, by = caller.id, "User deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/role-groups",
    tag = "Users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's role groups", body = [RoleGroupSummary]),
        (status = 404, description = "User not found")
    )
)]
#[get(
    "/users/{user_id}/role-groups",
    wrap = "AccessGate::permission(Permission::ViewUsers)"
)]
pub async fn list_user_role_groups(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user = load_response(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user.role_groups))
}

/// Replace the user's role groups. Unknown group ids are ignored.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/role-groups",
    tag = "Users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = SetUserRoleGroupsRequest,
    responses(
        (status = 200, description = "Memberships replaced", body = [RoleGroupSummary]),
        (status = 404, description = "User not found")
    )
)]
#[post(
    "/users/{user_id}/role-groups",
    wrap = "AccessGate::permission(Permission::ManageUsers)"
)]
pub async fn set_user_role_groups(
    path: web::Path<i32>,
    body: web::Json<SetUserRoleGroupsRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();

    let txn = pool.connection().begin().await?;
    if users::find_by_id(&txn, user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }
    users::replace_memberships(&txn, user_id, &body.role_group_ids).await?;
    let groups = users::role_groups_of(&txn, user_id).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(groups))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/role-groups/{role_group_id}",
    tag = "Users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("role_group_id" = i32, Path, description = "Role group ID")
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 404, description = "User not found or not a member")
    )
)]
#[delete(
    "/users/{user_id}/role-groups/{role_group_id}",
    wrap = "AccessGate::permission(Permission::ManageUsers)"
)]
pub async fn remove_user_role_group(
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (user_id, group_id) = path.into_inner();

    let txn = pool.connection().begin().await?;
    if users::find_by_id(&txn, user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }
    if !users::remove_membership(&txn, user_id, group_id).await? {
        return Err(AppError::NotFound(format!(
            "User {} in role group {}",
            user_id, group_id
        )));
    }
    txn.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
