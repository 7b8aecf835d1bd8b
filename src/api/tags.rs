//! Tag endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::TransactionTrait;

use crate::auth::{AccessGate, Permission};
use crate::db::DbPool;
use crate::db::tags;
use crate::error::{AppError, AppResult};
use crate::models::{CreateTagRequest, Tag, UpdateTagRequest, limits, required_name};

/// Configure tag routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tags)
        .service(get_tag)
        .service(create_tag)
        .service(update_tag)
        .service(delete_tag);
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Tags",
    responses((status = 200, description = "All tags", body = [Tag]))
)]
#[get("/tags", wrap = "AccessGate::permission(Permission::ViewReports)")]
pub async fn list_tags(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let tags = tags::list_all(pool.connection()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

#[utoipa::path(
    get,
    path = "/api/tags/{tag_id}",
    tag = "Tags",
    params(("tag_id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found")
    )
)]
#[get("/tags/{tag_id}", wrap = "AccessGate::permission(Permission::ViewReports)")]
pub async fn get_tag(path: web::Path<i32>, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let tag_id = path.into_inner();
    let tag = tags::find_by_id(pool.connection(), tag_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {}", tag_id)))?;
    Ok(HttpResponse::Ok().json(tag))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "Tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Tag name already exists")
    )
)]
#[post("/tags", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn create_tag(
    body: web::Json<CreateTagRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let name = required_name("name", Some(&body.name), limits::TAG_NAME)?;

    let txn = pool.connection().begin().await?;
    let tag = tags::insert(&txn, &name).await?;
    txn.commit().await?;

    Ok(HttpResponse::Created().json(tag))
}

#[utoipa::path(
    put,
    path = "/api/tags/{tag_id}",
    tag = "Tags",
    params(("tag_id" = i32, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag renamed", body = Tag),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Tag name already exists")
    )
)]
#[put("/tags/{tag_id}", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn update_tag(
    path: web::Path<i32>,
    body: web::Json<UpdateTagRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let tag_id = path.into_inner();
    let name = required_name("name", Some(&body.name), limits::TAG_NAME)?;

    let txn = pool.connection().begin().await?;
    let tag = tags::rename(&txn, tag_id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {}", tag_id)))?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(tag))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{tag_id}",
    tag = "Tags",
    params(("tag_id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    )
)]
#[delete("/tags/{tag_id}", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn delete_tag(path: web::Path<i32>, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let tag_id = path.into_inner();

    let txn = pool.connection().begin().await?;
    if !tags::delete(&txn, tag_id).await? {
        return Err(AppError::NotFound(format!("Tag {}", tag_id)));
    }
    txn.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
