//! Report endpoints: listing, detail, CRUD and tag associations.

use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::TransactionTrait;
use tracing::info;

use crate::auth::{AccessGate, CurrentUser, Permission};
use crate::db::DbPool;
use crate::db::reports::{self, NewReport, ReportChanges};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddTagRequest, CreateReportRequest, ReportResponse, UpdateReportRequest, check_length,
    limits, normalize_tag_names, required_name,
};
use crate::services::visibility;

/// Configure report routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reports)
        .service(get_report)
        .service(create_report)
        .service(update_report)
        .service(update_report_post)
        .service(delete_report)
        .service(delete_report_permanent)
        .service(add_report_tag)
        .service(remove_report_tag);
}

/// List the reports visible to the caller.
///
/// Plain users get `powerbi_id: null`; editors and admins get the id.
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Visible reports", body = [ReportResponse]),
        (status = 401, description = "Not logged in")
    )
)]
#[get("/reports", wrap = "AccessGate::permission(Permission::ViewReports)")]
pub async fn list_reports(user: CurrentUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let reports = visibility::visible_reports(pool.connection(), &user).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Get a single report, including its Power BI id.
#[utoipa::path(
    get,
    path = "/api/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report details", body = ReportResponse),
        (status = 403, description = "No access to this report"),
        (status = 404, description = "Report not found")
    )
)]
#[get("/reports/{report_id}", wrap = "AccessGate::report()")]
pub async fn get_report(path: web::Path<i32>, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let report = reports::find_by_id(pool.connection(), report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;

    Ok(HttpResponse::Ok().json(ReportResponse::new(report, true)))
}

/// Create a report. New reports start hidden unless `is_hide_report` is false.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = ReportResponse),
        (status = 400, description = "Missing name or powerbi_id"),
        (status = 403, description = "manage_reports required")
    )
)]
#[post("/reports", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn create_report(
    user: CurrentUser,
    body: web::Json<CreateReportRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let name = required_name("name", body.name.as_deref(), limits::REPORT_NAME)?;
    let external_report_id = required_name(
        "powerbi_id",
        body.powerbi_id.as_deref(),
        limits::REPORT_EXTERNAL_ID,
    )?;
    let tags = normalize_tag_names(body.tags.as_deref().unwrap_or_default())?;

    let txn = pool.connection().begin().await?;
    let created = reports::insert(
        &txn,
        NewReport {
            name,
            description: body.description,
            external_report_id,
            is_active: body.is_active.unwrap_or(true),
            is_hidden: body.is_hide_report.unwrap_or(true),
        },
    )
    .await?;
    if !tags.is_empty() {
        reports::set_tags(&txn, created.id, &tags).await?;
    }
    let report = reports::find_by_id(&txn, created.id)
        .await?
        .ok_or_else(|| AppError::Database("Failed to fetch newly inserted report".to_string()))?;
    txn.commit().await?;

    info!(report_id = report.id, by = user.id, "Report created");
    Ok(HttpResponse::Created().json(ReportResponse::new(report, true)))
}

/// Update a report (partial merge).
#[utoipa::path(
    put,
    path = "/api/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated", body = ReportResponse),
        (status = 404, description = "Report not found")
    )
)]
#[put("/reports/{report_id}", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn update_report(
    path: web::Path<i32>,
    body: web::Json<UpdateReportRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    apply_update(path.into_inner(), body.into_inner(), &pool).await
}

/// Same as `PUT /api/reports/{report_id}`, kept for form-style clients.
#[utoipa::path(
    post,
    path = "/api/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated", body = ReportResponse),
        (status = 404, description = "Report not found")
    )
)]
#[post("/reports/{report_id}", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn update_report_post(
    path: web::Path<i32>,
    body: web::Json<UpdateReportRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    apply_update(path.into_inner(), body.into_inner(), &pool).await
}

async fn apply_update(
    report_id: i32,
    body: UpdateReportRequest,
    pool: &DbPool,
) -> AppResult<HttpResponse> {
    let name = match body.name.as_deref() {
        Some(n) => Some(required_name("name", Some(n), limits::REPORT_NAME)?),
        None => None,
    };
    // A blank Power BI id leaves the stored one in place.
    let external_report_id = body
        .powerbi_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            check_length("powerbi_id", s, limits::REPORT_EXTERNAL_ID)?;
            Ok::<_, AppError>(s.to_string())
        })
        .transpose()?;
    let tags = match body.tags.as_deref() {
        Some(t) => Some(normalize_tag_names(t)?),
        None => None,
    };

    let changes = ReportChanges {
        name,
        description: body.description,
        external_report_id,
        is_active: body.is_active,
        is_hidden: body.is_hide_report,
    };

    let txn = pool.connection().begin().await?;
    reports::update(&txn, report_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;
    if let Some(tags) = tags {
        reports::set_tags(&txn, report_id, &tags).await?;
    }
    let report = reports::find_by_id(&txn, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;
    txn.commit().await?;

    info!(report_id, "Report updated");
    Ok(HttpResponse::Ok().json(ReportResponse::new(report, true)))
}

/// Soft delete: the report is deactivated and disappears for plain users.
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report deactivated"),
        (status = 404, description = "Report not found")
    )
)]
#[delete("/reports/{report_id}", wrap = "AccessGate::permission(Permission::ManageReports)")]
pub async fn delete_report(path: web::Path<i32>, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let txn = pool.connection().begin().await?;
    if !reports::soft_delete(&txn, report_id).await? {
        return Err(AppError::NotFound(format!("Report {}", report_id)));
    }
    txn.commit().await?;

    info!(report_id, "Report deactivated");
    Ok(HttpResponse::NoContent().finish())
}

/// Hard delete: removes the report with its visibility and tag links.
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}/permanent",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report removed"),
        (status = 404, description = "Report not found")
    )
)]
#[delete(
    "/reports/{report_id}/permanent",
    wrap = "AccessGate::permission(Permission::ManageReports)"
)]
pub async fn delete_report_permanent(
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let txn = pool.connection().begin().await?;
    if !reports::hard_delete(&txn, report_id).await? {
        return Err(AppError::NotFound(format!("Report {}", report_id)));
    }
    txn.commit().await?;

    info!(report_id, "Report permanently deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Add a tag to a report, creating the tag when it does not exist yet.
#[utoipa::path(
    post,
    path = "/api/reports/{report_id}/tags",
    tag = "Reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    request_body = AddTagRequest,
    responses(
        (status = 200, description = "Tag added", body = ReportResponse),
        (status = 404, description = "Report not found")
    )
)]
#[post(
    "/reports/{report_id}/tags",
    wrap = "AccessGate::permission(Permission::ManageReports)"
)]
pub async fn add_report_tag(
    path: web::Path<i32>,
    body: web::Json<AddTagRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let name = required_name("tag name", Some(&body.name), limits::TAG_NAME)?;

    let txn = pool.connection().begin().await?;
    if reports::find_by_id(&txn, report_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Report {}", report_id)));
    }
    reports::add_tag(&txn, report_id, &name).await?;
    let report = reports::find_by_id(&txn, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(ReportResponse::new(report, true)))
}

/// Remove a tag from a report. The tag itself is kept.
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}/tags/{name}",
    tag = "Reports",
    params(
        ("report_id" = i32, Path, description = "Report ID"),
        ("name" = String, Path, description = "Tag name")
    ),
    responses(
        (status = 204, description = "Tag removed from report"),
        (status = 404, description = "Report or tag association not found")
    )
)]
#[delete(
    "/reports/{report_id}/tags/{name}",
    wrap = "AccessGate::permission(Permission::ManageReports)"
)]
pub async fn remove_report_tag(
    path: web::Path<(i32, String)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (report_id, name) = path.into_inner();
    let name = name.trim();

    let txn = pool.connection().begin().await?;
    if reports::find_by_id(&txn, report_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Report {}", report_id)));
    }
    if !reports::remove_tag(&txn, report_id, name).await? {
        return Err(AppError::NotFound(format!(
            "Tag '{}' on report {}",
            name, report_id
        )));
    }
    txn.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
