//! Which reports a user may see, and whether the Power BI id is revealed.

use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;

use crate::db::reports;
use crate::error::{AppError, AppResult};
use crate::models::{Report, ReportResponse, User, UserRole};

/// Visibility predicate for a single report.
///
/// `shares_group` is whether one of the user's role groups is linked to the report.
pub fn can_view(role: UserRole, report: &Report, shares_group: bool) -> bool {
    if role.sees_all_reports() {
        return true;
    }
    report.is_active && !report.is_hidden && shares_group
}

/// Whether list output includes the external report id.
pub fn reveals_external_id(role: UserRole) -> bool {
    role.sees_all_reports()
}

/// Reports visible to the user, serialized for the caller's role.
pub async fn visible_reports<C: ConnectionTrait>(
    db: &C,
    user: &User,
) -> AppResult<Vec<ReportResponse>> {
    let role = user.role_enum();
    let all = reports::list_all(db).await?;
    let linked = linked_ids(db, user, role).await?;
    let reveal = reveals_external_id(role);

    Ok(all
        .into_iter()
        .filter(|r| can_view(role, r, linked.contains(&r.id)))
        .map(|r| ReportResponse::new(r, reveal))
        .collect())
}

/// Load a report and check that the user may see it.
///
/// Missing reports are `NotFound`; invisible ones are `Forbidden`.
pub async fn check_report_access<C: ConnectionTrait>(
    db: &C,
    user: &User,
    report_id: i32,
) -> AppResult<Report> {
    let report = reports::find_by_id(db, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;

    let role = user.role_enum();
    let linked = linked_ids(db, user, role).await?;
    if can_view(role, &report, linked.contains(&report_id)) {
        Ok(report)
    } else {
        Err(AppError::Forbidden("No access to this report".to_string()))
    }
}

async fn linked_ids<C: ConnectionTrait>(
    db: &C,
    user: &User,
    role: UserRole,
) -> AppResult<BTreeSet<i32>> {
    if role.sees_all_reports() {
        return Ok(BTreeSet::new());
    }
    reports::linked_report_ids_for_user(db, user.id).await
}
