//! Database operations for role groups, their members and their visible reports.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::*;

use crate::entity::{group_visible_report, report, role_group, user, user_role_group};
use crate::error::{AppError, AppResult};
use crate::models::{Report, RoleGroup, User};

use super::reports::attach_tags;
use super::users::model_to_user;

/// List all role groups, ordered by id.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<RoleGroup>> {
    let results = role_group::Entity::find()
        .order_by_asc(role_group::Column::Id)
        .all(db)
        .await?;
    Ok(results.into_iter().map(model_to_group).collect())
}

/// Find a role group by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<RoleGroup>> {
    let result = role_group::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_group))
}

/// Find a role group by exact name.
pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<RoleGroup>> {
    let result = role_group::Entity::find()
        .filter(role_group::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result.map(model_to_group))
}

/// Insert a new role group. The name must be unique.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<&str>,
) -> AppResult<RoleGroup> {
    if find_by_name(db, name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Role group '{}' already exists",
            name
        )));
    }

    let now = Utc::now();
    let model = role_group::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(description.map(str::to_owned)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_group(inserted))
}

/// Rename and/or re-describe a group. Returns `None` when the group does not exist.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    name: Option<&str>,
    description: Option<&str>,
) -> AppResult<Option<RoleGroup>> {
    let Some(existing) = role_group::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    if let Some(new_name) = name {
        if new_name != existing.name {
            if let Some(other) = find_by_name(db, new_name).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Role group '{}' already exists",
                        new_name
                    )));
                }
            }
        }
    }

    let mut active: role_group::ActiveModel = existing.into();
    if let Some(new_name) = name {
        active.name = Set(new_name.to_owned());
    }
    if let Some(desc) = description {
        active.description = Set(Some(desc.to_owned()));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    Ok(Some(model_to_group(updated)))
}

/// Delete a group together with its membership and visibility rows.
pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    user_role_group::Entity::delete_many()
        .filter(user_role_group::Column::RoleGroupId.eq(id))
        .exec(db)
        .await?;
    group_visible_report::Entity::delete_many()
        .filter(group_visible_report::Column::RoleGroupId.eq(id))
        .exec(db)
        .await?;

    let result = role_group::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Members of a group, ordered by user id.
pub async fn members<C: ConnectionTrait>(db: &C, group_id: i32) -> AppResult<Vec<User>> {
    let users = user::Entity::find()
        .inner_join(user_role_group::Entity)
        .filter(user_role_group::Column::RoleGroupId.eq(group_id))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    Ok(users.into_iter().map(model_to_user).collect())
}

/// Ids of the reports linked to a group.
pub async fn visible_report_ids<C: ConnectionTrait>(db: &C, group_id: i32) -> AppResult<Vec<i32>> {
    let rows = group_visible_report::Entity::find()
        .filter(group_visible_report::Column::RoleGroupId.eq(group_id))
        .order_by_asc(group_visible_report::Column::ReportId)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|m| m.report_id).collect())
}

/// Reports linked to a group, with tags.
pub async fn visible_reports<C: ConnectionTrait>(db: &C, group_id: i32) -> AppResult<Vec<Report>> {
    let ids = visible_report_ids(db, group_id).await?;
    let models = report::Entity::find()
        .filter(report::Column::Id.is_in(ids))
        .order_by_asc(report::Column::Id)
        .all(db)
        .await?;
    attach_tags(db, models).await
}

/// Reports not linked to a group, with tags.
pub async fn available_reports<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
) -> AppResult<Vec<Report>> {
    let ids = visible_report_ids(db, group_id).await?;
    let models = report::Entity::find()
        .filter(report::Column::Id.is_not_in(ids))
        .order_by_asc(report::Column::Id)
        .all(db)
        .await?;
    attach_tags(db, models).await
}

/// Link one report to a group. Returns false when the link already existed.
pub async fn add_visible_report<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
    report_id: i32,
) -> AppResult<bool> {
    let existing = group_visible_report::Entity::find()
        .filter(group_visible_report::Column::RoleGroupId.eq(group_id))
        .filter(group_visible_report::Column::ReportId.eq(report_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let model = group_visible_report::ActiveModel {
        role_group_id: Set(group_id),
        report_id: Set(report_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await?;
    Ok(true)
}

/// Unlink one report from a group. Returns false if it was not linked.
pub async fn remove_visible_report<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
    report_id: i32,
) -> AppResult<bool> {
    let result = group_visible_report::Entity::delete_many()
        .filter(group_visible_report::Column::RoleGroupId.eq(group_id))
        .filter(group_visible_report::Column::ReportId.eq(report_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Replace the whole visible-report set of a group.
///
/// Ids that do not name an existing report are ignored. Returns the resulting
/// set of report ids in ascending order.
pub async fn set_visible_reports<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
    report_ids: &[i32],
) -> AppResult<Vec<i32>> {
    let wanted: BTreeSet<i32> = report_ids.iter().copied().collect();
    let existing: Vec<i32> = if wanted.is_empty() {
        Vec::new()
    } else {
        report::Entity::find()
            .filter(report::Column::Id.is_in(wanted.iter().copied()))
            .order_by_asc(report::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect()
    };

    group_visible_report::Entity::delete_many()
        .filter(group_visible_report::Column::RoleGroupId.eq(group_id))
        .exec(db)
        .await?;

    let now = Utc::now();
    for report_id in &existing {
        let model = group_visible_report::ActiveModel {
            role_group_id: Set(group_id),
            report_id: Set(*report_id),
            created_at: Set(now),
            ..Default::default()
        };
        model.insert(db).await?;
    }

    Ok(existing)
}

fn model_to_group(m: role_group::Model) -> RoleGroup {
    RoleGroup {
        id: m.id,
        name: m.name,
        description: m.description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
