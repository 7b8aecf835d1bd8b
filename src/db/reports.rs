//! Database operations for reports and their tags.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::*;

use crate::entity::{group_visible_report, report, report_tag, tag, user_role_group};
use crate::error::AppResult;
use crate::models::Report;

use super::tags;

/// Fields for a new report row.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub name: String,
    pub description: Option<String>,
    pub external_report_id: String,
    pub is_active: bool,
    pub is_hidden: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ReportChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub external_report_id: Option<String>,
    pub is_active: Option<bool>,
    pub is_hidden: Option<bool>,
}

/// List every report (active or not) with tags, ordered by id.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Report>> {
    let models = report::Entity::find()
        .order_by_asc(report::Column::Id)
        .all(db)
        .await?;
    attach_tags(db, models).await
}

/// Find a report by ID, with tags.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Report>> {
    let Some(model) = report::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut reports = attach_tags(db, vec![model]).await?;
    Ok(reports.pop())
}

/// Insert a new report.
pub async fn insert<C: ConnectionTrait>(db: &C, new: NewReport) -> AppResult<Report> {
    let now = Utc::now();
    let model = report::ActiveModel {
        name: Set(new.name),
        description: Set(new.description),
        external_report_id: Set(new.external_report_id),
        is_active: Set(new.is_active),
        is_hidden: Set(new.is_hidden),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_report(inserted, Vec::new()))
}

/// Apply a partial update. Returns `None` when the report does not exist.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    changes: ReportChanges,
) -> AppResult<Option<Report>> {
    let Some(existing) = report::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: report::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(external_id) = changes.external_report_id {
        active.external_report_id = Set(external_id);
    }
    if let Some(is_active) = changes.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_hidden) = changes.is_hidden {
        active.is_hidden = Set(is_hidden);
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await?;

    find_by_id(db, id).await
}

/// Soft delete: clear the active flag. Returns false if the report is missing.
pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    let changes = ReportChanges {
        is_active: Some(false),
        ..Default::default()
    };
    Ok(update(db, id, changes).await?.is_some())
}

/// Remove the report row with its visibility and tag associations.
pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    group_visible_report::Entity::delete_many()
        .filter(group_visible_report::Column::ReportId.eq(id))
        .exec(db)
        .await?;
    report_tag::Entity::delete_many()
        .filter(report_tag::Column::ReportId.eq(id))
        .exec(db)
        .await?;

    let result = report::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Replace the report's tag set by name, creating missing tags.
pub async fn set_tags<C: ConnectionTrait>(db: &C, report_id: i32, names: &[String]) -> AppResult<()> {
    report_tag::Entity::delete_many()
        .filter(report_tag::Column::ReportId.eq(report_id))
        .exec(db)
        .await?;

    let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    for name in unique {
        add_tag(db, report_id, name).await?;
    }
    Ok(())
}

/// Associate a tag with the report, creating the tag if needed. No-op when already linked.
pub async fn add_tag<C: ConnectionTrait>(db: &C, report_id: i32, name: &str) -> AppResult<()> {
    let tag = tags::find_or_create(db, name).await?;

    let linked = report_tag::Entity::find_by_id((report_id, tag.id))
        .one(db)
        .await?
        .is_some();
    if linked {
        return Ok(());
    }

    let model = report_tag::ActiveModel {
        report_id: Set(report_id),
        tag_id: Set(tag.id),
        created_at: Set(Utc::now()),
    };
    report_tag::Entity::insert(model).exec(db).await?;
    Ok(())
}

/// Remove a tag association by name. The tag row itself is kept.
pub async fn remove_tag<C: ConnectionTrait>(db: &C, report_id: i32, name: &str) -> AppResult<bool> {
    let Some(tag) = tags::find_by_name(db, name).await? else {
        return Ok(false);
    };

    let result = report_tag::Entity::delete_many()
        .filter(report_tag::Column::ReportId.eq(report_id))
        .filter(report_tag::Column::TagId.eq(tag.id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Ids of reports linked to at least one of the user's role groups.
pub async fn linked_report_ids_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<BTreeSet<i32>> {
    let group_ids: Vec<i32> = user_role_group::Entity::find()
        .filter(user_role_group::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.role_group_id)
        .collect();

    if group_ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let rows = group_visible_report::Entity::find()
        .filter(group_visible_report::Column::RoleGroupId.is_in(group_ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|m| m.report_id).collect())
}

/// Load tag names for a batch of report models.
pub(crate) async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    models: Vec<report::Model>,
) -> AppResult<Vec<Report>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let links = report_tag::Entity::find()
        .filter(report_tag::Column::ReportId.is_in(ids))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    let mut by_report: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            by_report.entry(link.report_id).or_default().push(tag.name);
        }
    }

    Ok(models
        .into_iter()
        .map(|m| {
            let mut names = by_report.remove(&m.id).unwrap_or_default();
            names.sort();
            model_to_report(m, names)
        })
        .collect())
}

fn model_to_report(m: report::Model, tags: Vec<String>) -> Report {
    Report {
        id: m.id,
        name: m.name,
        description: m.description,
        external_report_id: m.external_report_id,
        is_active: m.is_active,
        is_hidden: m.is_hidden,
        created_at: m.created_at,
        updated_at: m.updated_at,
        tags,
    }
}
