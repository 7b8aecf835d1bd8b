//! Database operations for tags.

use chrono::Utc;
use sea_orm::*;

use crate::entity::{report_tag, tag};
use crate::error::{AppError, AppResult};
use crate::models::Tag;

/// List all tags, ordered by name.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Tag>> {
    let results = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;
    Ok(results.into_iter().map(model_to_tag).collect())
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Tag>> {
    let result = tag::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_tag))
}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<Tag>> {
    let result = tag::Entity::find()
        .filter(tag::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result.map(model_to_tag))
}

/// Insert a new tag. The name must be unique.
pub async fn insert<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Tag> {
    if find_by_name(db, name).await?.is_some() {
        return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
    }
    create(db, name).await
}

/// Return the tag with this name, creating it when missing.
pub async fn find_or_create<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Tag> {
    match find_by_name(db, name).await? {
        Some(tag) => Ok(tag),
        None => create(db, name).await,
    }
}

/// Rename a tag. Returns `None` when the tag does not exist.
pub async fn rename<C: ConnectionTrait>(db: &C, id: i32, name: &str) -> AppResult<Option<Tag>> {
    let Some(existing) = tag::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    if let Some(other) = find_by_name(db, name).await? {
        if other.id != id {
            return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
        }
    }

    let mut active: tag::ActiveModel = existing.into();
    active.name = Set(name.to_owned());
    let updated = active.update(db).await?;
    Ok(Some(model_to_tag(updated)))
}

/// Delete a tag and its report associations.
pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    report_tag::Entity::delete_many()
        .filter(report_tag::Column::TagId.eq(id))
        .exec(db)
        .await?;

    let result = tag::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

async fn create<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Tag> {
    let model = tag::ActiveModel {
        name: Set(name.to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = model.insert(db).await?;
    Ok(model_to_tag(inserted))
}

fn model_to_tag(m: tag::Model) -> Tag {
    Tag {
        id: m.id,
        name: m.name,
        created_at: m.created_at,
    }
}
