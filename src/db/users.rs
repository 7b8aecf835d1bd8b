//! Database operations for users and their role group memberships.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entity::{role_group, session, user, user_role_group};
use crate::error::{AppError, AppResult};
use crate::models::{RoleGroupSummary, User, UserRole};

/// Fields for a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_identity_id: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: UserRole,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub external_identity_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// List all users with their role groups, ordered by id.
pub async fn list_with_groups<C: ConnectionTrait>(
    db: &C,
) -> AppResult<Vec<(User, Vec<RoleGroupSummary>)>> {
    let rows = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .find_with_related(role_group::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(u, groups)| (model_to_user(u), groups_to_summaries(groups)))
        .collect())
}

/// Find a user by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<User>> {
    let result = user::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_user))
}

/// Find a user by bound external identity (DingTalk unionId).
pub async fn find_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
) -> AppResult<Option<User>> {
    let result = user::Entity::find()
        .filter(user::Column::ExternalIdentityId.eq(external_id))
        .one(db)
        .await?;
    Ok(result.map(model_to_user))
}

/// Find a user by exact display name.
pub async fn find_by_display_name<C: ConnectionTrait>(
    db: &C,
    display_name: &str,
) -> AppResult<Option<User>> {
    let result = user::Entity::find()
        .filter(user::Column::DisplayName.eq(display_name))
        .order_by_asc(user::Column::Id)
        .one(db)
        .await?;
    Ok(result.map(model_to_user))
}

/// Find a pre-registered, not yet bound user.
///
/// Both the display name and the placeholder external id must be one of the
/// candidate names.
pub async fn find_unbound<C: ConnectionTrait>(
    db: &C,
    candidates: &[&str],
) -> AppResult<Option<User>> {
    let names: Vec<String> = candidates.iter().map(|s| String::from(*s)).collect();
    let result = user::Entity::find()
        .filter(user::Column::DisplayName.is_in(names.clone()))
        .filter(user::Column::ExternalIdentityId.is_in(names))
        .order_by_asc(user::Column::Id)
        .one(db)
        .await?;
    Ok(result.map(model_to_user))
}

/// Insert a new user.
pub async fn insert<C: ConnectionTrait>(db: &C, new: NewUser) -> AppResult<User> {
    let model = user::ActiveModel {
        external_identity_id: Set(new.external_identity_id),
        display_name: Set(new.display_name),
        email: Set(new.email),
        role: Set(new.role.as_str().to_owned()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        last_login_at: Set(new.last_login_at),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_user(inserted))
}

/// Apply a partial update. Returns `None` when the user does not exist.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    changes: UserChanges,
) -> AppResult<Option<User>> {
    let Some(existing) = user::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: user::ActiveModel = existing.into();
    if let Some(ext) = changes.external_identity_id {
        active.external_identity_id = Set(Some(ext));
    }
    if let Some(name) = changes.display_name {
        active.display_name = Set(name);
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
    }
    if let Some(role) = changes.role {
        active.role = Set(role.as_str().to_owned());
    }
    if let Some(is_active) = changes.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(at) = changes.last_login_at {
        active.last_login_at = Set(Some(at));
    }

    let updated = active.update(db).await?;
    Ok(Some(model_to_user(updated)))
}

/// Delete a user with its memberships and sessions. Returns false if missing.
pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    user_role_group::Entity::delete_many()
        .filter(user_role_group::Column::UserId.eq(id))
        .exec(db)
        .await?;
    session::Entity::delete_many()
        .filter(session::Column::UserId.eq(id))
        .exec(db)
        .await?;

    let result = user::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Role groups the user belongs to, ordered by group id.
pub async fn role_groups_of<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<Vec<RoleGroupSummary>> {
    let groups = role_group::Entity::find()
        .inner_join(user_role_group::Entity)
        .filter(user_role_group::Column::UserId.eq(user_id))
        .order_by_asc(role_group::Column::Id)
        .all(db)
        .await?;
    Ok(groups_to_summaries(groups))
}

/// Ids of the role groups the user belongs to.
pub async fn role_group_ids_of<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<Vec<i32>> {
    let rows = user_role_group::Entity::find()
        .filter(user_role_group::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|m| m.role_group_id).collect())
}

pub async fn is_member<C: ConnectionTrait>(db: &C, user_id: i32, group_id: i32) -> AppResult<bool> {
    let count = user_role_group::Entity::find()
        .filter(user_role_group::Column::UserId.eq(user_id))
        .filter(user_role_group::Column::RoleGroupId.eq(group_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Add a membership row. Rejects a pair that already exists.
pub async fn add_membership<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    group_id: i32,
) -> AppResult<()> {
    if is_member(db, user_id, group_id).await? {
        return Err(AppError::Conflict(format!(
            "User {} is already a member of role group {}",
            user_id, group_id
        )));
    }

    let model = user_role_group::ActiveModel {
        user_id: Set(user_id),
        role_group_id: Set(group_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await?;
    Ok(())
}

/// Remove a membership row. Returns false if the user was not a member.
pub async fn remove_membership<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    group_id: i32,
) -> AppResult<bool> {
    let result = user_role_group::Entity::delete_many()
        .filter(user_role_group::Column::UserId.eq(user_id))
        .filter(user_role_group::Column::RoleGroupId.eq(group_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Replace the user's memberships with the given groups.
///
/// Ids that do not name an existing group are ignored; duplicates collapse.
pub async fn replace_memberships<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    group_ids: &[i32],
) -> AppResult<()> {
    user_role_group::Entity::delete_many()
        .filter(user_role_group::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    grant_memberships(db, user_id, group_ids).await
}

/// Add memberships for every listed group that exists. Existing pairs are skipped.
pub async fn grant_memberships<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    group_ids: &[i32],
) -> AppResult<()> {
    let wanted: BTreeSet<i32> = group_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let existing_groups = role_group::Entity::find()
        .filter(role_group::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?;
    let current: BTreeSet<i32> = role_group_ids_of(db, user_id).await?.into_iter().collect();

    let now = Utc::now();
    for group in existing_groups {
        if current.contains(&group.id) {
            continue;
        }
        let model = user_role_group::ActiveModel {
            user_id: Set(user_id),
            role_group_id: Set(group.id),
            created_at: Set(now),
            ..Default::default()
        };
        model.insert(db).await?;
    }
    Ok(())
}

fn groups_to_summaries(groups: Vec<role_group::Model>) -> Vec<RoleGroupSummary> {
    groups
        .into_iter()
        .map(|g| RoleGroupSummary {
            id: g.id,
            name: g.name,
        })
        .collect()
}

pub(crate) fn model_to_user(m: user::Model) -> User {
    User {
        id: m.id,
        external_identity_id: m.external_identity_id,
        display_name: m.display_name,
        email: m.email,
        role: m.role,
        is_active: m.is_active,
        created_at: m.created_at,
        last_login_at: m.last_login_at,
    }
}
