//! Maps a DingTalk identity onto a local user account.
//!
//! Resolution order: bound account by unionId, then a pre-registered account
//! whose display name and placeholder external id match the nickname (or its
//! local-script form), then a brand-new account.

use chrono::Utc;
use sea_orm::ConnectionTrait;
use tracing::info;

use crate::db::users::{self, NewUser, UserChanges};
use crate::error::{AppError, AppResult};
use crate::models::{ExternalIdentity, User, UserRole, limits};

/// How a login was matched to a local account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Account already bound to this unionId.
    Matched,
    /// Pre-registered account bound on this login.
    Bound,
    /// New account created.
    Created,
}

#[derive(Debug)]
pub struct ResolvedLogin {
    pub user: User,
    pub outcome: LoginOutcome,
}

/// Strip ASCII Latin letters from a nickname.
///
/// Returns `None` when nothing is left or nothing was removed. Surrounding
/// whitespace left behind by removed words is trimmed.
pub fn local_script_form(nickname: &str) -> Option<String> {
    let stripped: String = nickname
        .chars()
        .filter(|c| !c.is_ascii_alphabetic())
        .collect();
    let stripped = stripped.trim();
    if stripped.is_empty() || stripped == nickname {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Find, bind or create the local user for an external identity.
///
/// Always records `last_login_at`. Callers run this inside a transaction.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    identity: &ExternalIdentity,
) -> AppResult<ResolvedLogin> {
    let nickname = identity
        .nickname()
        .ok_or_else(|| {
            AppError::InvalidInput("Identity payload has neither nick nor name".to_string())
        })?
        .to_string();
    crate::models::check_length("nick", &nickname, limits::USER_NAME)?;

    let now = Utc::now();
    let union_id = identity.union_id();

    if let Some(union_id) = union_id {
        if let Some(existing) = users::find_by_external_id(db, union_id).await? {
            let changes = UserChanges {
                display_name: rename_to(&existing, &nickname),
                last_login_at: Some(now),
                ..Default::default()
            };
            let user = apply(db, existing.id, changes).await?;
            info!(user_id = user.id, "Login matched bound account");
            return Ok(ResolvedLogin {
                user,
                outcome: LoginOutcome::Matched,
            });
        }
    }

    let local = local_script_form(&nickname);
    let mut candidates = vec![nickname.as_str()];
    if let Some(local) = local.as_deref() {
        candidates.push(local);
    }

    if let Some(existing) = users::find_unbound(db, &candidates).await? {
        let changes = UserChanges {
            external_identity_id: union_id.map(str::to_string),
            display_name: rename_to(&existing, &nickname),
            last_login_at: Some(now),
            ..Default::default()
        };
        let user = apply(db, existing.id, changes).await?;
        info!(
            user_id = user.id,
            bound = union_id.is_some(),
            "Login bound pre-registered account"
        );
        return Ok(ResolvedLogin {
            user,
            outcome: LoginOutcome::Bound,
        });
    }

    let external_id = union_id
        .or_else(|| {
            identity
                .dingtalk_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(nickname.as_str())
        .to_string();

    if users::find_by_external_id(db, &external_id).await?.is_some() {
        return Err(AppError::Conflict(
            "External identity is already linked to another account".to_string(),
        ));
    }

    let user = users::insert(
        db,
        NewUser {
            external_identity_id: Some(external_id),
            display_name: nickname,
            email: identity.email.clone().unwrap_or_default(),
            role: UserRole::User,
            last_login_at: Some(now),
        },
    )
    .await?;
    users::grant_memberships(db, user.id, &identity.role_group_ids).await?;

    info!(user_id = user.id, "Login created new account");
    Ok(ResolvedLogin {
        user,
        outcome: LoginOutcome::Created,
    })
}

fn rename_to(user: &User, nickname: &str) -> Option<String> {
    (user.display_name != nickname).then(|| nickname.to_string())
}

async fn apply<C: ConnectionTrait>(db: &C, id: i32, changes: UserChanges) -> AppResult<User> {
    users::update(db, id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}
