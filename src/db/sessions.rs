//! Database operations for login sessions.

use chrono::Utc;
use sea_orm::*;
use sha2::{Digest, Sha256};

use crate::entity::session;
use crate::error::AppResult;

/// Hash a session token using SHA-256.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random 256-bit session token, hex encoded.
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Insert a new session (stores the hash, not the raw token).
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    token_hash: &str,
    ttl_secs: u64,
) -> AppResult<()> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_secs as i64);

    let model = session::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash.to_owned()),
        expires_at: Set(expires_at),
        revoked_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    session::Entity::insert(model).exec(db).await?;
    Ok(())
}

/// Find a live (non-revoked, non-expired) session by its hash.
/// Returns the user_id if valid.
pub async fn find_valid_by_hash<C: ConnectionTrait>(
    db: &C,
    token_hash: &str,
) -> AppResult<Option<i32>> {
    let result = session::Entity::find()
        .filter(session::Column::TokenHash.eq(token_hash))
        .filter(session::Column::RevokedAt.is_null())
        .filter(session::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?;

    Ok(result.map(|m| m.user_id))
}

/// Revoke a session by its hash.
pub async fn revoke_by_hash<C: ConnectionTrait>(db: &C, token_hash: &str) -> AppResult<bool> {
    let result = session::Entity::find()
        .filter(session::Column::TokenHash.eq(token_hash))
        .filter(session::Column::RevokedAt.is_null())
        .one(db)
        .await?;

    if let Some(m) = result {
        let mut active: session::ActiveModel = m.into();
        active.revoked_at = Set(Some(Utc::now()));
        active.update(db).await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Delete a user's expired sessions.
pub async fn prune_expired_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<u64> {
    let result = session::Entity::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
