//! Login sessions: opaque token in an HttpOnly cookie, SHA-256 hash in the database.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use sea_orm::ConnectionTrait;

use crate::config::{SESSION_COOKIE, SessionSettings};
use crate::db::{sessions, users};
use crate::error::AppResult;
use crate::models::User;

/// Open a session for the user and return the raw token.
///
/// Expired sessions of the same user are pruned first.
pub async fn open<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    settings: &SessionSettings,
) -> AppResult<String> {
    sessions::prune_expired_for_user(db, user_id).await?;

    let token = sessions::generate_token();
    let token_hash = sessions::hash_token(&token);
    sessions::insert(db, user_id, &token_hash, settings.ttl_secs).await?;
    Ok(token)
}

/// Resolve a raw session token to its user.
pub async fn user_for_token<C: ConnectionTrait>(db: &C, token: &str) -> AppResult<Option<User>> {
    let token_hash = sessions::hash_token(token);
    match sessions::find_valid_by_hash(db, &token_hash).await? {
        Some(user_id) => users::find_by_id(db, user_id).await,
        None => Ok(None),
    }
}

/// Revoke the session behind a raw token.
pub async fn close<C: ConnectionTrait>(db: &C, token: &str) -> AppResult<bool> {
    sessions::revoke_by_hash(db, &sessions::hash_token(token)).await
}

/// Session cookie carrying the raw token.
pub fn session_cookie(token: String, settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(token, settings);
    cookie.set_max_age(Duration::seconds(settings.ttl_secs as i64));
    cookie
}

/// Expired cookie that clears the session on the client.
pub fn clear_session_cookie(settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), settings);
    cookie.make_removal();
    cookie
}

fn base_cookie(value: String, settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    if settings.cross_site {
        cookie.set_same_site(SameSite::None);
        cookie.set_secure(true);
    } else {
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(false);
    }
    cookie
}
