//! E2E tests: DingTalk login, account binding and sessions.

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::test;
use chrono::{DateTime, Utc};
use pbi_access_lib::config::SESSION_COOKIE;
use pbi_access_lib::models::UserRole;
use serde_json::{Value, json};

use super::test_helpers::*;

/// POST the callback and return status, body and the session cookie if one was set.
async fn callback<S>(app: &S, code: &str) -> (u16, Value, Option<Cookie<'static>>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/dingtalk/callback")
        .set_json(json!({ "code": code }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned());
    let body: Value = test::read_body_json(resp).await;
    (status, body, cookie)
}

fn last_login(user: &Value) -> DateTime<Utc> {
    let raw = user["last_login"].as_str().expect("last_login is set");
    DateTime::parse_from_rfc3339(raw)
        .expect("last_login is RFC 3339")
        .with_timezone(&Utc)
}

#[actix_rt::test]
async fn test_authorization_url() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    let (status, body) = send(&app, Method::GET, "/api/auth/dingtalk/url", None, None).await;
    assert_eq!(status, 200);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://oapi.dingtalk.com/connect/qrconnect?"));
    assert!(url.contains(&format!("appid={}", TEST_APP_KEY)));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2Flogin%2Fcallback"));
}

#[actix_rt::test]
async fn test_callback_rejects_missing_or_bad_code() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/dingtalk/callback",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing authorization code");

    let (status, body, cookie) = callback(&app, "never-issued").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(cookie.is_none());
}

#[actix_rt::test]
async fn test_first_login_creates_account_and_relogin_reuses_it() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    env.mock.register(
        "code-1",
        json!({"unionId": "u-jin", "nick": "Jin", "email": "jin@example.com"}),
    );
    env.mock.register("code-2", json!({"unionId": "u-jin", "nick": "Jin Park"}));

    let (status, body, cookie) = callback(&app, "code-1").await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["name"], "Jin");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["is_bind"], true);
    let first_login = last_login(&body["user"]);
    let first_id = body["user"]["id"].as_i64().unwrap();
    let cookie = cookie.expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));

    let (status, body) = send(&app, Method::GET, "/api/auth/user", Some(&cookie), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], first_id);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let (status, body, _) = callback(&app, "code-2").await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["id"], first_id);
    assert_eq!(body["user"]["name"], "Jin Park");
    let second_login = last_login(&body["user"]);
    assert!(
        second_login > first_login,
        "last_login should advance: {} -> {}",
        first_login,
        second_login
    );

    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let (_, users) = send(&app, Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_login_binds_pre_registered_account() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let group = create_group(&app, &admin, "Warehouse").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "张伟", "role_group_ids": [group]})),
    )
    .await;
    assert_eq!(status, 201);
    let pre_id = body["id"].as_i64().unwrap();

    // Nickname carries a Latin prefix; its local-script form matches
    env.mock.register("code-zw", json!({"unionId": "u-zw", "nick": "Wei 张伟"}));
    let (status, body, cookie) = callback(&app, "code-zw").await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["user"]["id"], pre_id);
    assert_eq!(body["user"]["is_bind"], true);
    assert_eq!(body["user"]["role_groups"][0]["id"], group);
    assert!(cookie.is_some());

    // A second login matches by unionId, not by name
    env.mock.register("code-zw2", json!({"unionId": "u-zw", "nick": "张伟"}));
    let (_, body, _) = callback(&app, "code-zw2").await;
    assert_eq!(body["user"]["id"], pre_id);
}

#[actix_rt::test]
async fn test_disabled_account_gets_no_session() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Kai"})),
    )
    .await;
    let kai = body["id"].as_i64().unwrap();
    send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", kai),
        Some(&admin),
        Some(json!({"is_active": false})),
    )
    .await;

    env.mock.register("code-kai", json!({"unionId": "u-kai", "nick": "Kai"}));
    let (status, body, cookie) = callback(&app, "code-kai").await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Account is disabled");
    assert!(cookie.is_none());

    // The binding is kept
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/users/{}", kai),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(body["is_bind"], true);
}

#[actix_rt::test]
async fn test_logout_revokes_session() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, cookie) = seed_session(&env, "lena", UserRole::User).await;

    let (status, _) = send(&app, Method::GET, "/api/auth/user", Some(&cookie), None).await;
    assert_eq!(status, 200);

    let (status, body) = send(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Logged out");

    let (status, _) = send(&app, Method::GET, "/api/auth/user", Some(&cookie), None).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_exact_name_binding_keeps_account() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Alice"})),
    )
    .await;
    let alice = body["id"].as_i64().unwrap();
    assert_eq!(body["is_bind"], false);

    env.mock.register("code-a", json!({"unionId": "U2", "nick": "Alice"}));
    let (status, body, _) = callback(&app, "code-a").await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["id"], alice);
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["is_bind"], true);
}
