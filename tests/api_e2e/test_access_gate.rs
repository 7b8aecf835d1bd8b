//! E2E tests: session authentication, permissions and error mapping.

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use pbi_access_lib::config::SESSION_COOKIE;
use pbi_access_lib::db::users::{self, UserChanges};
use pbi_access_lib::models::UserRole;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_no_session_is_unauthorized() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    let (status, body) = send(&app, Method::GET, "/api/reports", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/auth/user", None, None).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_unknown_token_is_unauthorized() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    let forged = Cookie::new(SESSION_COOKIE, "deadbeef");
    let (status, _) = send(&app, Method::GET, "/api/reports", Some(&forged), None).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_plain_user_cannot_manage() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, cookie) = seed_session(&env, "alice", UserRole::User).await;

    let (status, _) = send(&app, Method::GET, "/api/reports", Some(&cookie), None).await;
    assert_eq!(status, 200, "view_reports is granted to every user");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(&cookie),
        Some(serde_json::json!({"name": "R", "powerbi_id": "x"})),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");

    for uri in ["/api/users", "/api/role_groups"] {
        let (status, _) = send(&app, Method::GET, uri, Some(&cookie), None).await;
        assert_eq!(status, 403, "{} should need a management permission", uri);
    }
}

#[actix_rt::test]
async fn test_editor_can_manage_reports() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, cookie) = seed_session(&env, "ed", UserRole::Editor).await;

    let id = create_report(&app, &cookie, "Quarterly", true).await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/reports/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["powerbi_id"], "pbi-Quarterly");
}

#[actix_rt::test]
async fn test_disabled_account_is_forbidden() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (user, cookie) = seed_session(&env, "bob", UserRole::Admin).await;

    users::update(
        env.pool.connection(),
        user.id,
        UserChanges {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/reports", Some(&cookie), None).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Account is disabled");
}

#[actix_rt::test]
async fn test_report_detail_missing_and_invisible() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let (_, user) = seed_session(&env, "carol", UserRole::User).await;

    let (status, _) = send(&app, Method::GET, "/api/reports/999", Some(&user), None).await;
    assert_eq!(status, 404);

    let id = create_report(&app, &admin, "Secret", false).await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/reports/{}", id),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "No access to this report");
}

#[actix_rt::test]
async fn test_bad_input_maps_to_400() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (status, body) = send(&app, Method::GET, "/api/reports/abc", Some(&admin), None).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&admin),
        Some(serde_json::json!({"label": 1})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(&admin),
        Some(serde_json::json!({"name": "No id"})),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_unknown_route_is_json_404() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/definitely/missing", None, None).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_health_endpoints_are_public() {
    let env = setup().await;
    let app = create_test_app(&env).await;

    for uri in ["/", "/api/health", "/api/ready"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, 200, "{} -> {}", uri, body);
    }
}
