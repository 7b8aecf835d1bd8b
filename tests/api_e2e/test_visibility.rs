//! E2E tests: who sees which report.

use actix_web::http::Method;
use pbi_access_lib::models::UserRole;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_admin_and_editor_see_everything() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let (_, editor) = seed_session(&env, "ed", UserRole::Editor).await;

    let hidden = create_report(&app, &admin, "Hidden", true).await;
    let shown = create_report(&app, &admin, "Shown", false).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/reports/{}", shown),
        Some(&admin),
        Some(json!({"is_active": false})),
    )
    .await;
    assert_eq!(status, 200);

    for cookie in [&admin, &editor] {
        let (status, body) = send(&app, Method::GET, "/api/reports", Some(cookie), None).await;
        assert_eq!(status, 200);
        assert_eq!(ids(&body), vec![hidden, shown]);
        assert!(
            body.as_array()
                .unwrap()
                .iter()
                .all(|r| r["powerbi_id"].is_string()),
            "privileged roles get the Power BI id: {}",
            body
        );
    }
}

#[actix_rt::test]
async fn test_user_sees_active_unhidden_group_reports() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let (user, cookie) = seed_session(&env, "dave", UserRole::User).await;

    let linked = create_report(&app, &admin, "Linked", false).await;
    let linked_hidden = create_report(&app, &admin, "LinkedHidden", true).await;
    let unlinked = create_report(&app, &admin, "Unlinked", false).await;

    let group = create_group(&app, &admin, "Sales").await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/role_groups/{}/users", group),
        Some(&admin),
        Some(json!({"user_id": user.id})),
    )
    .await;
    assert_eq!(status, 200);
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/role_groups/{}/visible_reports", group),
        Some(&admin),
        Some(json!({"report_ids": [linked, linked_hidden]})),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send(&app, Method::GET, "/api/reports", Some(&cookie), None).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![linked]);
    assert!(body[0]["powerbi_id"].is_null(), "list withholds the id");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/reports/{}", linked),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["powerbi_id"], "pbi-Linked");

    for id in [linked_hidden, unlinked] {
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/reports/{}", id),
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, 403);
    }
}

#[actix_rt::test]
async fn test_soft_delete_hides_from_users_only() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let (user, cookie) = seed_session(&env, "erin", UserRole::User).await;

    let report = create_report(&app, &admin, "Churn", false).await;
    let group = create_group(&app, &admin, "Ops").await;
    send(
        &app,
        Method::POST,
        &format!("/api/role_groups/{}/users", group),
        Some(&admin),
        Some(json!({"user_ids": [user.id]})),
    )
    .await;
    send(
        &app,
        Method::POST,
        &format!("/api/role_groups/{}/visible_reports/{}", group, report),
        Some(&admin),
        None,
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/reports", Some(&cookie), None).await;
    assert_eq!(ids(&body), vec![report]);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/reports/{}", report),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (_, body) = send(&app, Method::GET, "/api/reports", Some(&cookie), None).await;
    assert!(ids(&body).is_empty());

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/reports/{}", report),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["is_active"], false);
}

#[actix_rt::test]
async fn test_set_visible_reports_is_idempotent() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let a = create_report(&app, &admin, "A", false).await;
    let b = create_report(&app, &admin, "B", false).await;
    let c = create_report(&app, &admin, "C", false).await;
    let group = create_group(&app, &admin, "Finance").await;
    let uri = format!("/api/role_groups/{}/visible_reports", group);

    let mut results = Vec::new();
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(&admin),
            Some(json!({"report_ids": [b, a, a, 9999]})),
        )
        .await;
        assert_eq!(status, 200);
        results.push(body["visible_reports"].clone());
    }
    assert_eq!(results[0], json!([a, b]));
    assert_eq!(results[0], results[1]);

    // Linking an already visible report changes nothing
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/{}", uri, a),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["visible_reports"], json!([a, b]));

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/role_groups/{}/available_reports", group),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![c]);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{}/{}", uri, b),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{}/{}", uri, b),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 404);

    let (_, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(ids(&body), vec![a]);
}
