//! E2E tests: tags, role groups and user administration.

use actix_web::http::Method;
use pbi_access_lib::models::UserRole;
use serde_json::{Value, json};

use super::test_helpers::*;

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn test_report_tags_round_trip() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(&admin),
        Some(json!({
            "name": "Revenue",
            "powerbi_id": "pbi-rev",
            "tags": ["finance", " monthly ", "finance"],
        })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["tags"], json!(["finance", "monthly"]));
    assert_eq!(body["is_hide_report"], true, "reports start hidden");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/reports/{}/tags", id),
        Some(&admin),
        Some(json!({"name": "board"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["tags"], json!(["board", "finance", "monthly"]));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/reports/{}/tags/board", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    // The tag row outlives the association
    let (_, body) = send(&app, Method::GET, "/api/tags", Some(&admin), None).await;
    assert_eq!(names(&body), vec!["board", "finance", "monthly"]);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/reports/{}/tags/board", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 404);

    // Replacing the tag set through update
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/reports/{}", id),
        Some(&admin),
        Some(json!({"tags": ["weekly"]})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["tags"], json!(["weekly"]));
}

#[actix_rt::test]
async fn test_tag_crud_and_conflicts() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&admin),
        Some(json!({"name": "ops"})),
    )
    .await;
    assert_eq!(status, 201);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&admin),
        Some(json!({"name": "ops"})),
    )
    .await;
    assert_eq!(status, 409);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&admin),
        Some(json!({"name": "x".repeat(31)})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tags/{}", id),
        Some(&admin),
        Some(json!({"name": "operations"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "operations");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/tags/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/tags/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_duplicate_membership_conflicts() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let member = seed_user(&env.pool, "frank", UserRole::User).await;
    let group = create_group(&app, &admin, "Audit").await;
    let uri = format!("/api/role_groups/{}/users", group);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({"user_id": member.id})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["user_count"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({"user_id": member.id})),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = send(&app, Method::POST, &uri, Some(&admin), Some(json!({}))).await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({"user_id": 4242})),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{}/{}", uri, member.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (_, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_role_group_lifecycle() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let member = seed_user(&env.pool, "gina", UserRole::User).await;

    let group = create_group(&app, &admin, "Marketing").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/role_groups",
        Some(&admin),
        Some(json!({"name": "Marketing"})),
    )
    .await;
    assert_eq!(status, 409);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/role_groups/{}", group),
        Some(&admin),
        Some(json!({"description": "Campaign dashboards"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Marketing");
    assert_eq!(body["description"], "Campaign dashboards");

    send(
        &app,
        Method::POST,
        &format!("/api/users/{}/role-groups", member.id),
        Some(&admin),
        Some(json!({"role_group_ids": [group]})),
    )
    .await;
    let (_, body) = send(&app, Method::GET, "/api/role_groups", Some(&admin), None).await;
    assert_eq!(body[0]["users"][0]["name"], "gina");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/role_groups/{}", group),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/users/{}/role-groups", member.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_user_pre_registration_and_admin_rules() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (root, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let group = create_group(&app, &admin, "Support").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Hana", "role": "editor", "role_group_ids": [group, 777]})),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["is_bind"], false);
    assert_eq!(body["role"], "editor");
    assert_eq!(body["role_groups"][0]["id"], group);
    let hana = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Hana"})),
    )
    .await;
    assert_eq!(status, 409);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Ivan", "role": "superuser"})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", hana),
        Some(&admin),
        Some(json!({"name": "Hana K", "role_group_ids": []})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Hana K");
    assert_eq!(body["is_bind"], false, "the placeholder follows the rename");
    assert!(body["role_groups"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", root.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", hana),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/users/{}", hana),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_rename_onto_taken_external_id_conflicts() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (root, admin) = seed_session(&env, "root", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({"name": "Carl"})),
    )
    .await;
    assert_eq!(status, 201);
    let carl = body["id"].as_i64().unwrap();

    // The admin's bound external id is "union-root"
    let taken = root.external_identity_id.clone().unwrap();
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", carl),
        Some(&admin),
        Some(json!({ "name": taken })),
    )
    .await;
    assert_eq!(status, 409, "{}", body);
    assert_eq!(body["code"], "CONFLICT");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/users/{}", carl),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(body["name"], "Carl");
    assert_eq!(body["is_bind"], false);
}

#[actix_rt::test]
async fn test_repeated_ids_add_member_once() {
    let env = setup().await;
    let app = create_test_app(&env).await;
    let (_, admin) = seed_session(&env, "root", UserRole::Admin).await;
    let member = seed_user(&env.pool, "mia", UserRole::User).await;
    let group = create_group(&app, &admin, "Logistics").await;
    let uri = format!("/api/role_groups/{}/users", group);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({"user_id": member.id, "user_ids": [member.id, member.id]})),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["user_count"], 1);

    let (_, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(ids(&body), vec![member.id as i64]);
}
