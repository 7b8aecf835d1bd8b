//! Shared test helpers for API E2E tests.

use actix_web::cookie::Cookie;
use actix_web::{App, dev::ServiceResponse, http::Method, test, web};
use pbi_access_lib::config::{
    Config, DatabaseSettings, DingTalkSettings, Environment, SESSION_COOKIE, SessionSettings,
};
use pbi_access_lib::db::DbPool;
use pbi_access_lib::db::users::{self, NewUser};
use pbi_access_lib::models::{User, UserRole};
use pbi_access_lib::services::{DingTalkClient, session};
use secrecy::SecretString;
use serde_json::Value;

use super::mock_dingtalk::MockDingTalk;

/// DingTalk app key the mock provider accepts.
pub const TEST_APP_KEY: &str = "test-app-key";

/// Everything one test needs: its own database, config and provider.
pub struct TestEnv {
    pub pool: DbPool,
    pub config: Config,
    pub mock: MockDingTalk,
}

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps every query on the same SQLite memory database.
pub async fn create_test_pool() -> DbPool {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let pool = DbPool::new(&settings)
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

/// Config pointing the DingTalk client at the mock provider.
pub fn test_config(api_base: &str) -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        dingtalk: DingTalkSettings {
            app_key: TEST_APP_KEY.to_string(),
            app_secret: SecretString::from("test-app-secret".to_string()),
            redirect_uri: "http://localhost:5173/login/callback".to_string(),
            api_base: api_base.to_string(),
            oauth_base: "https://oapi.dingtalk.com".to_string(),
        },
        session: SessionSettings {
            ttl_secs: 3600,
            cross_site: false,
        },
        cors_origins: vec![],
        log_level: "info".to_string(),
    }
}

/// Database, mock provider and config for one test.
pub async fn setup() -> TestEnv {
    let mock = MockDingTalk::start().await;
    let pool = create_test_pool().await;
    let config = test_config(&mock.base_url);
    TestEnv { pool, config, mock }
}

/// Create a test app wired like the production server.
pub async fn create_test_app(
    env: &TestEnv,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let client = DingTalkClient::new(env.config.dingtalk.clone()).expect("client");

    test::init_service(
        App::new()
            .app_data(web::Data::new(env.pool.clone()))
            .app_data(web::Data::new(env.config.clone()))
            .app_data(web::Data::new(client))
            .configure(pbi_access_lib::configure_app),
    )
    .await
}

/// Insert a bound user directly.
pub async fn seed_user(pool: &DbPool, name: &str, role: UserRole) -> User {
    users::insert(
        pool.connection(),
        NewUser {
            external_identity_id: Some(format!("union-{}", name)),
            display_name: name.to_string(),
            email: format!("{}@example.com", name),
            role,
            last_login_at: None,
        },
    )
    .await
    .expect("Failed to seed user")
}

/// Open a session for `user` and return the cookie a browser would send.
pub async fn login_as(env: &TestEnv, user: &User) -> Cookie<'static> {
    let token = session::open(env.pool.connection(), user.id, &env.config.session)
        .await
        .expect("Failed to open session");
    Cookie::new(SESSION_COOKIE, token)
}

/// Seed a user with `role` and log them in.
pub async fn seed_session(env: &TestEnv, name: &str, role: UserRole) -> (User, Cookie<'static>) {
    let user = seed_user(&env.pool, name, role).await;
    let cookie = login_as(env, &user).await;
    (user, cookie)
}

/// Send a request and return status and JSON body (`Null` for empty bodies).
pub async fn send<S>(
    app: &S,
    method: Method,
    uri: &str,
    cookie: Option<&Cookie<'static>>,
    body: Option<Value>,
) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::default().method(method).uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, body)
}

/// Create a report as `cookie` and return its id.
pub async fn create_report<S>(
    app: &S,
    cookie: &Cookie<'static>,
    name: &str,
    hidden: bool,
) -> i64
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send(
        app,
        Method::POST,
        "/api/reports",
        Some(cookie),
        Some(serde_json::json!({
            "name": name,
            "powerbi_id": format!("pbi-{}", name),
            "is_hide_report": hidden,
        })),
    )
    .await;
    assert_eq!(status, 201, "Failed to create report: {}", body);
    body["id"].as_i64().unwrap()
}

/// Create a role group as `cookie` and return its id.
pub async fn create_group<S>(app: &S, cookie: &Cookie<'static>, name: &str) -> i64
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send(
        app,
        Method::POST,
        "/api/role_groups",
        Some(cookie),
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(status, 201, "Failed to create role group: {}", body);
    body["id"].as_i64().unwrap()
}

/// Ids in a JSON array of objects.
pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}
