//! Mock DingTalk provider for E2E tests.
//!
//! Serves the two v1.0 endpoints the login flow calls. Each registered
//! authorization code maps to one profile; the issued access token is
//! `at-<code>`.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

const ACCESS_TOKEN_HEADER: &str = "x-acs-dingtalk-access-token";

/// Shared state for the mock provider.
#[derive(Default)]
pub struct MockDingTalkState {
    pub profiles: HashMap<String, Value>,
}

type SharedState = web::Data<Arc<Mutex<MockDingTalkState>>>;

#[post("/v1.0/oauth2/userAccessToken")]
async fn user_access_token(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let code = body["code"].as_str().unwrap_or_default().to_string();
    let known = state.lock().unwrap().profiles.contains_key(&code);

    if body["clientId"].as_str() != Some(super::test_helpers::TEST_APP_KEY) {
        return HttpResponse::BadRequest().json(json!({
            "code": "InvalidClient",
            "message": "unknown clientId",
        }));
    }

    if known {
        HttpResponse::Ok().json(json!({
            "accessToken": format!("at-{}", code),
            "refreshToken": format!("rt-{}", code),
            "expireIn": 7200,
        }))
    } else {
        HttpResponse::BadRequest().json(json!({
            "code": "InvalidAuthCode",
            "message": "authorization code is invalid or expired",
        }))
    }
}

#[get("/v1.0/contact/users/me")]
async fn users_me(state: SharedState, req: HttpRequest) -> HttpResponse {
    let code = req
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("at-"))
        .unwrap_or_default()
        .to_string();

    match state.lock().unwrap().profiles.get(&code) {
        Some(profile) => HttpResponse::Ok().json(profile),
        None => HttpResponse::Unauthorized().json(json!({
            "code": "InvalidAuthentication",
            "message": "access token is invalid",
        })),
    }
}

/// Mock DingTalk provider serving the token and profile endpoints.
pub struct MockDingTalk {
    pub base_url: String,
    pub state: Arc<Mutex<MockDingTalkState>>,
}

impl MockDingTalk {
    /// Start the mock provider on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockDingTalkState::default()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(user_access_token)
                .service(users_me)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Server lives until the test runtime shuts down
        tokio::spawn(server);

        MockDingTalk { base_url, state }
    }

    /// Make `code` log in as `profile`.
    pub fn register(&self, code: &str, profile: Value) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(code.to_string(), profile);
    }
}
