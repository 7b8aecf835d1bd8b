//! DingTalk single-sign-on client.
//!
//! Flow:
//! 1. Browser is sent to the QR-code authorization page (`authorization_url`)
//! 2. DingTalk redirects back with a one-time `code`
//! 3. `exchange_code` trades it for a user access token
//! 4. `fetch_profile` reads `contact/users/me` with that token

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::config::DingTalkSettings;
use crate::error::{AppError, AppResult};
use crate::models::ExternalIdentity;
use crate::models::dingtalk::{DingTalkErrorBody, DingTalkTokenResponse};

/// HTTP connect timeout for DingTalk API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for DingTalk API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
/// Header carrying the user access token on v1.0 API calls.
const ACCESS_TOKEN_HEADER: &str = "x-acs-dingtalk-access-token";

/// Client for the DingTalk OAuth and contact endpoints.
#[derive(Clone)]
pub struct DingTalkClient {
    http: reqwest::Client,
    settings: DingTalkSettings,
}

impl DingTalkClient {
    /// Build a client with connect and request timeouts.
    pub fn new(settings: DingTalkSettings) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { http, settings })
    }

    /// Browser-facing QR-code login URL.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}/connect/qrconnect?appid={}&response_type=code&scope=snsapi_login&redirect_uri={}",
            self.settings.oauth_base.trim_end_matches('/'),
            urlencoding::encode(&self.settings.app_key),
            urlencoding::encode(&self.settings.redirect_uri),
        )
    }

    /// Exchange an authorization code for a user access token.
    pub async fn exchange_code(&self, code: &str) -> AppResult<SecretString> {
        let url = format!("{}/v1.0/oauth2/userAccessToken", self.api_base());
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({
                "clientId": self.settings.app_key,
                "clientSecret": self.settings.app_secret.expose_secret(),
                "code": code,
                "grantType": "authorization_code",
            }))
            .send()
            .await
            .map_err(|e| {
                warn!("DingTalk: token exchange request failed: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(provider_error("token exchange", status, response).await);
        }

        let body: DingTalkTokenResponse = response.json().await.map_err(|e| {
            warn!("DingTalk: failed to parse token response: {}", e);
            AppError::Upstream("Failed to obtain DingTalk user token".to_string())
        })?;

        body.access_token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| {
                warn!(
                    code = body.code.as_deref().unwrap_or("-"),
                    "DingTalk: no accessToken in response"
                );
                AppError::Upstream("Failed to obtain DingTalk user token".to_string())
            })
    }

    /// Fetch the profile of the user owning `access_token`.
    pub async fn fetch_profile(&self, access_token: &SecretString) -> AppResult<ExternalIdentity> {
        let url = format!("{}/v1.0/contact/users/me", self.api_base());
        let response = self
            .http
            .get(url)
            .header(ACCESS_TOKEN_HEADER, access_token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!("DingTalk: profile request failed: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(provider_error("profile", status, response).await);
        }

        response.json().await.map_err(|e| {
            warn!("DingTalk: failed to parse profile: {}", e);
            AppError::Upstream("Failed to read DingTalk profile".to_string())
        })
    }

    /// Code exchange followed by profile fetch.
    pub async fn identify(&self, code: &str) -> AppResult<ExternalIdentity> {
        let token = self.exchange_code(code).await?;
        self.fetch_profile(&token).await
    }

    fn api_base(&self) -> &str {
        self.settings.api_base.trim_end_matches('/')
    }
}

async fn provider_error(step: &str, status: StatusCode, response: reqwest::Response) -> AppError {
    let detail = match response.json::<DingTalkErrorBody>().await {
        Ok(body) => body
            .message
            .or(body.code)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    };
    warn!("DingTalk: {} rejected with {}: {}", step, status, detail);
    AppError::Upstream(format!("DingTalk {} failed: {}", step, detail))
}
