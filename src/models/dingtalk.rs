//! DingTalk identity payloads and login request/response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserResponse;

/// External identity as reported by DingTalk's `contact/users/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIdentity {
    #[serde(rename = "unionId")]
    pub union_id: Option<String>,
    pub nick: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub dingtalk_id: Option<String>,
    /// Groups granted when the login creates a brand-new account.
    #[serde(default)]
    pub role_group_ids: Vec<i32>,
}

impl ExternalIdentity {
    /// Nickname, falling back to `name`. Blank values count as absent.
    pub fn nickname(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// unionId when present and non-blank.
    pub fn union_id(&self) -> Option<&str> {
        self.union_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Response from `POST /v1.0/oauth2/userAccessToken`.
#[derive(Debug, Deserialize)]
pub struct DingTalkTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Error envelope DingTalk returns from its v1.0 API.
#[derive(Debug, Deserialize)]
pub struct DingTalkErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}
