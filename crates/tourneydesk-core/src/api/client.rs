//! API client for communicating with the tournament REST backend.
//!
//! This module provides the `ApiClient` struct for authenticating and for
//! making CRUD requests against the backend's entity collections.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::SessionData;
use crate::models::{Entity, PlayerStatsRow, Role, User, UserId};

use super::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("tourneydesk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    role: Role,
    user_id: UserId,
}

/// API client for the tournament backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.authorize(request).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    // ===== Session =====

    /// Exchange credentials for a session.
    /// A rejected login yields `ApiError::Unauthorized` and no session.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<SessionData> {
        let url = self.url("auth/login");
        debug!(url = %url, username = username, "Logging in");

        let body = LoginRequest { username, password };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;
        let login: LoginResponse = Self::parse_json(response, &url).await?;

        if login.token.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        Ok(SessionData {
            token: login.token,
            role: login.role,
            user_id: login.user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Backend health check
    pub async fn ping(&self) -> ApiResult<()> {
        let url = self.url("ping");
        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn fetch_users(&self) -> ApiResult<Vec<User>> {
        self.get("users").await
    }

    /// Aggregated statistics for every player
    pub async fn fetch_player_stats(&self) -> ApiResult<Vec<PlayerStatsRow>> {
        self.get("participant-stats/all-players").await
    }

    // ===== Generic entity CRUD =====

    pub async fn list<T: Entity>(&self) -> ApiResult<Vec<T>> {
        self.get(T::KIND.resource()).await
    }

    pub async fn fetch_one<T: Entity>(&self, id: &T::Id) -> ApiResult<T> {
        self.get(&format!("{}/{}", T::KIND.resource(), id)).await
    }

    pub async fn create<T: Entity>(&self, item: &T) -> ApiResult<T> {
        let url = self.url(T::KIND.resource());
        debug!(url = %url, kind = %T::KIND, "POST");
        self.send_json(self.client.post(&url), &url, item).await
    }

    pub async fn update<T: Entity>(&self, id: &T::Id, patch: &T::Patch) -> ApiResult<T> {
        let url = self.url(&format!("{}/{}", T::KIND.resource(), id));
        debug!(url = %url, kind = %T::KIND, "PATCH");
        self.send_json(self.client.patch(&url), &url, patch).await
    }

    pub async fn delete<T: Entity>(&self, id: &T::Id) -> ApiResult<()> {
        let url = self.url(&format!("{}/{}", T::KIND.resource(), id));
        debug!(url = %url, kind = %T::KIND, "DELETE");
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slashes() {
        let api = ApiClient::new("https://league.example.com/api/").unwrap();
        assert_eq!(api.base_url(), "https://league.example.com/api");
        assert_eq!(api.url("/ping"), "https://league.example.com/api/ping");
        assert_eq!(
            api.url("participant-stats/all-players"),
            "https://league.example.com/api/participant-stats/all-players"
        );
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let api = ApiClient::new("http://localhost:8080").unwrap();
        let authed = api.with_token("abc".to_string());
        assert_eq!(authed.token.as_deref(), Some("abc"));
        assert_eq!(authed.base_url(), "http://localhost:8080");
        assert!(api.token.is_none());
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"token":"eyJhbGciOi","role":"admin","userId":"42"}"#;
        let login: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(login.role, Role::Admin);
        assert_eq!(login.user_id, UserId::new("42"));
    }
}
