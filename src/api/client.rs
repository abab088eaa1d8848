use super::{ApiError, FeedRecord, ItemId, ItemRecord, ItemsApi, PendingRequests};
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Body the server sends with a 403 when the session header is rejected.
pub const AUTH_FAILURE_MARKER: &str = "Bad or missing X-Authentication header";

const AUTH_HEADER: &str = "X-Authentication";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    name: String,
    #[serde(rename = "sessionID")]
    session_id: String,
}

/// `reqwest` client for the reader server.
///
/// Attaches the session header to every request, tracks in-flight requests
/// in [`PendingRequests`], and clears the session when the server reports it
/// invalid. Nothing is retried.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: SessionStore,
    pending: PendingRequests,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(
        server_url: &str,
        session: SessionStore,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut base = Url::parse(server_url)?;
        // Url::join drops the last path segment unless it ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        // PERF-019: Connection pooling for the many small item requests
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("tpr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(server = %base, timeout_secs = timeout.as_secs(), "API client configured");

        Ok(Self {
            http,
            base,
            session,
            pending: PendingRequests::new(),
            timeout,
        })
    }

    /// Shared in-flight counter for the "Working..." indicator.
    pub fn pending(&self) -> PendingRequests {
        self.pending.clone()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send one request and return the response body.
    ///
    /// The pending counter covers the whole exchange including the body read.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let url = self.base.join(path)?;
        let _pending = self.pending.begin();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            request = request.header(AUTH_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let timed_out = |_| ApiError::Timeout(self.timeout.as_secs());
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(timed_out)??;
        let status = response.status();
        let text = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(timed_out)??;

        if status == StatusCode::FORBIDDEN && text.trim() == AUTH_FAILURE_MARKER {
            tracing::warn!(%method, path, "Server rejected session, clearing it");
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "Failed to remove session file");
            }
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "Request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::trace!(%method, path, status = status.as_u16(), "Request complete");
        Ok(text)
    }

    /// Like [`Self::execute`], but refuses to send without a session.
    ///
    /// Once the server has rejected the session it is cleared, so later item
    /// requests fail locally instead of going out without the header.
    async fn execute_authenticated(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        if !self.session.is_authenticated() {
            tracing::debug!(%method, path, "No session, request not sent");
            return Err(ApiError::NotLoggedIn);
        }
        self.execute(method, path, body).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute_authenticated(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Create a session and persist it.
    pub async fn login(&self, name: &str, password: &SecretString) -> Result<(), ApiError> {
        let credentials = serde_json::json!({
            "name": name,
            "password": password.expose_secret(),
        });
        let body = self
            .execute(Method::POST, "api/sessions", Some(credentials))
            .await?;
        let created: LoginResponse = serde_json::from_str(&body)?;
        self.session.set(created.session_id, created.name)?;
        tracing::info!(user = %name, "Logged in");
        Ok(())
    }

    /// Delete the session on the server and forget it locally.
    ///
    /// The local session is cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let token = self.session.token().ok_or(ApiError::NotLoggedIn)?;
        let result = self
            .execute(Method::DELETE, &format!("api/sessions/{}", token), None)
            .await
            .map(|_| ());
        self.session.clear()?;
        result
    }

    pub async fn get_feeds(&self) -> Result<Vec<FeedRecord>, ApiError> {
        self.get_json("api/feeds").await
    }
}

#[async_trait]
impl ItemsApi for ApiClient {
    async fn get_unread_items(&self) -> Result<Vec<ItemRecord>, ApiError> {
        self.get_json("api/items/unread").await
    }

    async fn get_archived_items(&self) -> Result<Vec<ItemRecord>, ApiError> {
        self.get_json("api/items/archived").await
    }

    async fn mark_item_read(&self, id: ItemId) -> Result<(), ApiError> {
        self.execute_authenticated(
            Method::DELETE,
            &format!("api/items/unread/{}", id),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn mark_all_read(&self, ids: &[ItemId]) -> Result<(), ApiError> {
        let body = serde_json::json!({ "itemIDs": ids });
        self.execute_authenticated(
            Method::POST,
            "api/items/unread/mark_multiple_read",
            Some(body),
        )
        .await
        .map(|_| ())
    }
}
