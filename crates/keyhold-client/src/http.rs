//! HTTP client for a Consul-compatible coordination service
//!
//! Covers the session and KV endpoints the lock protocol needs: TTL-bound
//! session lifecycle and session-conditional KV writes/deletes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::CoordinationClient;
use crate::error::{ClientError, Result};
use crate::model::{KvPair, Session, SessionCreateRequest, SessionCreateResponse};

/// Configuration for the coordination-service HTTP client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server address, e.g. "http://127.0.0.1:8500"
    pub server_addr: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Optional ACL token sent as `X-Consul-Token`
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "http://127.0.0.1:8500".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            token: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given server address
    pub fn new(server_addr: &str) -> Self {
        Self {
            server_addr: server_addr.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set the ACL token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Coordination-service client over the Consul v1 HTTP API
pub struct HttpCoordinationClient {
    client: Client,
    config: ClientConfig,
}

impl HttpCoordinationClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Build full URL for an API path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.server_addr, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.build_url(path));
        if let Some(ref token) = self.config.token {
            builder = builder.header("X-Consul-Token", token);
        }
        builder
    }

    /// Parse a successful response as JSON, mapping non-2xx to `ServerError`
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Look up a session by id. `None` if the session does not exist or has
    /// expired.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/session/info/{}", session_id),
            )
            .send()
            .await?;
        let sessions: Vec<Session> = self.handle_response(response).await?;
        Ok(sessions.into_iter().next())
    }

    /// Renew a session's TTL. `None` if the session does not exist or has
    /// expired.
    pub async fn renew_session(&self, session_id: &str) -> Result<Option<Session>> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/v1/session/renew/{}", session_id),
            )
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let sessions: Vec<Session> = self.handle_response(response).await?;
        Ok(sessions.into_iter().next())
    }

    /// Read a key. `None` if it does not exist.
    pub async fn get_key(&self, key: &str) -> Result<Option<KvPair>> {
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/kv/{}", key))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let pairs: Vec<KvPair> = self.handle_response(response).await?;
        Ok(pairs.into_iter().next())
    }

    /// Unconditionally delete a key
    async fn delete_key(&self, key: &str) -> Result<bool> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/v1/kv/{}", key))
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl CoordinationClient for HttpCoordinationClient {
    async fn create_session(&self, ttl_seconds: u64) -> Result<String> {
        // LockDelay 0: these are temporary single-lock sessions, nothing
        // should linger after invalidation.
        // Behavior "delete": the service removes held keys when the session
        // dies, so a crashed holder cannot leave a stale record behind.
        let body = SessionCreateRequest {
            lock_delay: Some("0s".to_string()),
            behavior: Some("delete".to_string()),
            ttl: Some(format!("{}s", ttl_seconds)),
            ..Default::default()
        };

        let response = self
            .request(reqwest::Method::PUT, "/v1/session/create")
            .json(&body)
            .send()
            .await?;
        let created: SessionCreateResponse = self.handle_response(response).await?;

        if created.id.is_empty() {
            return Err(ClientError::InvalidResponse(
                "session create returned an empty id".to_string(),
            ));
        }

        debug!(session_id = %created.id, ttl_seconds, "session created");
        Ok(created.id)
    }

    async fn destroy_session(&self, session_id: &str) -> Result<bool> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/v1/session/destroy/{}", session_id),
            )
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.handle_response(response).await
    }

    async fn acquire_key(&self, key: &str, value: &str, session_id: &str) -> Result<bool> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/v1/kv/{}", key))
            .query(&[("acquire", session_id)])
            .body(value.to_string())
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn release_key(&self, key: &str, session_id: &str) -> Result<bool> {
        // The `release` write only succeeds for the owning session, so the
        // follow-up delete never runs for a record some other session now
        // holds.
        let response = self
            .request(reqwest::Method::PUT, &format!("/v1/kv/{}", key))
            .query(&[("release", session_id)])
            .send()
            .await?;
        let released: bool = self.handle_response(response).await?;

        if !released {
            return Ok(false);
        }
        self.delete_key(key).await?;
        Ok(true)
    }
}
