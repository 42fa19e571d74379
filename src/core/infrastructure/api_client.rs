//! Internal HTTP client that owns the token cache and issues bearer-authenticated requests.

use crate::{
    BearerToken, ClientConfig, TcwError, TcwResult,
    auth::application::service::login_service::LoginService,
    core::{
        domain::model::connection::Connection,
        infrastructure::http_session::HttpSession,
    },
};
use governor::DefaultDirectRateLimiter;
use reqwest::{
    Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Internal HTTP client that manages the bearer token and calls the node API.
///
/// The token is reused while younger than the configured lifetime and fetched
/// again lazily on the next call after that. Refreshes are serialized so that
/// concurrent callers trigger a single login. A `401 Unauthorized` answer forces
/// one re-login and one retry of the request.
#[derive(Debug)]
pub struct ApiClient {
    connection: Arc<Connection>,
    token: Arc<RwLock<Option<BearerToken>>>,
    refresh_lock: Arc<Mutex<()>>,
    config: Arc<ClientConfig>,
    login_service: LoginService,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts without a token.
    ///
    /// # Errors
    /// Returns `TcwError::InvalidInput` if the rate limit has zero capacity.
    pub fn new(connection: Connection, config: ClientConfig) -> TcwResult<Self> {
        let rate_limiter = config
            .rate_limit
            .map(|rl| {
                rl.quota()
                    .map(|quota| Arc::new(DefaultDirectRateLimiter::direct(quota)))
            })
            .transpose()?;

        Ok(Self {
            connection: Arc::new(connection),
            token: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            config: Arc::new(config),
            login_service: LoginService::new(),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Replaces the cached token.
    pub async fn set_token(&self, token: BearerToken) {
        let mut lock = self.token.write().await;
        *lock = Some(token);
    }

    /// Returns the cached token, fresh or not.
    pub async fn cached_token(&self) -> Option<BearerToken> {
        self.token.read().await.clone()
    }

    /// Returns `true` if there is a fresh token in the cache.
    pub async fn is_authenticated(&self) -> bool {
        self.fresh_token().await.is_some()
    }

    /// Returns a usable bearer token, logging in only when the cache is empty or stale.
    ///
    /// # Errors
    /// `TcwError::Authentication` when the login fails; the cache is left as it was.
    pub async fn get_token(&self) -> TcwResult<BearerToken> {
        if let Some(token) = self.fresh_token().await {
            tracing::debug!("Using cached bearer token");
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another task may have logged in while we waited.
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }
        self.login_locked().await
    }

    /// Logs in unconditionally and caches the new token.
    pub async fn login(&self) -> TcwResult<BearerToken> {
        let _guard = self.refresh_lock.lock().await;
        self.login_locked().await
    }

    /// Opens an HTTP session for one logical operation.
    pub fn open_session(&self) -> TcwResult<HttpSession> {
        HttpSession::open(&self.connection)
    }

    /// Performs an authenticated GET request and parses the JSON body.
    ///
    /// # Errors
    /// `Transport` for network failures, non-2xx answers and unparsable bodies;
    /// `Authentication` when no token can be obtained.
    pub async fn get<T>(&self, session: &HttpSession, path: &str) -> TcwResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .execute_request(session, Method::GET, path, None, "application/json")
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TcwError::Transport(format!("Failed to parse response: {}", e)))
    }

    /// Performs an authenticated PATCH with a JSON-patch body. The response body is ignored.
    pub async fn patch<B>(&self, session: &HttpSession, path: &str, body: &B) -> TcwResult<()>
    where
        B: serde::Serialize,
    {
        let body = serde_json::to_vec(body)
            .map_err(|e| TcwError::InvalidInput(format!("Cannot serialize body: {}", e)))?;
        self.execute_request(
            session,
            Method::PATCH,
            path,
            Some(body),
            "application/json-patch+json",
        )
        .await?;
        Ok(())
    }

    /// Core request execution: attaches the token, sends, and on 401 logs in
    /// again and retries exactly once.
    async fn execute_request(
        &self,
        session: &HttpSession,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        content_type: &'static str,
    ) -> TcwResult<reqwest::Response> {
        let token = self.get_token().await?;
        let response = self
            .send(session, method.clone(), path, body.clone(), content_type, &token)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(path, "Token rejected, logging in again");
            let token = self.refresh_rejected(&token).await?;
            let response = self
                .send(session, method, path, body, content_type, &token)
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(TcwError::Authentication(
                    "Token rejected after fresh login".to_string(),
                ));
            }
            return Self::check_status(response).await;
        }

        Self::check_status(response).await
    }

    async fn send(
        &self,
        session: &HttpSession,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        content_type: &'static str,
        token: &BearerToken,
    ) -> TcwResult<reqwest::Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.server().endpoint(path);
        tracing::debug!(%method, %url, "Sending API request");

        let mut req_builder = session
            .client()
            .request(method, &url)
            .header(AUTHORIZATION, token.as_authorization_header())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, content_type);

        if let Some(body) = body {
            req_builder = req_builder.body(body);
        }

        req_builder
            .send()
            .await
            .map_err(|e| TcwError::Transport(format!("HTTP request failed: {}", e)))
    }

    async fn check_status(response: reqwest::Response) -> TcwResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Err(TcwError::Transport(format!(
            "API error ({}): {}",
            status, error_text
        )))
    }

    /// Re-login after the server rejected `rejected`, unless a concurrent
    /// caller already replaced it.
    async fn refresh_rejected(&self, rejected: &BearerToken) -> TcwResult<BearerToken> {
        let _guard = self.refresh_lock.lock().await;
        if let Some(current) = self.fresh_token().await {
            if current.as_str() != rejected.as_str() {
                return Ok(current);
            }
        }
        self.login_locked().await
    }

    /// Must be called with `refresh_lock` held.
    async fn login_locked(&self) -> TcwResult<BearerToken> {
        let token = self.login_service.execute(&self.connection).await?;
        tracing::info!(
            server = self.connection.server().as_str(),
            login = self.connection.login(),
            "Logged in"
        );
        self.set_token(token.clone()).await;
        Ok(token)
    }

    async fn fresh_token(&self) -> Option<BearerToken> {
        let lock = self.token.read().await;
        lock.as_ref()
            .filter(|t| !t.is_expired(self.config.token_lifetime))
            .cloned()
    }
}
