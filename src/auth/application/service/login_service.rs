use crate::{
    BearerToken, TcwError, TcwResult,
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    config::API_LOGIN_ENDPOINT,
    core::{
        domain::{model::connection::Connection, value_object::validate_token},
        infrastructure::http_session::HttpSession,
    },
};

use reqwest::{
    StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};

/// Exchanges a login and password for a bearer token.
#[derive(Debug, Clone)]
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// Logs in with the connection's credentials.
    ///
    /// Every failure, including transport errors, is reported as
    /// `TcwError::Authentication`.
    pub async fn execute(&self, connection: &Connection) -> TcwResult<BearerToken> {
        let session = HttpSession::open(connection)
            .map_err(|e| TcwError::Authentication(format!("Cannot open session: {}", e)))?;
        let response = self
            .send_request(&session, connection)
            .await
            .map_err(|e| TcwError::Authentication(format!("Login request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TcwError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(TcwError::Authentication(
                "Login endpoint not found".to_string(),
            )),
            status => Err(TcwError::Authentication(format!(
                "Unexpected response status: {}",
                status
            ))),
        }
    }

    /// Checks candidate credentials without producing a token.
    ///
    /// True only for a 2xx answer; network errors and any other status are false.
    pub async fn test_credentials(&self, connection: &Connection) -> bool {
        let session = match HttpSession::open(connection) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open session for credential check");
                return false;
            }
        };
        match self.send_request(&session, connection).await {
            Ok(response) => {
                let ok = response.status().is_success();
                tracing::info!(
                    server = connection.server().as_str(),
                    status = %response.status(),
                    valid = ok,
                    "Credential check finished"
                );
                ok
            }
            Err(e) => {
                tracing::warn!(
                    server = connection.server().as_str(),
                    error = %e,
                    "Credential check failed"
                );
                false
            }
        }
    }

    async fn send_request(
        &self,
        session: &HttpSession,
        connection: &Connection,
    ) -> TcwResult<reqwest::Response> {
        let url = connection.server().endpoint(API_LOGIN_ENDPOINT);
        let request = LoginRequest::new(connection.login(), connection.password());
        tracing::debug!(%url, login = connection.login(), "Sending login request");

        session
            .client()
            .post(&url)
            .headers(self.default_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| TcwError::Transport(e.to_string()))
    }

    async fn handle_successful_login(&self, response: reqwest::Response) -> TcwResult<BearerToken> {
        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            TcwError::Authentication(format!("Failed to parse login response: {}", e))
        })?;

        let token = login_response.token.ok_or_else(|| {
            TcwError::Authentication("Login response has no token".to_string())
        })?;
        validate_token(&token).map_err(|e| TcwError::Authentication(e.to_string()))?;

        Ok(BearerToken::new_unchecked(token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
