use serde::Deserialize;

/// Successful login payload. Only the token is read.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}
