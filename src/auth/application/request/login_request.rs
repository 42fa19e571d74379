use serde::Serialize;

/// Body of `POST /api/v1/Login`.
///
/// `code` and `application` are required by the server but unused here.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
    pub code: String,
    pub application: String,
}

impl LoginRequest {
    pub fn new(login: &str, password: &str) -> Self {
        Self {
            login: login.to_string(),
            password: password.to_string(),
            code: String::new(),
            application: String::new(),
        }
    }
}
