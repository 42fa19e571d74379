use crate::core::domain::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Accepts every prefix of an `http(s)://` URL the operator may be in the
/// middle of typing, and complete URLs with path and query characters.
static SERVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^$|^h$|^ht$|^htt$|^http$|^https$|^https?:$|^https?:/$|",
        r"^https?://$|^https?://[a-zA-Z0-9\-._\~:/?\#\[\]@!$\&'()*+,;=]*$",
    ))
    .expect("server pattern is a valid regex")
});

/// Base URL of the building-management server, e.g. `https://bms.example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl(String);

impl ServerUrl {
    /// Creates a server URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    /// Parses a complete base URL: scheme must be `http` or `https` and a host
    /// must be present.
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        validate_server_url(url)?;
        Ok(Self(url.trim_end_matches('/').to_string()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an absolute API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Validates partially typed server input.
pub(crate) fn validate_server(candidate: &str) -> Result<(), ValidationError> {
    if SERVER_PATTERN.is_match(candidate) {
        Ok(())
    } else {
        Err(ValidationError::Format(format!(
            "'{}' is not an http(s) URL",
            candidate
        )))
    }
}

/// Validates a finished server URL.
pub(crate) fn validate_server_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "server".to_string(),
            message: "Server URL cannot be empty".to_string(),
        });
    }
    validate_server(url)?;
    let parsed = url::Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::ConstraintViolation(
            "Server URL must contain a host".to_string(),
        ));
    }
    Ok(())
}
