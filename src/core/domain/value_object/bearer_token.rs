use crate::core::domain::error::ValidationError;
use std::fmt;
use std::time::{Duration, SystemTime};

/// A bearer token issued by the login endpoint, stamped with the time it was obtained.
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    acquired_at: SystemTime,
}

impl BearerToken {
    /// Creates a new token acquired now, without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self::acquired_at(value, SystemTime::now())
    }

    /// Creates a token with an explicit acquisition time.
    pub(crate) fn acquired_at(value: String, acquired_at: SystemTime) -> Self {
        Self { value, acquired_at }
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// A token is fresh while `now - acquired_at < lifetime`.
    ///
    /// A clock that went backwards counts as expired.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.acquired_at
            .elapsed()
            .map(|age| age >= lifetime)
            .unwrap_or(true)
    }

    /// Formats the token as an `Authorization` header value.
    #[must_use]
    pub fn as_authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

/// Validates a token string returned by the server.
pub(crate) fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "token".to_string(),
            message: "Token cannot be empty".to_string(),
        });
    }
    if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::Format(
            "Token contains whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_not_expired() {
        let token = BearerToken::new_unchecked("abc".to_string());
        assert!(!token.is_expired(Duration::from_secs(3000)));
    }

    #[test]
    fn test_old_token_expired() {
        let acquired = SystemTime::now() - Duration::from_secs(3001);
        let token = BearerToken::acquired_at("abc".to_string(), acquired);
        assert!(token.is_expired(Duration::from_secs(3000)));
    }

    #[test]
    fn test_zero_lifetime_always_expired() {
        let token = BearerToken::new_unchecked("abc".to_string());
        assert!(token.is_expired(Duration::ZERO));
    }

    #[test]
    fn test_future_token_counts_as_expired() {
        let acquired = SystemTime::now() + Duration::from_secs(60);
        let token = BearerToken::acquired_at("abc".to_string(), acquired);
        assert!(token.is_expired(Duration::from_secs(3000)));
    }

    #[test]
    fn test_authorization_header() {
        let token = BearerToken::new_unchecked("xyz".to_string());
        assert_eq!(token.as_authorization_header(), "Bearer xyz");
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = BearerToken::new_unchecked("secret-token".to_string());
        assert!(!format!("{:?}", token).contains("secret-token"));
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("eyJhbGciOi.x.y").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("   ").is_err());
        assert!(validate_token("ab cd").is_err());
    }
}
