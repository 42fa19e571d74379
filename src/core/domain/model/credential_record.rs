use crate::core::domain::{
    error::ValidationError,
    value_object::{ServerUrl, validate_required},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operator's login, password and server base URL.
///
/// Always saved and loaded as a whole; only ever persisted encrypted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub login: String,
    pub password: String,
    pub server: String,
}

impl CredentialRecord {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            server: server.into(),
        }
    }

    /// Checks that the record is complete enough to log in with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ServerUrl::parse(&self.server)?;
        validate_required("login", &self.login)?;
        validate_required("password", &self.password)?;
        Ok(())
    }

    /// The server as a URL value, without re-validating it.
    #[must_use]
    pub fn server_url(&self) -> ServerUrl {
        ServerUrl::new_unchecked(self.server.clone())
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .finish()
    }
}
