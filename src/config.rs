//! Fixed settings and runtime configuration for the client.

use crate::{TcwError, TcwResult};
use governor::Quota;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

/// Login endpoint, relative to the server base URL.
pub const API_LOGIN_ENDPOINT: &str = "/api/v1/Login";

/// Node collection endpoint, relative to the server base URL.
pub const API_NODES_ENDPOINT: &str = "/api/v1/Core/Nodes";

/// Attribute code carrying the operator-facing source label.
pub const SOURCE_NAME_ATTRIBUTE: &str = "sourceName";

/// Node fields replaced by a temperature push.
pub const SUMMER_TEMPERATURE_PATH: &str = "coldWaterSummerTemp";
pub const WINTER_TEMPERATURE_PATH: &str = "coldWaterWinterTemp";

/// How long a bearer token is reused before logging in again.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(3000);

/// Key derivation parameters for the credential cipher.
pub const KEY_DERIVATION_SALT: &[u8] = b"TcwImport_salt_123";
pub const KEY_DERIVATION_ITERATIONS: u32 = 480_000;

/// Identifier used when the host refuses to tell us who it is.
pub const FALLBACK_MACHINE_ID: &str = "fallback_id";

pub const CREDENTIALS_FILE: &str = "credentials.txt";
const APP_DIR: &str = "tcw-import";

/// Spreadsheet layout.
pub const SOURCE_COLUMN: &str = "Источник";
pub const TEMPERATURE_COLUMN: &str = "Температура";
pub const EXPORT_SHEET_NAME: &str = "Данные";

/// Inclusive bounds for a temperature value.
pub const MIN_TEMPERATURE: f64 = -99.99;
pub const MAX_TEMPERATURE: f64 = 99.99;

/// Default location of the encrypted credential file.
///
/// Lives under the platform config directory; falls back to the working
/// directory when the platform has none.
pub fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CREDENTIALS_FILE))
        .unwrap_or_else(|| PathBuf::from(CREDENTIALS_FILE))
}

/// Throttle applied to outgoing API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// # Errors
    /// `TcwError::InvalidInput` if either figure is zero.
    pub fn quota(&self) -> TcwResult<Quota> {
        let per_second = NonZeroU32::new(self.requests_per_second).ok_or_else(|| {
            TcwError::InvalidInput("requests_per_second must be positive".to_string())
        })?;
        let burst = NonZeroU32::new(self.burst_size)
            .ok_or_else(|| TcwError::InvalidInput("burst_size must be positive".to_string()))?;
        Ok(Quota::per_second(per_second).allow_burst(burst))
    }
}

/// Runtime knobs for the HTTP side of the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Reuse window of a bearer token.
    pub token_lifetime: Duration,
    /// Accept self-signed certificates. Off unless asked for.
    pub accept_invalid_certs: bool,
    /// Per-request timeout; `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    /// Optional throttle, mostly useful to tame the concurrent patch fan-out.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_lifetime: TOKEN_LIFETIME,
            accept_invalid_certs: false,
            request_timeout: None,
            rate_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.token_lifetime, Duration::from_secs(3000));
        assert!(!config.accept_invalid_certs);
        assert!(config.request_timeout.is_none());
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_default_credentials_path_ends_with_file_name() {
        let path = default_credentials_path();
        assert!(path.ends_with(CREDENTIALS_FILE));
    }

    #[test]
    fn test_rate_limit_quota() {
        let valid = RateLimitConfig {
            requests_per_second: 5,
            burst_size: 2,
        };
        assert_eq!(valid.quota().unwrap().burst_size().get(), 2);

        let zero = RateLimitConfig {
            requests_per_second: 0,
            burst_size: 1,
        };
        assert!(matches!(zero.quota(), Err(TcwError::InvalidInput(_))));
    }
}
