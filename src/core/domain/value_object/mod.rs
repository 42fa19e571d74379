mod bearer_token;
pub mod input_filter;
mod login;
pub(crate) mod serde_helpers;
mod server_url;
mod temperature;

pub use bearer_token::BearerToken;
pub use server_url::ServerUrl;
pub use temperature::Temperature;

// Re-export validation functions for internal use
pub(crate) use bearer_token::validate_token;
pub(crate) use login::validate_required;
