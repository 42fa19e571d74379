//! Keystroke filters for the settings and temperature fields.
//!
//! Each filter takes the candidate text of a field after an edit and returns
//! the text the field should hold: the candidate itself when it is acceptable,
//! otherwise the candidate with its last character dropped. They are pure
//! functions so any front end can call them from its change handler.

use super::{
    login::{validate_login, validate_password},
    server_url::validate_server,
    temperature::validate_temperature_input,
};
use crate::core::domain::error::ValidationError;

/// Filters server URL input.
#[must_use]
pub fn accept_server(candidate: &str) -> String {
    accept_with(candidate, validate_server)
}

/// Filters login input.
#[must_use]
pub fn accept_login(candidate: &str) -> String {
    accept_with(candidate, validate_login)
}

/// Filters password input.
#[must_use]
pub fn accept_password(candidate: &str) -> String {
    accept_with(candidate, validate_password)
}

/// Filters temperature input.
#[must_use]
pub fn accept_temperature(candidate: &str) -> String {
    accept_with(candidate, validate_temperature_input)
}

#[must_use]
pub fn is_valid_server_input(candidate: &str) -> bool {
    validate_server(candidate).is_ok()
}

#[must_use]
pub fn is_valid_login_input(candidate: &str) -> bool {
    validate_login(candidate).is_ok()
}

#[must_use]
pub fn is_valid_password_input(candidate: &str) -> bool {
    validate_password(candidate).is_ok()
}

#[must_use]
pub fn is_valid_temperature_input(candidate: &str) -> bool {
    validate_temperature_input(candidate).is_ok()
}

fn accept_with<F>(candidate: &str, validate: F) -> String
where
    F: Fn(&str) -> Result<(), ValidationError>,
{
    if validate(candidate).is_ok() {
        return candidate.to_string();
    }
    let mut chars = candidate.chars();
    chars.next_back();
    chars.as_str().to_string()
}
