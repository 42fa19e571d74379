use crate::core::domain::error::ValidationError;

/// Validates a login: ASCII letters and digits only. Empty input is allowed
/// while the operator is still typing.
pub(crate) fn validate_login(login: &str) -> Result<(), ValidationError> {
    validate_alphanumeric("login", login)
}

/// Same rule as the login; the server accepts nothing else for either field.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    validate_alphanumeric("password", password)
}

fn validate_alphanumeric(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::Field {
            field: field.to_string(),
            message: "Only latin letters and digits are allowed".to_string(),
        })
    }
}

/// Validates a finished login or password: alphanumeric and non-empty.
pub(crate) fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    validate_alphanumeric(field, value)
}
