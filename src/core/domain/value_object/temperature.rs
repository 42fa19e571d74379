use crate::config::{MAX_TEMPERATURE, MIN_TEMPERATURE};
use crate::core::domain::error::ValidationError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// One or two integer digits, an optional `.` or `,` separator and up to two decimals.
static TEMPERATURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]{1,2}[.,]?[0-9]{0,2}$").expect("temperature pattern is a valid regex")
});

/// A cold water temperature in degrees, bounded to `-99.99..=99.99`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    /// Parses operator input. A comma is accepted as decimal separator.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() || input == "-" {
            return Err(ValidationError::Field {
                field: "temperature".to_string(),
                message: "Temperature cannot be empty".to_string(),
            });
        }
        validate_temperature_input(input)?;
        let value = parse_decimal(input)?;
        Ok(Self(value))
    }

    /// Wraps a numeric value, checking only the range.
    pub fn from_value(value: f64) -> Result<Self, ValidationError> {
        check_range(value)?;
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates partially typed temperature input. `""` and `"-"` are accepted
/// as the start of a value.
pub(crate) fn validate_temperature_input(candidate: &str) -> Result<(), ValidationError> {
    if candidate.is_empty() || candidate == "-" {
        return Ok(());
    }
    if !TEMPERATURE_PATTERN.is_match(candidate) {
        return Err(ValidationError::Format(format!(
            "'{}' is not a temperature with up to two decimals",
            candidate
        )));
    }
    parse_decimal(candidate).map(|_| ())
}

fn parse_decimal(input: &str) -> Result<f64, ValidationError> {
    let value: f64 = input
        .replace(',', ".")
        .parse()
        .map_err(|_| ValidationError::Format(format!("'{}' is not a number", input)))?;
    check_range(value)?;
    Ok(value)
}

fn check_range(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Temperature {} is outside {}..{}",
            value, MIN_TEMPERATURE, MAX_TEMPERATURE
        )));
    }
    Ok(())
}
