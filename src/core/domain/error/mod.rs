use std::path::PathBuf;
use thiserror::Error;

/// The main error type for TCW import operations.
///
/// This enum represents all possible errors that can occur while
/// talking to the building-management API, handling the local
/// credential file, validating operator input, or exchanging spreadsheets.
#[derive(Error, Debug)]
pub enum TcwError {
    /// Represents network-level failures (connect, send, receive, timeout)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong on the wire
    #[error("Transport error: {0}")]
    Transport(String),

    /// Represents authentication failures: rejected credentials, a rejected
    /// token, or a login response without a token
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The ciphertext is malformed, truncated, or was produced on another machine
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// The credential file exists but cannot be decrypted or parsed
    #[error("Corrupt credentials file: {0}")]
    CorruptCredentials(String),

    /// No credential file has been saved yet
    #[error("Credentials file not found: {}", .0.display())]
    CredentialsNotFound(PathBuf),

    /// Precondition violation, e.g. empty plaintext handed to the cipher
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Represents validation failures of operator input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// At least one node patch failed; the others may have been applied
    ///
    /// # Fields
    /// * `attempted` - How many patches were issued in total
    #[error("Push failed for at least one of {attempted} nodes")]
    PartialPushFailure { attempted: usize },

    /// None of the entered values matched a node on the server
    #[error("Nothing to push: no entered value matches a known source")]
    NothingToPush,

    /// Reading or writing a spreadsheet failed
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a TcwError
pub type TcwResult<T> = Result<T, TcwError>;

impl TcwError {
    /// Returns true when the error means "no usable credentials on disk",
    /// which callers answer by re-entering the settings flow.
    #[must_use]
    pub fn is_missing_credentials(&self) -> bool {
        matches!(
            self,
            TcwError::CredentialsNotFound(_) | TcwError::CorruptCredentials(_)
        )
    }
}
