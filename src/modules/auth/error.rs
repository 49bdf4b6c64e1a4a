use std::fmt;
use std::io;

/// Errors reported by the credential manager.
///
/// Every operation returns one of these instead of panicking; callers are
/// expected to match exhaustively and decide how to present each case.
#[derive(Debug)]
pub enum AuthError {
    /// Setup has already been started or completed.
    AlreadyInitialized,
    /// The operation requires a completed (or at least started) setup.
    NotInitialized,
    /// A caller-supplied value failed validation; names the offending field.
    InvalidInput { field: &'static str, reason: String },
    /// Username or password did not match the stored identity.
    /// Deliberately does not say which one.
    InvalidCredentials,
    /// Neither a live TOTP code nor (where accepted) a backup code matched.
    InvalidCode,
    /// The persistence layer failed; the record was not mutated.
    Storage(io::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AlreadyInitialized => write!(f, "Setup already completed"),
            AuthError::NotInitialized => write!(f, "Setup not completed"),
            AuthError::InvalidInput { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidCode => write!(f, "Invalid verification code"),
            AuthError::Storage(err) => write!(f, "Storage failure: {}", err),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AuthError {
    fn from(err: io::Error) -> Self {
        AuthError::Storage(err)
    }
}
