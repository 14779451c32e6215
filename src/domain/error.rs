//! Domain errors

use thiserror::Error;

/// Terminal failures of the credential workflow.
///
/// The `Display` text of each variant is the message returned to clients,
/// so it must never carry internal detail (directory status, hash errors).
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required request field is absent or empty.
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown email or wrong password. Both cases are reported identically.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The user directory refused the new user or could not be reached.
    #[error("Failed to register user")]
    RegistrationFailed,

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Whether the error stems from the service itself rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::TokenIssuance(_) | Self::Hashing(_))
    }
}

/// Failures reported by a [`UserDirectory`](crate::domain::UserDirectory) adapter.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user already exists")]
    Conflict,

    #[error("directory rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("directory unreachable: {0}")]
    Unreachable(String),

    #[error("directory request timed out")]
    Timeout,

    #[error("unexpected directory response: {0}")]
    Decode(String),

    #[error("invalid directory URL: {0}")]
    InvalidUrl(String),
}

impl DirectoryError {
    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Rejected { .. } => "rejected",
            Self::Unreachable(_) => "unreachable",
            Self::Timeout => "timeout",
            Self::Decode(_) => "decode",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        assert_eq!(
            DomainError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            DomainError::RegistrationFailed.to_string(),
            "Failed to register user"
        );
        assert_eq!(
            DomainError::InvalidInput("Email and password required".into()).to_string(),
            "Email and password required"
        );
    }

    #[test]
    fn test_internal_errors() {
        assert!(DomainError::Hashing("boom".into()).is_internal());
        assert!(!DomainError::InvalidCredentials.is_internal());
        assert_eq!(DirectoryError::Rejected { status: 500 }.kind(), "rejected");
    }
}
