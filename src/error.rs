//! Screen-facing errors for the credential operations (sign-in / sign-up).
//!
//! Only those two operations surface errors to the user. Everything on the
//! session-resolution path (identity unavailable, profile fetch failure,
//! profile not found, sign-out rejection, stale-result discard) is resolved
//! inside the core and never reaches a screen.

use thiserror::Error;

use crate::supabase::AuthApiError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailInUse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Auth service error {status}: {message}")]
    Service { status: u16, message: String },
}

impl SessionError {
    /// True when retrying the same input may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SessionError::Network(_) => true,
            SessionError::Service { status, .. } => *status >= 500 || *status == 429,
            SessionError::InvalidCredentials | SessionError::EmailInUse => false,
        }
    }

    /// Copy shown on the login/sign-up screens.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InvalidCredentials => "Invalid email or password.",
            SessionError::EmailInUse => {
                "An account with this email already exists. Try logging in."
            }
            SessionError::Network(_) => "Check your internet connection and try again.",
            SessionError::Service { .. } => "Something went wrong. Please try again.",
        }
    }
}

impl From<AuthApiError> for SessionError {
    fn from(err: AuthApiError) -> Self {
        match err {
            AuthApiError::InvalidCredentials => SessionError::InvalidCredentials,
            AuthApiError::Api { status, message } => {
                if message.to_lowercase().contains("already registered")
                    || message.to_lowercase().contains("already exists")
                {
                    SessionError::EmailInUse
                } else {
                    SessionError::Service { status, message }
                }
            }
            AuthApiError::Http(e) => SessionError::Network(e.to_string()),
            AuthApiError::Io(e) => SessionError::Network(e.to_string()),
            other => SessionError::Service {
                status: 0,
                message: other.to_string(),
            },
        }
    }
}

/// Serializable form handed to the shell's view layer.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialError {
    pub message: String,
    pub can_retry: bool,
}

impl From<&SessionError> for CredentialError {
    fn from(err: &SessionError) -> Self {
        CredentialError {
            message: err.user_message().to_string(),
            can_retry: err.is_transient(),
        }
    }
}
