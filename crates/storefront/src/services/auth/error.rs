//! Authentication error types.

use thiserror::Error;

use crate::identity::IdentityError;

/// Shown when sign-up hits an email that already belongs to an account.
pub const EMAIL_IN_USE_MESSAGE: &str =
    "This email address is already in use. Please try logging in.";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] luxe_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name missing on sign-up.
    #[error("full name is required")]
    MissingName,

    /// The identity service refused the request (bad credentials, unconfirmed
    /// email, rate limit). Carries the service's own message.
    #[error("rejected by identity service: {0}")]
    Rejected(String),

    /// Email already registered.
    #[error("email already in use")]
    EmailInUse,

    /// Transport or server failure talking to the identity service.
    #[error("identity service error: {0}")]
    Identity(#[source] IdentityError),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Api {
                status: 400..=499,
                message,
            } => Self::Rejected(message),
            other => Self::Identity(other),
        }
    }
}

impl AuthError {
    /// Message to show inline on the form that triggered the error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::WeakPassword(msg) | Self::Rejected(msg) => msg.clone(),
            Self::MissingName => "Please enter your full name.".to_string(),
            Self::EmailInUse => EMAIL_IN_USE_MESSAGE.to_string(),
            Self::Identity(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the error is a server-class failure worth reporting.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Identity(_))
    }
}
