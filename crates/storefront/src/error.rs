//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for callers that drive several
//! services at once (the CLI, embedding applications). Server-class errors
//! are captured to Sentry by [`AppError::report`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::services::auth::AuthError;
use crate::services::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Identity service operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Local storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the error points at a fault outside the user's control.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Identity(_) | Self::Storage(_) => true,
            Self::Auth(err) => err.is_server_error(),
            Self::Config(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error and, for server-class errors, capture it to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront request failed");
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Config(err) => err.to_string(),
            Self::Identity(_) | Self::Storage(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("search", "Ran search", Some(&[("query", "hoodie")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::from(IdentityError::NoSession);
        assert_eq!(err.to_string(), "Identity error: no active session");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::from(IdentityError::NoSession).is_server_error());
        assert!(!AppError::BadRequest("nope".to_string()).is_server_error());
        assert!(!AppError::from(AuthError::EmailInUse).is_server_error());
        assert!(
            AppError::from(AuthError::from(IdentityError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }))
            .is_server_error()
        );
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(IdentityError::Api {
            status: 500,
            message: "database password leaked".to_string(),
        });
        assert!(!err.user_message().contains("password"));

        let err = AppError::from(AuthError::EmailInUse);
        assert_eq!(
            err.user_message(),
            "This email address is already in use. Please try logging in."
        );
    }

    #[test]
    fn test_report_without_client_is_harmless() {
        AppError::from(IdentityError::NoSession).report();
        add_breadcrumb("test", "breadcrumb", Some(&[("k", "v")]));
        set_sentry_user(&"user-1", None);
        clear_sentry_user();
    }
}
