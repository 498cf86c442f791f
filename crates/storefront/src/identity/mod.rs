//! Identity service boundary.
//!
//! The storefront never owns credentials or profiles; it asks an external
//! backend-as-a-service for them. This module defines the contract the rest
//! of the crate depends on ([`IdentityService`]), the session-change event
//! stream, and [`HttpIdentityClient`], a client for a Supabase-style REST API
//! (`/auth/v1` for sessions, `/rest/v1` for the `profiles` table and RPCs).
//!
//! # Example
//!
//! ```rust,ignore
//! use luxe_storefront::identity::{HttpIdentityClient, IdentityService};
//!
//! let identity = HttpIdentityClient::new(&config.identity);
//! let mut events = identity.subscribe();
//!
//! let session = identity.sign_in(&email, &password).await?;
//! let profile = identity.fetch_profile(&session).await?;
//! ```

mod events;
mod http;
mod types;

pub use events::{SessionEvents, SessionNotifier};
pub use http::HttpIdentityClient;
pub use types::*;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use luxe_core::Email;

/// Errors that can occur when talking to the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error payload.
    #[error("identity service error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built from the configured base URL.
    #[error("invalid identity URL: {0}")]
    Url(#[from] url::ParseError),

    /// An operation that needs a session was called without one.
    #[error("no active session")]
    NoSession,
}

impl IdentityError {
    /// Whether the error means the service rejected the supplied credentials.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status: 400..=499, .. })
    }
}

/// Contract for the external identity/session service.
///
/// Implementations must be cheap to share across tasks; the session
/// bootstrapper holds one for its whole lifetime.
pub trait IdentityService: Send + Sync + 'static {
    /// Return the session the service currently considers active, if any.
    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, IdentityError>> + Send;

    /// Subscribe to session-change notifications.
    ///
    /// Dropping the returned stream releases the subscription.
    fn subscribe(&self) -> SessionEvents;

    /// Authenticate with email and password.
    fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send;

    /// Register a new account. The account may need email confirmation
    /// before it can sign in.
    fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        full_name: &str,
    ) -> impl Future<Output = Result<NewAccount, IdentityError>> + Send;

    /// End the active session.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Fetch the stored profile row for the session's user.
    ///
    /// Returns `Ok(None)` when the user has no profile row yet.
    fn fetch_profile(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<Option<ProfileRecord>, IdentityError>> + Send;

    /// Record today's login and return the streak reward, if any.
    fn claim_login_streak(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<StreakAward, IdentityError>> + Send;
}
