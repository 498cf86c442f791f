//! Identity service payload types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use luxe_core::{MembershipTier, UserId};

/// The authenticated user as described by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated identity handle.
///
/// Tokens are wrapped in [`SecretString`] so they never appear in logs.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: SessionUser,
}

impl Session {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Kind of session change reported by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

impl AuthChangeEvent {
    /// Tag used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignedIn => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed => "token_refreshed",
            Self::UserUpdated => "user_updated",
        }
    }
}

/// A session-change notification.
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    /// A sign-in notification carrying the new session.
    #[must_use]
    pub const fn signed_in(session: Session) -> Self {
        Self {
            event: AuthChangeEvent::SignedIn,
            session: Some(session),
        }
    }

    /// A sign-out notification.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            event: AuthChangeEvent::SignedOut,
            session: None,
        }
    }
}

/// A row of the `profiles` table.
///
/// Every column except the id may be null for freshly created accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub membership_tier: MembershipTier,
    #[serde(default)]
    pub loyalty_points: Option<u64>,
}

/// Result of the login streak RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakAward {
    /// Points granted by this login; zero when already claimed today.
    pub points_awarded: u64,
    pub new_streak_count: u32,
}

/// Outcome of a sign-up request.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: SessionUser,
    /// Number of linked identities. Zero means the email already belongs to
    /// an account; the service hides that fact behind a fake success.
    pub identity_count: usize,
    /// Present when the service signs the user in without email confirmation.
    pub session: Option<Session>,
}

impl NewAccount {
    /// Whether the service reported the email as already registered.
    #[must_use]
    pub const fn email_already_registered(&self) -> bool {
        self.identity_count == 0
    }
}
