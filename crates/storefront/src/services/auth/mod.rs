//! Authentication service.
//!
//! Drives the sign-in and sign-up forms: validates input, calls the identity
//! service, and dispatches the resulting session and login-streak reward into
//! the store.

mod error;

pub use error::{AuthError, EMAIL_IN_USE_MESSAGE};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, instrument};

use luxe_core::Email;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::identity::IdentityService;
use crate::models::{DailyReward, User};
use crate::routes::Route;
use crate::session::resolve_profile;
use crate::store::{Action, Store};

/// Minimum password length accepted on sign-up.
const MIN_PASSWORD_LENGTH: usize = 6;

/// What a successful sign-in produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    /// Resolved profile; `None` if it could not be loaded.
    pub user: Option<User>,
    /// Login-streak reward granted by this sign-in.
    pub reward: Option<DailyReward>,
    /// Where to navigate next.
    pub redirect: Route,
}

/// What a successful sign-up produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// A confirmation link was emailed; the user must follow it, then sign in.
    ConfirmationSent { email: Email },
    /// The account was confirmed immediately and is now signed in.
    SignedIn,
}

impl SignUpOutcome {
    /// Where to navigate next.
    #[must_use]
    pub const fn redirect(&self) -> Route {
        match self {
            Self::ConfirmationSent { .. } => Route::Login,
            Self::SignedIn => Route::Dashboard,
        }
    }
}

/// Authentication service.
///
/// Handles password sign-in, sign-up and sign-out against the identity
/// service, keeping the store in step.
pub struct AuthService<I> {
    identity: Arc<I>,
    store: Store,
}

impl<I: IdentityService> AuthService<I> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: Arc<I>, store: Store) -> Self {
        Self { identity, store }
    }

    /// Sign in with email and password.
    ///
    /// On success the profile is dispatched as the current session, then the
    /// daily login streak is claimed; any points it awards are added to the
    /// user and surfaced as a daily reward notification. A failed streak
    /// claim is logged and does not fail the sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Rejected` if the service refuses the credentials.
    /// Returns `AuthError::Identity` if the service cannot be reached.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignInOutcome, AuthError> {
        let email = Email::parse(email)?;
        let session = self.identity.sign_in(&email, password).await?;

        let user = resolve_profile(self.identity.as_ref(), &session).await;
        if let Some(user) = &user {
            set_sentry_user(&user.id, Some(email.as_str()));
            self.store.dispatch(Action::SetSession(Some(user.clone())));
        }
        add_breadcrumb("auth", "Signed in", None);

        let reward = match self.identity.claim_login_streak(&session).await {
            Ok(award) if award.points_awarded > 0 => {
                let reward = DailyReward {
                    points: award.points_awarded,
                    streak: award.new_streak_count,
                };
                self.store.dispatch(Action::AddLoyaltyPoints(
                    i64::try_from(award.points_awarded).unwrap_or(i64::MAX),
                ));
                self.store.dispatch(Action::ShowDailyReward(reward));
                info!(
                    points = reward.points,
                    streak = reward.streak,
                    "Daily login reward granted"
                );
                Some(reward)
            }
            Ok(_) => None,
            Err(e) => {
                error!(error = %e, "Failed to claim login streak");
                None
            }
        };

        Ok(SignInOutcome {
            user: self.store.select(|s| s.user.clone()).or(user),
            reward,
            redirect: Route::Dashboard,
        })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for invalid input.
    /// Returns `AuthError::EmailInUse` if the email is already registered.
    /// Returns `AuthError::Rejected` or `AuthError::Identity` if the service
    /// refuses or fails.
    #[instrument(skip_all)]
    pub async fn sign_up(
        &self,
        full_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SignUpOutcome, AuthError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let account = self.identity.sign_up(&email, password, full_name).await?;
        if account.email_already_registered() {
            info!("Sign-up attempted with registered email");
            return Err(AuthError::EmailInUse);
        }

        add_breadcrumb("auth", "Signed up", None);
        if account.session.is_some() {
            Ok(SignUpOutcome::SignedIn)
        } else {
            Ok(SignUpOutcome::ConfirmationSent { email })
        }
    }

    /// End the current session.
    ///
    /// The store is cleared even if the service call fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Identity` if the session could not be revoked.
    #[instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.identity.sign_out().await;
        self.store.dispatch(Action::ClearSession);
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        result.map_err(AuthError::from)
    }
}

/// Validate password requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password(&SecretString::from("12345")).is_err());
        assert!(validate_password(&SecretString::from("123456")).is_ok());
    }

    #[test]
    fn test_sign_up_redirects() {
        let email = Email::parse("new@shop.test").unwrap();
        assert_eq!(
            SignUpOutcome::ConfirmationSent { email }.redirect(),
            Route::Login
        );
        assert_eq!(SignUpOutcome::SignedIn.redirect(), Route::Dashboard);
    }
}
