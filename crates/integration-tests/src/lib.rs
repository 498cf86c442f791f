//! Integration tests for the Luxe storefront client core.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luxe-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_bootstrap` - Session bootstrapper against a scripted identity service
//! - `auth_flow` - Sign-in, daily reward and sign-up flows
//! - `storefront_flow` - Store, search and recent searches end to end
//!
//! No network access is needed: [`FakeIdentity`] stands in for the identity
//! service and lets tests hold profile lookups open to force races.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Notify, watch};

use luxe_core::{Email, MembershipTier, UserId};
use luxe_storefront::identity::{
    IdentityError, IdentityService, NewAccount, ProfileRecord, Session, SessionChange,
    SessionEvents, SessionNotifier, SessionUser, StreakAward,
};
use luxe_storefront::store::{Store, StoreState};

/// How long helpers wait for asynchronous effects before failing the test.
pub const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct FakeState {
    current: Option<Session>,
    accounts: HashMap<String, (String, UserId)>,
    profiles: HashMap<UserId, ProfileRecord>,
    gates: HashMap<UserId, Arc<Notify>>,
    streak: Option<StreakAward>,
    fail_current_session: bool,
    fail_profiles: bool,
    fail_streak: bool,
    auto_confirm: bool,
}

/// Scripted in-memory identity service.
pub struct FakeIdentity {
    notifier: SessionNotifier,
    state: Mutex<FakeState>,
    completed_fetches: watch::Sender<usize>,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifier: SessionNotifier::new(),
            state: Mutex::new(FakeState::default()),
            completed_fetches: watch::channel(0).0,
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account with a profile row.
    pub fn add_account(&self, email: &str, password: &str, profile: ProfileRecord) {
        let mut state = self.state();
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), profile.id));
        state.profiles.insert(profile.id, profile);
    }

    /// Register an account that has no profile row.
    pub fn add_account_without_profile(&self, email: &str, password: &str) -> UserId {
        let id = UserId::new(uuid::Uuid::new_v4());
        self.state()
            .accounts
            .insert(email.to_string(), (password.to_string(), id));
        id
    }

    /// Make `session` the one [`IdentityService::current_session`] returns.
    pub fn set_current_session(&self, session: Option<Session>) {
        self.state().current = session;
    }

    /// Store a profile row.
    pub fn add_profile(&self, profile: ProfileRecord) {
        self.state().profiles.insert(profile.id, profile);
    }

    /// Block profile lookups for `user_id` until the returned gate is released.
    pub fn hold_profile(&self, user_id: UserId) -> ProfileGate {
        let notify = Arc::new(Notify::new());
        self.state().gates.insert(user_id, Arc::clone(&notify));
        ProfileGate { notify }
    }

    pub fn set_streak(&self, award: StreakAward) {
        self.state().streak = Some(award);
    }

    pub fn fail_current_session(&self) {
        self.state().fail_current_session = true;
    }

    pub fn fail_profiles(&self) {
        self.state().fail_profiles = true;
    }

    pub fn fail_streak(&self) {
        self.state().fail_streak = true;
    }

    /// Sign-ups return a session instead of waiting for email confirmation.
    pub fn auto_confirm(&self) {
        self.state().auto_confirm = true;
    }

    /// Publish a session change as if the service observed it.
    pub fn emit(&self, change: SessionChange) -> usize {
        self.notifier.notify(change)
    }

    /// Live session-change subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Wait until at least `n` profile lookups have returned.
    ///
    /// # Panics
    ///
    /// Panics if that doesn't happen within [`WAIT`].
    pub async fn wait_for_fetches(&self, n: usize) {
        let mut rx = self.completed_fetches.subscribe();
        let reached = tokio::time::timeout(WAIT, rx.wait_for(|done| *done >= n)).await;
        assert!(
            matches!(reached, Ok(Ok(_))),
            "timed out waiting for {n} profile fetches"
        );
    }
}

/// Releases a held profile lookup.
pub struct ProfileGate {
    notify: Arc<Notify>,
}

impl ProfileGate {
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

impl IdentityService for FakeIdentity {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let state = self.state();
        if state.fail_current_session {
            return Err(IdentityError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(state.current.clone())
    }

    fn subscribe(&self) -> SessionEvents {
        self.notifier.subscribe()
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let session = {
            let mut state = self.state();
            let Some((expected, id)) = state.accounts.get(email.as_str()).cloned() else {
                return Err(invalid_credentials());
            };
            if expected != password.expose_secret() {
                return Err(invalid_credentials());
            }
            let session = session_for(id, Some(email.as_str()));
            state.current = Some(session.clone());
            session
        };

        self.notifier.notify(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        full_name: &str,
    ) -> Result<NewAccount, IdentityError> {
        let (account, session) = {
            let mut state = self.state();
            if let Some((_, id)) = state.accounts.get(email.as_str()) {
                let account = NewAccount {
                    user: SessionUser {
                        id: *id,
                        email: Some(email.as_str().to_string()),
                    },
                    identity_count: 0,
                    session: None,
                };
                return Ok(account);
            }

            let id = UserId::new(uuid::Uuid::new_v4());
            state.accounts.insert(
                email.as_str().to_string(),
                (password.expose_secret().to_string(), id),
            );
            state.profiles.insert(id, profile(id, Some(full_name), 0));

            let session = state
                .auto_confirm
                .then(|| session_for(id, Some(email.as_str())));
            if let Some(session) = &session {
                state.current = Some(session.clone());
            }
            let account = NewAccount {
                user: SessionUser {
                    id,
                    email: Some(email.as_str().to_string()),
                },
                identity_count: 1,
                session: session.clone(),
            };
            (account, session)
        };

        if let Some(session) = session {
            self.notifier.notify(SessionChange::signed_in(session));
        }
        Ok(account)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.state().current = None;
        self.notifier.notify(SessionChange::signed_out());
        Ok(())
    }

    async fn fetch_profile(
        &self,
        session: &Session,
    ) -> Result<Option<ProfileRecord>, IdentityError> {
        let gate = self.state().gates.get(&session.user.id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let result = {
            let state = self.state();
            if state.fail_profiles {
                Err(IdentityError::Api {
                    status: 500,
                    message: "profiles table unavailable".to_string(),
                })
            } else {
                Ok(state.profiles.get(&session.user.id).cloned())
            }
        };

        self.completed_fetches.send_modify(|done| *done += 1);
        result
    }

    async fn claim_login_streak(&self, _session: &Session) -> Result<StreakAward, IdentityError> {
        let state = self.state();
        if state.fail_streak {
            return Err(IdentityError::Api {
                status: 500,
                message: "function handle_login_streak failed".to_string(),
            });
        }
        Ok(state.streak.unwrap_or(StreakAward {
            points_awarded: 0,
            new_streak_count: 1,
        }))
    }
}

fn invalid_credentials() -> IdentityError {
    IdentityError::Api {
        status: 400,
        message: "Invalid login credentials".to_string(),
    }
}

/// A session for `user_id` valid for an hour.
#[must_use]
pub fn session_for(user_id: UserId, email: Option<&str>) -> Session {
    Session {
        access_token: SecretString::from(format!("access-{user_id}")),
        refresh_token: Some(SecretString::from(format!("refresh-{user_id}"))),
        expires_at: Some(Utc::now() + TimeDelta::hours(1)),
        user: SessionUser {
            id: user_id,
            email: email.map(String::from),
        },
    }
}

/// A profile row with a Gold tier.
#[must_use]
pub fn profile(user_id: UserId, full_name: Option<&str>, points: u64) -> ProfileRecord {
    ProfileRecord {
        id: user_id,
        full_name: full_name.map(String::from),
        avatar_url: None,
        membership_tier: MembershipTier::Gold,
        loyalty_points: Some(points),
    }
}

/// A fresh random user id.
#[must_use]
pub fn new_user_id() -> UserId {
    UserId::new(uuid::Uuid::new_v4())
}

/// Wait until the store state satisfies `predicate`.
///
/// # Panics
///
/// Panics if that doesn't happen within [`WAIT`].
pub async fn wait_for_state(store: &Store, predicate: impl FnMut(&StoreState) -> bool) {
    let mut rx = store.subscribe();
    let reached = tokio::time::timeout(WAIT, rx.wait_for(predicate)).await;
    assert!(
        matches!(reached, Ok(Ok(_))),
        "timed out waiting for store state"
    );
}

/// Give spawned tasks a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
