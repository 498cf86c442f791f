//! Bridges the identity service's session into the store.
//!
//! On start the bootstrapper looks up any existing session and then follows
//! the identity service's session-change stream:
//!
//! - signed in: resolve the profile and dispatch [`Action::SetSession`]
//! - signed out: dispatch [`Action::ClearSession`]
//! - anything else: ignored
//!
//! Profile resolution runs concurrently with event handling. Every session
//! change bumps a generation counter and a resolution only dispatches if its
//! generation is still current, so a slow lookup for an old session can never
//! overwrite a newer sign-in or resurrect a signed-out user.
//!
//! A resolution also leaves the store alone when it already holds the
//! resolved user. Sign-in dispatches its own session and then rewards on top
//! of it; re-setting the same user afterwards would drop the reward.

use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use luxe_core::UserId;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::identity::{AuthChangeEvent, IdentityService, Session, SessionChange, SessionEvents};
use crate::models::User;
use crate::store::{Action, Store, StoreState};

/// Resolve the application profile for a session.
///
/// Failures are logged and resolve to `None`; callers treat that the same as
/// a user without a profile row.
pub async fn resolve_profile<I: IdentityService>(identity: &I, session: &Session) -> Option<User> {
    match identity.fetch_profile(session).await {
        Ok(Some(record)) => Some(User::from_profile(&session.user, record)),
        Ok(None) => {
            warn!(user_id = %session.user.id, "No profile row for signed-in user");
            None
        }
        Err(e) => {
            error!(user_id = %session.user.id, error = %e, "Failed to fetch user profile");
            None
        }
    }
}

/// Result of a finished lookup.
enum Resolution {
    /// A session was found; the profile may still be missing.
    Session { user_id: UserId, user: Option<User> },
    /// There was no session to resolve.
    NoSession,
}

/// Keeps the store's session in sync with the identity service.
pub struct SessionBootstrapper<I> {
    identity: Arc<I>,
    store: Store,
}

impl<I: IdentityService> SessionBootstrapper<I> {
    #[must_use]
    pub const fn new(identity: Arc<I>, store: Store) -> Self {
        Self { identity, store }
    }

    /// Subscribe to session changes and start the background listener.
    ///
    /// The subscription is taken before the initial lookup so no change that
    /// happens in between is missed. Must be called inside a Tokio runtime.
    #[must_use = "dropping the handle stops the bootstrapper"]
    pub fn start(self) -> BootstrapHandle {
        let events = self.identity.subscribe();
        let task = tokio::spawn(self.run(events));
        BootstrapHandle { task }
    }

    async fn run(self, mut events: SessionEvents) {
        let mut generation: u64 = 0;
        let mut resolutions: JoinSet<(u64, Resolution)> = JoinSet::new();

        let identity = Arc::clone(&self.identity);
        resolutions.spawn(async move { (0, initial_lookup(identity.as_ref()).await) });

        loop {
            tokio::select! {
                change = events.next() => {
                    let Some(change) = change else {
                        debug!("Session event stream closed");
                        break;
                    };
                    self.handle_change(change, &mut generation, &mut resolutions);
                }
                Some(joined) = resolutions.join_next(), if !resolutions.is_empty() => {
                    self.handle_joined(joined, generation);
                }
            }
        }

        while let Some(joined) = resolutions.join_next().await {
            self.handle_joined(joined, generation);
        }
    }

    fn handle_change(
        &self,
        change: SessionChange,
        generation: &mut u64,
        resolutions: &mut JoinSet<(u64, Resolution)>,
    ) {
        match (change.event, change.session) {
            (AuthChangeEvent::SignedIn, Some(session)) => {
                *generation += 1;
                let current = *generation;
                info!(user_id = %session.user.id, generation = current, "Session signed in");

                let identity = Arc::clone(&self.identity);
                resolutions.spawn(async move {
                    let user = resolve_profile(identity.as_ref(), &session).await;
                    let user_id = session.user.id;
                    (current, Resolution::Session { user_id, user })
                });
            }
            (AuthChangeEvent::SignedOut, _) => {
                *generation += 1;
                info!(generation = *generation, "Session signed out");
                resolutions.abort_all();

                self.store.dispatch(Action::ClearSession);
                clear_sentry_user();
                // The initial lookup may have been cancelled above.
                if self.store.select(|s| s.is_loading) {
                    self.store.dispatch(Action::SetLoading(false));
                }
            }
            (event, _) => {
                debug!(event = event.as_str(), "Ignoring session change");
            }
        }
    }

    fn handle_joined(
        &self,
        joined: Result<(u64, Resolution), tokio::task::JoinError>,
        generation: u64,
    ) {
        let (started_at, resolution) = match joined {
            Ok(done) => done,
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                error!(error = %e, "Profile resolution task failed");
                return;
            }
        };

        if started_at != generation {
            debug!(
                started_at,
                current = generation,
                "Discarding stale profile resolution"
            );
            return;
        }

        match resolution {
            Resolution::Session { user_id, user } => {
                let sentry_user = user.as_ref().map(|u| (u.id, u.email.clone()));
                let applied = self
                    .store
                    .dispatch_if(Action::SetSession(user), |s| !holds_user(s, user_id));

                if applied {
                    if let Some((id, email)) = sentry_user {
                        set_sentry_user(&id, Some(email.as_str()).filter(|e| !e.is_empty()));
                    }
                } else {
                    debug!(%user_id, "Store already holds this session, keeping it");
                    self.store.dispatch_if(Action::SetLoading(false), |s| s.is_loading);
                }
            }
            Resolution::NoSession => self.store.dispatch(Action::SetLoading(false)),
        }
    }
}

/// Whether the store's current user is `user_id`.
fn holds_user(state: &StoreState, user_id: UserId) -> bool {
    state.user.as_ref().is_some_and(|u| u.id == user_id)
}

async fn initial_lookup<I: IdentityService>(identity: &I) -> Resolution {
    match identity.current_session().await {
        Ok(Some(session)) => Resolution::Session {
            user_id: session.user.id,
            user: resolve_profile(identity, &session).await,
        },
        Ok(None) => Resolution::NoSession,
        Err(e) => {
            error!(error = %e, "Failed to look up current session");
            Resolution::NoSession
        }
    }
}

/// Owns the running bootstrapper.
///
/// Dropping the handle stops the listener, releases the session-change
/// subscription, and cancels in-flight profile lookups.
#[derive(Debug)]
pub struct BootstrapHandle {
    task: JoinHandle<()>,
}

impl BootstrapHandle {
    /// Whether the listener has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the listener and wait until it has released its resources.
    pub async fn shutdown(mut self) {
        self.task.abort();
        match (&mut self.task).await {
            Err(e) if !e.is_cancelled() => error!(error = %e, "Session bootstrapper panicked"),
            _ => {}
        }
    }
}

impl Drop for BootstrapHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
