//! HTTP client for a Supabase-style identity backend.
//!
//! Auth endpoints live under `/auth/v1`, table and RPC access under `/rest/v1`.
//! Every request carries the project's anon key in the `apikey` header;
//! user-scoped requests additionally send the session's access token as a
//! bearer token.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use luxe_core::{Email, UserId};

use super::{
    AuthChangeEvent, IdentityError, IdentityService, NewAccount, ProfileRecord, Session,
    SessionChange, SessionEvents, SessionNotifier, SessionUser, StreakAward,
};
use crate::config::IdentityConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    identities: Option<Vec<serde_json::Value>>,
}

impl UserResponse {
    fn identity_count(&self) -> usize {
        self.identities.as_ref().map_or(0, Vec::len)
    }

    fn into_session_user(self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
            user: self.user.into_session_user(),
        }
    }
}

/// Sign-up answers with a full token response when email confirmation is
/// disabled, and with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Build an [`IdentityError::Api`] from a non-success response body.
fn api_error(status: u16, body: &str) -> IdentityError {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("request failed with status {status}")
            } else {
                body.to_string()
            }
        });
    IdentityError::Api { status, message }
}

// ─────────────────────────────────────────────────────────────────────────────
// HttpIdentityClient
// ─────────────────────────────────────────────────────────────────────────────

/// Identity client over HTTP.
///
/// Holds the active session in memory and publishes a [`SessionChange`]
/// whenever it signs in, refreshes, or signs out.
#[derive(Clone)]
pub struct HttpIdentityClient {
    inner: Arc<HttpIdentityClientInner>,
}

struct HttpIdentityClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    email_redirect_to: Option<String>,
    session: RwLock<Option<Session>>,
    notifier: SessionNotifier,
}

impl HttpIdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(HttpIdentityClientInner {
                client: reqwest::Client::new(),
                base_url,
                anon_key: config.anon_key.clone(),
                email_redirect_to: config.email_redirect_to.clone(),
                session: RwLock::new(None),
                notifier: SessionNotifier::new(),
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn stored_session(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, session: Option<Session>) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Attach the anon key, plus the user's token when one is given.
    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        session: Option<&Session>,
    ) -> reqwest::RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        let bearer = session.map_or(anon_key, |s| s.access_token.expose_secret());
        request
            .header("apikey", anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and decode a JSON body, mapping error statuses.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, IdentityError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Exchange a refresh token for a new session.
    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &SecretString) -> Result<Session, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let request = self
            .authorize(self.inner.client.post(url), None)
            .json(&json!({ "refresh_token": refresh_token.expose_secret() }));

        let token: TokenResponse = self.send_json(request).await?;
        Ok(token.into_session(Utc::now()))
    }

    fn publish(&self, event: AuthChangeEvent, session: Option<Session>) {
        let receivers = self.inner.notifier.notify(SessionChange { event, session });
        debug!(event = event.as_str(), receivers, "Published session change");
    }
}

impl IdentityService for HttpIdentityClient {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };

        if !session.is_expired_at(Utc::now()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_ref() else {
            info!("Stored session expired without refresh token, discarding");
            self.store_session(None);
            self.publish(AuthChangeEvent::SignedOut, None);
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(refreshed) => {
                self.store_session(Some(refreshed.clone()));
                self.publish(AuthChangeEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, signing out locally");
                self.store_session(None);
                self.publish(AuthChangeEvent::SignedOut, None);
                Err(e)
            }
        }
    }

    fn subscribe(&self) -> SessionEvents {
        self.inner.notifier.subscribe()
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self.authorize(self.inner.client.post(url), None).json(&json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        }));

        let token: TokenResponse = self.send_json(request).await?;
        let session = token.into_session(Utc::now());

        info!(user_id = %session.user.id, "Signed in");
        self.store_session(Some(session.clone()));
        self.publish(AuthChangeEvent::SignedIn, Some(session.clone()));

        Ok(session)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        full_name: &str,
    ) -> Result<NewAccount, IdentityError> {
        let mut url = self.endpoint("auth/v1/signup")?;
        if let Some(redirect) = &self.inner.email_redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }

        let request = self.authorize(self.inner.client.post(url), None).json(&json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
            "data": { "full_name": full_name },
        }));

        let response: SignUpResponse = self.send_json(request).await?;

        let account = match response {
            SignUpResponse::Session(token) => {
                let identity_count = token.user.identity_count();
                let session = token.into_session(Utc::now());
                self.store_session(Some(session.clone()));
                self.publish(AuthChangeEvent::SignedIn, Some(session.clone()));
                NewAccount {
                    user: session.user.clone(),
                    identity_count,
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => NewAccount {
                identity_count: user.identity_count(),
                user: user.into_session_user(),
                session: None,
            },
        };

        info!(
            user_id = %account.user.id,
            confirmed = account.session.is_some(),
            "Sign-up accepted"
        );
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), IdentityError> {
        let session = self.stored_session();

        // Local sign-out stands even if the revoke below fails.
        self.store_session(None);
        self.publish(AuthChangeEvent::SignedOut, None);

        let Some(session) = session else {
            return Ok(());
        };

        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .authorize(self.inner.client.post(url), Some(&session))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        info!(user_id = %session.user.id, "Signed out");
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = %session.user.id))]
    async fn fetch_profile(
        &self,
        session: &Session,
    ) -> Result<Option<ProfileRecord>, IdentityError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", session.user.id))
            .append_pair("select", "*");

        let request = self.authorize(self.inner.client.get(url), Some(session));
        let rows: Vec<ProfileRecord> = self.send_json(request).await?;

        Ok(rows.into_iter().next())
    }

    #[instrument(skip_all, fields(user_id = %session.user.id))]
    async fn claim_login_streak(&self, session: &Session) -> Result<StreakAward, IdentityError> {
        let url = self.endpoint("rest/v1/rpc/handle_login_streak")?;
        let request = self
            .authorize(self.inner.client.post(url), Some(session))
            .json(&json!({}));

        self.send_json(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(url: &str) -> IdentityConfig {
        IdentityConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("anon"),
            email_redirect_to: None,
        }
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = HttpIdentityClient::new(&test_config("https://proj.example.co/prefix"));
        let url = client.endpoint("auth/v1/token").unwrap();
        assert_eq!(url.as_str(), "https://proj.example.co/prefix/auth/v1/token");
    }

    #[test]
    fn test_api_error_prefers_description() {
        let err = api_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        match err {
            IdentityError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_body() {
        let err = api_error(502, "bad gateway");
        assert_eq!(
            err.to_string(),
            "identity service error (502): bad gateway"
        );
        let empty = api_error(503, "");
        assert_eq!(
            empty.to_string(),
            "identity service error (503): request failed with status 503"
        );
    }

    #[test]
    fn test_token_response_into_session() {
        let body = r#"{
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600,
            "user": {"id": "6f1c1f8e-2f1d-4a55-9d0e-1f0d7c2b9a10", "email": "a@b.co"}
        }"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        let now = Utc::now();
        let session = token.into_session(now);

        assert_eq!(session.access_token.expose_secret(), "tok");
        assert_eq!(session.expires_at, Some(now + Duration::seconds(3600)));
        assert_eq!(session.user.email.as_deref(), Some("a@b.co"));
        assert!(!session.is_expired_at(now));
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let bare = r#"{"id": "6f1c1f8e-2f1d-4a55-9d0e-1f0d7c2b9a10", "identities": []}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(bare).unwrap(),
            SignUpResponse::User(user) if user.identity_count() == 0
        ));

        let with_session = r#"{
            "access_token": "tok",
            "user": {"id": "6f1c1f8e-2f1d-4a55-9d0e-1f0d7c2b9a10", "identities": [{}]}
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));
    }

    #[tokio::test]
    async fn test_current_session_empty_without_sign_in() {
        let client = HttpIdentityClient::new(&test_config("https://proj.example.co"));
        assert!(client.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_without_session_publishes_locally() {
        let client = HttpIdentityClient::new(&test_config("https://proj.example.co"));
        let mut events = client.subscribe();

        client.sign_out().await.unwrap();

        let change = events.next().await.unwrap();
        assert_eq!(change.event, AuthChangeEvent::SignedOut);
    }
}
