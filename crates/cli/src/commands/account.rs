//! Sign-in and sign-up against the identity service.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use luxe_storefront::config::StorefrontConfig;
use luxe_storefront::error::{AppError, Result};
use luxe_storefront::identity::HttpIdentityClient;
use luxe_storefront::services::{AuthService, SignUpOutcome};
use luxe_storefront::session::SessionBootstrapper;
use luxe_storefront::store::Store;

/// Read the password from an environment variable.
fn password_from_env(var: &str) -> Result<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| AppError::BadRequest(format!("Set {var} to the account password")))
}

/// Sign in, claim the daily login reward, and print the resulting session.
///
/// # Errors
///
/// Returns an error if the identity service is not configured or rejects the
/// credentials.
#[allow(clippy::print_stdout)]
pub async fn login(config: &StorefrontConfig, email: &str, password_env: &str) -> Result<()> {
    let password = password_from_env(password_env)?;
    let identity = Arc::new(HttpIdentityClient::new(config.identity()?));
    let store = Store::new();

    let bootstrap = SessionBootstrapper::new(Arc::clone(&identity), store.clone()).start();
    let auth = AuthService::new(identity, store.clone());

    let outcome = auth.sign_in(email, &password).await?;
    bootstrap.shutdown().await;

    match &outcome.user {
        Some(user) => println!(
            "Signed in as {} <{}> ({} tier, {} points)",
            user.name, user.email, user.membership_tier, user.loyalty_points
        ),
        None => println!("Signed in, but no profile was found"),
    }
    if let Some(reward) = outcome.reward {
        println!(
            "Daily reward: +{} points ({} day streak)",
            reward.points, reward.streak
        );
    }
    println!("Next: {}", outcome.redirect);

    info!(redirect = %outcome.redirect, "Login complete");
    Ok(())
}

/// Register an account and print what to do next.
///
/// # Errors
///
/// Returns an error if input is invalid, the email is taken, or the identity
/// service fails.
#[allow(clippy::print_stdout)]
pub async fn signup(
    config: &StorefrontConfig,
    name: &str,
    email: &str,
    password_env: &str,
) -> Result<()> {
    let password = password_from_env(password_env)?;
    let identity = Arc::new(HttpIdentityClient::new(config.identity()?));
    let auth = AuthService::new(identity, Store::new());

    let outcome = auth.sign_up(name, email, &password).await?;
    match &outcome {
        SignUpOutcome::ConfirmationSent { email } => println!(
            "Check your email! We've sent a confirmation link to {email}. \
             Follow it to complete your registration."
        ),
        SignUpOutcome::SignedIn => println!("Account created and signed in."),
    }
    println!("Next: {}", outcome.redirect());
    Ok(())
}
