//! Session bootstrap and the auth flows that move between surfaces.
//!
//! ARCHITECTURE
//! ============
//! The client has three surfaces (login, signup, chat). Each flow here
//! returns the surface to switch to, the terminal equivalent of a page
//! redirect. The token check on entry to chat is advisory: it only avoids
//! dialling without a credential, the server still decides.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{info, warn};

use crate::error::ClientError;
use crate::net::api::{ApiClient, SignupForm};
use crate::state::credentials::CredentialStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Login,
    Signup,
    Chat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bootstrap {
    /// Leave the chat surface; nothing else runs.
    Redirect(Surface),
    /// Connect with this token.
    Proceed(String),
}

/// Entry check for the chat surface.
///
/// # Errors
///
/// Credential store failures.
pub fn bootstrap(store: &dyn CredentialStore) -> Result<Bootstrap, ClientError> {
    match store.get()? {
        Some(token) => Ok(Bootstrap::Proceed(token)),
        None => {
            info!("no session token; redirecting to login");
            Ok(Bootstrap::Redirect(Surface::Login))
        }
    }
}

/// [`bootstrap`], then ask the server whether the token is still valid.
///
/// A rejected token is cleared and redirects to login. Any other failure is
/// logged and the token is used anyway.
///
/// # Errors
///
/// Credential store failures.
pub async fn bootstrap_validated(store: &mut dyn CredentialStore, api: &ApiClient) -> Result<Bootstrap, ClientError> {
    let token = match bootstrap(store)? {
        Bootstrap::Proceed(token) => token,
        redirect @ Bootstrap::Redirect(_) => return Ok(redirect),
    };

    match api.validate(&token).await {
        Ok(true) => Ok(Bootstrap::Proceed(token)),
        Ok(false) => {
            info!("server rejected stored session token");
            store.clear()?;
            Ok(Bootstrap::Redirect(Surface::Login))
        }
        Err(e) => {
            warn!(error = %e, "token validation failed; connecting anyway");
            Ok(Bootstrap::Proceed(token))
        }
    }
}

/// Entry check for the login surface: an existing token skips straight to chat.
///
/// # Errors
///
/// Credential store failures.
pub fn guard_login(store: &dyn CredentialStore) -> Result<Option<Surface>, ClientError> {
    Ok(store.get()?.map(|_| Surface::Chat))
}

/// Log in and persist the returned token. Nothing is stored on failure.
///
/// # Errors
///
/// Transport failures, server rejections, and store failures.
pub async fn submit_login(
    api: &ApiClient,
    store: &mut dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<Surface, ClientError> {
    let token = api.login(username, password).await?;
    store.set(&token)?;
    info!(%username, "logged in");
    Ok(Surface::Chat)
}

/// Create an account; success leads to the login surface.
///
/// # Errors
///
/// Transport failures and server rejections.
pub async fn submit_signup(api: &ApiClient, form: &SignupForm) -> Result<Surface, ClientError> {
    api.signup(form).await?;
    info!(username = %form.username, "account created");
    Ok(Surface::Login)
}

/// Expire the stored token; always leads to the login surface.
///
/// # Errors
///
/// Credential store failures.
pub fn logout(store: &mut dyn CredentialStore) -> Result<Surface, ClientError> {
    store.clear()?;
    info!("logged out");
    Ok(Surface::Login)
}

#[must_use]
pub fn login_error_text(error: &ClientError) -> String {
    format!("Error logging in: {error}")
}

#[must_use]
pub fn signup_error_text(error: &ClientError) -> String {
    format!("Error signing up: {error}")
}
