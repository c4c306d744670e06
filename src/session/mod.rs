//! Session gate
//!
//! Owns the bearer token lifecycle: capture at the sign-in callback,
//! retrieval before every protected call, and invalidation on logout or
//! on a 403 from the API. The context is passed explicitly to whatever
//! needs it; there is no global token.

pub mod callback;
pub mod listener;
pub mod navigator;

pub use callback::{extract_token, CallbackError};
pub use listener::CallbackListener;
pub use navigator::{HistoryNavigator, Navigator};

use crate::api::ApiError;
use crate::persistence::{PersistenceError, TokenStore};
use std::sync::Arc;

/// Default unauthenticated entry point
pub const ROOT_PATH: &str = "/";
/// Default path the identity provider redirects back to
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Whether a usable token is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Which view a location resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Sign-in callback; token acquisition runs here
    Callback,
    /// Signed in: the dashboard
    Dashboard,
    /// Signed out: the sign-in page
    Home,
}

/// Explicit session context injected into every API call
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    entry_point: String,
    callback_path: String,
}

impl SessionContext {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        SessionContext {
            store,
            navigator,
            entry_point: ROOT_PATH.to_string(),
            callback_path: CALLBACK_PATH.to_string(),
        }
    }

    /// Override where unauthenticated users are sent
    pub fn with_entry_point(mut self, entry_point: &str) -> Self {
        self.entry_point = entry_point.to_string();
        self
    }

    /// Override the sign-in callback path
    pub fn with_callback_path(mut self, callback_path: &str) -> Self {
        self.callback_path = callback_path.to_string();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// The persisted token; an empty string counts as no token
    pub fn token(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.store.get_token()?.filter(|token| !token.is_empty()))
    }

    pub fn state(&self) -> Result<SessionState, PersistenceError> {
        Ok(match self.token()? {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Unauthenticated,
        })
    }

    /// Handle the identity provider redirect.
    ///
    /// Persists the token when the location carries one. Either way the
    /// user lands on the entry point, so a callback without a token quietly
    /// leaves the session unauthenticated.
    pub fn capture_callback(&self, location: &str) -> Result<SessionState, CallbackError> {
        let token = extract_token(location)?;

        let state = match token {
            Some(token) => match self.store.set_token(Some(&token)) {
                Ok(()) => {
                    log::info!("Session token captured");
                    SessionState::Authenticated
                }
                Err(e) => {
                    log::error!("Failed to persist session token: {}", e);
                    SessionState::Unauthenticated
                }
            },
            None => {
                log::warn!("Sign-in callback carried no token");
                SessionState::Unauthenticated
            }
        };

        self.navigator.redirect(&self.entry_point);
        Ok(state)
    }

    /// Token for a protected call.
    ///
    /// Without a token the user is sent to the entry point and the call
    /// must not go out.
    pub fn require_token(&self) -> Result<String, ApiError> {
        match self.token()? {
            Some(token) => Ok(token),
            None => {
                self.navigator.redirect(&self.entry_point);
                Err(ApiError::AuthenticationMissing)
            }
        }
    }

    /// Inspect a response before its body is used.
    ///
    /// 403 ends the session. Other non-success statuses fail with the body
    /// text, or a generic message when the body is empty.
    pub fn validate_response(&self, status: u16, body: String) -> Result<String, ApiError> {
        if status == 403 {
            if let Err(e) = self.store.clear_token() {
                log::error!("Failed to clear session token after 403: {}", e);
            }
            log::warn!("API rejected the session token, signing out");
            self.navigator.redirect(&self.entry_point);
            return Err(ApiError::Unauthorized);
        }

        if !(200..300).contains(&status) {
            log::debug!("API returned status {}", status);
            return Err(ApiError::from_body(body));
        }

        Ok(body)
    }

    /// Clear the token and return to the entry point; safe to repeat
    pub fn logout(&self) -> Result<(), PersistenceError> {
        self.store.clear_token()?;
        log::info!("Signed out");
        self.navigator.redirect(&self.entry_point);
        Ok(())
    }

    /// Pick the view for `path`: the callback path is always the callback
    /// view, anything else depends on whether a token is held.
    pub fn resolve_view(&self, path: &str) -> Result<View, PersistenceError> {
        if path == self.callback_path {
            return Ok(View::Callback);
        }
        Ok(match self.state()? {
            SessionState::Authenticated => View::Dashboard,
            SessionState::Unauthenticated => View::Home,
        })
    }
}
