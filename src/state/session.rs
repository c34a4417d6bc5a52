//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Single source of truth for "who is signed in". Read by route guards and
//! identity-aware views; independent of the resource hooks.
//!
//! INVARIANTS
//! ==========
//! `token` and `user` are written together under one lock, so a snapshot
//! never shows one without the other. While [`SessionStore::initialize`]
//! validates a persisted token, the snapshot stays unauthenticated with
//! `loading == true`; the token is only adopted once `/auth/me` succeeds.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::outcome::{Action, Outcome, OutcomeListener};
use super::token::TokenStore;
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{AuthPayload, Credentials, ProfileUpdate, RegisterRequest, Role, SignUpProfile, User};
use crate::util::validate;

/// Observable identity state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    /// True until [`SessionStore::initialize`] has finished.
    pub loading: bool,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

/// Owns the current session and the operations that change it.
pub struct SessionStore {
    api: Arc<ApiClient>,
    tokens: Arc<dyn TokenStore>,
    listener: Arc<dyn OutcomeListener>,
    state: Mutex<SessionState>,
    initialized: AtomicBool,
    disposed: AtomicBool,
}

impl SessionStore {
    /// A store awaiting [`initialize`](Self::initialize); `loading` is set.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, tokens: Arc<dyn TokenStore>, listener: Arc<dyn OutcomeListener>) -> Self {
        Self {
            api,
            tokens,
            listener,
            state: Mutex::new(SessionState { loading: true, ..SessionState::default() }),
            initialized: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` unless the store has been disposed.
    fn commit(&self, f: impl FnOnce(&mut SessionState)) -> bool {
        if self.disposed.load(Ordering::Acquire) {
            return false;
        }
        f(&mut self.lock());
        true
    }

    fn publish(&self, outcome: &Outcome) {
        self.listener.on_outcome(outcome);
    }

    /// Restore a persisted session. Runs once; later calls return the
    /// current snapshot untouched.
    ///
    /// Any failure (unreadable store, network error, rejected token) clears
    /// the persisted token and ends unauthenticated.
    pub async fn initialize(&self) -> SessionState {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return self.snapshot();
        }

        let persisted = self.tokens.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "token store unreadable; starting signed out");
            None
        });
        let Some(token) = persisted else {
            tracing::debug!("no persisted token");
            self.commit(|s| s.loading = false);
            return self.snapshot();
        };

        self.api.set_token(Some(token.clone()));
        match self.api.me().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                self.commit(|s| {
                    s.token = Some(token);
                    s.user = Some(user);
                    s.loading = false;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted token rejected; clearing");
                self.api.set_token(None);
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!(error = %e, "failed to clear persisted token");
                }
                self.commit(|s| *s = SessionState::default());
            }
        }
        self.snapshot()
    }

    /// Persist and adopt a fresh `{user, token}` pair as one step.
    fn adopt(&self, payload: AuthPayload) -> Result<User, ClientError> {
        self.tokens.save(&payload.token)?;
        self.api.set_token(Some(payload.token.clone()));
        let user = payload.user;
        self.commit(|s| {
            s.token = Some(payload.token);
            s.user = Some(user.clone());
            s.loading = false;
        });
        tracing::info!(user_id = %user.id, role = %user.role, "signed in");
        Ok(user)
    }

    fn settle(&self, action: Action, success: Outcome, result: Result<User, ClientError>) -> Result<User, ClientError> {
        match result {
            Ok(user) => {
                self.publish(&success);
                Ok(user)
            }
            Err(e) => {
                self.publish(&Outcome::failed(action, e.to_string()));
                Err(e)
            }
        }
    }

    /// Register and sign in.
    ///
    /// # Errors
    ///
    /// Local validation errors return before any request and without an
    /// outcome. Server and storage failures publish a failure outcome,
    /// leave the previous session untouched, and are returned.
    pub async fn sign_up(&self, email: &str, password: &str, profile: SignUpProfile) -> Result<User, ClientError> {
        let request = RegisterRequest { email: email.trim().to_owned(), password: password.to_owned(), profile };
        validate::registration(&request)?;
        let result = match self.api.register(&request).await {
            Ok(payload) => self.adopt(payload),
            Err(e) => Err(e),
        };
        self.settle(Action::SignUp, Outcome::SignedUp, result)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Same policy as [`sign_up`](Self::sign_up).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let credentials = Credentials { email: email.trim().to_owned(), password: password.to_owned() };
        validate::credentials(&credentials)?;
        let result = match self.api.login(&credentials).await {
            Ok(payload) => self.adopt(payload),
            Err(e) => Err(e),
        };
        self.settle(Action::SignIn, Outcome::SignedIn, result)
    }

    /// Sign out. The backend call is best effort; local state is always
    /// cleared.
    pub async fn sign_out(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout request failed; continuing with local logout");
        }
        self.api.set_token(None);
        let cleared = self.tokens.clear();
        {
            let mut state = self.lock();
            state.token = None;
            state.user = None;
            state.loading = false;
        }
        match cleared {
            Ok(()) => {
                tracing::info!("signed out");
                self.publish(&Outcome::SignedOut);
            }
            Err(e) => {
                tracing::warn!(error = %e, "signed out locally but token could not be cleared");
                self.publish(&Outcome::SignedOutLocally);
            }
        }
    }

    /// Update profile fields and adopt the server's returned user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] without a request when no
    /// one is signed in, and after the request when the session ended while
    /// it was in flight. Server failures publish a failure outcome and are
    /// returned with the session unchanged.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, ClientError> {
        if self.current_user().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        let result = self.api.update_me(&update).await.and_then(|user| {
            // A sign-out that raced this request wins; never revive a user without a token.
            let mut adopted = false;
            self.commit(|s| {
                if s.token.is_some() {
                    s.user = Some(user.clone());
                    adopted = true;
                }
            });
            if adopted { Ok(user) } else { Err(ClientError::NotAuthenticated) }
        });
        self.settle(Action::UpdateProfile, Outcome::ProfileUpdated, result)
    }

    /// End the store's lifetime. In-memory identity and the client's token
    /// are dropped; the persisted token is kept for the next start. Late
    /// responses from in-flight operations are discarded.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.api.set_token(None);
        *self.lock() = SessionState::default();
    }
}
