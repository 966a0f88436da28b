//! Session lifecycle controller
//!
//! Owns the in-memory authentication state and drives login, signup, logout
//! and status updates through [`DevSyncApi`]. State lives in a
//! `tokio::sync::watch` channel; every transition is published after the
//! fields change, so subscribers always observe a consistent snapshot.
//!
//! Lifecycle calls are not serialized. Two calls issued without awaiting each
//! other (for example `login` racing `logout`) leave the final state in
//! whichever order their last transitions happen to land.

use crate::api::DevSyncApi;
use crate::error::{ClientError, Result};
use crate::models::{MessageResponse, User, UserStatus};
use crate::validation;
use std::sync::Arc;
use tokio::sync::watch;

/// Coarse phase derived from [`AuthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    Loading,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl AuthState {
    fn loading() -> Self {
        AuthState {
            user: None,
            is_loading: true,
            is_authenticated: false,
        }
    }

    fn unauthenticated() -> Self {
        AuthState {
            user: None,
            is_loading: false,
            is_authenticated: false,
        }
    }

    fn authenticated(user: User) -> Self {
        AuthState {
            user: Some(user),
            is_loading: false,
            is_authenticated: true,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Loading
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        }
    }
}

pub struct SessionController {
    api: Arc<DevSyncApi>,
    state: watch::Sender<AuthState>,
}

impl SessionController {
    /// Starts in `Loading`; call [`restore`](Self::restore) to settle it
    pub fn new(api: Arc<DevSyncApi>) -> Self {
        let (state, _) = watch::channel(AuthState::loading());
        SessionController { api, state }
    }

    pub fn api(&self) -> &Arc<DevSyncApi> {
        &self.api
    }

    /// Current snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    fn publish(&self, next: AuthState) {
        log::debug!("Auth state -> {:?}", next.phase());
        self.state.send_replace(next);
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|state| state.is_loading = is_loading);
    }

    /// Initial check: validate a stored token by fetching the profile
    ///
    /// A rejected or unreachable profile call drops the stored session.
    pub async fn restore(&self) -> Result<AuthPhase> {
        let has_token = match self.api.is_authenticated() {
            Ok(has_token) => has_token,
            Err(e) => {
                log::error!("Failed to read stored session: {}", e);
                self.publish(AuthState::unauthenticated());
                return Err(e);
            }
        };
        if !has_token {
            self.publish(AuthState::unauthenticated());
            return Ok(AuthPhase::Unauthenticated);
        }

        match self.api.profile().await {
            Ok(user) => {
                log::info!("Restored session for {}", user.username);
                self.publish(AuthState::authenticated(user));
                Ok(AuthPhase::Authenticated)
            }
            Err(e) => {
                log::warn!("Stored session rejected: {}", e);
                let cleared = self.api.session().clear();
                self.publish(AuthState::unauthenticated());
                cleared.map(|_| AuthPhase::Unauthenticated)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        validation::validate_credentials(username, password)?;
        self.publish(AuthState::loading());

        match self.sign_in(username, password).await {
            Ok(user) => {
                self.publish(AuthState::authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                log::warn!("Login failed: {}", e);
                self.publish(AuthState::unauthenticated());
                Err(e)
            }
        }
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<User> {
        self.api.login(username, password).await?;

        match self.api.profile().await {
            Ok(user) => Ok(user),
            Err(e) => {
                // No token may outlive a failed login
                if let Err(clear_err) = self.api.session().clear() {
                    log::error!("Failed to clear session after login error: {}", clear_err);
                }
                Err(e)
            }
        }
    }

    /// Register an account; does not sign in
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<MessageResponse> {
        validation::validate_signup(username, email, password)?;

        self.set_loading(true);
        let result = self.api.signup(username, email, password).await;
        self.set_loading(false);

        result
    }

    /// Always ends unauthenticated with an empty session store
    ///
    /// A failed backend signout is logged and otherwise ignored. Only a
    /// failure to clear local storage is returned.
    pub async fn logout(&self) -> Result<()> {
        self.publish(AuthState::loading());

        if let Err(e) = self.api.signout().await {
            log::warn!("Signout failed, clearing local session anyway: {}", e);
        }

        let cleared = self.api.session().clear();
        self.publish(AuthState::unauthenticated());
        cleared
    }

    /// Push a new presence status, then patch it onto the cached user
    pub async fn update_user_status(&self, status: UserStatus, is_online: Option<bool>) -> Result<()> {
        if !self.state.borrow().is_authenticated {
            return Err(ClientError::NotAuthenticated);
        }

        self.api.update_status(status, is_online).await?;

        self.state.send_modify(|state| {
            if let Some(user) = state.user.as_mut() {
                user.status = status;
                if let Some(is_online) = is_online {
                    user.is_online = is_online;
                }
            }
        });
        Ok(())
    }

    /// Re-fetch the profile and replace the cached user
    ///
    /// Only the user changes, and only while authenticated. Failures keep
    /// the previous state.
    pub async fn refresh_user(&self) {
        match self.api.profile().await {
            Ok(user) => {
                self.state.send_if_modified(|state| {
                    if !state.is_authenticated {
                        return false;
                    }
                    state.user = Some(user);
                    true
                });
            }
            Err(e) => log::warn!("Failed to refresh user profile: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::storage::{KeyValueStore, MemoryStore};

    /// Store whose reads and writes all fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(ClientError::Storage("disk I/O error".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(ClientError::Storage("disk I/O error".to_string()))
        }

        fn set_many(&self, _entries: &[(&str, &str)]) -> Result<()> {
            Err(ClientError::Storage("disk I/O error".to_string()))
        }

        fn remove_all(&self, _keys: &[&str]) -> Result<()> {
            Err(ClientError::Storage("disk I/O error".to_string()))
        }
    }

    fn controller_with_store(store: Arc<dyn KeyValueStore>) -> SessionController {
        let session = SessionStore::new(store);
        // Port 9 (discard) has nothing listening; any request fails to connect
        let api = DevSyncApi::new("http://127.0.0.1:9/api", session).unwrap();
        SessionController::new(Arc::new(api))
    }

    fn controller() -> SessionController {
        controller_with_store(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_phase_derivation() {
        assert_eq!(AuthState::loading().phase(), AuthPhase::Loading);
        assert_eq!(AuthState::unauthenticated().phase(), AuthPhase::Unauthenticated);
    }

    #[test]
    fn test_starts_loading() {
        let controller = controller();
        assert_eq!(controller.state().phase(), AuthPhase::Loading);
        assert!(controller.current_user().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_token_is_offline() {
        let controller = controller();
        let mut rx = controller.subscribe();

        assert_eq!(controller.restore().await.unwrap(), AuthPhase::Unauthenticated);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_with_unreadable_store_settles_unauthenticated() {
        let controller = controller_with_store(Arc::new(BrokenStore));
        assert_eq!(controller.state().phase(), AuthPhase::Loading);

        let err = controller.restore().await.unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
        assert_eq!(controller.state().phase(), AuthPhase::Unauthenticated);
        assert!(controller.current_user().is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_unauthenticated_state() {
        let controller = controller();
        controller.restore().await.unwrap();

        controller.refresh_user().await;
        assert_eq!(controller.state().phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_invalid_credentials_rejected_locally() {
        let controller = controller();
        let before = controller.state();

        let err = controller.login("ab", "").await.unwrap_err();
        match err {
            ClientError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(controller.state(), before);
    }

    #[tokio::test]
    async fn test_status_update_requires_authentication() {
        let controller = controller();
        let err = controller
            .update_user_status(UserStatus::Away, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }
}
