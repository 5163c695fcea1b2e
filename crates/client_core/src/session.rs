use std::{
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{User, UserId, UserRole},
    error::{ApiError, ErrorCode},
};
use storage::KeyValueStore;
use thiserror::Error;
use tracing::{info, warn};

/// Key the signed-in user is persisted under.
pub const USER_KEY: &str = "user";

/// Failure reason recorded when a login future is dropped mid-flight.
pub const LOGIN_CANCELLED: &str = "login cancelled";

pub const DEFAULT_LOGIN_LATENCY: Duration = Duration::from_millis(1000);
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_millis(5000);

const DEMO_AVATAR: &str = "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?ixlib=rb-1.2.1&auto=format&fit=facearea&facepad=2&w=256&h=256&q=80";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    InvalidCredentials,
    #[error("login timed out after {0:?}")]
    Timeout(Duration),
    #[error("a login is already in progress")]
    AlreadyPending,
    #[error("session storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    pub fn api_error(&self) -> ApiError {
        let code = match self {
            AuthError::InvalidCredentials => ErrorCode::Unauthorized,
            AuthError::Timeout(_) => ErrorCode::Timeout,
            AuthError::AlreadyPending => ErrorCode::Validation,
            AuthError::Storage(_) => ErrorCode::Internal,
        };
        ApiError::new(code, self.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    SignedOut,
    Pending,
    Authenticated(User),
    Failed(String),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError>;
}

/// Accepts any non-empty credentials after a fixed delay and returns the demo admin.
#[derive(Debug, Clone)]
pub struct MockAuthService {
    latency: Duration,
}

impl MockAuthService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_LATENCY)
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        tokio::time::sleep(self.latency).await;
        Ok(User {
            id: UserId(1),
            name: "John Doe".to_string(),
            email: email.to_string(),
            role: UserRole::Admin,
            avatar: Some(DEMO_AVATAR.to_string()),
        })
    }
}

/// Tracks who is signed in and mirrors it into a `KeyValueStore`.
///
/// The state lock is never held across an await, so it can also be taken
/// from `Drop` when a login future is abandoned.
pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
    state: RwLock<SessionState>,
}

/// Moves a still-`Pending` session to `Failed` if the login future is dropped
/// before it settles.
struct PendingLogin<'a> {
    state: &'a RwLock<SessionState>,
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        let mut state = write_state(self.state);
        if *state == SessionState::Pending {
            warn!("session: login abandoned before it finished");
            *state = SessionState::Failed(LOGIN_CANCELLED.to_string());
        }
    }
}

fn read_state(state: &RwLock<SessionState>) -> RwLockReadGuard<'_, SessionState> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_state(state: &RwLock<SessionState>) -> RwLockWriteGuard<'_, SessionState> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn KeyValueStore>, timeout: Duration) -> Self {
        Self {
            auth,
            store,
            timeout,
            state: RwLock::new(SessionState::SignedOut),
        }
    }

    pub async fn state(&self) -> SessionState {
        read_state(&self.state).clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        match &*read_state(&self.state) {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(&*read_state(&self.state), SessionState::Authenticated(_))
    }

    /// Picks up a user persisted by an earlier login.
    ///
    /// An unreadable entry is dropped and the session stays signed out.
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                info!(user_id = user.id.0, "session: restored");
                *write_state(&self.state) = SessionState::Authenticated(user.clone());
                Ok(Some(user))
            }
            Err(err) => {
                warn!(error = %err, "session: discarding unreadable stored user");
                self.store.remove(USER_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        {
            let mut state = write_state(&self.state);
            if *state == SessionState::Pending {
                return Err(AuthError::AlreadyPending);
            }
            if email.trim().is_empty() || password.is_empty() {
                let err = AuthError::InvalidCredentials;
                *state = SessionState::Failed(err.to_string());
                warn!("session: login rejected, missing credentials");
                return Err(err);
            }
            *state = SessionState::Pending;
        }
        let _pending = PendingLogin { state: &self.state };
        info!(email, "session: login pending");

        let result = match tokio::time::timeout(self.timeout, self.auth.authenticate(email, password)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(self.timeout)),
        };
        let result = match result {
            Ok(user) => self.persist(&user).await.map(|()| user),
            Err(err) => Err(err),
        };

        let mut state = write_state(&self.state);
        match result {
            Ok(user) => {
                info!(user_id = user.id.0, "session: authenticated");
                *state = SessionState::Authenticated(user.clone());
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "session: login failed");
                *state = SessionState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        let removed = self.store.remove(USER_KEY).await?;
        *write_state(&self.state) = SessionState::SignedOut;
        info!(removed, "session: signed out");
        Ok(())
    }

    async fn persist(&self, user: &User) -> Result<(), AuthError> {
        let raw = serde_json::to_string(user).map_err(anyhow::Error::from)?;
        self.store.set(USER_KEY, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
