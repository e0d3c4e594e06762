use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::Authenticator;
use crate::db::{
    load_snapshot, save_snapshot, AuthSession, SharedStorage, User, UserPatch, UserRole,
    AUTH_NAMESPACE,
};
use crate::utils::{avatar_url, generate_id};

/// Holds the signed-in user and persists it under [`AUTH_NAMESPACE`]
pub struct AuthStore {
    session: AuthSession,
    authenticator: Arc<dyn Authenticator>,
    storage: SharedStorage,
    latency: Duration,
}

impl AuthStore {
    /// Restore the persisted session, starting signed out if there is none or
    /// it cannot be read
    pub fn open(
        storage: SharedStorage,
        authenticator: Arc<dyn Authenticator>,
        latency: Duration,
    ) -> Self {
        let session = match load_snapshot::<AuthSession>(storage.as_ref(), AUTH_NAMESPACE) {
            Ok(Some(session)) => {
                if let Some(user) = &session.user {
                    info!(user_id = %user.id, "Restored session");
                }
                session
            }
            Ok(None) => AuthSession::default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable auth snapshot");
                AuthSession::default()
            }
        };

        Self {
            session,
            authenticator,
            storage,
            latency,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Sign in. Returns `false` on a credential mismatch and leaves the
    /// session untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.simulate_latency().await;

        match self.authenticator.validate(email, password).await {
            Some(user) => {
                info!(user_id = %user.id, role = %user.role, "Login succeeded");
                self.session = AuthSession::signed_in(user);
                self.persist();
                true
            }
            None => {
                warn!(email, "Login failed");
                false
            }
        }
    }

    /// Create a new account and sign in as it. Always succeeds.
    pub async fn signup(&mut self, email: &str, password: &str, name: &str, role: UserRole) -> bool {
        self.simulate_latency().await;

        let user = User {
            id: generate_id(),
            email: email.to_string(),
            name: name.to_string(),
            avatar: Some(avatar_url(name)),
            role,
            created_at: Utc::now(),
        };
        self.authenticator.register(email, password, &user).await;

        info!(user_id = %user.id, %role, "Signed up");
        self.session = AuthSession::signed_in(user);
        self.persist();
        true
    }

    pub fn logout(&mut self) {
        if let Some(user) = &self.session.user {
            info!(user_id = %user.id, "Logged out");
        }
        self.session = AuthSession::default();
        self.persist();
    }

    /// Merge fields into the signed-in user; does nothing when signed out
    pub fn update_user(&mut self, patch: UserPatch) -> Option<&User> {
        let user = self.session.user.as_mut()?;
        user.apply(patch);
        self.persist();
        self.session.user.as_ref()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn persist(&self) {
        if let Err(e) = save_snapshot(self.storage.as_ref(), AUTH_NAMESPACE, &self.session) {
            error!(error = %e, "Failed to persist auth session");
        }
    }
}
