pub mod analytics;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod kanban;
pub mod store;
pub mod utils;

pub use error::{StoreError, StoreResult};

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::analytics::{AdminOverview, ManagerOverview, MemberOverview};
use crate::auth::{AuthStore, Authenticator, CredentialTable};
use crate::config::Config;
use crate::db::{
    initialize_demo_data, FileStorage, NewNotification, NewTeamMember, Notification,
    SharedStorage, TeamMember, User, UserRole,
};
use crate::kanban::build_transition_policy;
use crate::store::AppStore;

/// Owns the configuration and both stores, and keeps them in step: the
/// signed-in user is the actor recorded in the activity log, and a first
/// login seeds the demo workspace when enabled.
pub struct TaskFlow {
    config: Config,
    auth: AuthStore,
    app: AppStore,
}

impl TaskFlow {
    /// File-backed state under `config.storage.data_dir` with the demo
    /// credential table
    pub fn open(config: Config) -> Result<Self> {
        utils::ensure_dir(&config.storage.data_dir)?;
        let storage: SharedStorage = Arc::new(FileStorage::open(&config.storage.data_dir)?);
        let authenticator = Arc::new(CredentialTable::demo()?);
        Ok(Self::with_storage(config, storage, authenticator))
    }

    pub fn with_storage(
        config: Config,
        storage: SharedStorage,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let auth = AuthStore::open(storage.clone(), authenticator, config.auth.latency());
        let mut app = AppStore::open(storage, build_transition_policy(&config.kanban));
        app.set_acting_user(auth.current_user().map(|u| u.id.clone()));

        Self { config, auth, app }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthStore {
        &mut self.auth
    }

    pub fn app(&self) -> &AppStore {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut AppStore {
        &mut self.app
    }

    pub fn current_user(&self) -> Option<&User> {
        self.auth.current_user()
    }

    /// Sign in; on success the user becomes the acting user
    pub async fn login(&mut self, email: &str, password: &str) -> StoreResult<bool> {
        if !self.auth.login(email, password).await {
            return Ok(false);
        }
        self.after_sign_in()?;
        Ok(true)
    }

    pub async fn signup(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> StoreResult<bool> {
        let created = self.auth.signup(email, password, name, role).await;
        if created {
            self.after_sign_in()?;
        }
        Ok(created)
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.app.set_acting_user(None);
    }

    /// Invite a team member after the simulated round trip
    pub async fn invite_member(&mut self, new: NewTeamMember) -> StoreResult<TeamMember> {
        simulate_latency(self.config.team.invite_latency()).await;
        self.app.add_team_member(new)
    }

    /// Send a notification after the simulated round trip
    pub async fn send_notification(&mut self, new: NewNotification) -> StoreResult<Notification> {
        simulate_latency(self.config.team.notify_latency()).await;
        let notification = self.app.add_notification(new)?;
        info!(
            recipient = %notification.recipient,
            kind = notification.kind.label(),
            "Notification sent"
        );
        Ok(notification)
    }

    pub fn admin_overview(&self, now: DateTime<Utc>) -> AdminOverview {
        AdminOverview::compute(
            self.app.snapshot(),
            self.auth.authenticator().account_count(),
            now,
        )
    }

    /// Overview for the signed-in user, `None` when signed out
    pub fn manager_overview(&self, now: DateTime<Utc>) -> Option<ManagerOverview> {
        let user = self.current_user()?;
        Some(ManagerOverview::for_user(
            self.app.snapshot(),
            &user.id,
            self.auth.authenticator().account_count(),
            now,
        ))
    }

    pub fn member_overview(&self, now: DateTime<Utc>) -> Option<MemberOverview> {
        let user = self.current_user()?;
        Some(MemberOverview::for_user(self.app.snapshot(), &user.id, now))
    }

    fn after_sign_in(&mut self) -> StoreResult<()> {
        let Some(user_id) = self.auth.current_user().map(|u| u.id.clone()) else {
            return Ok(());
        };
        if self.config.seed.demo_data {
            initialize_demo_data(&mut self.app, &user_id)?;
        }
        self.app.set_acting_user(Some(user_id));
        Ok(())
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
