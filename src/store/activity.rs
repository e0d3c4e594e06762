use chrono::Utc;

use super::AppStore;
use crate::db::{Activity, ActivityTarget};
use crate::utils::generate_id;

/// Oldest entries are dropped once the log grows past this
pub const MAX_ACTIVITIES: usize = 200;

impl AppStore {
    /// The activity log, newest first
    pub fn activities(&self) -> &[Activity] {
        &self.state.activities
    }

    pub fn activities_for<'a>(&'a self, target_id: &'a str) -> impl Iterator<Item = &'a Activity> {
        self.state
            .activities
            .iter()
            .filter(move |a| a.target_id == target_id)
    }

    /// Log an action by the acting user. Nothing is logged without one.
    pub(crate) fn record_activity(
        &mut self,
        target_type: ActivityTarget,
        target_id: &str,
        action: &str,
        metadata: Option<serde_json::Value>,
    ) {
        let Some(user_id) = self.acting_user.clone() else {
            return;
        };

        self.state.activities.insert(
            0,
            Activity {
                id: generate_id(),
                user_id,
                action: action.to_string(),
                target_type,
                target_id: target_id.to_string(),
                timestamp: Utc::now(),
                metadata,
            },
        );
        self.state.activities.truncate(MAX_ACTIVITIES);
    }
}
