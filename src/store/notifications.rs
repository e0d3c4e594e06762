use chrono::Utc;
use tracing::debug;

use super::AppStore;
use crate::db::{NewNotification, Notification};
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::utils::generate_id;

impl AppStore {
    /// All notifications, newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.state.notifications
    }

    /// Notifications addressed to `user_id`, broadcasts included
    pub fn notifications_for(&self, user_id: &str) -> Vec<&Notification> {
        self.state
            .notifications
            .iter()
            .filter(|n| n.recipient.includes(user_id))
            .collect()
    }

    pub fn unread_count_for(&self, user_id: &str) -> usize {
        self.state
            .notifications
            .iter()
            .filter(|n| !n.read && n.recipient.includes(user_id))
            .count()
    }

    pub fn add_notification(&mut self, new: NewNotification) -> StoreResult<Notification> {
        let notification = self.push_notification(new);
        self.persist()?;
        Ok(notification)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> StoreResult<Notification> {
        let notification = self
            .state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Notification, id))?;
        notification.read = true;
        let updated = notification.clone();

        self.persist()?;
        Ok(updated)
    }

    /// Mark every notification read. Returns how many changed.
    pub fn mark_all_notifications_read(&mut self) -> StoreResult<usize> {
        let mut changed = 0;
        for notification in self.state.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }

        self.persist()?;
        Ok(changed)
    }

    /// Prepend without persisting; callers persist once per operation
    pub(crate) fn push_notification(&mut self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: generate_id(),
            recipient: new.recipient,
            kind: new.kind,
            title: new.title,
            message: new.message,
            read: false,
            link: new.link,
            created_at: Utc::now(),
        };
        debug!(
            notification_id = %notification.id,
            recipient = %notification.recipient,
            kind = %notification.kind,
            "Notification added"
        );
        self.state.notifications.insert(0, notification.clone());
        notification
    }
}
