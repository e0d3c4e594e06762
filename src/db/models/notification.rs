//! In-app notification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored in `userId` for notifications addressed to everyone
pub const BROADCAST_RECIPIENT: &str = "all";

/// Notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Mention,
    Assignment,
    Comment,
    Deadline,
    StatusChange,
    Warning,
    Announcement,
    Complaint,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::Assignment => "assignment",
            Self::Comment => "comment",
            Self::Deadline => "deadline",
            Self::StatusChange => "status-change",
            Self::Warning => "warning",
            Self::Announcement => "announcement",
            Self::Complaint => "complaint",
        }
    }

    /// Human label used when confirming a sent notification
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mention => "Mention",
            Self::Assignment => "Assignment",
            Self::Comment => "Comment",
            Self::Deadline => "Deadline Reminder",
            Self::StatusChange => "Status Change",
            Self::Warning => "Warning",
            Self::Announcement => "Announcement",
            Self::Complaint => "Complaint/Feedback",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mention" => Ok(Self::Mention),
            "assignment" => Ok(Self::Assignment),
            "comment" => Ok(Self::Comment),
            "deadline" => Ok(Self::Deadline),
            "status-change" | "status_change" => Ok(Self::StatusChange),
            "warning" => Ok(Self::Warning),
            "announcement" => Ok(Self::Announcement),
            "complaint" | "feedback" => Ok(Self::Complaint),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

/// Who a notification is addressed to.
///
/// Serialized as a plain string: a user ID, or `"all"` for broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recipient {
    All,
    User(String),
}

impl Recipient {
    pub fn user(id: impl Into<String>) -> Self {
        Recipient::User(id.into())
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, Recipient::All)
    }

    /// Whether a notification with this recipient is visible to the user
    pub fn includes(&self, user_id: &str) -> bool {
        match self {
            Recipient::All => true,
            Recipient::User(id) => id == user_id,
        }
    }
}

impl From<String> for Recipient {
    fn from(s: String) -> Self {
        if s == BROADCAST_RECIPIENT {
            Recipient::All
        } else {
            Recipient::User(s)
        }
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        match recipient {
            Recipient::All => BROADCAST_RECIPIENT.to_string(),
            Recipient::User(id) => id,
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::All => f.write_str(BROADCAST_RECIPIENT),
            Recipient::User(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "userId")]
    pub recipient: Recipient,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Notification as submitted, before an id and timestamp are assigned
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: Recipient,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(
        recipient: Recipient,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Recipient::All).unwrap(), "\"all\"");
        assert_eq!(
            serde_json::to_string(&Recipient::user("42")).unwrap(),
            "\"42\""
        );

        let parsed: Recipient = serde_json::from_str("\"all\"").unwrap();
        assert!(parsed.is_broadcast());
        let parsed: Recipient = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(parsed, Recipient::user("7"));
    }

    #[test]
    fn test_recipient_includes() {
        assert!(Recipient::All.includes("anyone"));
        assert!(Recipient::user("3").includes("3"));
        assert!(!Recipient::user("3").includes("4"));
    }

    #[test]
    fn test_notification_field_names() {
        let notification = Notification {
            id: "n1".to_string(),
            recipient: Recipient::All,
            kind: NotificationType::StatusChange,
            title: "Heads up".to_string(),
            message: "Sprint review moved".to_string(),
            read: false,
            link: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["userId"], "all");
        assert_eq!(value["type"], "status-change");
        assert!(value.get("link").is_none());
    }

    #[test]
    fn test_notification_type_parsing() {
        assert_eq!(
            "status_change".parse::<NotificationType>(),
            Ok(NotificationType::StatusChange)
        );
        assert_eq!(
            "feedback".parse::<NotificationType>(),
            Ok(NotificationType::Complaint)
        );
        assert!("spam".parse::<NotificationType>().is_err());
    }
}
