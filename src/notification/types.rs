use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of a notification.
///
/// Moves forward only: `queued -> processing -> sent | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Queued,
    Processing,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub const ALL: [NotificationStatus; 4] = [
        NotificationStatus::Queued,
        NotificationStatus::Processing,
        NotificationStatus::Sent,
        NotificationStatus::Failed,
    ];

    /// Transition table: the statuses reachable in one step
    pub fn successors(self) -> &'static [NotificationStatus] {
        match self {
            NotificationStatus::Queued => &[NotificationStatus::Processing],
            NotificationStatus::Processing => {
                &[NotificationStatus::Sent, NotificationStatus::Failed]
            }
            NotificationStatus::Sent | NotificationStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: NotificationStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Queued => "queued",
            NotificationStatus::Processing => "processing",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient address, opaque to the dispatcher
    #[serde(rename = "to")]
    pub recipient: String,
    pub message: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Create a queued notification with a fresh id
    pub fn new(recipient: impl Into<String>, message: impl Into<String>, channel: Channel) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            message: message.into(),
            channel,
            status: NotificationStatus::Queued,
            created_at: now,
            updated_at: now,
        }
    }
}
