use cadence_core::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{AttendeeStatus, AttendeeType};

/// A participant of a master event.
///
/// Attendees are owned by the master event; children read their parent's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "userId")]
    pub user: Option<UserId>,
    #[serde(default)]
    pub status: Option<AttendeeStatus>,
    #[serde(default, rename = "type")]
    pub attendee_type: Option<AttendeeType>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Attendee {
    #[must_use]
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            display_name: display_name.into(),
            user: None,
            status: None,
            attendee_type: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: AttendeeStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_type(mut self, attendee_type: AttendeeType) -> Self {
        self.attendee_type = Some(attendee_type);
        self
    }

    /// ## Summary
    /// Attendee equality: same user (or both unbound), emails equal ignoring
    /// case, display names exactly equal.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        self.user == other.user
            && self.email.to_lowercase() == other.email.to_lowercase()
            && self.display_name == other.display_name
    }

    /// Fresh, unpersisted attendee carrying the same identity, for another event's list.
    #[must_use]
    pub fn copy_for_exception(&self) -> Self {
        Self {
            id: None,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            user: self.user,
            status: self.status,
            attendee_type: self.attendee_type,
            created_at: None,
            updated_at: None,
        }
    }
}
