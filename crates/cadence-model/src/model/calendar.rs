//! Calendars an event can live on.

use cadence_core::types::{CalendarId, SystemCalendarId, UserId};
use serde::{Deserialize, Serialize};

use super::user::User;

/// A user's personal calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: CalendarId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Option<User>,
}

impl Calendar {
    #[must_use]
    pub fn new(id: impl Into<CalendarId>, owner: Option<User>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            owner,
        }
    }
}

/// A calendar shared by an organization rather than owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemCalendar {
    pub id: SystemCalendarId,
    #[serde(default)]
    pub name: String,
    /// Public calendars are visible across organizations.
    #[serde(default)]
    pub public: bool,
}

/// The calendar an event belongs to: personal or system, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventCalendar {
    Personal(Calendar),
    System(SystemCalendar),
}

impl EventCalendar {
    /// Owner of a personal calendar; system calendars have none.
    #[must_use]
    pub fn owner(&self) -> Option<&User> {
        match self {
            Self::Personal(calendar) => calendar.owner.as_ref(),
            Self::System(_) => None,
        }
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<UserId> {
        self.owner().map(|owner| owner.id)
    }

    #[must_use]
    pub fn personal(&self) -> Option<&Calendar> {
        match self {
            Self::Personal(calendar) => Some(calendar),
            Self::System(_) => None,
        }
    }

    #[must_use]
    pub fn personal_id(&self) -> Option<CalendarId> {
        self.personal().map(|calendar| calendar.id)
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }
}
