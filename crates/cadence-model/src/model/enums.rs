//! Enumerated attendee values.
//!
//! Each enum maps to the code stored by the repository and exposed by the API.

use std::fmt;

/// Response of an attendee to an invitation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    #[default]
    None,
    Accepted,
    Declined,
    Tentative,
}

impl AttendeeStatus {
    pub const ALL: [Self; 4] = [Self::None, Self::Accepted, Self::Declined, Self::Tentative];

    /// Returns the stored code of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }

    /// Resolves a status by its code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == code)
    }
}

impl fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an attendee in a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    Organizer,
    Optional,
    Required,
}

impl AttendeeType {
    pub const ALL: [Self; 3] = [Self::Organizer, Self::Optional, Self::Required];

    /// Returns the stored code of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Optional => "optional",
            Self::Required => "required",
        }
    }

    /// Resolves a type by its code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == code)
    }
}

impl fmt::Display for AttendeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
