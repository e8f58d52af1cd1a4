//! Lookups of users and calendars owned by the caller's repository.

use std::collections::HashMap;

use cadence_core::types::{OrganizationId, UserId};
use cadence_model::{Calendar, User};

use crate::error::ServiceResult;

/// Repository queries the reconcilers depend on.
pub trait Directory {
    /// ## Summary
    /// Finds a member of the organization by email, ignoring case.
    ///
    /// ## Errors
    /// Returns an error if the lookup itself fails.
    fn find_user_by_email(
        &self,
        organization: OrganizationId,
        email: &str,
    ) -> ServiceResult<Option<User>>;

    /// ## Summary
    /// Returns the calendar new events for `user` are placed on.
    ///
    /// ## Errors
    /// Returns an error if the lookup itself fails.
    fn default_calendar(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> ServiceResult<Option<Calendar>>;
}

/// In-memory directory, for callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<User>,
    calendars: HashMap<UserId, Calendar>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user together with its default calendar.
    #[must_use]
    pub fn with_user(mut self, user: User, calendar: Option<Calendar>) -> Self {
        if let Some(calendar) = calendar {
            self.calendars.insert(user.id, calendar);
        }
        self.users.push(user);
        self
    }
}

impl Directory for StaticDirectory {
    fn find_user_by_email(
        &self,
        organization: OrganizationId,
        email: &str,
    ) -> ServiceResult<Option<User>> {
        let email = email.trim();
        Ok(self
            .users
            .iter()
            .find(|user| {
                user.organization.is_none_or(|org| org == organization)
                    && user.email.eq_ignore_ascii_case(email)
            })
            .cloned())
    }

    fn default_calendar(
        &self,
        user: UserId,
        _organization: OrganizationId,
    ) -> ServiceResult<Option<Calendar>> {
        Ok(self.calendars.get(&user).cloned())
    }
}
