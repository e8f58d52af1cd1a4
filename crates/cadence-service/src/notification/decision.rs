use std::collections::VecDeque;

use cadence_core::types::UserId;
use cadence_model::{Attendee, AttendeeStatus, EventKey, User};
use serde::Serialize;

use crate::error::ServiceResult;

/// What a recipient is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    Invite,
    Update,
    Cancel,
    Uninvite,
    /// An attendee removed their copy of the event.
    ChildDeleted,
    /// An attendee answered the invitation.
    StatusChanged { status: AttendeeStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email: String,
    pub display_name: String,
    pub user_id: Option<UserId>,
}

impl From<&Attendee> for Recipient {
    fn from(attendee: &Attendee) -> Self {
        Self {
            email: attendee.email.clone(),
            display_name: attendee.display_name.clone(),
            user_id: attendee.user,
        }
    }
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            display_name: user.full_name(),
            user_id: Some(user.id),
        }
    }
}

/// One decided notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDecision {
    #[serde(flatten)]
    pub kind: NotificationKind,
    #[serde(skip)]
    pub event: EventKey,
    pub event_id: Option<i64>,
    pub event_uid: uuid::Uuid,
    pub recipients: Vec<Recipient>,
    /// Attendee the notification reports on, for owner notifications.
    pub subject: Option<Recipient>,
}

/// Delivers decided notifications.
pub trait NotificationTransport {
    /// ## Errors
    /// Returns an error if the notification could not be handed over.
    fn send(&mut self, decision: &NotificationDecision) -> ServiceResult<()>;
}

impl NotificationTransport for Vec<NotificationDecision> {
    fn send(&mut self, decision: &NotificationDecision) -> ServiceResult<()> {
        self.push(decision.clone());
        Ok(())
    }
}

/// Decisions waiting to be flushed, in decision order.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<NotificationDecision>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a decision; decisions without recipients are dropped.
    pub fn push(&mut self, decision: NotificationDecision) {
        if decision.recipients.is_empty() {
            tracing::trace!(kind = ?decision.kind, event = %decision.event, "No recipients, skipping notification");
            return;
        }
        tracing::debug!(
            kind = ?decision.kind,
            event = %decision.event,
            recipients = decision.recipients.len(),
            "Queued notification"
        );
        self.pending.push_back(decision);
    }

    pub fn pending(&self) -> impl Iterator<Item = &NotificationDecision> {
        self.pending.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending decision, e.g. after a rolled back transaction.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// ## Summary
    /// Sends pending decisions in order and returns how many were sent.
    ///
    /// ## Errors
    /// Returns the transport error; the failed decision and the ones after it
    /// stay queued.
    pub fn flush<T>(&mut self, transport: &mut T) -> ServiceResult<usize>
    where
        T: NotificationTransport + ?Sized,
    {
        let mut sent = 0;
        while let Some(decision) = self.pending.front() {
            transport.send(decision)?;
            self.pending.pop_front();
            sent += 1;
        }
        tracing::debug!(sent, "Flushed notifications");
        Ok(sent)
    }
}
