//! Reconciliation of recurring events and their per-attendee copies.
//!
//! - `calendar`: attendee binding, child-event and exception synchronization,
//!   deletion, occurrence projection and the update entry point
//! - `directory`: lookups of users and default calendars
//! - `notification`: notification decisions queued for an external transport

pub mod calendar;
pub mod directory;
pub mod error;
pub mod notification;

#[cfg(test)]
mod test_support;
