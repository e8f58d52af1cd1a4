//! Integration tests across the recurrence, model and service crates.

mod deletion;
mod notification;
mod projection;
mod reconciliation;
