//! Notification decisions.
//!
//! The engine decides who is told what about an event change and queues the
//! decision. Nothing is sent until the caller flushes the queue into a
//! transport, normally after its transaction committed.

pub mod decision;
pub mod engine;

pub use decision::{
    NotificationDecision, NotificationKind, NotificationQueue, NotificationTransport, Recipient,
};
pub use engine::{on_change_invitation_status, on_create, on_delete, on_update};
