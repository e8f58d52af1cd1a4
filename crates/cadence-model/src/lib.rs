//! Calendar entities and the event tree they form.
//!
//! - `model::event`: the event record with its scalar fields and organizer info
//! - `model::attendee`: attendees and their equality rule
//! - `model::calendar`: personal and system calendars
//! - `model::tree`: the arena holding masters, children and exceptions

pub mod model;

pub use model::attendee::Attendee;
pub use model::calendar::{Calendar, EventCalendar, SystemCalendar};
pub use model::enums::{AttendeeStatus, AttendeeType};
pub use model::event::{Event, Organizer};
pub use model::tree::{EventKey, EventTree, RemovedEntity};
pub use model::user::User;
