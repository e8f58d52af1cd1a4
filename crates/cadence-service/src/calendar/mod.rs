pub mod attendee;
pub mod child_events;
pub mod deletion;
pub mod exceptions;
pub mod manager;
pub mod projection;
