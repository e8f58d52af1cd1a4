pub mod attendee;
pub mod calendar;
pub mod enums;
pub mod event;
pub mod tree;
pub mod user;
