pub mod conversation;
pub mod schedule;
pub mod usage;
