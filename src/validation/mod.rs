//! Validation rule library and the message catalogue it draws from

pub mod messages;
pub mod rules;
