//! Ageless Forms - reactive form and validation engine
//!
//! The core is [`state::Form`]: per-field state, ordered async validators
//! fired by blur/change/submit triggers, an optional cross-field check and a
//! submit lifecycle that allows one submission in flight at a time. Around it
//! sit the built-in rule library, the message catalogue and the services the
//! account screens submit to.

pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod validation;

pub use error::{ConfigError, FormError};
