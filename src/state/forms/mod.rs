//! Form domain layer
//!
//! This module provides the reactive form engine: per-field state, ordered
//! async validators with interaction triggers, form-level checks and a
//! guarded submit lifecycle. Rendering layers read snapshots and call the
//! engine's operations on user interaction.

mod engine;
mod events;
mod field;
mod form_state;
mod validator;

pub use engine::{Form, FormBuilder};
pub use events::{FormEvent, ListenerId};
pub use field::{FieldConfig, FieldState, FieldValue, Rule, Trigger};
pub use form_state::{FormState, FormValues};
pub use validator::{
    form_validator_fn, submit_fn, validator_async, validator_fn, AsyncFnValidator,
    FnFormValidator, FnSubmitHandler, FnValidator, FormValidator, SubmitHandler,
    ValidationResult, Validator,
};
