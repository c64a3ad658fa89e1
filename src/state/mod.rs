//! Application state module

pub mod account_forms;
mod app_state;
mod forms;

pub use app_state::*;
pub use forms::*;
