//! Form rendering

mod account_form;
mod field_renderer;

pub use account_form::draw_account_form;
