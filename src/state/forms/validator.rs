//! Trait seams for validators, form-level checks and submit handlers
//!
//! Each seam is an async trait so that implementations may wait (e.g. on a
//! remote uniqueness check). Closure adapters cover the common synchronous case.

use super::field::FieldValue;
use super::form_state::FormValues;
use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;

/// Outcome of a single validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub valid: bool,
    /// Failure reason, or an advisory note on a passing result
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// Passing result that still carries a hint for the user
    pub fn ok_with_note(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: Some(message.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// Failing result without a message; the engine fills in its default
    pub fn fail_silent() -> Self {
        Self {
            valid: false,
            message: None,
        }
    }
}

/// Per-field validator. An `Err` is treated as an unexpected fault.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, value: &FieldValue) -> Result<ValidationResult>;
}

/// Cross-field check run after every field passes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormValidator: Send + Sync {
    async fn validate(&self, values: &FormValues) -> Result<ValidationResult>;
}

/// Receives the form values once validation passes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: &FormValues) -> Result<()>;
}

/// Synchronous closure validator
pub struct FnValidator<F>(F);

/// Wrap a plain function as a [`Validator`]
pub fn validator_fn<F>(f: F) -> FnValidator<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    FnValidator(f)
}

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&FieldValue) -> ValidationResult + Send + Sync,
{
    async fn validate(&self, value: &FieldValue) -> Result<ValidationResult> {
        Ok((self.0)(value))
    }
}

/// Asynchronous closure validator; the closure receives an owned copy of the value
pub struct AsyncFnValidator<F>(F);

pub fn validator_async<F, Fut>(f: F) -> AsyncFnValidator<F>
where
    F: Fn(FieldValue) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ValidationResult>> + Send,
{
    AsyncFnValidator(f)
}

#[async_trait]
impl<F, Fut> Validator for AsyncFnValidator<F>
where
    F: Fn(FieldValue) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ValidationResult>> + Send,
{
    async fn validate(&self, value: &FieldValue) -> Result<ValidationResult> {
        (self.0)(value.clone()).await
    }
}

/// Synchronous closure form-level validator
pub struct FnFormValidator<F>(F);

pub fn form_validator_fn<F>(f: F) -> FnFormValidator<F>
where
    F: Fn(&FormValues) -> ValidationResult + Send + Sync,
{
    FnFormValidator(f)
}

#[async_trait]
impl<F> FormValidator for FnFormValidator<F>
where
    F: Fn(&FormValues) -> ValidationResult + Send + Sync,
{
    async fn validate(&self, values: &FormValues) -> Result<ValidationResult> {
        Ok((self.0)(values))
    }
}

/// Asynchronous closure submit handler
pub struct FnSubmitHandler<F>(F);

pub fn submit_fn<F, Fut>(f: F) -> FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    FnSubmitHandler(f)
}

#[async_trait]
impl<F, Fut> SubmitHandler for FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn submit(&self, values: &FormValues) -> Result<()> {
        (self.0)(values.clone()).await
    }
}
