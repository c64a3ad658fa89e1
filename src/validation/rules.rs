//! Built-in validation rules
//!
//! Each rule comes in two shapes: a plain `check_*` function over the raw
//! input, and a constructor returning a [`Validator`] ready to be placed in a
//! [`Rule`](crate::state::Rule).

use super::messages;
use crate::config::ValidationLimits;
use crate::state::{
    form_validator_fn, validator_fn, FieldValue, FormValidator, FormValues, ValidationResult,
    Validator,
};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Mainland China mobile numbers
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone pattern"));

/// CJK unified ideographs, ASCII letters, digits and underscore
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9_]+$").expect("name pattern")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("url pattern")
});

static LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]").expect("letter pattern"));

static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("digit pattern"));

// -------------------------------------------------------------------------
// Plain checks
// -------------------------------------------------------------------------

pub fn check_required(value: &FieldValue, label: &str) -> ValidationResult {
    if value.is_empty() {
        ValidationResult::fail(messages::required(label))
    } else {
        ValidationResult::ok()
    }
}

pub fn check_email(email: &str) -> ValidationResult {
    if email.is_empty() {
        return ValidationResult::fail(messages::EMAIL_REQUIRED);
    }
    if EMAIL_RE.is_match(email) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(messages::EMAIL_INVALID)
    }
}

/// Length-checked password. A password without both a letter and a digit
/// still passes, with an advisory note.
pub fn check_password(password: &str, limits: &ValidationLimits) -> ValidationResult {
    if password.is_empty() {
        return ValidationResult::fail(messages::PASSWORD_REQUIRED);
    }
    let len = password.chars().count();
    if len < limits.password_min {
        return ValidationResult::fail(messages::password_too_short(limits.password_min));
    }
    if len > limits.password_max {
        return ValidationResult::fail(messages::password_too_long(limits.password_max));
    }
    if !LETTER_RE.is_match(password) || !DIGIT_RE.is_match(password) {
        return ValidationResult::ok_with_note(messages::PASSWORD_WEAK_HINT);
    }
    ValidationResult::ok()
}

pub fn check_password_confirm(password: &str, confirm: &str) -> ValidationResult {
    if confirm.is_empty() {
        return ValidationResult::fail(messages::PASSWORD_CONFIRM_REQUIRED);
    }
    if password == confirm {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(messages::PASSWORD_MISMATCH)
    }
}

/// Nickname: bounds apply to the trimmed text
pub fn check_name(name: &str, limits: &ValidationLimits) -> ValidationResult {
    if name.is_empty() {
        return ValidationResult::fail(messages::NAME_REQUIRED);
    }
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < limits.name_min {
        return ValidationResult::fail(messages::name_too_short(limits.name_min));
    }
    if len > limits.name_max {
        return ValidationResult::fail(messages::name_too_long(limits.name_max));
    }
    if !NAME_RE.is_match(trimmed) {
        return ValidationResult::fail(messages::NAME_INVALID);
    }
    ValidationResult::ok()
}

pub fn check_phone(phone: &str) -> ValidationResult {
    if phone.is_empty() {
        return ValidationResult::fail(messages::PHONE_REQUIRED);
    }
    if PHONE_RE.is_match(phone) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(messages::PHONE_INVALID)
    }
}

/// Length of a text (in chars) or list (in items)
pub fn check_length(value: &FieldValue, min: usize, max: usize, label: &str) -> ValidationResult {
    let len = match value {
        FieldValue::Text(s) => s.chars().count(),
        FieldValue::List(items) => items.len(),
        FieldValue::Number(_) | FieldValue::Bool(_) => 0,
    };
    if len < min {
        return ValidationResult::fail(messages::too_short(label, min));
    }
    if len > max {
        return ValidationResult::fail(messages::too_long(label, max));
    }
    ValidationResult::ok()
}

pub fn check_url(url: &str) -> ValidationResult {
    if url.is_empty() {
        return ValidationResult::fail(messages::URL_REQUIRED);
    }
    if URL_RE.is_match(url) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(messages::URL_INVALID)
    }
}

/// Numeric bounds. Text input is accepted when it parses as a number, since
/// terminal fields only ever hold text.
pub fn check_range(value: &FieldValue, min: f64, max: f64, label: &str) -> ValidationResult {
    let number = match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        FieldValue::Bool(_) | FieldValue::List(_) => None,
    };
    let Some(number) = number.filter(|n| !n.is_nan()) else {
        return ValidationResult::fail(messages::not_a_number(label));
    };
    if number < min {
        return ValidationResult::fail(messages::below_min(label, min));
    }
    if number > max {
        return ValidationResult::fail(messages::above_max(label, max));
    }
    ValidationResult::ok()
}

pub fn check_pattern(value: &str, regex: &Regex, message: &str) -> ValidationResult {
    if regex.is_match(value) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(message)
    }
}

// -------------------------------------------------------------------------
// Validator constructors
// -------------------------------------------------------------------------

/// Non-empty check; `label` defaults to "此项"
pub fn required(label: Option<&str>) -> impl Validator {
    let label = label.unwrap_or(messages::DEFAULT_FIELD_LABEL).to_string();
    validator_fn(move |value| check_required(value, &label))
}

pub fn email() -> impl Validator {
    validator_fn(|value| check_email(value.as_text()))
}

pub fn password(limits: ValidationLimits) -> impl Validator {
    validator_fn(move |value| check_password(value.as_text(), &limits))
}

pub fn name(limits: ValidationLimits) -> impl Validator {
    validator_fn(move |value| check_name(value.as_text(), &limits))
}

pub fn phone() -> impl Validator {
    validator_fn(|value| check_phone(value.as_text()))
}

pub fn length(min: usize, max: usize, label: Option<&str>) -> impl Validator {
    let label = label.unwrap_or(messages::DEFAULT_LENGTH_LABEL).to_string();
    validator_fn(move |value| check_length(value, min, max, &label))
}

pub fn url() -> impl Validator {
    validator_fn(|value| check_url(value.as_text()))
}

pub fn range(min: f64, max: f64, label: Option<&str>) -> impl Validator {
    let label = label.unwrap_or(messages::DEFAULT_RANGE_LABEL).to_string();
    validator_fn(move |value| check_range(value, min, max, &label))
}

pub fn pattern(regex: Regex, message: Option<&str>) -> impl Validator {
    let message = message.unwrap_or(messages::INVALID_FORMAT).to_string();
    validator_fn(move |value| check_pattern(value.as_text(), &regex, &message))
}

/// Form-level check that two text fields hold the same password
pub fn passwords_match(password_field: &str, confirm_field: &str) -> impl FormValidator {
    let password_field = password_field.to_string();
    let confirm_field = confirm_field.to_string();
    form_validator_fn(move |values: &FormValues| {
        check_password_confirm(values.text(&password_field), values.text(&confirm_field))
    })
}

/// Runs validators in order and returns the first failing result
pub struct Compose {
    validators: Vec<Arc<dyn Validator>>,
}

pub fn compose(validators: Vec<Arc<dyn Validator>>) -> Compose {
    Compose { validators }
}

#[async_trait]
impl Validator for Compose {
    async fn validate(&self, value: &FieldValue) -> Result<ValidationResult> {
        for validator in &self.validators {
            let result = validator.validate(value).await?;
            if !result.valid {
                return Ok(result);
            }
        }
        Ok(ValidationResult::ok())
    }
}
