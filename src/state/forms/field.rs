//! Form field value objects

use super::validator::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl FieldValue {
    /// Get the text value (returns empty string for non-text fields)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the numeric value, if this is a number field
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value counts as "not filled in"
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// Push a character to a text value
    pub fn push_char(&mut self, c: char) {
        if let FieldValue::Text(s) = self {
            s.push(c);
        }
    }

    /// Remove the last character from a text value
    pub fn pop_char(&mut self) {
        if let FieldValue::Text(s) = self {
            s.pop();
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(true) => "yes".to_string(),
            FieldValue::Bool(false) => "no".to_string(),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

/// User interaction that causes a rule to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Blur,
    Change,
    Submit,
}

/// A validator paired with the interaction that fires it
#[derive(Clone)]
pub struct Rule {
    pub validator: Arc<dyn Validator>,
    pub trigger: Option<Trigger>,
}

impl Rule {
    pub fn new(validator: impl Validator + 'static, trigger: Option<Trigger>) -> Self {
        Self {
            validator: Arc::new(validator),
            trigger,
        }
    }

    pub fn on_blur(validator: impl Validator + 'static) -> Self {
        Self::new(validator, Some(Trigger::Blur))
    }

    pub fn on_change(validator: impl Validator + 'static) -> Self {
        Self::new(validator, Some(Trigger::Change))
    }

    pub fn on_submit(validator: impl Validator + 'static) -> Self {
        Self::new(validator, Some(Trigger::Submit))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

/// Static configuration of one field: its initial value and ordered rules
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub initial_value: FieldValue,
    pub rules: Vec<Rule>,
}

impl FieldConfig {
    /// Create a text field config with an initial value
    pub fn text(initial: &str) -> Self {
        Self::with_value(FieldValue::Text(initial.to_string()))
    }

    pub fn with_value(initial_value: FieldValue) -> Self {
        Self {
            initial_value,
            rules: Vec::new(),
        }
    }

    /// Append a rule; rules run in the order they were added
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Whether any rule fires on the given interaction
    pub fn has_trigger(&self, trigger: Trigger) -> bool {
        self.rules.iter().any(|r| r.trigger == Some(trigger))
    }
}

/// Live state of a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub value: FieldValue,
    pub error: Option<String>,
    pub touched: bool,
    pub validating: bool,
    pub valid: bool,
}

impl FieldState {
    /// Pristine state for a freshly constructed (or reset) field
    pub fn pristine(value: FieldValue) -> Self {
        Self {
            value,
            error: None,
            touched: false,
            validating: false,
            valid: true,
        }
    }
}
