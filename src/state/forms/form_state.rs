//! Form-level state and the aggregated value snapshot

use super::field::FieldValue;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Submission lifecycle flags, one per form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub submitting: bool,
    pub submitted: bool,
    pub error: Option<String>,
}

/// Field values keyed by field name, in configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(Vec<(String, FieldValue)>);

impl FormValues {
    /// Set a value, keeping the position of an existing name
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Text of a field, or "" when missing or not text
    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut values = Self::default();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// Serializes as a plain JSON object
impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
