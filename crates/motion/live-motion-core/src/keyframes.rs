//! Keyframe maps and the variant names that select them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One keyframe value for a style property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeScalar {
    Number(f64),
    Text(String),
    /// `null` in a sequence: start from the element's current value.
    Wildcard,
}

/// Target for one style property: a single value or a keyframe sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Single(KeyframeScalar),
    Sequence(Vec<KeyframeScalar>),
}

impl From<f64> for KeyframeValue {
    fn from(v: f64) -> Self {
        KeyframeValue::Single(KeyframeScalar::Number(v))
    }
}

impl From<&str> for KeyframeValue {
    fn from(v: &str) -> Self {
        KeyframeValue::Single(KeyframeScalar::Text(v.to_string()))
    }
}

/// Mapping from style property name to its target.
/// Ordered so two semantically equal maps always compare and serialize equal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframes(pub BTreeMap<String, KeyframeValue>);

impl Keyframes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: &str, value: impl Into<KeyframeValue>) -> Self {
        self.0.insert(property.to_string(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&KeyframeValue> {
        self.0.get(property)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyframeValue)> {
        self.0.iter()
    }
}

/// Named variants an engine state can activate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Initial,
    Animate,
    Exit,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Initial => "initial",
            Variant::Animate => "animate",
            Variant::Exit => "exit",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
