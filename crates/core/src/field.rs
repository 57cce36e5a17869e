//! Three-state optional input fields.
//!
//! Update semantics depend on whether a caller sent a key at all, while
//! create semantics depend on whether the value is non-empty. A plain
//! `Option<T>` cannot tell `""` from "not sent" without re-checking emptiness
//! everywhere, so arguments that feed either path use [`FieldInput`].

use serde::{Deserialize, Deserializer};

pub trait Emptiable {
    fn is_empty_value(&self) -> bool;
}

impl Emptiable for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiable for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// Use with `#[serde(default)]`: a missing key stays `Omitted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput<T> {
    Omitted,
    Empty,
    Given(T),
}

impl<T> Default for FieldInput<T> {
    fn default() -> Self {
        FieldInput::Omitted
    }
}

impl<T> FieldInput<T> {
    /// The key was present, with any value.
    pub fn is_provided(&self) -> bool {
        !matches!(self, FieldInput::Omitted)
    }

    /// The key was present with a non-empty value.
    pub fn is_given(&self) -> bool {
        matches!(self, FieldInput::Given(_))
    }

    pub fn given(&self) -> Option<&T> {
        match self {
            FieldInput::Given(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone + Default> FieldInput<T> {
    /// The value to forward when the key was present; `Empty` yields `T::default()`.
    pub fn provided(&self) -> Option<T> {
        match self {
            FieldInput::Omitted => None,
            FieldInput::Empty => Some(T::default()),
            FieldInput::Given(v) => Some(v.clone()),
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldInput<T>
where
    T: Deserialize<'de> + Emptiable,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = T::deserialize(deserializer)?;
        if value.is_empty_value() {
            Ok(FieldInput::Empty)
        } else {
            Ok(FieldInput::Given(value))
        }
    }
}
