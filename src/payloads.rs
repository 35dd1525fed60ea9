#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Error payloads layered on top of the taxonomy. All of them wrap an
//! arbitrary `E`, so they ride through the combinators unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// An error tagged with the input position that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedError<E> {
    index: usize,
    error: E,
}

impl<E> IndexedError<E> {
    #[must_use]
    pub const fn new(index: usize, error: E) -> Self {
        Self { index, error }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn error(&self) -> &E {
        &self.error
    }

    #[must_use]
    pub fn into_error(self) -> E {
        self.error
    }
}

impl<E: fmt::Display> fmt::Display for IndexedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}: {}", self.index, self.error)
    }
}

/// An error attached to a named form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError<E> {
    field: String,
    error: E,
}

impl<E> FieldError<E> {
    #[must_use]
    pub fn new(field: impl Into<String>, error: E) -> Self {
        Self {
            field: field.into(),
            error,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn error(&self) -> &E {
        &self.error
    }
}

impl<E: fmt::Display> fmt::Display for FieldError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// An error with free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichError<E> {
    error: E,
    metadata: BTreeMap<String, Value>,
}

impl<E> RichError<E> {
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            error,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn error(&self) -> &E {
        &self.error
    }

    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    #[must_use]
    pub fn into_parts(self) -> (E, BTreeMap<String, Value>) {
        (self.error, self.metadata)
    }
}

impl<E: fmt::Display> fmt::Display for RichError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::collect::{combine_all, traverse_indexed};
    use crate::outcome::{failure, success, Outcome};

    #[test]
    fn field_errors_accumulate_through_combine_all() {
        let checks: Vec<Outcome<&str, FieldError<String>>> = vec![
            success("alice"),
            failure(FieldError::new("email", "missing @".to_string())),
            failure(FieldError::new("age", "negative".to_string())),
        ];
        let errors = combine_all(checks).error();
        let fields: Vec<&str> = errors.iter().map(FieldError::field).collect();
        assert_eq!(fields, vec!["email", "age"]);
        assert_eq!(errors[0].to_string(), "email: missing @");
    }

    #[test]
    fn indexed_error_displays_position() {
        let outcome = traverse_indexed(["1", "x"], |s| {
            Outcome::attempt(|| s.parse::<i32>(), |_| format!("'{s}' is not a number"))
        });
        assert_eq!(outcome.error().to_string(), "item 1: 'x' is not a number");
    }

    #[test]
    fn rich_error_keeps_metadata_in_key_order() {
        let rich = RichError::new("timeout")
            .with_meta("retry", 3)
            .with_meta("host", "db-1");
        let keys: Vec<&String> = rich.metadata().keys().collect();
        assert_eq!(keys, vec!["host", "retry"]);
        assert_eq!(rich.error(), &"timeout");
    }
}
