//! Scoped fixture state
//!
//! Values produced by setup steps (auth token, created booking id) live in
//! a [`ScopedState`] owned by exactly one scope: a single scenario, or a
//! group sharing one setup run. State never leaks across groups, so
//! scenario order within the suite cannot affect outcomes.

use std::collections::HashMap;

use serde_json::Value;

/// Key for the auth token produced by `POST /auth`.
pub const TOKEN: &str = "token";
/// Key for a booking id created or discovered by setup.
pub const BOOKING_ID: &str = "booking_id";
/// Key for the highest booking id seen in the listing (used to derive
/// ids that are guaranteed absent).
pub const MAX_BOOKING_ID: &str = "max_booking_id";

/// A fixture value was requested that setup never produced, or was
/// produced with a different type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateError {
    #[error("fixture value '{0}' was never produced")]
    NotFound(String),
    #[error("fixture value '{0}' is not a {1}")]
    WrongType(String, &'static str),
}

/// Key-value store scoped to one scenario or one group.
///
/// Cloned when a group-shared setup hands its values to each scenario, so
/// a scenario mutating its copy cannot disturb its siblings.
#[derive(Debug, Clone, Default)]
pub struct ScopedState {
    values: HashMap<String, Value>,
}

impl ScopedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// # Errors
    ///
    /// `NotFound` when the key is absent, `WrongType` when present but not
    /// an integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, StateError> {
        match self.values.get(key) {
            None => Err(StateError::NotFound(key.to_string())),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| StateError::WrongType(key.to_string(), "number")),
        }
    }

    /// # Errors
    ///
    /// `NotFound` when the key is absent, `WrongType` when present but not
    /// a string.
    pub fn get_str(&self, key: &str) -> Result<&str, StateError> {
        match self.values.get(key) {
            None => Err(StateError::NotFound(key.to_string())),
            Some(v) => v
                .as_str()
                .ok_or_else(|| StateError::WrongType(key.to_string(), "string")),
        }
    }
}
