//! Structural response assertions
//!
//! Pure predicate functions. Each returns a structured [`CheckFailure`]
//! instead of panicking; the runner accumulates failures into the owning
//! scenario's result so one scenario can report several independent
//! mismatches.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::{ApiResponse, StatusClass};

/// Which assertion produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Status code or status class mismatch
    Status,
    /// Required key(s) absent from a JSON object
    KeysPresent,
    /// Deep partial-object comparison mismatch
    PartialMatch,
    /// Expected a non-empty array
    NonEmptyCollection,
    /// Transport-level failure (connect, timeout, malformed response)
    Transport,
    /// A value a later step depended on was never produced
    MissingDependency,
    /// Observed remote behavior contradicts the documented contract
    ContractAmbiguity,
}

impl CheckKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::KeysPresent => "keys_present",
            Self::PartialMatch => "partial_match",
            Self::NonEmptyCollection => "non_empty_collection",
            Self::Transport => "transport",
            Self::MissingDependency => "missing_dependency",
            Self::ContractAmbiguity => "contract_ambiguity",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single assertion failure with expected vs. actual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckFailure {
    pub check: CheckKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl CheckFailure {
    #[must_use]
    pub fn new(
        check: CheckKind,
        message: impl Into<String>,
        expected: Option<Value>,
        actual: Option<Value>,
    ) -> Self {
        Self {
            check,
            message: message.into(),
            expected,
            actual,
        }
    }

    /// Failure entry for a transport-level error that terminated a scenario.
    #[must_use]
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::new(CheckKind::Transport, err.to_string(), None, None)
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.check, self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, " (expected {expected}")?;
            if let Some(actual) = &self.actual {
                write!(f, ", got {actual}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// What a scenario expects from a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusExpectation {
    /// Exact code, e.g. 200 or 403
    Exact(u16),
    /// Any code in the class, e.g. any 2xx
    Class(StatusClass),
    /// Anything but a 2xx ("not success" — exact code not contractually fixed)
    NotSuccess,
}

/// Assert the response status against an exact code or a class.
///
/// # Errors
///
/// Returns a [`CheckFailure`] describing expected vs. actual status.
pub fn expect_status(
    response: &ApiResponse,
    expected: StatusExpectation,
) -> Result<(), CheckFailure> {
    let status = response.status;
    let ok = match expected {
        StatusExpectation::Exact(code) => status == code,
        StatusExpectation::Class(class) => response.class() == class,
        StatusExpectation::NotSuccess => !response.ok(),
    };
    if ok {
        return Ok(());
    }

    let expected_desc = match expected {
        StatusExpectation::Exact(code) => Value::from(code),
        StatusExpectation::Class(class) => Value::from(class.to_string()),
        StatusExpectation::NotSuccess => Value::from("any non-2xx"),
    };
    Err(CheckFailure::new(
        CheckKind::Status,
        format!("unexpected status {status}"),
        Some(expected_desc),
        Some(Value::from(status)),
    ))
}

/// Assert that `object` is a JSON object containing every key in `required`.
///
/// # Errors
///
/// The failure lists every missing key, not just the first.
pub fn expect_keys_present(object: &Value, required: &[&str]) -> Result<(), CheckFailure> {
    let Some(map) = object.as_object() else {
        return Err(CheckFailure::new(
            CheckKind::KeysPresent,
            "value is not a JSON object",
            Some(Value::from("object")),
            Some(Value::from(type_name(object))),
        ));
    };

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CheckFailure::new(
            CheckKind::KeysPresent,
            format!("missing required keys: {}", missing.join(", ")),
            Some(Value::from(
                required.iter().map(|k| (*k).to_string()).collect::<Vec<_>>(),
            )),
            Some(Value::from(map.keys().cloned().collect::<Vec<_>>())),
        ))
    }
}

/// Deep partial-object comparison restricted to keys present in `expected`.
///
/// Nested objects are compared recursively; arrays element-wise, and only
/// when `expected` itself specifies an array. Extra keys in `actual` are
/// ignored. The failure message carries the path of the first mismatch.
///
/// # Errors
///
/// Returns a [`CheckFailure`] with the mismatch path and both values.
pub fn expect_partial_match(actual: &Value, expected: &Value) -> Result<(), CheckFailure> {
    match_at("", actual, expected)
}

fn match_at(path: &str, actual: &Value, expected: &Value) -> Result<(), CheckFailure> {
    match expected {
        Value::Object(expected_map) => {
            let Some(actual_map) = actual.as_object() else {
                return Err(mismatch(path, "expected an object", expected, actual));
            };
            for (key, expected_child) in expected_map {
                let child_path = format!("{path}/{key}");
                match actual_map.get(key) {
                    Some(actual_child) => match_at(&child_path, actual_child, expected_child)?,
                    None => {
                        return Err(mismatch(
                            &child_path,
                            "key absent",
                            expected_child,
                            &Value::Null,
                        ));
                    }
                }
            }
            Ok(())
        }
        Value::Array(expected_items) => {
            let Some(actual_items) = actual.as_array() else {
                return Err(mismatch(path, "expected an array", expected, actual));
            };
            if actual_items.len() != expected_items.len() {
                return Err(mismatch(
                    path,
                    &format!(
                        "array length {} != {}",
                        actual_items.len(),
                        expected_items.len()
                    ),
                    expected,
                    actual,
                ));
            }
            for (i, (actual_item, expected_item)) in
                actual_items.iter().zip(expected_items).enumerate()
            {
                match_at(&format!("{path}/{i}"), actual_item, expected_item)?;
            }
            Ok(())
        }
        scalar => {
            if actual == scalar {
                Ok(())
            } else {
                Err(mismatch(path, "value mismatch", scalar, actual))
            }
        }
    }
}

fn mismatch(path: &str, what: &str, expected: &Value, actual: &Value) -> CheckFailure {
    let at = if path.is_empty() { "/" } else { path };
    CheckFailure::new(
        CheckKind::PartialMatch,
        format!("{what} at {at}"),
        Some(expected.clone()),
        Some(actual.clone()),
    )
}

/// Assert that `value` is an array with at least one element.
///
/// # Errors
///
/// Fails for non-arrays and for empty arrays.
pub fn expect_non_empty_collection(value: &Value) -> Result<(), CheckFailure> {
    match value.as_array() {
        Some(items) if !items.is_empty() => Ok(()),
        Some(_) => Err(CheckFailure::new(
            CheckKind::NonEmptyCollection,
            "collection is empty",
            Some(Value::from("non-empty array")),
            Some(Value::from(0)),
        )),
        None => Err(CheckFailure::new(
            CheckKind::NonEmptyCollection,
            "value is not an array",
            Some(Value::from("non-empty array")),
            Some(Value::from(type_name(value))),
        )),
    }
}

/// Record a contract ambiguity: observed behavior contradicts the documented
/// contract. Always produces a failure entry — never resolved by guessing.
#[must_use]
pub fn contract_ambiguity(note: impl Into<String>, documented: Value, observed: Value) -> CheckFailure {
    CheckFailure::new(CheckKind::ContractAmbiguity, note, Some(documented), Some(observed))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
