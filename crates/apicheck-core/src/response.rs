//! Normalized HTTP responses and status classification

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized HTTP response as seen by scenario checks.
///
/// Produced once per call by the client adapter and never mutated. Non-2xx
/// statuses are ordinary values here, not errors — negative scenarios
/// assert on them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body, `None` when empty or not JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl ApiResponse {
    /// Derived success flag: `200 <= status < 300`
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub fn class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }
}

/// Coarse status code classification used by scenario expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// 1xx, 3xx, or out of range
    Other,
}

impl StatusClass {
    #[must_use]
    pub const fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success (2xx)"),
            Self::ClientError => write!(f, "client error (4xx)"),
            Self::ServerError => write!(f, "server error (5xx)"),
            Self::Other => write!(f, "other"),
        }
    }
}
