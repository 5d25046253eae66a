//! Harness configuration
//!
//! Loaded once before any scenario group runs and never mutated afterwards.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide configuration: target service, credentials, timeout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Base URL of the booking service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Username for `POST /auth`
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for `POST /auth`
    #[serde(default = "default_password")]
    pub password: String,

    /// Per-call timeout in seconds; expiry surfaces as a transport error
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory for persisted reports (default: ~/.apicheck/reports)
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://restful-booker.herokuapp.com".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "password123".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
            report_dir: None,
        }
    }
}

impl Config {
    /// Load config from file (TOML, or JSON for a `.json` extension).
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apicheck.toml), falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error only when a config file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".apicheck.toml", ".apicheck.json", "apicheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Example config file content.
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apicheck configuration

# Booking service under test
base_url = "https://restful-booker.herokuapp.com"

# Credentials for POST /auth (the demo service's documented pair)
username = "admin"
password = "password123"

# Per-call timeout in seconds
timeout_secs = 10

# Directory for persisted reports (default: ~/.apicheck/reports)
# report_dir = ".apicheck/reports"
"#
    }

    /// Pre-flight validation: URL scheme and placeholder credentials.
    #[must_use]
    pub fn validate(&self) -> Vec<Validation> {
        let mut checks = Vec::new();

        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            checks.push(Validation {
                check: "base_url".into(),
                status: ValidationStatus::Ok,
                message: format!("base_url: {}", self.base_url),
            });
        } else {
            checks.push(Validation {
                check: "base_url".into(),
                status: ValidationStatus::Error,
                message: format!(
                    "base_url: {} (missing http:// or https:// prefix)",
                    self.base_url
                ),
            });
        }

        for (field, value) in [("username", &self.username), ("password", &self.password)] {
            if looks_like_placeholder(value) {
                checks.push(Validation {
                    check: field.into(),
                    status: ValidationStatus::Warning,
                    message: format!("{field} looks like a placeholder: {value}"),
                });
            }
        }

        if self.timeout_secs == 0 {
            checks.push(Validation {
                check: "timeout_secs".into(),
                status: ValidationStatus::Error,
                message: "timeout_secs must be greater than 0".into(),
            });
        }

        checks
    }
}

/// Patterns that suggest a placeholder rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "TODO",
    "CHANGEME",
    "changeme",
    "placeholder",
    "xxx",
    "XXX",
    "replace-me",
    "REPLACE_ME",
];

fn looks_like_placeholder(value: &str) -> bool {
    PLACEHOLDER_PATTERNS.iter().any(|p| value.contains(p))
}

/// A pre-flight validation result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
