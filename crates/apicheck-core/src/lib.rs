//! apicheck-core: Core types for API contract checking
//!
//! This crate provides the configuration, normalized-response model,
//! structural assertion library, and scenario reporting used by the
//! scenario runner.

pub mod check;
pub mod config;
pub mod report;
pub mod response;

pub use check::{
    CheckFailure, CheckKind, StatusExpectation, contract_ambiguity, expect_keys_present,
    expect_non_empty_collection, expect_partial_match, expect_status,
};
pub use config::{Config, ConfigError, Validation, ValidationStatus};
pub use report::{ScenarioResult, ScenarioStatus, SuiteReport, Verdict, VerdictStatus};
pub use response::{ApiResponse, StatusClass};
