//! Scenario results, suite report, and verdict
//!
//! Assertion failures never abort the runner; they end up here. The suite
//! verdict maps to the process exit code: 0 only when every executed
//! (non-skipped) scenario passed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::check::CheckFailure;

/// Outcome of one executed (or skipped) scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    /// Group setup failed; the scenario was never executed
    Skipped,
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
            Self::Skipped => write!(f, "SKIP"),
        }
    }
}

/// One scenario's result. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioResult {
    /// Scenario group, e.g. "mutation"
    pub group: String,
    /// Scenario name, e.g. "patch_partial_keeps_unrelated_fields"
    pub name: String,
    pub status: ScenarioStatus,
    /// Ordered assertion failures (empty for Passed/Skipped)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CheckFailure>,
    /// Why the scenario was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl ScenarioResult {
    #[must_use]
    pub fn passed(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            status: ScenarioStatus::Passed,
            failures: Vec::new(),
            skip_reason: None,
        }
    }

    #[must_use]
    pub fn failed(
        group: impl Into<String>,
        name: impl Into<String>,
        failures: Vec<CheckFailure>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            status: ScenarioStatus::Failed,
            failures,
            skip_reason: None,
        }
    }

    #[must_use]
    pub fn skipped(
        group: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            status: ScenarioStatus::Skipped,
            failures: Vec::new(),
            skip_reason: Some(reason.into()),
        }
    }

    /// `"group::name"` — the label used for filtering and display.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}::{}", self.group, self.name)
    }
}

/// Complete suite report: every scenario in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    pub results: Vec<ScenarioResult>,
}

/// Pass or fail, with the exit code the process should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

impl SuiteReport {
    #[must_use]
    pub fn new(results: Vec<ScenarioResult>) -> Self {
        Self { results }
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// Scenarios that actually ran (passed or failed).
    #[must_use]
    pub fn executed(&self) -> usize {
        self.passed() + self.failed()
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Derive the final verdict.
    ///
    /// PASS (exit 0) requires at least one executed scenario and zero
    /// failures. Any failure → exit 1. Nothing executed at all (setup
    /// cascade skipped everything, or empty selection) → exit 3, a tool
    /// error rather than a false OK.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.executed() == 0 {
            return Verdict {
                status: VerdictStatus::Fail,
                exit_code: 3,
                reason: if self.results.is_empty() {
                    "no scenarios were selected".to_string()
                } else {
                    format!("all {} scenarios were skipped", self.skipped())
                },
            };
        }

        if self.failed() > 0 {
            return Verdict {
                status: VerdictStatus::Fail,
                exit_code: 1,
                reason: format!(
                    "{} of {} executed scenarios failed ({} skipped)",
                    self.failed(),
                    self.executed(),
                    self.skipped()
                ),
            };
        }

        Verdict {
            status: VerdictStatus::Pass,
            exit_code: 0,
            reason: format!(
                "all {} executed scenarios passed ({} skipped)",
                self.executed(),
                self.skipped()
            ),
        }
    }

    /// Human-readable report: one line per scenario, failures indented,
    /// summary at the end.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            out.push_str(&format!("{} {}\n", result.status, result.label()));
            for failure in &result.failures {
                out.push_str(&format!("    {failure}\n"));
            }
            if let Some(reason) = &result.skip_reason {
                out.push_str(&format!("    reason: {reason}\n"));
            }
        }
        let verdict = self.verdict();
        out.push_str(&format!(
            "\n{}: {} ({} passed, {} failed, {} skipped)\n",
            verdict.status,
            verdict.reason,
            self.passed(),
            self.failed(),
            self.skipped()
        ));
        out
    }
}

/// JSON Schema for the report interchange format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(SuiteReport);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckFailure, CheckKind};
    use serde_json::json;

    fn failure() -> CheckFailure {
        CheckFailure::new(
            CheckKind::Status,
            "unexpected status 403",
            Some(json!(200)),
            Some(json!(403)),
        )
    }

    #[test]
    fn all_passed_is_pass_exit_zero() {
        let report = SuiteReport::new(vec![
            ScenarioResult::passed("read", "detail_has_required_keys"),
            ScenarioResult::passed("read", "filter_by_name_returns_array"),
        ]);
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, 0);
    }

    #[test]
    fn one_failure_is_fail_exit_one() {
        let report = SuiteReport::new(vec![
            ScenarioResult::passed("read", "a"),
            ScenarioResult::failed("mutation", "b", vec![failure()]),
        ]);
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 1);
        assert!(v.reason.contains("1 of 2"));
    }

    #[test]
    fn skipped_does_not_fail_the_suite() {
        let report = SuiteReport::new(vec![
            ScenarioResult::passed("read", "a"),
            ScenarioResult::skipped("mutation", "b", "setup failed: timeout"),
        ]);
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, 0);
        assert!(v.reason.contains("1 skipped"));
    }

    #[test]
    fn all_skipped_is_tool_error() {
        let report = SuiteReport::new(vec![
            ScenarioResult::skipped("read", "a", "setup failed"),
            ScenarioResult::skipped("read", "b", "setup failed"),
        ]);
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 3);
        assert!(v.reason.contains("all 2 scenarios were skipped"));
    }

    #[test]
    fn empty_report_is_tool_error() {
        let v = SuiteReport::default().verdict();
        assert_eq!(v.exit_code, 3);
        assert!(v.reason.contains("no scenarios were selected"));
    }

    #[test]
    fn counts() {
        let report = SuiteReport::new(vec![
            ScenarioResult::passed("g", "a"),
            ScenarioResult::failed("g", "b", vec![failure()]),
            ScenarioResult::skipped("g", "c", "setup failed"),
        ]);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.executed(), 2);
    }

    #[test]
    fn terminal_rendering_lists_failures_in_order() {
        let report = SuiteReport::new(vec![ScenarioResult::failed(
            "negative",
            "put_without_token_forbidden",
            vec![failure()],
        )]);
        let text = report.to_terminal();
        assert!(text.contains("FAIL negative::put_without_token_forbidden"));
        assert!(text.contains("[status] unexpected status 403"));
        assert!(text.contains("0 passed, 1 failed, 0 skipped"));
    }

    #[test]
    fn terminal_rendering_shows_skip_reason() {
        let report = SuiteReport::new(vec![ScenarioResult::skipped(
            "read",
            "detail_has_required_keys",
            "setup failed: listing empty",
        )]);
        let text = report.to_terminal();
        assert!(text.contains("SKIP read::detail_has_required_keys"));
        assert!(text.contains("reason: setup failed: listing empty"));
    }

    #[test]
    fn label_format() {
        let r = ScenarioResult::passed("read", "detail_has_required_keys");
        assert_eq!(r.label(), "read::detail_has_required_keys");
    }

    #[test]
    fn report_serialization_roundtrip() {
        let report = SuiteReport::new(vec![
            ScenarioResult::passed("g", "a"),
            ScenarioResult::failed("g", "b", vec![failure()]),
        ]);
        let json = serde_json::to_string(&report).unwrap();
        let parsed: SuiteReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
    }

    #[test]
    fn schema_export_mentions_core_types() {
        let schema = generate_schema();
        assert!(schema.contains("ScenarioResult"));
        assert!(schema.contains("CheckFailure"));
    }
}
