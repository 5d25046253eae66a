//! Scenarios, groups, and the execution context
//!
//! A scenario is a named closure over a [`ScenarioCtx`]. Assertion
//! mismatches are recorded on the context and never abort the scenario;
//! only a [`StepError`] (transport failure, or a fixture value a later
//! step depends on) terminates it early — and terminates only that
//! scenario.

use serde_json::Value;

use apicheck_core::{
    ApiResponse, CheckFailure, CheckKind, StatusExpectation, expect_keys_present,
    expect_non_empty_collection, expect_partial_match, expect_status,
};

use crate::fixture::{ScopedState, StateError};
use crate::http::{ApiClient, Call, TransportError};

/// Shared, read-only run environment: the client plus the credentials
/// setup steps need for `POST /auth`.
pub struct RunEnv {
    pub client: ApiClient,
    pub username: String,
    pub password: String,
}

/// Error that terminates one scenario (or one setup step) early.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Setup could not produce its fixture values; every scenario that
/// depends on it is skipped, not failed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SetupFailure(pub String);

impl From<StepError> for SetupFailure {
    fn from(err: StepError) -> Self {
        Self(err.to_string())
    }
}

impl From<TransportError> for SetupFailure {
    fn from(err: TransportError) -> Self {
        Self(err.to_string())
    }
}

impl From<StateError> for SetupFailure {
    fn from(err: StateError) -> Self {
        Self(err.to_string())
    }
}

/// Per-scenario execution context: the environment, this scenario's
/// fixture state, and the failures accumulated so far.
pub struct ScenarioCtx<'a> {
    pub env: &'a RunEnv,
    pub state: ScopedState,
    failures: Vec<CheckFailure>,
}

impl<'a> ScenarioCtx<'a> {
    #[must_use]
    pub fn new(env: &'a RunEnv, state: ScopedState) -> Self {
        Self {
            env,
            state,
            failures: Vec::new(),
        }
    }

    /// Perform one call through the shared client.
    ///
    /// # Errors
    ///
    /// Transport failures terminate the scenario.
    pub fn call(&self, call: &Call) -> Result<ApiResponse, StepError> {
        Ok(self.env.client.call(call)?)
    }

    /// Record an assertion outcome; a failure is accumulated, never thrown.
    pub fn check(&mut self, outcome: Result<(), CheckFailure>) {
        if let Err(failure) = outcome {
            self.failures.push(failure);
        }
    }

    /// Record an already-built failure entry (contract ambiguities).
    pub fn record(&mut self, failure: CheckFailure) {
        self.failures.push(failure);
    }

    pub fn check_status(
        &mut self,
        response: &ApiResponse,
        expected: StatusExpectation,
    ) {
        self.check(expect_status(response, expected));
    }

    pub fn check_keys(&mut self, object: &Value, required: &[&str]) {
        self.check(expect_keys_present(object, required));
    }

    pub fn check_partial(&mut self, actual: &Value, expected: &Value) {
        self.check(expect_partial_match(actual, expected));
    }

    pub fn check_non_empty(&mut self, value: &Value) {
        self.check(expect_non_empty_collection(value));
    }

    /// Body of a response, or a recorded failure when absent.
    ///
    /// Returns `None` (after recording) rather than erroring: a missing
    /// body is an assertion mismatch, not a transport problem.
    pub fn require_body<'r>(&mut self, response: &'r ApiResponse) -> Option<&'r Value> {
        if response.body.is_none() {
            self.failures.push(CheckFailure::new(
                CheckKind::KeysPresent,
                "response has no JSON body",
                Some(Value::from("JSON body")),
                None,
            ));
        }
        response.body.as_ref()
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<CheckFailure> {
        self.failures
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Setup step: populates fixture state before scenarios run.
pub type SetupFn = fn(&RunEnv, &mut ScopedState) -> Result<(), SetupFailure>;

/// How a group's setup relates to its scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupScope {
    /// Setup runs once; every scenario gets a clone of its state.
    Group,
    /// Setup re-runs for each scenario, giving each a fresh fixture.
    PerScenario,
}

type ScenarioFn = Box<dyn Fn(&mut ScenarioCtx) -> Result<(), StepError> + Send + Sync>;

/// A named check against the remote contract.
pub struct Scenario {
    pub name: &'static str,
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn new(
        name: &'static str,
        run: impl Fn(&mut ScenarioCtx) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }
}

/// An ordered set of scenarios sharing one setup policy.
pub struct Group {
    pub name: &'static str,
    pub scope: SetupScope,
    pub setup: Option<SetupFn>,
    pub scenarios: Vec<Scenario>,
}

impl Group {
    #[must_use]
    pub fn new(name: &'static str, scope: SetupScope) -> Self {
        Self {
            name,
            scope,
            setup: None,
            scenarios: Vec::new(),
        }
    }

    #[must_use]
    pub fn setup(mut self, setup: SetupFn) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn scenario(
        mut self,
        name: &'static str,
        run: impl Fn(&mut ScenarioCtx) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Self {
        self.scenarios.push(Scenario::new(name, run));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RawReply, Transport};
    use serde_json::json;
    use std::collections::HashMap;

    struct Canned(u16, &'static str);

    impl Transport for Canned {
        fn send(&self, _base: &str, _call: &Call) -> Result<RawReply, TransportError> {
            Ok(RawReply {
                status: self.0,
                headers: HashMap::new(),
                body_text: self.1.to_string(),
                elapsed_ms: 0,
            })
        }
    }

    fn env(status: u16, body: &'static str) -> RunEnv {
        RunEnv {
            client: ApiClient::new("http://localhost:3001", Box::new(Canned(status, body))),
            username: "admin".into(),
            password: "password123".into(),
        }
    }

    #[test]
    fn failures_accumulate_without_aborting() {
        let env = env(500, "{}");
        let mut ctx = ScenarioCtx::new(&env, ScopedState::new());
        let resp = ctx.call(&Call::get("/booking/1")).unwrap();
        ctx.check_status(&resp, StatusExpectation::Exact(200));
        ctx.check_keys(resp.body.as_ref().unwrap(), &["firstname", "lastname"]);
        assert_eq!(ctx.failure_count(), 2);
        let failures = ctx.into_failures();
        assert_eq!(failures[0].check, CheckKind::Status);
        assert_eq!(failures[1].check, CheckKind::KeysPresent);
    }

    #[test]
    fn passing_checks_record_nothing() {
        let env = env(200, r#"{"firstname": "Jim"}"#);
        let mut ctx = ScenarioCtx::new(&env, ScopedState::new());
        let resp = ctx.call(&Call::get("/booking/1")).unwrap();
        ctx.check_status(&resp, StatusExpectation::Exact(200));
        ctx.check_partial(resp.body.as_ref().unwrap(), &json!({"firstname": "Jim"}));
        assert_eq!(ctx.failure_count(), 0);
    }

    #[test]
    fn require_body_records_when_absent() {
        let env = env(201, "");
        let mut ctx = ScenarioCtx::new(&env, ScopedState::new());
        let resp = ctx.call(&Call::delete("/booking/1")).unwrap();
        assert!(ctx.require_body(&resp).is_none());
        assert_eq!(ctx.failure_count(), 1);
    }

    #[test]
    fn state_error_converts_to_step_error() {
        let env = env(200, "{}");
        let ctx = ScenarioCtx::new(&env, ScopedState::new());
        let err: StepError = ctx.state.get_i64("booking_id").unwrap_err().into();
        assert!(matches!(err, StepError::State(StateError::NotFound(_))));
    }

    #[test]
    fn group_builder_collects_scenarios() {
        let group = Group::new("read", SetupScope::Group)
            .scenario("a", |_| Ok(()))
            .scenario("b", |_| Ok(()));
        assert_eq!(group.name, "read");
        assert_eq!(group.scenarios.len(), 2);
        assert!(group.setup.is_none());
    }
}
