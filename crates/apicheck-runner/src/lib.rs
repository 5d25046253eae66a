//! apicheck-runner: Scenario execution against a live booking service
//!
//! Wraps the HTTP transport, scoped fixture state, and the group state
//! machine around the scenario suites: booking read/mutation paths plus
//! the declarative negative-case catalog.

pub mod booking;
pub mod catalog;
pub mod fixture;
pub mod http;
pub mod runner;
pub mod scenario;

pub use fixture::{ScopedState, StateError};
pub use http::{ApiClient, Call, HttpTransport, Method, RawReply, Transport, TransportError};
pub use runner::{Selection, run_suite};
pub use scenario::{Group, RunEnv, Scenario, ScenarioCtx, SetupFailure, SetupScope, StepError};

use std::time::Duration;

use apicheck_core::Config;

/// Every scenario group the harness knows about, in declaration order.
#[must_use]
pub fn full_suite() -> Vec<Group> {
    vec![
        booking::read_group(),
        booking::mutation_group(),
        catalog::negative_group(),
    ]
}

/// Build the run environment from configuration using the real transport.
///
/// # Errors
///
/// Returns error when the HTTP client cannot be constructed.
pub fn env_from_config(config: &Config) -> Result<RunEnv, TransportError> {
    let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
    Ok(RunEnv {
        client: ApiClient::new(config.base_url.clone(), Box::new(transport)),
        username: config.username.clone(),
        password: config.password.clone(),
    })
}
