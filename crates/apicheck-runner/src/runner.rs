//! Suite execution
//!
//! Runs scenario groups against one shared client. Groups are isolated:
//! setup failures skip the scenarios that depend on them and nothing
//! else, and one scenario's early termination never touches its
//! siblings. Results come back in declaration order regardless of how
//! many worker threads ran the groups.

use apicheck_core::{CheckFailure, CheckKind, ScenarioResult, SuiteReport};

use crate::fixture::ScopedState;
use crate::scenario::{Group, RunEnv, ScenarioCtx, SetupScope, StepError};

/// Which scenarios to run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Exact group name; `None` selects every group.
    pub group: Option<String>,
    /// Substring match against the `group::name` label.
    pub filter: Option<String>,
}

impl Selection {
    fn group_matches(&self, group: &Group) -> bool {
        self.group.as_deref().is_none_or(|g| g == group.name)
    }

    fn scenario_matches(&self, group: &Group, name: &str) -> bool {
        self.filter
            .as_deref()
            .is_none_or(|f| format!("{}::{name}", group.name).contains(f))
    }
}

/// Run every selected scenario and collect the report.
///
/// `jobs` is the number of worker threads for group-level parallelism;
/// scenarios within a group always run sequentially in declaration order.
#[must_use]
pub fn run_suite(env: &RunEnv, groups: Vec<Group>, selection: &Selection, jobs: usize) -> SuiteReport {
    let groups: Vec<Group> = groups
        .into_iter()
        .filter(|g| selection.group_matches(g))
        .collect();

    let results = if jobs <= 1 || groups.len() <= 1 {
        groups
            .iter()
            .flat_map(|group| run_group(env, group, selection))
            .collect()
    } else {
        run_parallel(env, &groups, selection, jobs)
    };

    SuiteReport::new(results)
}

fn run_parallel(
    env: &RunEnv,
    groups: &[Group],
    selection: &Selection,
    jobs: usize,
) -> Vec<ScenarioResult> {
    let chunk_size = groups.len().div_ceil(jobs);
    let mut chunk_results: Vec<Vec<ScenarioResult>> = Vec::new();

    std::thread::scope(|scope| {
        let handles: Vec<_> = groups
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .flat_map(|group| run_group(env, group, selection))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            // A panicking scenario is a bug in the harness itself.
            match handle.join() {
                Ok(results) => chunk_results.push(results),
                Err(_) => chunk_results.push(Vec::new()),
            }
        }
    });

    chunk_results.into_iter().flatten().collect()
}

fn run_group(env: &RunEnv, group: &Group, selection: &Selection) -> Vec<ScenarioResult> {
    let selected: Vec<_> = group
        .scenarios
        .iter()
        .filter(|s| selection.scenario_matches(group, s.name))
        .collect();
    if selected.is_empty() {
        return Vec::new();
    }

    eprintln!("group {} ({} scenarios)", group.name, selected.len());

    // Group-shared setup runs once; failure skips every selected scenario.
    let shared_state = match (group.scope, group.setup) {
        (SetupScope::Group, Some(setup)) => {
            let mut state = ScopedState::new();
            match setup(env, &mut state) {
                Ok(()) => Some(state),
                Err(e) => {
                    let reason = format!("setup failed: {e}");
                    return selected
                        .iter()
                        .map(|s| ScenarioResult::skipped(group.name, s.name, reason.clone()))
                        .collect();
                }
            }
        }
        _ => None,
    };

    selected
        .iter()
        .map(|scenario| {
            let state = match (group.scope, group.setup, &shared_state) {
                (SetupScope::Group, _, Some(shared)) => shared.clone(),
                (SetupScope::PerScenario, Some(setup), _) => {
                    let mut state = ScopedState::new();
                    if let Err(e) = setup(env, &mut state) {
                        return ScenarioResult::skipped(
                            group.name,
                            scenario.name,
                            format!("setup failed: {e}"),
                        );
                    }
                    state
                }
                _ => ScopedState::new(),
            };

            let mut ctx = ScenarioCtx::new(env, state);
            let aborted = (scenario.run)(&mut ctx).err();
            let mut failures = ctx.into_failures();
            match aborted {
                Some(StepError::Transport(e)) => failures.push(CheckFailure::transport(e)),
                Some(StepError::State(e)) => failures.push(CheckFailure::new(
                    CheckKind::MissingDependency,
                    e.to_string(),
                    None,
                    None,
                )),
                None => {}
            }

            if failures.is_empty() {
                ScenarioResult::passed(group.name, scenario.name)
            } else {
                ScenarioResult::failed(group.name, scenario.name, failures)
            }
        })
        .collect()
}
