//! Test runner implementation
//!
//! Executes scenario steps in ascending order against one authenticated
//! session. A failing step is recorded and the run moves on to the next one;
//! only a failed login aborts the run.

use std::path::Path;
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::{info, warn};

use crate::api::{decode_response, decode_response_list, ApiReply, ApiRequest, Session};
use crate::common::error::excerpt;
use crate::common::{Error, Result, Settings};

use super::config::{Capture, TestScenario, TestStep};
use super::context::ScenarioContext;

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub outcomes: Vec<StepOutcome>,
    /// Requests sent through the authenticated session before it was closed
    pub requests_sent: usize,
}

impl TestResult {
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Result of a single step
#[derive(Debug)]
pub struct StepOutcome {
    pub order: u32,
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    pub elapsed: Duration,
}

/// Run a test scenario from a YAML file
pub async fn run_scenario_file(
    path: &Path,
    settings: &Settings,
    verbose: bool,
) -> Result<TestResult> {
    let scenario = TestScenario::load(path)?;
    run_scenario(&scenario, settings, verbose).await
}

/// Authenticate, run every step, and close the session
///
/// Returns `Err` only for fatal errors: an invalid scenario, or a session
/// that could not be opened. Step failures are reported in the result.
pub async fn run_scenario(
    scenario: &TestScenario,
    settings: &Settings,
    verbose: bool,
) -> Result<TestResult> {
    scenario.validate()?;

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    println!("\n{}", "Setup:".cyan());
    let mut session = match Session::open(settings).await {
        Ok(session) => session,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return Err(e);
        }
    };
    println!(
        "  {} Authenticated against {}",
        "✓".green(),
        session.base_url().dimmed()
    );

    let outcomes = run_steps(&mut session, scenario, verbose).await;
    let requests_sent = session.close();

    let result = summarize(scenario, outcomes, requests_sent);
    print_summary(&result);
    Ok(result)
}

/// Execute the steps of a scenario through an already opened session
pub async fn run_steps(
    session: &mut Session,
    scenario: &TestScenario,
    verbose: bool,
) -> Vec<StepOutcome> {
    let mut ctx = ScenarioContext::new();
    let mut outcomes = Vec::with_capacity(scenario.steps.len());

    println!("\n{}", "Steps:".cyan());

    for step in scenario.ordered_steps() {
        let started = Instant::now();
        let result = execute_step(session, step, &mut ctx, verbose).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(()) => {
                info!(step = %step.name, order = step.order, "Step passed");
                println!(
                    "  {} Step {}: {}",
                    "✓".green(),
                    step.order,
                    step.name.dimmed()
                );
                StepOutcome {
                    order: step.order,
                    name: step.name.clone(),
                    passed: true,
                    error: None,
                    elapsed,
                }
            }
            Err(e) => {
                warn!(step = %step.name, order = step.order, error = %e, "Step failed");
                println!("  {} Step {}: {} - {}", "✗".red(), step.order, step.name, e);
                StepOutcome {
                    order: step.order,
                    name: step.name.clone(),
                    passed: false,
                    error: Some(e.to_string()),
                    elapsed,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Execute a single step: request, status check, body checks, captures
async fn execute_step(
    session: &mut Session,
    step: &TestStep,
    ctx: &mut ScenarioContext,
    verbose: bool,
) -> Result<()> {
    let request = build_request(step, ctx)?;

    if verbose {
        let query: Vec<String> = request
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!(
            "    {} {} {}",
            request.method.to_string().dimmed(),
            request.path.dimmed(),
            query.join("&").dimmed()
        );
    }

    let reply = session.execute(&request).await?;

    if verbose {
        println!("    {} {}", reply.status, excerpt(&reply.body).dimmed());
    }

    check_reply(step, &reply, ctx)
}

/// Resolve the request template against the scenario context
fn build_request(step: &TestStep, ctx: &ScenarioContext) -> Result<ApiRequest> {
    let query = step
        .request
        .query
        .iter()
        .map(|(key, value)| Ok((key.clone(), ctx.resolve(value)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ApiRequest {
        method: step.request.method,
        path: ctx.resolve(&step.request.path)?,
        query,
        body: step.request.body.clone(),
    })
}

/// Check a reply against the step's expectations and record captures
fn check_reply(step: &TestStep, reply: &ApiReply, ctx: &mut ScenarioContext) -> Result<()> {
    let expect = &step.expect;

    if let Some(expected) = expect.status {
        if reply.status != expected {
            return Err(Error::TestAssertion(format!(
                "Expected status {}, got {} (body: {:?})",
                expected,
                reply.status,
                excerpt(&reply.body)
            )));
        }
    }

    if let Some(needle) = &expect.body_contains {
        if !reply.body.contains(needle.as_str()) {
            return Err(Error::TestAssertion(format!(
                "Expected body to contain '{}', got {:?}",
                needle,
                excerpt(&reply.body)
            )));
        }
    }

    if let Some(expected_msg) = &expect.msg {
        let response = decode_response(&reply.body)?;
        if &response.msg != expected_msg {
            return Err(Error::TestAssertion(format!(
                "Expected msg '{}', got '{}'",
                expected_msg, response.msg
            )));
        }
    }

    if step.reads_list() {
        let items = decode_response_list(&reply.body)?;

        if expect.non_empty && items.is_empty() {
            return Err(Error::TestAssertion(
                "Expected a non-empty array, got an empty one".to_string(),
            ));
        }

        if let Some(delta) = expect.count_delta {
            let before = ctx.idea_count()?;
            let actual = items.len() as i64 - before as i64;
            if actual != delta {
                return Err(Error::TestAssertion(format!(
                    "Expected idea count to change by {}, changed by {} ({} -> {})",
                    delta,
                    actual,
                    before,
                    items.len()
                )));
            }
        }

        for capture in &step.capture {
            match capture {
                Capture::LastIdeaId => {
                    let last = items.last().and_then(|item| item.id.as_deref());
                    ctx.set_last_idea_id(last)?;
                }
                Capture::IdeaCount => ctx.set_idea_count(items.len()),
            }
        }
    }

    Ok(())
}

fn summarize(
    scenario: &TestScenario,
    outcomes: Vec<StepOutcome>,
    requests_sent: usize,
) -> TestResult {
    TestResult {
        name: scenario.name.clone(),
        passed: outcomes.iter().all(|o| o.passed),
        steps_run: outcomes.len(),
        steps_total: scenario.steps.len(),
        outcomes,
        requests_sent,
    }
}

fn print_summary(result: &TestResult) {
    if result.passed {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Test Passed".green().bold()
        );
    } else {
        let failed = result.failures().count();
        println!(
            "\n{} {} ({} of {} steps failed)\n",
            "✗".red().bold(),
            "Test Failed".red().bold(),
            failed,
            result.steps_total
        );
    }
}
