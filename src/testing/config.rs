//! Test scenario configuration types
//!
//! Scenarios are ordered lists of HTTP steps. They can be loaded from YAML
//! or taken from the built-in Idea lifecycle scenario.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::api::{HttpMethod, IdeaRequest};
use crate::common::{Error, Result};

use super::context::LAST_IDEA_ID;

/// A complete test scenario
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps, executed by ascending `order`
    pub steps: Vec<TestStep>,
}

/// A single ordered step
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TestStep {
    /// Position in the run; unique within a scenario
    pub order: u32,
    pub name: String,
    pub request: RequestSpec,
    #[serde(default)]
    pub expect: Expectation,
    /// Values to record into the scenario context after the step passes its checks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capture: Vec<Capture>,
}

/// Request template; `{lastIdeaId}` in the path or query values is
/// substituted from the scenario context
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Post-conditions checked against the response
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Expectation {
    /// Expected HTTP status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Exact `msg` of the decoded envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Substring of the raw body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_contains: Option<String>,
    /// The body must decode to a non-empty array
    #[serde(default, skip_serializing_if = "is_false")]
    pub non_empty: bool,
    /// Array length minus the previously captured idea count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_delta: Option<i64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Expectation {
    /// Whether the body has to be decoded as a list of envelopes
    pub fn needs_list(&self) -> bool {
        self.non_empty || self.count_delta.is_some()
    }
}

/// Shared-state values a step can record
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capture {
    /// `id` of the last element of the returned array
    LastIdeaId,
    /// Length of the returned array
    IdeaCount,
}

impl TestStep {
    /// Whether the response body is read as an array of envelopes
    pub fn reads_list(&self) -> bool {
        self.expect.needs_list() || !self.capture.is_empty()
    }
}

impl TestScenario {
    /// Load and validate a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: TestScenario = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize test scenario: {}", e)))
    }

    /// Reject scenarios the runner cannot order or check unambiguously
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::Config(format!(
                "Scenario '{}' has no steps",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.order) {
                return Err(Error::Config(format!(
                    "Duplicate step order {} in scenario '{}'",
                    step.order, self.name
                )));
            }
            if step.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Step {} has an empty name",
                    step.order
                )));
            }
            if step.expect.msg.is_some() && step.reads_list() {
                return Err(Error::Config(format!(
                    "Step '{}' expects both a single message and a list body",
                    step.name
                )));
            }
        }
        Ok(())
    }

    /// Steps sorted by ascending `order`
    pub fn ordered_steps(&self) -> Vec<&TestStep> {
        let mut steps: Vec<&TestStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }

    /// The create / list / edit / delete lifecycle plus its negative paths
    pub fn idea_lifecycle() -> Self {
        let last_id = format!("{{{LAST_IDEA_ID}}}");

        Self {
            name: "Idea API lifecycle".to_string(),
            description: Some(
                "Create, list, edit and delete an idea, then check the error paths".to_string(),
            ),
            steps: vec![
                TestStep {
                    order: 1,
                    name: "create_idea_with_correct_data".to_string(),
                    request: request(
                        HttpMethod::Post,
                        "/Idea/Create",
                        &[],
                        Some(IdeaRequest::new("Test Title", "Testdescription.")),
                    ),
                    expect: Expectation {
                        status: Some(200),
                        msg: Some("Successfully created!".to_string()),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
                TestStep {
                    order: 2,
                    name: "get_all_ideas_returns_non_empty_array".to_string(),
                    request: request(HttpMethod::Get, "/Idea/All", &[], None),
                    expect: Expectation {
                        status: Some(200),
                        non_empty: true,
                        ..Default::default()
                    },
                    capture: vec![Capture::LastIdeaId],
                },
                TestStep {
                    order: 3,
                    name: "edit_last_idea".to_string(),
                    request: request(
                        HttpMethod::Put,
                        "/Idea/Edit",
                        &[("ideaId", &last_id)],
                        Some(IdeaRequest::new("EditedTestTitle", "EditedTestDescription")),
                    ),
                    expect: Expectation {
                        status: Some(200),
                        msg: Some("Edited successfully".to_string()),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
                TestStep {
                    order: 4,
                    name: "delete_last_idea".to_string(),
                    request: request(
                        HttpMethod::Delete,
                        "/Idea/Delete",
                        &[("ideaId", &last_id)],
                        None,
                    ),
                    expect: Expectation {
                        status: Some(200),
                        body_contains: Some("The idea is deleted!".to_string()),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
                TestStep {
                    order: 5,
                    name: "create_idea_with_missing_required_fields".to_string(),
                    request: request(
                        HttpMethod::Post,
                        "/Idea/Create",
                        &[],
                        Some(IdeaRequest::title_only("Test Title")),
                    ),
                    expect: Expectation {
                        status: Some(400),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
                TestStep {
                    order: 6,
                    name: "edit_non_existing_idea".to_string(),
                    request: request(
                        HttpMethod::Put,
                        "/Idea/Edit",
                        &[("ideaId", "112233")],
                        Some(IdeaRequest::new("EditedTestTitle", "EditedTestDescription")),
                    ),
                    expect: Expectation {
                        status: Some(400),
                        body_contains: Some("There is no such idea!".to_string()),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
                TestStep {
                    order: 7,
                    name: "delete_non_existing_idea".to_string(),
                    request: request(
                        HttpMethod::Delete,
                        "/Idea/Delete",
                        &[("ideaId", "1122334444")],
                        None,
                    ),
                    expect: Expectation {
                        status: Some(400),
                        body_contains: Some("There is no such idea!".to_string()),
                        ..Default::default()
                    },
                    capture: Vec::new(),
                },
            ],
        }
    }
}

fn request(
    method: HttpMethod,
    path: &str,
    query: &[(&str, &str)],
    body: Option<IdeaRequest>,
) -> RequestSpec {
    RequestSpec {
        method,
        path: path.to_string(),
        query: query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: body.map(serde_json::Value::from),
    }
}
