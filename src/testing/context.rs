//! State carried between the steps of one scenario run

use crate::common::{Error, Result};

/// Placeholder name for the id captured by a list step
pub const LAST_IDEA_ID: &str = "lastIdeaId";
pub const IDEA_COUNT: &str = "ideaCount";

/// Values written by earlier steps and read by later ones
#[derive(Debug, Default, Clone)]
pub struct ScenarioContext {
    last_idea_id: Option<String>,
    idea_count: Option<usize>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured idea id; errors if no step has captured one
    pub fn last_idea_id(&self) -> Result<&str> {
        self.last_idea_id
            .as_deref()
            .ok_or_else(|| Error::StateMissing(LAST_IDEA_ID.to_string()))
    }

    /// Record the id of the last listed idea
    ///
    /// The id is stored exactly as received. A missing or blank id is an
    /// assertion failure and leaves the previous value untouched.
    pub fn set_last_idea_id(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) if !id.trim().is_empty() => {
                self.last_idea_id = Some(id.to_string());
                Ok(())
            }
            _ => Err(Error::TestAssertion(
                "Last listed idea has no id to capture".to_string(),
            )),
        }
    }

    pub fn idea_count(&self) -> Result<usize> {
        self.idea_count
            .ok_or_else(|| Error::StateMissing(IDEA_COUNT.to_string()))
    }

    pub fn set_idea_count(&mut self, count: usize) {
        self.idea_count = Some(count);
    }

    /// Substitute `{lastIdeaId}` in a path or query value
    pub fn resolve(&self, template: &str) -> Result<String> {
        let placeholder = format!("{{{LAST_IDEA_ID}}}");
        if template.contains(&placeholder) {
            Ok(template.replace(&placeholder, self.last_idea_id()?))
        } else {
            Ok(template.to_string())
        }
    }
}
