//! Dialogflow CX agents.
//!
//! An agent is the Dialogflow counterpart of a bot. It lives under a
//! project and location and is addressed by its full resource name,
//! `projects/{project}/locations/{location}/agents/{agent}`.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::BotError;

/// Project and location an agent lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentParent {
    pub project_id: String,
    pub location: String,
}

impl AgentParent {
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
        }
    }

    /// `projects/{project}/locations/{location}`
    pub fn path(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}

impl fmt::Display for AgentParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// An agent as returned by the create and list operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Full resource name assigned by the service.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub default_language_code: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Agent {
    /// Last segment of the resource name, the value `agent_id` takes in
    /// the `[dialogflow]` config section.
    pub fn agent_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Request to create an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub display_name: String,
    pub default_language_code: String,
    /// IANA time zone name, e.g. `America/Buenos_Aires`.
    pub time_zone: String,
}

impl NewAgent {
    /// Presence checks done before any remote call.
    pub fn validate(&self) -> Result<(), BotError> {
        for (field, value) in [
            ("display name", &self.display_name),
            ("language code", &self.default_language_code),
            ("time zone", &self.time_zone),
        ] {
            if value.trim().is_empty() {
                return Err(BotError::MalformedInput(format!(
                    "agent {field} cannot be empty"
                )));
            }
        }
        Ok(())
    }
}
