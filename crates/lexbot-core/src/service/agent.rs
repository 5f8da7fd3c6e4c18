//! Dialogflow CX agent administration: create and list agents.

use lexbot_types::agent::{Agent, AgentParent, NewAgent};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};

use crate::client::AgentAdminClient;
use crate::retry::RetryPolicy;
use crate::service::read_with_retry;

/// Creates and lists agents under one project and location.
pub struct AgentService<C: AgentAdminClient> {
    client: C,
    parent: AgentParent,
    retry: RetryPolicy,
}

impl<C: AgentAdminClient> AgentService<C> {
    pub fn new(client: C, parent: AgentParent) -> Self {
        Self {
            client,
            parent,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn parent(&self) -> &AgentParent {
        &self.parent
    }

    /// Create an agent. Sent once; a transient failure is reported, not
    /// retried, since a lost reply may still have created it.
    pub async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, BotError> {
        agent.validate()?;
        let created = self
            .client
            .create_agent(&self.parent, agent)
            .await
            .map_err(|e| {
                BotError::from_remote(
                    "create_agent",
                    ResourceRef::new(ResourceKind::Agent, agent.display_name.as_str())
                        .in_parent(self.parent.path()),
                    e,
                )
            })?;
        tracing::info!(
            parent = %self.parent,
            agent = %created.name,
            display_name = %created.display_name,
            "agent created"
        );
        Ok(created)
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>, BotError> {
        let client = &self.client;
        let parent = &self.parent;
        read_with_retry(
            &self.retry,
            "list_agents",
            ResourceRef::new(ResourceKind::Agent, "*").in_parent(parent.path()),
            move || client.list_agents(parent),
        )
        .await
    }
}
