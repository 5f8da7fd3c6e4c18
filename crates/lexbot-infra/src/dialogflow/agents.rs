//! DialogflowAgentsClient -- [`AgentAdminClient`] over the Dialogflow CX
//! `projects.locations.agents` collection.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use lexbot_core::client::AgentAdminClient;
use lexbot_types::agent::{Agent, AgentParent, NewAgent};
use lexbot_types::error::RemoteError;

use super::{api_url, base_url};
use crate::http::{build_client, error_from_response, read_json, transport_error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Page size requested when listing agents.
const PAGE_SIZE: &str = "100";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAgentsResponse {
    #[serde(default)]
    agents: Vec<Agent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Agent administration client for one API location.
pub struct DialogflowAgentsClient {
    client: reqwest::Client,
    base_url: Url,
    access_token: SecretString,
}

impl DialogflowAgentsClient {
    /// `location` picks the regional host unless `endpoint` overrides it.
    pub fn new(
        location: &str,
        access_token: SecretString,
        endpoint: Option<String>,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            base_url: base_url(endpoint, location)?,
            access_token,
        })
    }

    fn agents_url(&self, parent: &AgentParent) -> Url {
        api_url(&self.base_url, &parent.path(), &["agents"])
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

impl AgentAdminClient for DialogflowAgentsClient {
    async fn create_agent(
        &self,
        parent: &AgentParent,
        agent: &NewAgent,
    ) -> Result<Agent, RemoteError> {
        let url = self.agents_url(parent);
        tracing::debug!(url = %url, display_name = %agent.display_name, "dialogflow create agent");
        let response = self.send(self.client.post(url).json(agent)).await?;
        read_json(response).await
    }

    async fn list_agents(&self, parent: &AgentParent) -> Result<Vec<Agent>, RemoteError> {
        let url = self.agents_url(parent);
        let mut agents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(url.clone()).query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: ListAgentsResponse = read_json(self.send(request).await?).await?;
            agents.extend(page.agents);

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!(parent = %parent, count = agents.len(), "listed agents");
        Ok(agents)
    }
}
