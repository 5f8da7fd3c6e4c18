//! DialogflowSessionClient -- [`BotRuntimeClient`] over Dialogflow CX
//! `sessions:detectIntent`.
//!
//! Dialogflow has no dialog-action concept, so turns never carry one; the
//! query parameters play the role of the session state.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};

use lexbot_core::client::BotRuntimeClient;
use lexbot_types::config::DialogflowConfig;
use lexbot_types::conversation::{
    BotMessage, Interpretation, RecognizedTurn, SessionId, SessionState,
};
use lexbot_types::error::RemoteError;

use super::{api_url, base_url};
use crate::http::{build_client, error_from_response, read_json, transport_error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Conversation client bound to one Dialogflow CX agent.
pub struct DialogflowSessionClient {
    client: reqwest::Client,
    base_url: Url,
    agent_path: String,
    language_code: String,
    access_token: SecretString,
}

impl DialogflowSessionClient {
    pub fn new(
        config: &DialogflowConfig,
        access_token: SecretString,
        endpoint: Option<String>,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            base_url: base_url(endpoint, &config.location)?,
            agent_path: config.agent_path(),
            language_code: config.language_code.clone(),
            access_token,
        })
    }

    /// The session id is caller-chosen, so it is encoded as one segment.
    fn detect_intent_url(&self, session_id: &SessionId) -> Url {
        let session = format!("{session_id}:detectIntent");
        api_url(&self.base_url, &self.agent_path, &["sessions", &session])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    intent: Option<MatchedIntent>,
    #[serde(default)]
    intent_detection_confidence: Option<f64>,
    #[serde(default)]
    response_messages: Vec<ResponseMessage>,
    #[serde(default)]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedIntent {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    text: Option<TextMessage>,
}

#[derive(Debug, Deserialize)]
struct TextMessage {
    #[serde(default)]
    text: Vec<String>,
}

fn round_confidence(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn into_turn(response: DetectIntentResponse) -> RecognizedTurn {
    let result = response.query_result;

    let text = result
        .response_messages
        .into_iter()
        .filter_map(|m| m.text)
        .flat_map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ");

    RecognizedTurn {
        interpretations: result
            .intent
            .map(|intent| Interpretation {
                intent_name: Some(intent.display_name),
                confidence: result.intent_detection_confidence.map(round_confidence),
            })
            .into_iter()
            .collect(),
        dialog_action: None,
        messages: if text.is_empty() {
            Vec::new()
        } else {
            vec![BotMessage {
                content: Some(text),
                content_type: None,
            }]
        },
        session_state: SessionState(result.parameters),
    }
}

impl BotRuntimeClient for DialogflowSessionClient {
    fn name(&self) -> &str {
        "dialogflow"
    }

    async fn recognize_text(
        &self,
        session_id: &SessionId,
        text: &str,
        prior_state: &SessionState,
    ) -> Result<RecognizedTurn, RemoteError> {
        let mut body = json!({
            "queryInput": {
                "text": { "text": text },
                "languageCode": self.language_code,
            }
        });
        if let Some(parameters) = prior_state.as_value() {
            body["queryParams"] = json!({ "parameters": parameters });
        }

        let url = self.detect_intent_url(session_id);
        tracing::debug!(url = %url, "dialogflow detectIntent");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let detected: DetectIntentResponse = read_json(response).await?;
        Ok(into_turn(detected))
    }
}
