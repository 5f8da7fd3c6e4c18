//! LexRuntimeClient -- [`BotRuntimeClient`] over the Lex V2 runtime API.

use std::time::Duration;

use aws_config::SdkConfig;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_lexruntimev2::Client;

use lexbot_core::client::BotRuntimeClient;
use lexbot_types::bot::{AliasId, BotId, LocaleId};
use lexbot_types::conversation::{RecognizedTurn, SessionId, SessionState};
use lexbot_types::error::RemoteError;

use super::convert;
use super::error::remote_error;

/// Conversation client bound to one bot alias and locale.
#[derive(Clone)]
pub struct LexRuntimeClient {
    client: Client,
    bot_id: BotId,
    alias_id: AliasId,
    locale: LocaleId,
}

impl LexRuntimeClient {
    const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

    /// `endpoint` overrides the regional `runtime-v2-lex` endpoint.
    pub fn new(
        sdk_config: &SdkConfig,
        endpoint: Option<String>,
        bot_id: BotId,
        alias_id: AliasId,
        locale: LocaleId,
    ) -> Self {
        let mut builder = aws_sdk_lexruntimev2::config::Builder::from(sdk_config);
        builder.set_endpoint_url(endpoint);
        let config = builder
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Self::OPERATION_TIMEOUT)
                    .build(),
            )
            .build();
        Self {
            client: Client::from_conf(config),
            bot_id,
            alias_id,
            locale,
        }
    }
}

impl BotRuntimeClient for LexRuntimeClient {
    fn name(&self) -> &str {
        "lex"
    }

    async fn recognize_text(
        &self,
        session_id: &SessionId,
        text: &str,
        prior_state: &SessionState,
    ) -> Result<RecognizedTurn, RemoteError> {
        let output = self
            .client
            .recognize_text()
            .bot_id(self.bot_id.as_str())
            .bot_alias_id(self.alias_id.as_str())
            .locale_id(self.locale.as_str())
            .session_id(session_id.as_str())
            .text(text)
            .set_session_state(convert::session_state_in(prior_state)?)
            .send()
            .await
            .map_err(remote_error)?;

        tracing::debug!(
            session_id = %session_id,
            interpretations = output.interpretations().len(),
            "lex turn recognized"
        );
        convert::recognized_turn(&output)
    }
}
