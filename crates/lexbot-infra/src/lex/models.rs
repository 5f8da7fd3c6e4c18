//! LexModelsClient -- [`BotModelsClient`] over the Lex V2 models API.

use std::future::Future;
use std::time::Duration;

use aws_config::SdkConfig;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_lexmodelsv2::Client;
use aws_sdk_lexmodelsv2::types::{BotAliasLocaleSettings, BotVersionLocaleDetails, DataPrivacy};

use lexbot_core::client::{BotModelsClient, NewBot};
use lexbot_types::bot::{
    AliasId, BotAlias, BotId, BotSummary, BotVersion, LocaleId, LocaleScope, VersionSummary,
};
use lexbot_types::error::RemoteError;
use lexbot_types::intent::{IntentInput, IntentSummary, SlotDefinition, SlotSummary};
use lexbot_types::status::BotStatus;

use super::convert;
use super::error::{invalid_request, missing, remote_error};

/// Page size requested from listing operations.
const PAGE_SIZE: i32 = 100;

/// Management client for Lex V2 bots.
#[derive(Clone)]
pub struct LexModelsClient {
    client: Client,
}

impl LexModelsClient {
    const OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a client from the shared AWS configuration. `endpoint`
    /// overrides the regional `models-v2-lex` endpoint.
    pub fn new(sdk_config: &SdkConfig, endpoint: Option<String>) -> Self {
        let mut builder = aws_sdk_lexmodelsv2::config::Builder::from(sdk_config);
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
        }
    }
}

/// Follow `nextToken` until the listing is exhausted. `fetch` gets the
/// token of the page to read and returns its items and the next token.
async fn collect_pages<T, F, Fut>(what: &str, mut fetch: F) -> Result<Vec<T>, RemoteError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), RemoteError>>,
{
    let mut items = Vec::new();
    let mut next_token = None;

    loop {
        let (batch, token) = fetch(next_token.take()).await?;
        items.extend(batch);
        match token.filter(|t| !t.is_empty()) {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(what, count = items.len(), "listed");
    Ok(items)
}

fn convert_all<S, T>(
    items: &[S],
    convert: impl Fn(&S) -> Result<T, RemoteError>,
) -> Result<Vec<T>, RemoteError> {
    items.iter().map(convert).collect()
}

// LexModelsClient does not derive Debug (its config holds credentials).

impl BotModelsClient for LexModelsClient {
    async fn list_bots(&self) -> Result<Vec<BotSummary>, RemoteError> {
        collect_pages("bots", |token| async move {
            let page = self
                .client
                .list_bots()
                .max_results(PAGE_SIZE)
                .set_next_token(token)
                .send()
                .await
                .map_err(remote_error)?;
            let bots = convert_all(page.bot_summaries(), convert::bot_summary)?;
            Ok::<_, RemoteError>((bots, page.next_token().map(str::to_string)))
        })
        .await
    }

    async fn create_bot(&self, bot: &NewBot) -> Result<BotId, RemoteError> {
        let privacy = DataPrivacy::builder()
            .child_directed(bot.child_directed)
            .build();
        let output = self
            .client
            .create_bot()
            .bot_name(&bot.name)
            .role_arn(&bot.role_arn)
            .data_privacy(privacy)
            .idle_session_ttl_in_seconds(
                i32::try_from(bot.idle_session_ttl_secs).map_err(invalid_request)?,
            )
            .send()
            .await
            .map_err(remote_error)?;
        output
            .bot_id()
            .map(BotId::new)
            .ok_or_else(|| missing("botId"))
    }

    async fn describe_bot(&self, bot_id: &BotId) -> Result<BotSummary, RemoteError> {
        let output = self
            .client
            .describe_bot()
            .bot_id(bot_id.as_str())
            .send()
            .await
            .map_err(remote_error)?;
        convert::described_bot(&output)
    }

    async fn delete_bot(&self, bot_id: &BotId) -> Result<BotStatus, RemoteError> {
        let output = self
            .client
            .delete_bot()
            .bot_id(bot_id.as_str())
            .skip_resource_in_use_check(true)
            .send()
            .await
            .map_err(remote_error)?;
        convert::bot_status(output.bot_status().map(|s| s.as_str()))
    }

    async fn create_bot_locale(
        &self,
        scope: &LocaleScope,
        nlu_confidence_threshold: f64,
    ) -> Result<(), RemoteError> {
        self.client
            .create_bot_locale()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .nlu_intent_confidence_threshold(nlu_confidence_threshold)
            .send()
            .await
            .map_err(remote_error)?;
        Ok(())
    }

    async fn build_bot_locale(&self, scope: &LocaleScope) -> Result<(), RemoteError> {
        self.client
            .build_bot_locale()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .send()
            .await
            .map_err(remote_error)?;
        Ok(())
    }

    async fn create_bot_version(
        &self,
        bot_id: &BotId,
        locale: &LocaleId,
        description: &str,
    ) -> Result<VersionSummary, RemoteError> {
        let source = BotVersionLocaleDetails::builder()
            .source_bot_version(BotVersion::DRAFT)
            .build()
            .map_err(invalid_request)?;
        let output = self
            .client
            .create_bot_version()
            .bot_id(bot_id.as_str())
            .description(description)
            .bot_version_locale_specification(locale.as_str(), source)
            .send()
            .await
            .map_err(remote_error)?;
        convert::created_version(&output)
    }

    async fn describe_bot_version(
        &self,
        bot_id: &BotId,
        version: &BotVersion,
    ) -> Result<VersionSummary, RemoteError> {
        let output = self
            .client
            .describe_bot_version()
            .bot_id(bot_id.as_str())
            .bot_version(version.as_str())
            .send()
            .await
            .map_err(remote_error)?;
        convert::described_version(&output)
    }

    async fn list_bot_versions(&self, bot_id: &BotId) -> Result<Vec<VersionSummary>, RemoteError> {
        collect_pages("versions", |token| async move {
            let page = self
                .client
                .list_bot_versions()
                .bot_id(bot_id.as_str())
                .max_results(PAGE_SIZE)
                .set_next_token(token)
                .send()
                .await
                .map_err(remote_error)?;
            let versions = convert_all(page.bot_version_summaries(), convert::version_listing)?;
            Ok::<_, RemoteError>((versions, page.next_token().map(str::to_string)))
        })
        .await
    }

    async fn create_bot_alias(
        &self,
        bot_id: &BotId,
        alias_name: &str,
        version: &BotVersion,
        description: &str,
    ) -> Result<BotAlias, RemoteError> {
        let output = self
            .client
            .create_bot_alias()
            .bot_id(bot_id.as_str())
            .bot_alias_name(alias_name)
            .bot_version(version.as_str())
            .description(description)
            .send()
            .await
            .map_err(remote_error)?;
        convert::created_alias(&output)
    }

    async fn update_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
        alias_name: &str,
        version: &BotVersion,
        locale: &LocaleId,
    ) -> Result<BotAlias, RemoteError> {
        let enabled = BotAliasLocaleSettings::builder()
            .enabled(true)
            .build();
        let output = self
            .client
            .update_bot_alias()
            .bot_id(bot_id.as_str())
            .bot_alias_id(alias_id.as_str())
            .bot_alias_name(alias_name)
            .bot_version(version.as_str())
            .bot_alias_locale_settings(locale.as_str(), enabled)
            .send()
            .await
            .map_err(remote_error)?;
        convert::updated_alias(&output)
    }

    async fn describe_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
    ) -> Result<BotAlias, RemoteError> {
        let output = self
            .client
            .describe_bot_alias()
            .bot_id(bot_id.as_str())
            .bot_alias_id(alias_id.as_str())
            .send()
            .await
            .map_err(remote_error)?;
        convert::described_alias(&output)
    }

    async fn list_bot_aliases(&self, bot_id: &BotId) -> Result<Vec<BotAlias>, RemoteError> {
        collect_pages("aliases", |token| async move {
            let page = self
                .client
                .list_bot_aliases()
                .bot_id(bot_id.as_str())
                .max_results(PAGE_SIZE)
                .set_next_token(token)
                .send()
                .await
                .map_err(remote_error)?;
            let aliases = convert_all(page.bot_alias_summaries(), convert::alias_listing)?;
            Ok::<_, RemoteError>((aliases, page.next_token().map(str::to_string)))
        })
        .await
    }

    async fn list_intents(&self, scope: &LocaleScope) -> Result<Vec<IntentSummary>, RemoteError> {
        collect_pages("intents", |token| async move {
            let page = self
                .client
                .list_intents()
                .bot_id(scope.bot_id.as_str())
                .bot_version(scope.version.as_str())
                .locale_id(scope.locale.as_str())
                .max_results(PAGE_SIZE)
                .set_next_token(token)
                .send()
                .await
                .map_err(remote_error)?;
            let intents = convert_all(page.intent_summaries(), convert::intent_summary)?;
            Ok::<_, RemoteError>((intents, page.next_token().map(str::to_string)))
        })
        .await
    }

    async fn create_intent(
        &self,
        scope: &LocaleScope,
        intent: &IntentInput,
    ) -> Result<String, RemoteError> {
        let output = self
            .client
            .create_intent()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .intent_name(&intent.name)
            .description(&intent.description)
            .set_sample_utterances(Some(convert::sample_utterances(intent)?))
            .send()
            .await
            .map_err(remote_error)?;
        output
            .intent_id()
            .map(str::to_string)
            .ok_or_else(|| missing("intentId"))
    }

    async fn update_intent(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        intent: &IntentInput,
    ) -> Result<(), RemoteError> {
        self.client
            .update_intent()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .intent_id(intent_id)
            .intent_name(&intent.name)
            .description(&intent.description)
            .set_sample_utterances(Some(convert::sample_utterances(intent)?))
            .set_slot_priorities(convert::slot_priorities(&intent.slot_priorities)?)
            .send()
            .await
            .map_err(remote_error)?;
        Ok(())
    }

    async fn list_slots(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
    ) -> Result<Vec<SlotSummary>, RemoteError> {
        collect_pages("slots", |token| async move {
            let page = self
                .client
                .list_slots()
                .bot_id(scope.bot_id.as_str())
                .bot_version(scope.version.as_str())
                .locale_id(scope.locale.as_str())
                .intent_id(intent_id)
                .max_results(PAGE_SIZE)
                .set_next_token(token)
                .send()
                .await
                .map_err(remote_error)?;
            let slots = convert_all(page.slot_summaries(), convert::slot_summary)?;
            Ok::<_, RemoteError>((slots, page.next_token().map(str::to_string)))
        })
        .await
    }

    async fn create_slot(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        slot: &SlotDefinition,
    ) -> Result<String, RemoteError> {
        let setting = convert::elicitation_setting(&slot.value_elicitation_setting)?;
        let output = self
            .client
            .create_slot()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .intent_id(intent_id)
            .slot_name(&slot.name)
            .slot_type_id(&slot.slot_type)
            .description(&slot.description)
            .value_elicitation_setting(setting)
            .send()
            .await
            .map_err(remote_error)?;
        output
            .slot_id()
            .map(str::to_string)
            .ok_or_else(|| missing("slotId"))
    }

    async fn update_slot(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        slot_id: &str,
        slot: &SlotDefinition,
    ) -> Result<(), RemoteError> {
        let setting = convert::elicitation_setting(&slot.value_elicitation_setting)?;
        self.client
            .update_slot()
            .bot_id(scope.bot_id.as_str())
            .bot_version(scope.version.as_str())
            .locale_id(scope.locale.as_str())
            .intent_id(intent_id)
            .slot_id(slot_id)
            .slot_name(&slot.name)
            .slot_type_id(&slot.slot_type)
            .description(&slot.description)
            .value_elicitation_setting(setting)
            .send()
            .await
            .map_err(remote_error)?;
        Ok(())
    }
}
