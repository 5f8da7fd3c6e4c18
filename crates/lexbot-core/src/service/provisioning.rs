//! Bot lifecycle: create, look up, delete, list.

use lexbot_types::bot::{
    AliasId, BotId, BotSummary, BotTarget, BotVersion, CreateBotRequest, LocaleId, LocaleScope,
};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};
use lexbot_types::status::BotStatus;

use crate::build::BotStatusProbe;
use crate::client::{BotModelsClient, NewBot};
use crate::poll::{PollPolicy, wait_until_stable};
use crate::publish::{AliasProbe, VersionProbe};
use crate::retry::RetryPolicy;
use crate::service::read_with_retry;

/// A freshly provisioned bot, ready to receive intents.
#[derive(Debug, Clone)]
pub struct ProvisionedBot {
    pub target: BotTarget,
    /// The first version, which the alias points at.
    pub version: BotVersion,
}

/// Creates and removes bots.
pub struct ProvisioningService<C: BotModelsClient> {
    client: C,
    poll: PollPolicy,
    retry: RetryPolicy,
}

impl<C: BotModelsClient> ProvisioningService<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            poll: PollPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Create a bot with one locale, a first version and an alias on it.
    ///
    /// Each step waits for the previous one to settle:
    /// 1. create the bot
    /// 2. add the locale to the draft
    /// 3. publish version 1
    /// 4. create the alias pointing at version 1
    pub async fn create_bot(&self, request: &CreateBotRequest) -> Result<ProvisionedBot, BotError> {
        let name = request.bot_name.trim();
        if name.is_empty() {
            return Err(BotError::MalformedInput("bot name cannot be empty".to_string()));
        }
        if request.alias_name.trim().is_empty() {
            return Err(BotError::MalformedInput(
                "alias name cannot be empty".to_string(),
            ));
        }

        let bot_ref = ResourceRef::new(ResourceKind::Bot, name);
        let bot_id = self
            .client
            .create_bot(&NewBot {
                name: name.to_string(),
                role_arn: request.role_arn.clone(),
                idle_session_ttl_secs: request.idle_session_ttl_secs,
                child_directed: false,
            })
            .await
            .map_err(|e| BotError::from_remote("create_bot", bot_ref, e))?;
        tracing::info!(bot_id = %bot_id, bot_name = name, "bot created");
        wait_until_stable(
            &mut BotStatusProbe::for_bot(&self.client, &bot_id, &self.retry),
            &self.poll,
        )
        .await?;

        let scope = LocaleScope::draft(bot_id.clone(), request.locale.clone());
        self.client
            .create_bot_locale(&scope, request.nlu_confidence_threshold)
            .await
            .map_err(|e| {
                BotError::from_remote(
                    "create_bot_locale",
                    ResourceRef::new(ResourceKind::Locale, request.locale.as_str())
                        .in_parent(bot_id.as_str()),
                    e,
                )
            })?;
        tracing::info!(bot_id = %bot_id, locale = %request.locale, "locale created");
        wait_until_stable(
            &mut BotStatusProbe::for_bot(&self.client, &bot_id, &self.retry),
            &self.poll,
        )
        .await?;

        let description = format!("First version of the bot {name}.");
        let version = self
            .client
            .create_bot_version(&bot_id, &request.locale, &description)
            .await
            .map_err(|e| {
                BotError::from_remote(
                    "create_bot_version",
                    ResourceRef::new(ResourceKind::Version, BotVersion::DRAFT)
                        .in_parent(bot_id.as_str()),
                    e,
                )
            })?
            .bot_version;
        tracing::info!(bot_id = %bot_id, version = %version, "first version created");
        wait_until_stable(
            &mut VersionProbe::new(&self.client, &bot_id, &version, &self.retry),
            &self.poll,
        )
        .await?;

        let alias = self
            .client
            .create_bot_alias(
                &bot_id,
                &request.alias_name,
                &version,
                &format!("Alias of the bot {name}."),
            )
            .await
            .map_err(|e| {
                BotError::from_remote(
                    "create_bot_alias",
                    ResourceRef::new(ResourceKind::Alias, request.alias_name.as_str())
                        .in_parent(bot_id.as_str()),
                    e,
                )
            })?;
        tracing::info!(bot_id = %bot_id, alias_id = %alias.bot_alias_id, "alias created");
        wait_until_stable(
            &mut AliasProbe::new(
                &self.client,
                &bot_id,
                &alias.bot_alias_id,
                &alias.bot_alias_name,
                &self.retry,
            ),
            &self.poll,
        )
        .await?;

        Ok(ProvisionedBot {
            target: BotTarget {
                bot_id,
                bot_name: name.to_string(),
                alias_id: alias.bot_alias_id,
                alias_name: alias.bot_alias_name,
                locale: request.locale.clone(),
            },
            version,
        })
    }

    pub async fn get_bot(&self, bot_id: &BotId) -> Result<BotSummary, BotError> {
        let client = &self.client;
        read_with_retry(
            &self.retry,
            "describe_bot",
            ResourceRef::new(ResourceKind::Bot, bot_id.as_str()),
            move || client.describe_bot(bot_id),
        )
        .await
    }

    /// Resolve the names behind a bot id and alias id.
    pub async fn resolve_target(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
        locale: &LocaleId,
    ) -> Result<BotTarget, BotError> {
        let bot = self.get_bot(bot_id).await?;
        let client = &self.client;
        let alias = read_with_retry(
            &self.retry,
            "describe_bot_alias",
            ResourceRef::new(ResourceKind::Alias, alias_id.as_str()).in_parent(bot_id.as_str()),
            move || client.describe_bot_alias(bot_id, alias_id),
        )
        .await?;
        Ok(BotTarget {
            bot_id: bot.bot_id,
            bot_name: bot.bot_name,
            alias_id: alias.bot_alias_id,
            alias_name: alias.bot_alias_name,
            locale: locale.clone(),
        })
    }

    /// Delete a bot and everything it owns. Returns the status the service
    /// reports right after the call.
    pub async fn delete_bot(&self, bot_id: &BotId) -> Result<BotStatus, BotError> {
        let status = self.client.delete_bot(bot_id).await.map_err(|e| {
            BotError::from_remote(
                "delete_bot",
                ResourceRef::new(ResourceKind::Bot, bot_id.as_str()),
                e,
            )
        })?;
        tracing::info!(bot_id = %bot_id, %status, "bot deletion requested");
        Ok(status)
    }

    pub async fn list_bots(&self) -> Result<Vec<BotSummary>, BotError> {
        let client = &self.client;
        read_with_retry(
            &self.retry,
            "list_bots",
            ResourceRef::new(ResourceKind::Bot, "*"),
            move || client.list_bots(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBotService;
    use lexbot_types::error::RemoteError;
    use std::time::Duration;

    fn request() -> CreateBotRequest {
        CreateBotRequest {
            bot_name: "TestBotPrototype".to_string(),
            alias_name: "TestBotPrototypeAlias".to_string(),
            locale: LocaleId::new("pt_BR"),
            role_arn: "arn:aws:iam::123456789012:role/lex".to_string(),
            idle_session_ttl_secs: 1200,
            nlu_confidence_threshold: 0.4,
        }
    }

    fn service(fake: &FakeBotService) -> ProvisioningService<FakeBotService> {
        ProvisioningService::new(fake.clone())
            .with_poll_policy(PollPolicy::fixed(
                Duration::from_secs(1),
                Duration::from_secs(60),
            ))
            .with_retry_policy(RetryPolicy::none())
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_bot_end_to_end() {
        let fake = FakeBotService::new();
        fake.script_bot_statuses(&[BotStatus::Creating, BotStatus::Available]);
        let svc = service(&fake);

        let bot = svc.create_bot(&request()).await.unwrap();

        assert_eq!(bot.target.bot_name, "TestBotPrototype");
        assert_eq!(bot.target.alias_name, "TestBotPrototypeAlias");
        assert_eq!(bot.version, BotVersion::Numbered("1".into()));
        assert_eq!(fake.locales_of(&bot.target.bot_id), vec!["pt_BR"]);

        let target = svc
            .resolve_target(&bot.target.bot_id, &bot.target.alias_id, &bot.target.locale)
            .await
            .unwrap();
        assert_eq!(target, bot.target);
    }

    #[tokio::test]
    async fn test_create_bot_rejects_blank_name() {
        let fake = FakeBotService::new();
        let mut req = request();
        req.bot_name = "  ".to_string();
        let err = service(&fake).create_bot(&req).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedInput(_)));
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_and_delete() {
        let fake = FakeBotService::new();
        let svc = service(&fake);
        let bot = svc.create_bot(&request()).await.unwrap();

        let bots = svc.list_bots().await.unwrap();
        assert!(bots.iter().any(|b| b.bot_id == bot.target.bot_id));

        let status = svc.delete_bot(&bot.target.bot_id).await.unwrap();
        assert_eq!(status, BotStatus::Deleting);
        let err = svc.get_bot(&bot.target.bot_id).await.unwrap_err();
        assert!(matches!(err, BotError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_retry_transient_failures() {
        let fake = FakeBotService::new();
        fake.fail_next_with(RemoteError::Unavailable("throttled".into()));
        let svc = ProvisioningService::new(fake.clone());

        let bots = svc.list_bots().await.unwrap();
        assert!(bots.is_empty());
    }
}
