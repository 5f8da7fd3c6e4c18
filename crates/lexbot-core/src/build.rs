//! Draft locale builds.
//!
//! A build is asynchronous on the service side: [`trigger_build`] returns as
//! soon as the service accepted the request, and [`wait_for_build`] polls the
//! bot status until it settles. Each status query is retried on transient
//! failures, so one dropped connection does not end a long wait.

use lexbot_types::bot::{BotId, LocaleId, LocaleScope};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};
use lexbot_types::status::BotStatus;

use crate::client::BotModelsClient;
use crate::poll::{PollPolicy, StableStatus, StatusProbe, wait_until_stable};
use crate::retry::RetryPolicy;
use crate::service::read_with_retry;

/// Start building the draft of `locale`. Does not wait.
pub async fn trigger_build<C: BotModelsClient>(
    client: &C,
    bot_id: &BotId,
    locale: &LocaleId,
) -> Result<(), BotError> {
    let scope = LocaleScope::draft(bot_id.clone(), locale.clone());
    client.build_bot_locale(&scope).await.map_err(|e| {
        BotError::from_remote(
            "build_bot_locale",
            ResourceRef::new(ResourceKind::Locale, locale.as_str()).in_parent(bot_id.as_str()),
            e,
        )
    })?;
    tracing::info!(bot_id = %bot_id, locale = %locale, "build triggered");
    Ok(())
}

/// Poll the bot until the build settles. `Failed` becomes
/// [`BotError::BuildFailed`].
pub async fn wait_for_build<C: BotModelsClient>(
    client: &C,
    bot_id: &BotId,
    locale: &LocaleId,
    policy: &PollPolicy,
    retry: &RetryPolicy,
) -> Result<StableStatus, BotError> {
    let mut probe = BotStatusProbe::for_build(client, bot_id, locale, retry);
    wait_until_stable(&mut probe, policy).await
}

/// Reads the bot's status through `DescribeBot`.
pub struct BotStatusProbe<'a, C: BotModelsClient> {
    client: &'a C,
    bot_id: &'a BotId,
    locale: Option<&'a LocaleId>,
    retry: &'a RetryPolicy,
}

impl<'a, C: BotModelsClient> BotStatusProbe<'a, C> {
    /// Probe for a locale build; `Failed` reports the locale.
    pub fn for_build(
        client: &'a C,
        bot_id: &'a BotId,
        locale: &'a LocaleId,
        retry: &'a RetryPolicy,
    ) -> Self {
        Self {
            client,
            bot_id,
            locale: Some(locale),
            retry,
        }
    }

    /// Probe for bot-level transitions (creation, locale creation).
    pub fn for_bot(client: &'a C, bot_id: &'a BotId, retry: &'a RetryPolicy) -> Self {
        Self {
            client,
            bot_id,
            locale: None,
            retry,
        }
    }
}

impl<C: BotModelsClient> StatusProbe for BotStatusProbe<'_, C> {
    fn label(&self) -> String {
        match self.locale {
            Some(locale) => format!("build of {}/{}", self.bot_id, locale),
            None => format!("bot {}", self.bot_id),
        }
    }

    async fn query(&mut self) -> Result<BotStatus, BotError> {
        let client = self.client;
        let bot_id = self.bot_id;
        let bot = read_with_retry(
            self.retry,
            "describe_bot",
            ResourceRef::new(ResourceKind::Bot, bot_id.as_str()),
            move || client.describe_bot(bot_id),
        )
        .await?;
        Ok(bot.bot_status)
    }

    fn failure(&self) -> BotError {
        BotError::BuildFailed {
            bot_id: self.bot_id.to_string(),
            locale: self
                .locale
                .map(|l| l.to_string())
                .unwrap_or_else(|| "*".to_string()),
        }
    }
}
