//! Publishing the draft as a numbered version and repointing the alias.
//!
//! Neither step is durable when its call returns. [`VersionPublisher`] exposes
//! the wait for each as a separate `.await` so callers decide when to block.
//! Status reads during a wait are retried on transient failures; the
//! publish and repoint calls themselves are sent once.

use lexbot_types::bot::{AliasId, BotAlias, BotId, BotTarget, BotVersion};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};
use lexbot_types::status::BotStatus;

use crate::client::BotModelsClient;
use crate::poll::{PollPolicy, StableStatus, StatusProbe, wait_until_stable};
use crate::retry::RetryPolicy;
use crate::service::read_with_retry;

/// Publishes versions of one bot and moves its alias between them.
pub struct VersionPublisher<'a, C: BotModelsClient> {
    client: &'a C,
    target: &'a BotTarget,
    retry: RetryPolicy,
}

impl<'a, C: BotModelsClient> VersionPublisher<'a, C> {
    pub fn new(client: &'a C, target: &'a BotTarget) -> Self {
        Self {
            client,
            target,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn version_ref(&self, version: &str) -> ResourceRef {
        ResourceRef::new(ResourceKind::Version, version).in_parent(self.target.bot_id.as_str())
    }

    fn alias_ref(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Alias, self.target.alias_name.as_str())
            .in_parent(self.target.bot_id.as_str())
    }

    /// Snapshot the draft of the target locale into a new version.
    pub async fn publish(&self, description: &str) -> Result<BotVersion, BotError> {
        let summary = self
            .client
            .create_bot_version(&self.target.bot_id, &self.target.locale, description)
            .await
            .map_err(|e| {
                BotError::from_remote("create_bot_version", self.version_ref(BotVersion::DRAFT), e)
            })?;
        tracing::info!(
            bot_id = %self.target.bot_id,
            version = %summary.bot_version,
            status = %summary.bot_status,
            "published new bot version"
        );
        Ok(summary.bot_version)
    }

    /// Poll the version until it leaves `Versioning`.
    pub async fn wait_for_version(
        &self,
        version: &BotVersion,
        policy: &PollPolicy,
    ) -> Result<StableStatus, BotError> {
        let mut probe = VersionProbe::new(self.client, &self.target.bot_id, version, &self.retry);
        wait_until_stable(&mut probe, policy).await
    }

    /// Point the alias at `version` with the target locale enabled.
    ///
    /// The draft is never servable through an alias and is refused.
    pub async fn repoint(&self, version: &BotVersion) -> Result<BotAlias, BotError> {
        if version.is_draft() {
            return Err(BotError::MalformedInput(
                "an alias cannot point at the DRAFT version".to_string(),
            ));
        }
        let alias = self
            .client
            .update_bot_alias(
                &self.target.bot_id,
                &self.target.alias_id,
                &self.target.alias_name,
                version,
                &self.target.locale,
            )
            .await
            .map_err(|e| BotError::from_remote("update_bot_alias", self.alias_ref(), e))?;
        tracing::info!(
            bot_id = %self.target.bot_id,
            alias = %self.target.alias_name,
            version = %version,
            "alias repointed"
        );
        Ok(alias)
    }

    /// Poll the alias until its update settles.
    pub async fn wait_for_alias(&self, policy: &PollPolicy) -> Result<StableStatus, BotError> {
        let mut probe = AliasProbe::new(
            self.client,
            &self.target.bot_id,
            &self.target.alias_id,
            &self.target.alias_name,
            &self.retry,
        );
        wait_until_stable(&mut probe, policy).await
    }

    /// Read the alias back from the service.
    pub async fn describe_alias(&self) -> Result<BotAlias, BotError> {
        let client = self.client;
        let bot_id = &self.target.bot_id;
        let alias_id = &self.target.alias_id;
        read_with_retry(&self.retry, "describe_bot_alias", self.alias_ref(), move || {
            client.describe_bot_alias(bot_id, alias_id)
        })
        .await
    }

    /// Version the alias currently points at.
    pub async fn alias_version(&self) -> Result<Option<BotVersion>, BotError> {
        Ok(self.describe_alias().await?.bot_version)
    }
}

/// Reads a version's status through `DescribeBotVersion`.
pub struct VersionProbe<'a, C: BotModelsClient> {
    client: &'a C,
    bot_id: &'a BotId,
    version: &'a BotVersion,
    retry: &'a RetryPolicy,
}

impl<'a, C: BotModelsClient> VersionProbe<'a, C> {
    pub fn new(
        client: &'a C,
        bot_id: &'a BotId,
        version: &'a BotVersion,
        retry: &'a RetryPolicy,
    ) -> Self {
        Self {
            client,
            bot_id,
            version,
            retry,
        }
    }

    fn resource(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Version, self.version.as_str())
            .in_parent(self.bot_id.as_str())
    }
}

impl<C: BotModelsClient> StatusProbe for VersionProbe<'_, C> {
    fn label(&self) -> String {
        format!("version {} of {}", self.version, self.bot_id)
    }

    async fn query(&mut self) -> Result<BotStatus, BotError> {
        let client = self.client;
        let bot_id = self.bot_id;
        let version = self.version;
        let summary = read_with_retry(self.retry, "describe_bot_version", self.resource(), move || {
            client.describe_bot_version(bot_id, version)
        })
        .await?;
        Ok(summary.bot_status)
    }

    fn failure(&self) -> BotError {
        BotError::RemoteRejected {
            operation: "create_bot_version",
            resource: self.resource(),
            message: "version reached Failed status".to_string(),
        }
    }
}

/// Reads an alias's status through `DescribeBotAlias`.
pub struct AliasProbe<'a, C: BotModelsClient> {
    client: &'a C,
    bot_id: &'a BotId,
    alias_id: &'a AliasId,
    alias_name: &'a str,
    retry: &'a RetryPolicy,
}

impl<'a, C: BotModelsClient> AliasProbe<'a, C> {
    pub fn new(
        client: &'a C,
        bot_id: &'a BotId,
        alias_id: &'a AliasId,
        alias_name: &'a str,
        retry: &'a RetryPolicy,
    ) -> Self {
        Self {
            client,
            bot_id,
            alias_id,
            alias_name,
            retry,
        }
    }

    fn resource(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Alias, self.alias_name).in_parent(self.bot_id.as_str())
    }
}

impl<C: BotModelsClient> StatusProbe for AliasProbe<'_, C> {
    fn label(&self) -> String {
        format!("alias {} of {}", self.alias_name, self.bot_id)
    }

    async fn query(&mut self) -> Result<BotStatus, BotError> {
        let client = self.client;
        let bot_id = self.bot_id;
        let alias_id = self.alias_id;
        let alias = read_with_retry(self.retry, "describe_bot_alias", self.resource(), move || {
            client.describe_bot_alias(bot_id, alias_id)
        })
        .await?;
        // Aliases that never report a status are usable.
        Ok(alias.bot_alias_status.unwrap_or(BotStatus::Available))
    }

    fn failure(&self) -> BotError {
        BotError::RemoteRejected {
            operation: "update_bot_alias",
            resource: self.resource(),
            message: "alias reached Failed status".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBotService, target};
    use lexbot_types::error::RemoteError;
    use std::time::Duration;

    fn policy() -> PollPolicy {
        PollPolicy::fixed(Duration::from_secs(2), Duration::from_secs(120))
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_repoint_then_alias_reads_new_version() {
        let fake = FakeBotService::new();
        let target = target();
        fake.seed_alias(&target, BotVersion::Numbered("1".into()));
        let publisher = VersionPublisher::new(&fake, &target);

        let version = publisher.publish("release").await.unwrap();
        publisher.wait_for_version(&version, &policy()).await.unwrap();
        publisher.repoint(&version).await.unwrap();
        publisher.wait_for_alias(&policy()).await.unwrap();

        assert_eq!(version, BotVersion::Numbered("2".into()));
        assert_eq!(publisher.alias_version().await.unwrap(), Some(version));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_version_polls_through_versioning() {
        let fake = FakeBotService::new();
        let target = target();
        fake.script_version_statuses(&[BotStatus::Versioning, BotStatus::Available]);
        let publisher = VersionPublisher::new(&fake, &target);

        let version = publisher.publish("release").await.unwrap();
        let stable = publisher.wait_for_version(&version, &policy()).await.unwrap();
        assert_eq!(stable.waits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_version_read_is_retried() {
        let fake = FakeBotService::new();
        let target = target();
        fake.script_version_statuses(&[BotStatus::Versioning, BotStatus::Available]);
        let publisher = VersionPublisher::new(&fake, &target);

        let version = publisher.publish("release").await.unwrap();
        fake.fail_next_with(RemoteError::Unavailable("throttled (HTTP 429)".into()));
        let stable = publisher.wait_for_version(&version, &policy()).await.unwrap();

        assert_eq!(stable.status, BotStatus::Available);
        assert_eq!(stable.queries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alias_wait_survives_dropped_connection() {
        let fake = FakeBotService::new();
        let target = target();
        fake.seed_alias(&target, BotVersion::Numbered("1".into()));
        let publisher = VersionPublisher::new(&fake, &target);

        publisher.repoint(&BotVersion::Numbered("1".into())).await.unwrap();
        fake.fail_next_with(RemoteError::Unavailable("connection reset".into()));
        let stable = publisher.wait_for_alias(&policy()).await.unwrap();

        assert_eq!(stable.status, BotStatus::Available);
    }

    #[tokio::test]
    async fn test_repoint_to_draft_is_refused() {
        let fake = FakeBotService::new();
        let target = target();
        let publisher = VersionPublisher::new(&fake, &target);

        let err = publisher.repoint(&BotVersion::Draft).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_repoint_missing_alias_is_not_found() {
        let fake = FakeBotService::new();
        let target = target();
        let publisher = VersionPublisher::new(&fake, &target);

        let err = publisher
            .repoint(&BotVersion::Numbered("1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NotFound { .. }));
    }
}
