//! Bot-management facade for an existing bot.
//!
//! `BotService` is bound to one bot, alias and locale ([`BotTarget`]) and
//! runs the release workflow against it: upload intents and slots into the
//! draft, build the draft, publish a version and move the alias onto it.

use std::path::Path;

use lexbot_types::bot::{BotAlias, BotSummary, BotTarget, BotVersion, LocaleScope, VersionSummary};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};
use lexbot_types::intent::{IntentFile, IntentInput, IntentSummary, SlotPriority, SlotSummary};
use lexbot_types::report::{ItemOutcome, UploadReport};

use crate::build::{trigger_build, wait_for_build};
use crate::client::BotModelsClient;
use crate::poll::{PollPolicy, StableStatus};
use crate::publish::VersionPublisher;
use crate::retry::RetryPolicy;
use crate::service::read_with_retry;
use crate::upsert::{IntentScope, SlotScope, upsert};

/// Outcome of an upload followed by a build.
#[derive(Debug, Clone)]
pub struct UploadRun {
    pub report: UploadReport,
    /// `None` when the build was skipped because some item failed.
    pub build: Option<StableStatus>,
}

/// A published version the alias now serves.
#[derive(Debug, Clone)]
pub struct Release {
    pub version: BotVersion,
    pub alias: BotAlias,
}

/// Default description for versions published without one.
pub fn default_release_description() -> String {
    format!(
        "Version with intents uploaded on {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// Release workflow for one bot.
///
/// Generic over the models client so the workflow can run against the real
/// service adapter or an in-memory double.
pub struct BotService<C: BotModelsClient> {
    client: C,
    target: BotTarget,
    poll: PollPolicy,
    retry: RetryPolicy,
}

impl<C: BotModelsClient> BotService<C> {
    pub fn new(client: C, target: BotTarget) -> Self {
        Self {
            client,
            target,
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

    pub fn target(&self) -> &BotTarget {
        &self.target
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn draft_scope(&self) -> LocaleScope {
        LocaleScope::draft(self.target.bot_id.clone(), self.target.locale.clone())
    }

    fn publisher(&self) -> VersionPublisher<'_, C> {
        VersionPublisher::new(&self.client, &self.target).with_retry_policy(self.retry.clone())
    }

    fn bot_ref(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Bot, self.target.bot_id.as_str())
    }

    // ----- upload -----

    /// Upsert every intent of `file` into the draft, with its slots and
    /// slot priorities.
    ///
    /// The batch never stops at a failed item. A failed intent has its slots
    /// reported as skipped; everything else is attempted and reported.
    pub async fn upload_intents(&self, file: &IntentFile) -> UploadReport {
        let scope = self.draft_scope();
        let bot_id = self.target.bot_id.as_str();
        let mut report = UploadReport::default();

        tracing::info!(bot_id, intents = file.len(), "uploading intents");

        for (name, definition) in &file.intents {
            let input = IntentInput::from_definition(name, definition);
            let intents = IntentScope::new(&self.client, &scope);

            let intent = match upsert(&intents, &input).await {
                Ok(intent) => intent,
                Err(err) => {
                    tracing::warn!(bot_id, intent = %name, error = %err, "intent upsert failed");
                    report.record(
                        ResourceKind::Intent,
                        name,
                        None,
                        ItemOutcome::Failed {
                            error: err.to_string(),
                        },
                    );
                    for slot in &definition.slots {
                        report.record(
                            ResourceKind::Slot,
                            &slot.name,
                            Some(name.as_str()),
                            ItemOutcome::Skipped {
                                reason: format!("intent '{name}' failed"),
                            },
                        );
                    }
                    continue;
                }
            };

            let intent_item = report.items.len();
            report.record(
                ResourceKind::Intent,
                name,
                None,
                ItemOutcome::Succeeded {
                    id: intent.id.clone(),
                    action: intent.action,
                },
            );

            let slots = SlotScope::new(&self.client, &scope, &intent.id);
            let mut priorities = Vec::new();
            for (index, slot) in definition.slots.iter().enumerate() {
                match upsert(&slots, slot).await {
                    Ok(upserted) => {
                        priorities.push(SlotPriority {
                            priority: index as u32,
                            slot_id: upserted.id.clone(),
                        });
                        report.record(
                            ResourceKind::Slot,
                            &slot.name,
                            Some(name.as_str()),
                            ItemOutcome::Succeeded {
                                id: upserted.id,
                                action: upserted.action,
                            },
                        );
                    }
                    Err(err) => {
                        tracing::warn!(bot_id, intent = %name, slot = %slot.name, error = %err, "slot upsert failed");
                        report.record(
                            ResourceKind::Slot,
                            &slot.name,
                            Some(name.as_str()),
                            ItemOutcome::Failed {
                                error: err.to_string(),
                            },
                        );
                    }
                }
            }

            if priorities.is_empty() {
                continue;
            }

            let mut prioritized = input;
            prioritized.slot_priorities = priorities;
            if let Err(e) = self
                .client
                .update_intent(&scope, &intent.id, &prioritized)
                .await
            {
                let err = BotError::from_remote(
                    "update_intent",
                    ResourceRef::new(ResourceKind::Intent, name.as_str()).in_parent(bot_id),
                    e,
                );
                tracing::warn!(bot_id, intent = %name, error = %err, "slot priority update failed");
                report.items[intent_item].outcome = ItemOutcome::Failed {
                    error: err.to_string(),
                };
            }
        }

        tracing::info!(
            bot_id,
            succeeded = report.succeeded(),
            failed = report.failures().count(),
            "intent upload finished"
        );
        report
    }

    /// Read, validate and upload an intent-definition file.
    ///
    /// The whole file is validated before the first remote call, so a
    /// malformed file uploads nothing.
    pub async fn upload_intents_from_file(&self, path: &Path) -> Result<UploadReport, BotError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            BotError::MalformedInput(format!("cannot read {}: {e}", path.display()))
        })?;
        let file = IntentFile::parse(&content)?;
        Ok(self.upload_intents(&file).await)
    }

    /// Upload a file, then build the draft if every item succeeded.
    pub async fn upload_and_build(&self, path: &Path) -> Result<UploadRun, BotError> {
        let report = self.upload_intents_from_file(path).await?;
        if report.has_failures() {
            tracing::warn!(
                bot_id = %self.target.bot_id,
                "skipping build: some items failed to upload"
            );
            return Ok(UploadRun {
                report,
                build: None,
            });
        }
        let build = self.build().await?;
        Ok(UploadRun {
            report,
            build: Some(build),
        })
    }

    // ----- build and release -----

    /// Build the draft locale and wait for it to settle.
    pub async fn build(&self) -> Result<StableStatus, BotError> {
        trigger_build(&self.client, &self.target.bot_id, &self.target.locale).await?;
        wait_for_build(
            &self.client,
            &self.target.bot_id,
            &self.target.locale,
            &self.poll,
            &self.retry,
        )
        .await
    }

    /// Publish the draft as a new version and wait until it is available.
    pub async fn publish(&self, description: &str) -> Result<BotVersion, BotError> {
        let publisher = self.publisher();
        let version = publisher.publish(description).await?;
        publisher.wait_for_version(&version, &self.poll).await?;
        Ok(version)
    }

    /// Move the alias to `version` and wait until the alias settles.
    pub async fn repoint(&self, version: &BotVersion) -> Result<BotAlias, BotError> {
        let publisher = self.publisher();
        publisher.repoint(version).await?;
        publisher.wait_for_alias(&self.poll).await?;
        publisher.describe_alias().await
    }

    /// Publish the draft and make the alias serve it.
    pub async fn publish_release(&self, description: Option<&str>) -> Result<Release, BotError> {
        let description = description
            .map(str::to_string)
            .unwrap_or_else(default_release_description);
        let version = self.publish(&description).await?;
        let alias = self.repoint(&version).await?;
        tracing::info!(
            bot_id = %self.target.bot_id,
            version = %version,
            alias = %self.target.alias_name,
            "release published"
        );
        Ok(Release { version, alias })
    }

    /// Version the alias currently serves.
    pub async fn alias_version(&self) -> Result<Option<BotVersion>, BotError> {
        self.publisher().alias_version().await
    }

    // ----- reads -----

    pub async fn status(&self) -> Result<BotSummary, BotError> {
        let client = &self.client;
        let bot_id = &self.target.bot_id;
        read_with_retry(&self.retry, "describe_bot", self.bot_ref(), move || {
            client.describe_bot(bot_id)
        })
        .await
    }

    pub async fn list_versions(&self) -> Result<Vec<VersionSummary>, BotError> {
        let client = &self.client;
        let bot_id = &self.target.bot_id;
        read_with_retry(&self.retry, "list_bot_versions", self.bot_ref(), move || {
            client.list_bot_versions(bot_id)
        })
        .await
    }

    pub async fn list_aliases(&self) -> Result<Vec<BotAlias>, BotError> {
        let client = &self.client;
        let bot_id = &self.target.bot_id;
        read_with_retry(&self.retry, "list_bot_aliases", self.bot_ref(), move || {
            client.list_bot_aliases(bot_id)
        })
        .await
    }

    /// Intents of the draft locale.
    pub async fn list_intents(&self) -> Result<Vec<IntentSummary>, BotError> {
        let client = &self.client;
        let scope = &self.draft_scope();
        let resource = ResourceRef::new(ResourceKind::Intent, "*").in_parent(self.target.bot_id.as_str());
        read_with_retry(&self.retry, "list_intents", resource, move || {
            client.list_intents(scope)
        })
        .await
    }

    /// Slots of the draft intent named `intent_name`.
    pub async fn list_slots(&self, intent_name: &str) -> Result<Vec<SlotSummary>, BotError> {
        let intent = self
            .list_intents()
            .await?
            .into_iter()
            .find(|i| i.intent_name == intent_name)
            .ok_or_else(|| BotError::NotFound {
                operation: "list_slots",
                resource: ResourceRef::new(ResourceKind::Intent, intent_name)
                    .in_parent(self.target.bot_id.as_str()),
            })?;

        let client = &self.client;
        let scope = &self.draft_scope();
        let intent_id = intent.intent_id.as_str();
        let resource = ResourceRef::new(ResourceKind::Slot, "*").in_parent(intent_id);
        read_with_retry(&self.retry, "list_slots", resource, move || {
            client.list_slots(scope, intent_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBotService, target};
    use lexbot_types::report::UpsertAction;
    use lexbot_types::status::BotStatus;
    use std::time::Duration;

    const GREET: &str =
        r#"{"GreetIntent": {"description": "greets", "sampleUtterances": ["hi","hello"], "slots": []}}"#;

    const ORDER: &str = r#"{
        "OrderFlowers": {
            "description": "order",
            "sampleUtterances": ["I want flowers"],
            "slots": [
                {"name": "FlowerType", "slotType": "FlowerTypes", "description": "kind",
                 "valueElicitationSetting": {"slotConstraint": "Required"}},
                {"name": "PickupDate", "slotType": "AMAZON.Date", "description": "when",
                 "valueElicitationSetting": {"slotConstraint": "Required"}}
            ]
        },
        "GreetIntent": {"description": "greets", "sampleUtterances": ["hi"], "slots": []}
    }"#;

    fn service(fake: &FakeBotService) -> BotService<FakeBotService> {
        BotService::new(fake.clone(), target())
            .with_poll_policy(PollPolicy::fixed(
                Duration::from_secs(1),
                Duration::from_secs(60),
            ))
            .with_retry_policy(RetryPolicy::none())
    }

    #[tokio::test]
    async fn test_greet_intent_against_empty_bot() {
        let fake = FakeBotService::new();
        let svc = service(&fake);

        let report = svc.upload_intents(&IntentFile::parse(GREET).unwrap()).await;

        assert!(!report.has_failures());
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].name, "GreetIntent");
        let intents = svc.list_intents().await.unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].intent_name, "GreetIntent");
        let slots = svc.list_slots("GreetIntent").await.unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_second_upload_updates_in_place() {
        let fake = FakeBotService::new();
        let svc = service(&fake);
        let file = IntentFile::parse(ORDER).unwrap();

        svc.upload_intents(&file).await;
        let second = svc.upload_intents(&file).await;

        assert!(second.items.iter().all(|item| matches!(
            item.outcome,
            ItemOutcome::Succeeded {
                action: UpsertAction::Updated,
                ..
            }
        )));
        assert_eq!(svc.list_intents().await.unwrap().len(), 2);
        assert_eq!(svc.list_slots("OrderFlowers").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_slot_priorities_follow_file_order() {
        let fake = FakeBotService::new();
        let svc = service(&fake);

        svc.upload_intents(&IntentFile::parse(ORDER).unwrap()).await;

        let slots = svc.list_slots("OrderFlowers").await.unwrap();
        let priorities = fake.slot_priorities_of("OrderFlowers");
        let ids: Vec<_> = priorities.iter().map(|p| p.slot_id.clone()).collect();
        let by_name = |n: &str| {
            slots
                .iter()
                .find(|s| s.slot_name == n)
                .map(|s| s.slot_id.clone())
                .unwrap()
        };
        assert_eq!(ids, vec![by_name("FlowerType"), by_name("PickupDate")]);
        assert_eq!(priorities[0].priority, 0);
        assert_eq!(priorities[1].priority, 1);
    }

    #[tokio::test]
    async fn test_failed_intent_skips_its_slots_but_batch_continues() {
        let fake = FakeBotService::new();
        fake.reject_create_intent("OrderFlowers");
        let svc = service(&fake);

        let report = svc.upload_intents(&IntentFile::parse(ORDER).unwrap()).await;

        assert!(report.has_failures());
        let outcome_of = |name: &str| {
            report
                .items
                .iter()
                .find(|i| i.name == name)
                .map(|i| i.outcome.clone())
                .unwrap()
        };
        assert!(matches!(outcome_of("GreetIntent"), ItemOutcome::Succeeded { .. }));
        assert!(matches!(outcome_of("OrderFlowers"), ItemOutcome::Failed { .. }));
        assert!(matches!(outcome_of("FlowerType"), ItemOutcome::Skipped { .. }));
        assert!(matches!(outcome_of("PickupDate"), ItemOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_uploads_nothing() {
        let fake = FakeBotService::new();
        let svc = service(&fake);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(&path, r#"{"GreetIntent": {"sampleUtterances": ["hi"], "slots": []}}"#)
            .unwrap();

        let err = svc.upload_intents_from_file(&path).await.unwrap_err();

        assert!(matches!(err, BotError::MalformedInput(_)));
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_and_build() {
        let fake = FakeBotService::new();
        fake.script_bot_statuses(&[BotStatus::Updating, BotStatus::Available]);
        let svc = service(&fake);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(&path, GREET).unwrap();

        let run = svc.upload_and_build(&path).await.unwrap();

        assert_eq!(run.build.map(|b| b.status), Some(BotStatus::Available));
        assert_eq!(fake.builds_triggered(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_skips_build() {
        let fake = FakeBotService::new();
        fake.reject_create_intent("GreetIntent");
        let svc = service(&fake);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(&path, GREET).unwrap();

        let run = svc.upload_and_build(&path).await.unwrap();

        assert!(run.build.is_none());
        assert_eq!(fake.builds_triggered(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_release_moves_alias() {
        let fake = FakeBotService::new();
        fake.seed_alias(&target(), BotVersion::Numbered("1".into()));
        let svc = service(&fake);

        let release = svc.publish_release(None).await.unwrap();

        assert_eq!(release.version, BotVersion::Numbered("2".into()));
        assert_eq!(release.alias.bot_version, Some(release.version.clone()));
        assert_eq!(svc.alias_version().await.unwrap(), Some(release.version));
        let versions = svc.list_versions().await.unwrap();
        assert!(
            versions
                .iter()
                .any(|v| v.description.as_deref().unwrap_or("").starts_with("Version with intents uploaded on"))
        );
    }

    #[tokio::test]
    async fn test_list_slots_of_unknown_intent() {
        let fake = FakeBotService::new();
        let svc = service(&fake);
        let err = svc.list_slots("Nope").await.unwrap_err();
        assert!(matches!(err, BotError::NotFound { .. }));
    }
}
