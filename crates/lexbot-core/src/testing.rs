//! In-memory bot service doubles for workflow tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use lexbot_types::agent::{Agent, AgentParent, NewAgent};
use lexbot_types::bot::{
    AliasId, BotAlias, BotId, BotSummary, BotTarget, BotVersion, LocaleId, LocaleScope,
    VersionSummary,
};
use lexbot_types::conversation::{RecognizedTurn, SessionId, SessionState};
use lexbot_types::error::RemoteError;
use lexbot_types::intent::{IntentInput, IntentSummary, SlotDefinition, SlotPriority, SlotSummary};
use lexbot_types::status::BotStatus;

use crate::client::{AgentAdminClient, BotModelsClient, BotRuntimeClient, NewBot};

pub fn target() -> BotTarget {
    BotTarget {
        bot_id: BotId::new("BOT1"),
        bot_name: "TestBot".to_string(),
        alias_id: AliasId::new("ALIAS1"),
        alias_name: "TestBotAlias".to_string(),
        locale: LocaleId::new("pt_BR"),
    }
}

pub fn greet_input() -> IntentInput {
    IntentInput {
        name: "GreetIntent".to_string(),
        description: "greets".to_string(),
        sample_utterances: vec!["hi".to_string(), "hello".to_string()],
        slot_priorities: vec![],
    }
}

struct FakeIntent {
    bot_id: BotId,
    locale: LocaleId,
    id: String,
    input: IntentInput,
}

struct FakeSlot {
    intent_id: String,
    id: String,
    definition: SlotDefinition,
}

#[derive(Default)]
struct FakeState {
    next_id: u32,
    bots: Vec<BotSummary>,
    deleted: HashSet<BotId>,
    locales: HashMap<BotId, Vec<String>>,
    versions: HashMap<BotId, Vec<VersionSummary>>,
    aliases: Vec<(BotId, BotAlias)>,
    intents: Vec<FakeIntent>,
    slots: Vec<FakeSlot>,
    bot_statuses: VecDeque<BotStatus>,
    version_statuses: VecDeque<BotStatus>,
    rejected_intents: HashSet<String>,
    next_failure: Option<RemoteError>,
    created_intents: Vec<String>,
    builds: u32,
    mutations: u32,
}

impl FakeState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn check_failure(&mut self) -> Result<(), RemoteError> {
        match self.next_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Tracks every resource created against it so tests can assert on the
/// resulting remote state.
#[derive(Clone, Default)]
pub struct FakeBotService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBotService {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Statuses returned by successive `describe_bot` calls before falling
    /// back to `Available`.
    pub fn script_bot_statuses(&self, statuses: &[BotStatus]) {
        self.with(|s| s.bot_statuses = statuses.iter().copied().collect());
    }

    pub fn script_version_statuses(&self, statuses: &[BotStatus]) {
        self.with(|s| s.version_statuses = statuses.iter().copied().collect());
    }

    /// Make the next remote call of any kind fail with `err`.
    pub fn fail_next_with(&self, err: RemoteError) {
        self.with(|s| s.next_failure = Some(err));
    }

    pub fn reject_create_intent(&self, name: &str) {
        self.with(|s| {
            s.rejected_intents.insert(name.to_string());
        });
    }

    pub fn seed_intent(&self, scope: &LocaleScope, id: &str, name: &str) -> String {
        self.with(|s| {
            s.intents.push(FakeIntent {
                bot_id: scope.bot_id.clone(),
                locale: scope.locale.clone(),
                id: id.to_string(),
                input: IntentInput {
                    name: name.to_string(),
                    description: String::new(),
                    sample_utterances: vec![],
                    slot_priorities: vec![],
                },
            });
        });
        id.to_string()
    }

    /// Seed the target's alias, pointing at `version` (which is recorded as
    /// an existing version).
    pub fn seed_alias(&self, target: &BotTarget, version: BotVersion) {
        self.with(|s| {
            let versions = s.versions.entry(target.bot_id.clone()).or_default();
            if !versions.iter().any(|v| v.bot_version == version) {
                versions.push(VersionSummary {
                    bot_version: version.clone(),
                    description: None,
                    bot_status: BotStatus::Available,
                    creation_date_time: None,
                });
            }
            s.aliases.push((
                target.bot_id.clone(),
                BotAlias {
                    bot_alias_id: target.alias_id.clone(),
                    bot_alias_name: target.alias_name.clone(),
                    bot_version: Some(version),
                    bot_alias_status: Some(BotStatus::Available),
                    description: None,
                },
            ));
        });
    }

    pub fn created_intent_names(&self) -> Vec<String> {
        self.with(|s| s.created_intents.clone())
    }

    pub fn slot_priorities_of(&self, intent_name: &str) -> Vec<SlotPriority> {
        self.with(|s| {
            s.intents
                .iter()
                .find(|i| i.input.name == intent_name)
                .map(|i| i.input.slot_priorities.clone())
                .unwrap_or_default()
        })
    }

    pub fn locales_of(&self, bot_id: &BotId) -> Vec<String> {
        self.with(|s| s.locales.get(bot_id).cloned().unwrap_or_default())
    }

    pub fn builds_triggered(&self) -> u32 {
        self.with(|s| s.builds)
    }

    /// Number of create/update/delete/build calls that reached the service.
    pub fn mutation_count(&self) -> u32 {
        self.with(|s| s.mutations)
    }
}

impl BotModelsClient for FakeBotService {
    async fn list_bots(&self) -> Result<Vec<BotSummary>, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            Ok(s.bots.clone())
        })
    }

    async fn create_bot(&self, bot: &NewBot) -> Result<BotId, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            let id = BotId::new(s.id("BOT"));
            s.bots.push(BotSummary {
                bot_id: id.clone(),
                bot_name: bot.name.clone(),
                description: None,
                bot_status: BotStatus::Available,
                latest_bot_version: None,
                last_updated_date_time: None,
            });
            Ok(id)
        })
    }

    async fn describe_bot(&self, bot_id: &BotId) -> Result<BotSummary, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            if s.deleted.contains(bot_id) {
                return Err(RemoteError::NotFound(format!("bot {bot_id}")));
            }
            let mut bot = s
                .bots
                .iter()
                .find(|b| &b.bot_id == bot_id)
                .cloned()
                .unwrap_or_else(|| BotSummary {
                    bot_id: bot_id.clone(),
                    bot_name: bot_id.to_string(),
                    description: None,
                    bot_status: BotStatus::Available,
                    latest_bot_version: None,
                    last_updated_date_time: None,
                });
            if let Some(status) = s.bot_statuses.pop_front() {
                bot.bot_status = status;
            }
            Ok(bot)
        })
    }

    async fn delete_bot(&self, bot_id: &BotId) -> Result<BotStatus, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            s.bots.retain(|b| &b.bot_id != bot_id);
            s.deleted.insert(bot_id.clone());
            Ok(BotStatus::Deleting)
        })
    }

    async fn create_bot_locale(
        &self,
        scope: &LocaleScope,
        _nlu_confidence_threshold: f64,
    ) -> Result<(), RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            s.locales
                .entry(scope.bot_id.clone())
                .or_default()
                .push(scope.locale.to_string());
            Ok(())
        })
    }

    async fn build_bot_locale(&self, scope: &LocaleScope) -> Result<(), RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            if s.deleted.contains(&scope.bot_id) {
                return Err(RemoteError::NotFound(format!("bot {}", scope.bot_id)));
            }
            s.mutations += 1;
            s.builds += 1;
            Ok(())
        })
    }

    async fn create_bot_version(
        &self,
        bot_id: &BotId,
        _locale: &LocaleId,
        description: &str,
    ) -> Result<VersionSummary, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            let versions = s.versions.entry(bot_id.clone()).or_default();
            let summary = VersionSummary {
                bot_version: BotVersion::Numbered((versions.len() + 1).to_string()),
                description: Some(description.to_string()),
                bot_status: BotStatus::Versioning,
                creation_date_time: None,
            };
            versions.push(summary.clone());
            Ok(summary)
        })
    }

    async fn describe_bot_version(
        &self,
        bot_id: &BotId,
        version: &BotVersion,
    ) -> Result<VersionSummary, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            let scripted = s.version_statuses.pop_front();
            let summary = s
                .versions
                .get_mut(bot_id)
                .and_then(|vs| vs.iter_mut().find(|v| &v.bot_version == version))
                .ok_or_else(|| RemoteError::NotFound(format!("version {version}")))?;
            summary.bot_status = scripted.unwrap_or(BotStatus::Available);
            Ok(summary.clone())
        })
    }

    async fn list_bot_versions(&self, bot_id: &BotId) -> Result<Vec<VersionSummary>, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            Ok(s.versions.get(bot_id).cloned().unwrap_or_default())
        })
    }

    async fn create_bot_alias(
        &self,
        bot_id: &BotId,
        alias_name: &str,
        version: &BotVersion,
        description: &str,
    ) -> Result<BotAlias, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            let alias = BotAlias {
                bot_alias_id: AliasId::new(s.id("ALIAS")),
                bot_alias_name: alias_name.to_string(),
                bot_version: Some(version.clone()),
                bot_alias_status: Some(BotStatus::Creating),
                description: Some(description.to_string()),
            };
            s.aliases.push((bot_id.clone(), alias.clone()));
            Ok(alias)
        })
    }

    async fn update_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
        _alias_name: &str,
        version: &BotVersion,
        _locale: &LocaleId,
    ) -> Result<BotAlias, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            let (_, alias) = s
                .aliases
                .iter_mut()
                .find(|(b, a)| b == bot_id && &a.bot_alias_id == alias_id)
                .ok_or_else(|| RemoteError::NotFound(format!("alias {alias_id}")))?;
            alias.bot_version = Some(version.clone());
            alias.bot_alias_status = Some(BotStatus::Updating);
            let alias = alias.clone();
            s.mutations += 1;
            Ok(alias)
        })
    }

    async fn describe_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
    ) -> Result<BotAlias, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            let (_, alias) = s
                .aliases
                .iter_mut()
                .find(|(b, a)| b == bot_id && &a.bot_alias_id == alias_id)
                .ok_or_else(|| RemoteError::NotFound(format!("alias {alias_id}")))?;
            // Alias updates settle on the first read.
            alias.bot_alias_status = Some(BotStatus::Available);
            Ok(alias.clone())
        })
    }

    async fn list_bot_aliases(&self, bot_id: &BotId) -> Result<Vec<BotAlias>, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            Ok(s.aliases
                .iter()
                .filter(|(b, _)| b == bot_id)
                .map(|(_, a)| a.clone())
                .collect())
        })
    }

    async fn list_intents(&self, scope: &LocaleScope) -> Result<Vec<IntentSummary>, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            Ok(s.intents
                .iter()
                .filter(|i| i.bot_id == scope.bot_id && i.locale == scope.locale)
                .map(|i| IntentSummary {
                    intent_id: i.id.clone(),
                    intent_name: i.input.name.clone(),
                    description: Some(i.input.description.clone()),
                })
                .collect())
        })
    }

    async fn create_intent(
        &self,
        scope: &LocaleScope,
        intent: &IntentInput,
    ) -> Result<String, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            if s.rejected_intents.contains(&intent.name) {
                return Err(RemoteError::Rejected {
                    status: 409,
                    code: "ConflictException".to_string(),
                    message: format!("intent {} rejected", intent.name),
                });
            }
            s.mutations += 1;
            let id = s.id("INTENT");
            s.intents.push(FakeIntent {
                bot_id: scope.bot_id.clone(),
                locale: scope.locale.clone(),
                id: id.clone(),
                input: intent.clone(),
            });
            s.created_intents.push(intent.name.clone());
            Ok(id)
        })
    }

    async fn update_intent(
        &self,
        _scope: &LocaleScope,
        intent_id: &str,
        intent: &IntentInput,
    ) -> Result<(), RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            let existing = s
                .intents
                .iter_mut()
                .find(|i| i.id == intent_id)
                .ok_or_else(|| RemoteError::NotFound(format!("intent {intent_id}")))?;
            existing.input = intent.clone();
            s.mutations += 1;
            Ok(())
        })
    }

    async fn list_slots(
        &self,
        _scope: &LocaleScope,
        intent_id: &str,
    ) -> Result<Vec<SlotSummary>, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            Ok(s.slots
                .iter()
                .filter(|slot| slot.intent_id == intent_id)
                .map(|slot| SlotSummary {
                    slot_id: slot.id.clone(),
                    slot_name: slot.definition.name.clone(),
                    slot_type_id: Some(slot.definition.slot_type.clone()),
                    description: Some(slot.definition.description.clone()),
                })
                .collect())
        })
    }

    async fn create_slot(
        &self,
        _scope: &LocaleScope,
        intent_id: &str,
        slot: &SlotDefinition,
    ) -> Result<String, RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            s.mutations += 1;
            let id = s.id("SLOT");
            s.slots.push(FakeSlot {
                intent_id: intent_id.to_string(),
                id: id.clone(),
                definition: slot.clone(),
            });
            Ok(id)
        })
    }

    async fn update_slot(
        &self,
        _scope: &LocaleScope,
        intent_id: &str,
        slot_id: &str,
        slot: &SlotDefinition,
    ) -> Result<(), RemoteError> {
        self.with(|s| {
            s.check_failure()?;
            let existing = s
                .slots
                .iter_mut()
                .find(|x| x.intent_id == intent_id && x.id == slot_id)
                .ok_or_else(|| RemoteError::NotFound(format!("slot {slot_id}")))?;
            existing.definition = slot.clone();
            s.mutations += 1;
            Ok(())
        })
    }
}

/// Runtime double that replays canned recognizer replies.
pub struct ScriptedRuntime {
    replies: Mutex<VecDeque<RecognizedTurn>>,
}

impl ScriptedRuntime {
    pub fn new(replies: Vec<RecognizedTurn>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl BotRuntimeClient for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize_text(
        &self,
        _session_id: &SessionId,
        _text: &str,
        _prior_state: &SessionState,
    ) -> Result<RecognizedTurn, RemoteError> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Agent administration double keeping agents in memory.
#[derive(Clone, Default)]
pub struct FakeAgents {
    state: Arc<Mutex<FakeAgentState>>,
}

#[derive(Default)]
struct FakeAgentState {
    agents: Vec<Agent>,
    failures: VecDeque<RemoteError>,
    creates: u32,
}

impl FakeAgents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue failures for the next calls, one per call.
    pub fn fail_next_with(&self, err: RemoteError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    pub fn create_count(&self) -> u32 {
        self.state.lock().unwrap().creates
    }
}

impl AgentAdminClient for FakeAgents {
    async fn create_agent(
        &self,
        parent: &AgentParent,
        agent: &NewAgent,
    ) -> Result<Agent, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        state.creates += 1;
        let created = Agent {
            name: format!("{}/agents/agent-{}", parent.path(), state.creates),
            display_name: agent.display_name.clone(),
            default_language_code: Some(agent.default_language_code.clone()),
            time_zone: Some(agent.time_zone.clone()),
            description: None,
        };
        state.agents.push(created.clone());
        Ok(created)
    }

    async fn list_agents(&self, parent: &AgentParent) -> Result<Vec<Agent>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        let prefix = format!("{}/agents/", parent.path());
        Ok(state
            .agents
            .iter()
            .filter(|a| a.name.starts_with(&prefix))
            .cloned()
            .collect())
    }
}
