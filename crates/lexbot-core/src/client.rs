//! Bot service port traits.
//!
//! The managed bot service is an opaque collaborator: these traits name
//! the remote operations the workflow sequences, nothing more. Concrete
//! adapters (Lex V2 through the AWS SDK, Dialogflow CX over REST) live in
//! lexbot-infra.
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use lexbot_types::agent::{Agent, AgentParent, NewAgent};
use lexbot_types::bot::{
    AliasId, BotAlias, BotId, BotSummary, BotVersion, LocaleId, LocaleScope, VersionSummary,
};
use lexbot_types::conversation::{RecognizedTurn, SessionId, SessionState};
use lexbot_types::error::RemoteError;
use lexbot_types::intent::{IntentInput, IntentSummary, SlotDefinition, SlotSummary};
use lexbot_types::status::BotStatus;

/// Parameters of a bot-creation call.
#[derive(Debug, Clone)]
pub struct NewBot {
    pub name: String,
    pub role_arn: String,
    pub idle_session_ttl_secs: u32,
    pub child_directed: bool,
}

/// Management API of the bot service: bots, locales, versions, aliases,
/// intents and slots.
pub trait BotModelsClient: Send + Sync {
    /// List every bot in the region.
    fn list_bots(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<BotSummary>, RemoteError>> + Send;

    /// Create a bot. Returns the id the service assigned.
    fn create_bot(
        &self,
        bot: &NewBot,
    ) -> impl std::future::Future<Output = Result<BotId, RemoteError>> + Send;

    fn describe_bot(
        &self,
        bot_id: &BotId,
    ) -> impl std::future::Future<Output = Result<BotSummary, RemoteError>> + Send;

    /// Delete a bot, skipping the resource-in-use check. Returns the status
    /// the service reports right after the call (usually `Deleting`).
    fn delete_bot(
        &self,
        bot_id: &BotId,
    ) -> impl std::future::Future<Output = Result<BotStatus, RemoteError>> + Send;

    /// Add a locale to the bot's draft.
    fn create_bot_locale(
        &self,
        scope: &LocaleScope,
        nlu_confidence_threshold: f64,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    /// Start an asynchronous build of one locale. Returns immediately.
    fn build_bot_locale(
        &self,
        scope: &LocaleScope,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    /// Snapshot the draft of `locale` into a new immutable version.
    fn create_bot_version(
        &self,
        bot_id: &BotId,
        locale: &LocaleId,
        description: &str,
    ) -> impl std::future::Future<Output = Result<VersionSummary, RemoteError>> + Send;

    fn describe_bot_version(
        &self,
        bot_id: &BotId,
        version: &BotVersion,
    ) -> impl std::future::Future<Output = Result<VersionSummary, RemoteError>> + Send;

    fn list_bot_versions(
        &self,
        bot_id: &BotId,
    ) -> impl std::future::Future<Output = Result<Vec<VersionSummary>, RemoteError>> + Send;

    fn create_bot_alias(
        &self,
        bot_id: &BotId,
        alias_name: &str,
        version: &BotVersion,
        description: &str,
    ) -> impl std::future::Future<Output = Result<BotAlias, RemoteError>> + Send;

    /// Point an alias at `version` and enable `locale` on it.
    fn update_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
        alias_name: &str,
        version: &BotVersion,
        locale: &LocaleId,
    ) -> impl std::future::Future<Output = Result<BotAlias, RemoteError>> + Send;

    fn describe_bot_alias(
        &self,
        bot_id: &BotId,
        alias_id: &AliasId,
    ) -> impl std::future::Future<Output = Result<BotAlias, RemoteError>> + Send;

    fn list_bot_aliases(
        &self,
        bot_id: &BotId,
    ) -> impl std::future::Future<Output = Result<Vec<BotAlias>, RemoteError>> + Send;

    fn list_intents(
        &self,
        scope: &LocaleScope,
    ) -> impl std::future::Future<Output = Result<Vec<IntentSummary>, RemoteError>> + Send;

    /// Create an intent. Returns the new intent id.
    fn create_intent(
        &self,
        scope: &LocaleScope,
        intent: &IntentInput,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    fn update_intent(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        intent: &IntentInput,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    fn list_slots(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<SlotSummary>, RemoteError>> + Send;

    /// Create a slot on an intent. Returns the new slot id.
    fn create_slot(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        slot: &SlotDefinition,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    fn update_slot(
        &self,
        scope: &LocaleScope,
        intent_id: &str,
        slot_id: &str,
        slot: &SlotDefinition,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// Conversation (recognizer) API of the bot service.
///
/// The adapter is bound to one bot/alias/locale (or one agent) at
/// construction; each call is one user utterance.
pub trait BotRuntimeClient: Send + Sync {
    /// Human-readable backend name (e.g. "lex", "dialogflow").
    fn name(&self) -> &str;

    fn recognize_text(
        &self,
        session_id: &SessionId,
        text: &str,
        prior_state: &SessionState,
    ) -> impl std::future::Future<Output = Result<RecognizedTurn, RemoteError>> + Send;
}

/// Agent administration API of Dialogflow CX.
pub trait AgentAdminClient: Send + Sync {
    /// Create an agent under `parent`. Returns it with its assigned name.
    fn create_agent(
        &self,
        parent: &AgentParent,
        agent: &NewAgent,
    ) -> impl std::future::Future<Output = Result<Agent, RemoteError>> + Send;

    /// List every agent under `parent`.
    fn list_agents(
        &self,
        parent: &AgentParent,
    ) -> impl std::future::Future<Output = Result<Vec<Agent>, RemoteError>> + Send;
}
