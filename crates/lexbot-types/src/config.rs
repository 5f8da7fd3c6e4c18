//! Configuration types for lexbot.
//!
//! `LexConfig` is the merged view of `config.toml` and the environment. Bot
//! identity values are optional here and only checked for presence when a
//! command needs them.

use serde::{Deserialize, Serialize};

use crate::bot::{AliasId, BotId, BotTarget, LocaleId};
use crate::error::BotError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexConfig {
    /// AWS region hosting the bot.
    #[serde(default = "default_region")]
    pub region: String,

    /// IAM role the bot service assumes for newly created bots.
    #[serde(default)]
    pub role_arn: Option<String>,

    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub bot_name: Option<String>,
    #[serde(default)]
    pub alias_id: Option<String>,
    #[serde(default)]
    pub alias_name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub poll: PollSettings,

    #[serde(default)]
    pub provisioning: ProvisioningDefaults,

    #[serde(default)]
    pub endpoints: EndpointOverrides,

    #[serde(default)]
    pub dialogflow: Option<DialogflowConfig>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for LexConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            role_arn: None,
            bot_id: None,
            bot_name: None,
            alias_id: None,
            alias_name: None,
            locale: None,
            poll: PollSettings::default(),
            provisioning: ProvisioningDefaults::default(),
            endpoints: EndpointOverrides::default(),
            dialogflow: None,
        }
    }
}

impl LexConfig {
    /// Resolve the bot/alias/locale triple. Every field must be present.
    pub fn target(&self) -> Result<BotTarget, BotError> {
        Ok(BotTarget {
            bot_id: BotId::new(require(&self.bot_id, "BOT_ID")?),
            bot_name: require(&self.bot_name, "BOT_NAME")?,
            alias_id: AliasId::new(require(&self.alias_id, "BOT_ALIAS_ID")?),
            alias_name: require(&self.alias_name, "BOT_ALIAS_NAME")?,
            locale: LocaleId::new(require(&self.locale, "BOT_LOCALE_ID")?),
        })
    }

    pub fn require_role_arn(&self) -> Result<String, BotError> {
        require(&self.role_arn, "LEX_BOTS_IAM_ROLE_ARN")
    }

    pub fn require_bot_id(&self) -> Result<BotId, BotError> {
        require(&self.bot_id, "BOT_ID").map(BotId::new)
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String, BotError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BotError::Config(format!("{name} is not set"))),
    }
}

/// Status polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// 1.0 polls at a fixed rate.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interval_ms() -> u64 {
    5_000
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_timeout_secs() -> u64 {
    900
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Defaults applied when creating a bot from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningDefaults {
    /// How long the service keeps an idle conversation's context.
    #[serde(default = "default_idle_session_ttl_secs")]
    pub idle_session_ttl_secs: u32,
    /// Below this NLU confidence the fallback intent is inserted (0..1).
    #[serde(default = "default_nlu_confidence_threshold")]
    pub nlu_confidence_threshold: f64,
}

fn default_idle_session_ttl_secs() -> u32 {
    20 * 60
}

fn default_nlu_confidence_threshold() -> f64 {
    0.4
}

impl Default for ProvisioningDefaults {
    fn default() -> Self {
        Self {
            idle_session_ttl_secs: default_idle_session_ttl_secs(),
            nlu_confidence_threshold: default_nlu_confidence_threshold(),
        }
    }
}

/// Base URL overrides, mostly for local testing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub models: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub dialogflow: Option<String>,
}

/// Dialogflow CX agent addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogflowConfig {
    pub project_id: String,
    #[serde(default = "default_dialogflow_location")]
    pub location: String,
    pub agent_id: String,
    pub language_code: String,
}

fn default_dialogflow_location() -> String {
    "global".to_string()
}

impl DialogflowConfig {
    /// `projects/{project}/locations/{location}/agents/{agent}`
    pub fn agent_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/agents/{}",
            self.project_id, self.location, self.agent_id
        )
    }
}
