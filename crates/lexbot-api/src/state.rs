//! Application state wiring configuration to concrete services.
//!
//! Services are generic over the bot service ports; AppState pins them to
//! the Lex V2 and Dialogflow adapters. AWS credentials resolve on the first
//! Lex call and the Dialogflow token is read when a command first needs a
//! client, so commands that never reach a backend work without either.

use std::path::PathBuf;

use lexbot_core::conversation::ConversationClient;
use lexbot_core::poll::PollPolicy;
use lexbot_core::service::agent::AgentService;
use lexbot_core::service::bot::BotService;
use lexbot_core::service::provisioning::ProvisioningService;
use lexbot_infra::config::{load_config, load_dotenv, resolve_config_dir};
use lexbot_infra::dialogflow::{
    DialogflowAgentsClient, DialogflowSessionClient, access_token_from_env,
};
use lexbot_infra::lex::{LexModelsClient, LexRuntimeClient, SdkConfig, load_sdk_config};
use lexbot_types::agent::AgentParent;
use lexbot_types::config::LexConfig;

pub type ConcreteBotService = BotService<LexModelsClient>;

pub type ConcreteProvisioningService = ProvisioningService<LexModelsClient>;

pub type ConcreteAgentService = AgentService<DialogflowAgentsClient>;

/// Configuration plus factories for the services commands use.
pub struct AppState {
    pub config: LexConfig,
    pub config_dir: PathBuf,
    aws: SdkConfig,
}

impl AppState {
    /// Load `.env`, `config.toml` and environment overrides.
    pub async fn init() -> anyhow::Result<Self> {
        load_dotenv();
        let config_dir = resolve_config_dir();
        let config = load_config(&config_dir).await;
        tracing::debug!(
            config_dir = %config_dir.display(),
            region = %config.region,
            "configuration loaded"
        );
        let aws = load_sdk_config(&config.region).await;
        Ok(Self {
            config,
            config_dir,
            aws,
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.config.poll)
    }

    fn models_client(&self) -> LexModelsClient {
        LexModelsClient::new(&self.aws, self.config.endpoints.models.clone())
    }

    /// Release workflow for the configured bot/alias/locale.
    pub fn bot_service(&self) -> anyhow::Result<ConcreteBotService> {
        let target = self.config.target()?;
        Ok(BotService::new(self.models_client(), target).with_poll_policy(self.poll_policy()))
    }

    pub fn provisioning_service(&self) -> anyhow::Result<ConcreteProvisioningService> {
        Ok(ProvisioningService::new(self.models_client()).with_poll_policy(self.poll_policy()))
    }

    pub fn lex_conversation(&self) -> anyhow::Result<ConversationClient<LexRuntimeClient>> {
        let target = self.config.target()?;
        let runtime = LexRuntimeClient::new(
            &self.aws,
            self.config.endpoints.runtime.clone(),
            target.bot_id,
            target.alias_id,
            target.locale,
        );
        Ok(ConversationClient::new(runtime))
    }

    pub fn dialogflow_conversation(
        &self,
    ) -> anyhow::Result<ConversationClient<DialogflowSessionClient>> {
        let agent = self.config.dialogflow.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "no [dialogflow] section in {}",
                self.config_dir.join("config.toml").display()
            )
        })?;
        let runtime = DialogflowSessionClient::new(
            agent,
            access_token_from_env()?,
            self.config.endpoints.dialogflow.clone(),
        )?;
        Ok(ConversationClient::new(runtime))
    }

    /// Agent administration for `project` (falling back to the
    /// `[dialogflow]` project) in `location`.
    pub fn agent_service(
        &self,
        project: Option<String>,
        location: &str,
    ) -> anyhow::Result<ConcreteAgentService> {
        let project = project
            .or_else(|| self.config.dialogflow.as_ref().map(|d| d.project_id.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no Google Cloud project: pass --project, set GOOGLE_PROJECT_ID, or add a [dialogflow] section to {}",
                    self.config_dir.join("config.toml").display()
                )
            })?;
        let client = DialogflowAgentsClient::new(
            location,
            access_token_from_env()?,
            self.config.endpoints.dialogflow.clone(),
        )?;
        Ok(AgentService::new(client, AgentParent::new(project, location)))
    }
}
