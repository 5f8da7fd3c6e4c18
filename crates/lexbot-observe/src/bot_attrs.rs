//! Span attribute names for bot-service operations.
//!
//! Usable as constant field names in `tracing` macros:
//! `info_span!("publish", { BOT_ID } = %id)`.

/// The CLI operation being performed (e.g. "upload", "publish").
pub const LEXBOT_OPERATION: &str = "lexbot.operation";

/// Runtime backend answering conversational turns ("lex", "dialogflow").
pub const LEXBOT_BACKEND: &str = "lexbot.backend";

/// Cloud region of the bot service.
pub const CLOUD_REGION: &str = "cloud.region";

/// Service-assigned bot id.
pub const BOT_ID: &str = "lexbot.bot.id";

pub const BOT_ALIAS_ID: &str = "lexbot.bot.alias_id";

pub const BOT_LOCALE: &str = "lexbot.bot.locale";

pub const BOT_VERSION: &str = "lexbot.bot.version";

/// Conversation session id.
pub const SESSION_ID: &str = "lexbot.session.id";

/// Dialogflow agent parent, `projects/{project}/locations/{location}`.
pub const AGENT_PARENT: &str = "lexbot.agent.parent";

// --- Operation name values ---

pub const OP_CREATE_BOT: &str = "create_bot";
pub const OP_DELETE_BOT: &str = "delete_bot";
pub const OP_UPLOAD: &str = "upload";
pub const OP_BUILD: &str = "build";
pub const OP_PUBLISH: &str = "publish";
pub const OP_REPOINT: &str = "repoint";
pub const OP_TURN: &str = "turn";
pub const OP_CREATE_AGENT: &str = "create_agent";
