//! Configuration loader for lexbot.
//!
//! Reads `config.toml` from the config directory (`~/.lexbot/` by default),
//! then lets the environment override the bot identity. A `.env` file in the
//! working directory is loaded into the environment first.

use std::path::{Path, PathBuf};

use lexbot_types::config::LexConfig;

pub const CONFIG_DIR_VAR: &str = "LEXBOT_CONFIG_DIR";

pub const ROLE_ARN_VAR: &str = "LEX_BOTS_IAM_ROLE_ARN";
pub const BOT_ID_VAR: &str = "BOT_ID";
pub const BOT_NAME_VAR: &str = "BOT_NAME";
pub const BOT_ALIAS_ID_VAR: &str = "BOT_ALIAS_ID";
pub const BOT_ALIAS_NAME_VAR: &str = "BOT_ALIAS_NAME";
pub const BOT_LOCALE_ID_VAR: &str = "BOT_LOCALE_ID";
pub const REGION_VAR: &str = "AWS_REGION";

/// Resolve the config directory.
///
/// Priority:
/// 1. `LEXBOT_CONFIG_DIR` environment variable
/// 2. `~/.lexbot`
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_VAR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".lexbot");
    }

    PathBuf::from(".lexbot")
}

/// Load `.env` from the working directory (or a parent) if there is one.
/// Variables already set in the process environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("Failed to load .env: {err}"),
    }
}

/// Load configuration from `{config_dir}/config.toml`.
///
/// - If the file does not exist, returns [`LexConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_file_config(config_dir: &Path) -> LexConfig {
    let config_path = config_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return LexConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return LexConfig::default();
        }
    };

    match toml::from_str::<LexConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            LexConfig::default()
        }
    }
}

/// Overwrite config values with any non-empty variable `lookup` yields.
pub fn apply_env_overrides(config: &mut LexConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ROLE_ARN_VAR) {
        config.role_arn = Some(v);
    }
    if let Some(v) = get(BOT_ID_VAR) {
        config.bot_id = Some(v);
    }
    if let Some(v) = get(BOT_NAME_VAR) {
        config.bot_name = Some(v);
    }
    if let Some(v) = get(BOT_ALIAS_ID_VAR) {
        config.alias_id = Some(v);
    }
    if let Some(v) = get(BOT_ALIAS_NAME_VAR) {
        config.alias_name = Some(v);
    }
    if let Some(v) = get(BOT_LOCALE_ID_VAR) {
        config.locale = Some(v);
    }
    if let Some(v) = get(REGION_VAR) {
        config.region = v;
    }
}

/// File config with process-environment overrides applied.
pub async fn load_config(config_dir: &Path) -> LexConfig {
    let mut config = load_file_config(config_dir).await;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}
