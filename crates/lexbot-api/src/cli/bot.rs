//! Bot lifecycle CLI commands: create, show, delete, status.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use tracing::Instrument;

use lexbot_observe::bot_attrs;
use lexbot_types::bot::{AliasId, BotId, CreateBotRequest, LocaleId};

use super::{format_timestamp, spinner};
use crate::state::AppState;

const DEFAULT_LOCALE: &str = "pt_BR";

/// Create a bot via interactive prompts or one-shot flags.
///
/// ```bash
/// lexbot bot create --name TestBotPrototype --locale pt_BR
/// ```
pub async fn create_bot(
    state: &AppState,
    name: Option<String>,
    alias: Option<String>,
    locale: Option<String>,
    json: bool,
) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Bot name")
            .interact_text()?,
    };
    let alias = alias.unwrap_or_else(|| format!("{name}Alias"));
    let locale = locale
        .or_else(|| state.config.locale.clone())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

    let request = CreateBotRequest {
        bot_name: name.clone(),
        alias_name: alias,
        locale: LocaleId::new(locale),
        role_arn: state.config.require_role_arn()?,
        idle_session_ttl_secs: state.config.provisioning.idle_session_ttl_secs,
        nlu_confidence_threshold: state.config.provisioning.nlu_confidence_threshold,
    };

    let service = state.provisioning_service()?;
    let span = tracing::info_span!(
        "lexbot.bot.create",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_CREATE_BOT,
        { bot_attrs::CLOUD_REGION } = %state.config.region,
        { bot_attrs::BOT_LOCALE } = %request.locale,
    );

    let progress = spinner(&format!("Creating bot {name} (this takes a few minutes)..."));
    let provisioned = service.create_bot(&request).instrument(span).await;
    progress.finish_and_clear();
    let provisioned = provisioned?;

    let target = &provisioned.target;
    if json {
        let out = serde_json::json!({
            "bot_id": target.bot_id,
            "bot_name": target.bot_name,
            "alias_id": target.alias_id,
            "alias_name": target.alias_name,
            "locale": target.locale,
            "version": provisioned.version,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Bot created successfully!", style("✓").green().bold());
    println!();
    println!("  {}      {}", style("Name:").bold(), style(&target.bot_name).cyan());
    println!("  {}        {}", style("ID:").bold(), target.bot_id);
    println!(
        "  {}     {} ({})",
        style("Alias:").bold(),
        target.alias_name,
        style(&target.alias_id).dim()
    );
    println!("  {}    {}", style("Locale:").bold(), target.locale);
    println!("  {}   {}", style("Version:").bold(), provisioned.version);
    println!();
    println!("  Add to your .env:");
    println!("    {}", style(format!("BOT_ID={}", target.bot_id)).yellow());
    println!("    {}", style(format!("BOT_NAME={}", target.bot_name)).yellow());
    println!("    {}", style(format!("BOT_ALIAS_ID={}", target.alias_id)).yellow());
    println!("    {}", style(format!("BOT_ALIAS_NAME={}", target.alias_name)).yellow());
    println!("    {}", style(format!("BOT_LOCALE_ID={}", target.locale)).yellow());
    println!();

    Ok(())
}

/// Show a bot, and its alias when one is configured.
pub async fn show_bot(state: &AppState, bot_id: Option<String>, json: bool) -> Result<()> {
    let bot_id = match bot_id {
        Some(id) => BotId::new(id),
        None => state.config.require_bot_id()?,
    };
    let service = state.provisioning_service()?;
    let bot = service.get_bot(&bot_id).await?;

    let alias_id = state
        .config
        .alias_id
        .as_deref()
        .filter(|_| state.config.bot_id.as_deref() == Some(bot_id.as_str()));
    let target = match alias_id {
        Some(alias_id) => {
            let locale = LocaleId::new(
                state
                    .config
                    .locale
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            );
            Some(
                service
                    .resolve_target(&bot_id, &AliasId::new(alias_id), &locale)
                    .await?,
            )
        }
        None => None,
    };

    if json {
        let out = serde_json::json!({ "bot": bot, "target": target });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Name:").bold(), style(&bot.bot_name).cyan());
    println!("  {}    {}", style("ID:").bold(), bot.bot_id);
    println!("  {} {}", style("Status:").bold(), bot.bot_status);
    if let Some(description) = &bot.description {
        println!("  {}  {}", style("Desc:").bold(), description);
    }
    if let Some(latest) = &bot.latest_bot_version {
        println!("  {} {}", style("Latest:").bold(), latest);
    }
    println!(
        "  {} {}",
        style("Updated:").bold(),
        format_timestamp(bot.last_updated_at())
    );
    if let Some(target) = target {
        println!(
            "  {}  {} ({})",
            style("Alias:").bold(),
            target.alias_name,
            style(&target.alias_id).dim()
        );
    }
    println!();

    Ok(())
}

/// Delete a bot after confirmation.
pub async fn delete_bot(state: &AppState, bot_id: &str, force: bool, json: bool) -> Result<()> {
    let bot_id = BotId::new(bot_id);
    let service = state.provisioning_service()?;

    if !force && !json {
        let bot = service.get_bot(&bot_id).await?;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete bot '{}' ({}) with all its versions and aliases?",
                bot.bot_name, bot.bot_id
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let span = tracing::info_span!(
        "lexbot.bot.delete",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_DELETE_BOT,
        { bot_attrs::BOT_ID } = %bot_id,
    );
    let status = service.delete_bot(&bot_id).instrument(span).await?;

    if json {
        let out = serde_json::json!({ "bot_id": bot_id, "status": status });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Bot {} is {}",
        style("✓").green().bold(),
        style(&bot_id).cyan(),
        status
    );
    println!();
    Ok(())
}

/// Status of the configured bot and the version its alias serves.
pub async fn bot_status(state: &AppState, json: bool) -> Result<()> {
    let service = state.bot_service()?;
    let bot = service.status().await?;
    let serving = service.alias_version().await?;

    if json {
        let out = serde_json::json!({
            "bot_id": bot.bot_id,
            "bot_name": bot.bot_name,
            "status": bot.bot_status,
            "alias_id": service.target().alias_id,
            "alias_version": serving,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let serving = serving
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!();
    println!(
        "  {} {} ({})",
        style("Bot:").bold(),
        style(&bot.bot_name).cyan(),
        bot.bot_id
    );
    println!("  {} {}", style("Status:").bold(), bot.bot_status);
    println!(
        "  {} {} serves version {}",
        style("Alias:").bold(),
        service.target().alias_name,
        style(serving).yellow()
    );
    println!();
    Ok(())
}
