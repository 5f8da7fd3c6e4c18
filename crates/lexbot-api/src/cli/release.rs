//! Release CLI commands: upload intents, build, publish, repoint.

use std::path::Path;

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tracing::Instrument;

use lexbot_core::poll::StableStatus;
use lexbot_observe::bot_attrs;
use lexbot_types::bot::BotVersion;
use lexbot_types::report::{ItemOutcome, UpsertAction, UploadReport};

use super::spinner;
use crate::state::AppState;

/// Upload an intent-definition file into the draft, then build unless
/// `no_build`. Exits non-zero when any intent or slot failed.
pub async fn upload(state: &AppState, file: &Path, no_build: bool, json: bool) -> Result<()> {
    let service = state.bot_service()?;
    let target = service.target();
    let span = tracing::info_span!(
        "lexbot.upload",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_UPLOAD,
        { bot_attrs::BOT_ID } = %target.bot_id,
        { bot_attrs::BOT_LOCALE } = %target.locale,
    );

    let progress = spinner(&format!("Uploading intents from {}...", file.display()));
    let result = if no_build {
        service
            .upload_intents_from_file(file)
            .instrument(span)
            .await
            .map(|report| (report, None))
    } else {
        service
            .upload_and_build(file)
            .instrument(span)
            .await
            .map(|run| (run.report, run.build))
    };
    progress.finish_and_clear();
    let (report, build) = result?;

    if json {
        let out = serde_json::json!({
            "items": report.items,
            "succeeded": report.succeeded(),
            "build_status": build.map(|b| b.status),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_report(&report);
        match build {
            Some(build) => print_build(&build),
            None if no_build => {}
            None => println!(
                "  {} Build skipped because some items failed.",
                style("!").yellow().bold()
            ),
        }
        println!();
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} item(s) were not uploaded");
    }
    Ok(())
}

fn print_report(report: &UploadReport) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Kind").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Intent").fg(Color::White),
        Cell::new("Outcome").fg(Color::White),
        Cell::new("Detail").fg(Color::White),
    ]);

    for item in &report.items {
        let (outcome, detail) = match &item.outcome {
            ItemOutcome::Succeeded { id, action } => {
                let label = match action {
                    UpsertAction::Created => "created",
                    UpsertAction::Updated => "updated",
                };
                (Cell::new(label).fg(Color::Green), id.clone())
            }
            ItemOutcome::Failed { error } => (Cell::new("failed").fg(Color::Red), error.clone()),
            ItemOutcome::Skipped { reason } => {
                (Cell::new("skipped").fg(Color::Yellow), reason.clone())
            }
        };
        table.add_row(vec![
            Cell::new(&item.kind),
            Cell::new(&item.name).fg(Color::Cyan),
            Cell::new(item.parent.as_deref().unwrap_or("")),
            outcome,
            Cell::new(detail),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} of {} items uploaded",
        style(report.succeeded()).bold(),
        report.items.len()
    );
}

fn print_build(build: &StableStatus) {
    println!(
        "  {} Build finished: {} (after {} status checks)",
        style("✓").green().bold(),
        style(build.status).cyan(),
        build.queries
    );
}

/// Build the draft locale of the configured bot.
pub async fn build(state: &AppState, json: bool) -> Result<()> {
    let service = state.bot_service()?;
    let target = service.target();
    let span = tracing::info_span!(
        "lexbot.build",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_BUILD,
        { bot_attrs::BOT_ID } = %target.bot_id,
        { bot_attrs::BOT_LOCALE } = %target.locale,
    );

    let progress = spinner(&format!("Building {} locale {}...", target.bot_name, target.locale));
    let build = service.build().instrument(span).await;
    progress.finish_and_clear();
    let build = build?;

    if json {
        let out = serde_json::json!({
            "status": build.status,
            "queries": build.queries,
            "waits": build.waits,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_build(&build);
        println!();
    }
    Ok(())
}

/// Publish the draft as a new version; unless `no_repoint`, make the alias
/// serve it.
pub async fn publish(
    state: &AppState,
    description: Option<&str>,
    no_repoint: bool,
    json: bool,
) -> Result<()> {
    let service = state.bot_service()?;
    let target = service.target();
    let span = tracing::info_span!(
        "lexbot.publish",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_PUBLISH,
        { bot_attrs::BOT_ID } = %target.bot_id,
        { bot_attrs::BOT_ALIAS_ID } = %target.alias_id,
    );

    let progress = spinner("Publishing a new version...");
    let outcome = if no_repoint {
        let description = description
            .map(str::to_string)
            .unwrap_or_else(lexbot_core::service::bot::default_release_description);
        service
            .publish(&description)
            .instrument(span)
            .await
            .map(|version| (version, None))
    } else {
        service
            .publish_release(description)
            .instrument(span)
            .await
            .map(|release| (release.version, Some(release.alias)))
    };
    progress.finish_and_clear();
    let (version, alias) = outcome?;

    if json {
        let out = serde_json::json!({ "version": version, "alias": alias });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Published version {}",
        style("✓").green().bold(),
        style(&version).cyan()
    );
    if let Some(alias) = alias {
        println!(
            "  {} Alias {} now serves version {}",
            style("✓").green().bold(),
            alias.bot_alias_name,
            style(&version).cyan()
        );
    }
    println!();
    Ok(())
}

/// Point the alias at an existing version.
pub async fn repoint(state: &AppState, version: &str, json: bool) -> Result<()> {
    let version: BotVersion = version.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let service = state.bot_service()?;
    let target = service.target();
    let span = tracing::info_span!(
        "lexbot.repoint",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_REPOINT,
        { bot_attrs::BOT_ALIAS_ID } = %target.alias_id,
        { bot_attrs::BOT_VERSION } = %version,
    );

    let progress = spinner(&format!("Pointing {} at version {version}...", target.alias_name));
    let alias = service.repoint(&version).instrument(span).await;
    progress.finish_and_clear();
    let alias = alias?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alias)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Alias {} now serves version {}",
        style("✓").green().bold(),
        alias.bot_alias_name,
        style(&version).cyan()
    );
    println!();
    Ok(())
}
