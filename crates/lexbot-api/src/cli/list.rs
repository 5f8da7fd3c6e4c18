//! Listing commands: bots, versions, aliases, intents, slots.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use super::{format_timestamp, status_cell};
use crate::state::AppState;

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_empty(what: &str) {
    println!();
    println!("  {} No {what} found.", style("i").blue().bold());
    println!();
}

pub async fn list_bots(state: &AppState, json: bool) -> Result<()> {
    let bots = state.provisioning_service()?.list_bots().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bots)?);
        return Ok(());
    }
    if bots.is_empty() {
        print_empty("bots");
        return Ok(());
    }

    let mut table = table(&["Name", "ID", "Status", "Latest Version", "Updated"]);
    for bot in &bots {
        table.add_row(vec![
            Cell::new(&bot.bot_name).fg(Color::Cyan),
            Cell::new(&bot.bot_id),
            status_cell(bot.bot_status),
            Cell::new(bot.latest_bot_version.as_deref().unwrap_or("-")),
            Cell::new(format_timestamp(bot.last_updated_at())),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn list_versions(state: &AppState, json: bool) -> Result<()> {
    let versions = state.bot_service()?.list_versions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }
    if versions.is_empty() {
        print_empty("versions");
        return Ok(());
    }

    let mut table = table(&["Version", "Status", "Created", "Description"]);
    for version in &versions {
        table.add_row(vec![
            Cell::new(&version.bot_version),
            status_cell(version.bot_status),
            Cell::new(format_timestamp(version.created_at())),
            Cell::new(version.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn list_aliases(state: &AppState, json: bool) -> Result<()> {
    let aliases = state.bot_service()?.list_aliases().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&aliases)?);
        return Ok(());
    }
    if aliases.is_empty() {
        print_empty("aliases");
        return Ok(());
    }

    let mut table = table(&["Name", "ID", "Version", "Status"]);
    for alias in &aliases {
        table.add_row(vec![
            Cell::new(&alias.bot_alias_name).fg(Color::Cyan),
            Cell::new(&alias.bot_alias_id),
            Cell::new(
                alias
                    .bot_version
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            match alias.bot_alias_status {
                Some(status) => status_cell(status),
                None => Cell::new("-"),
            },
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn list_intents(state: &AppState, json: bool) -> Result<()> {
    let intents = state.bot_service()?.list_intents().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&intents)?);
        return Ok(());
    }
    if intents.is_empty() {
        print_empty("intents");
        return Ok(());
    }

    let mut table = table(&["Intent", "ID", "Description"]);
    for intent in &intents {
        table.add_row(vec![
            Cell::new(&intent.intent_name).fg(Color::Cyan),
            Cell::new(&intent.intent_id),
            Cell::new(intent.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn list_slots(state: &AppState, intent: &str, json: bool) -> Result<()> {
    let slots = state.bot_service()?.list_slots(intent).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }
    if slots.is_empty() {
        print_empty(&format!("slots on {intent}"));
        return Ok(());
    }

    let mut table = table(&["Slot", "ID", "Type", "Description"]);
    for slot in &slots {
        table.add_row(vec![
            Cell::new(&slot.slot_name).fg(Color::Cyan),
            Cell::new(&slot.slot_id),
            Cell::new(slot.slot_type_id.as_deref().unwrap_or("-")),
            Cell::new(slot.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}
