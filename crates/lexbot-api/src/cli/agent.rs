//! Dialogflow CX agent commands: create and list.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tracing::Instrument;

use lexbot_observe::bot_attrs;
use lexbot_types::agent::NewAgent;

use super::spinner;
use crate::state::AppState;

pub async fn create_agent(
    state: &AppState,
    project: Option<String>,
    location: &str,
    agent: NewAgent,
    json: bool,
) -> Result<()> {
    let service = state.agent_service(project, location)?;
    let span = tracing::info_span!(
        "lexbot.create_agent",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_CREATE_AGENT,
        { bot_attrs::AGENT_PARENT } = %service.parent(),
    );

    let progress = spinner(&format!("Creating agent {}...", agent.display_name));
    let created = service.create_agent(&agent).instrument(span).await;
    progress.finish_and_clear();
    let created = created?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Agent {} created",
        style("✓").green().bold(),
        style(&created.display_name).cyan()
    );
    println!("  {}", style(&created.name).dim());
    println!();
    Ok(())
}

pub async fn list_agents(
    state: &AppState,
    project: Option<String>,
    location: &str,
    json: bool,
) -> Result<()> {
    let service = state.agent_service(project, location)?;
    let agents = service.list_agents().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agents)?);
        return Ok(());
    }
    if agents.is_empty() {
        println!();
        println!(
            "  {} No agents found in {}.",
            style("i").blue().bold(),
            service.parent()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Language").fg(Color::White),
        Cell::new("Time Zone").fg(Color::White),
    ]);
    for agent in &agents {
        table.add_row(vec![
            Cell::new(&agent.display_name).fg(Color::Cyan),
            Cell::new(agent.agent_id()),
            Cell::new(agent.default_language_code.as_deref().unwrap_or("-")),
            Cell::new(agent.time_zone.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    Ok(())
}
