//! lexbot CLI entry point.
//!
//! Binary name: `lexbot`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{AgentCommand, BotCommand, Cli, Commands, ListResource};
use lexbot_observe::tracing_setup::{directives_for, init_tracing, shutdown_tracing};
use lexbot_types::agent::NewAgent;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(directives_for(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "lexbot", &mut std::io::stdout());
        shutdown_tracing();
        return Ok(());
    }

    finally(
        async {
            let state = AppState::init().await?;
            run(&state, cli).await
        },
        shutdown_tracing,
    )
    .await
}

/// Await `work`, then run `cleanup` whether it succeeded or not.
async fn finally<T>(
    work: impl Future<Output = anyhow::Result<T>>,
    cleanup: impl FnOnce(),
) -> anyhow::Result<T> {
    let result = work.await;
    cleanup();
    result
}

async fn run(state: &AppState, cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Bot { action } => match action {
            BotCommand::Create {
                name,
                alias,
                locale,
            } => cli::bot::create_bot(state, name, alias, locale, json).await?,
            BotCommand::Show { bot_id } => cli::bot::show_bot(state, bot_id, json).await?,
            BotCommand::Delete { bot_id, force } => {
                cli::bot::delete_bot(state, &bot_id, force, json).await?
            }
            BotCommand::Status => cli::bot::bot_status(state, json).await?,
        },

        Commands::List { resource } => match resource {
            ListResource::Bots => cli::list::list_bots(state, json).await?,
            ListResource::Versions => cli::list::list_versions(state, json).await?,
            ListResource::Aliases => cli::list::list_aliases(state, json).await?,
            ListResource::Intents => cli::list::list_intents(state, json).await?,
            ListResource::Slots { intent } => cli::list::list_slots(state, &intent, json).await?,
        },

        Commands::Upload { file, no_build } => {
            cli::release::upload(state, &file, no_build, json).await?
        }

        Commands::Build => cli::release::build(state, json).await?,

        Commands::Publish {
            description,
            no_repoint,
        } => cli::release::publish(state, description.as_deref(), no_repoint, json).await?,

        Commands::Repoint { version } => cli::release::repoint(state, &version, json).await?,

        Commands::Say {
            text,
            session,
            backend,
        } => cli::chat::say(state, &text, session, backend, json).await?,

        Commands::Chat { backend } => cli::chat::chat(state, backend).await?,

        Commands::Agent { action } => match action {
            AgentCommand::Create {
                name,
                language,
                time_zone,
                parent,
            } => {
                let agent = NewAgent {
                    display_name: name,
                    default_language_code: language,
                    time_zone,
                };
                cli::agent::create_agent(state, parent.project, &parent.location, agent, json)
                    .await?
            }
            AgentCommand::List { parent } => {
                cli::agent::list_agents(state, parent.project, &parent.location, json).await?
            }
        },

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
