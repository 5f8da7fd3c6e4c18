//! CLI command definitions for the `lexbot` binary.
//!
//! Uses clap derive macros for argument parsing. Bot identity (bot id,
//! alias, locale) comes from the environment or `config.toml`, so most
//! commands take no positional arguments.

pub mod agent;
pub mod bot;
pub mod chat;
pub mod list;
pub mod release;

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use comfy_table::{Cell, Color};
use indicatif::{ProgressBar, ProgressStyle};

use lexbot_types::status::BotStatus;

/// Manage Amazon Lex V2 bots: intents, builds, releases and conversations.
#[derive(Parser)]
#[command(name = "lexbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bot lifecycle (create, show, delete, status).
    Bot {
        #[command(subcommand)]
        action: BotCommand,
    },

    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Upsert every intent (and its slots) from an intent-definition file
    /// into the draft, then build the locale.
    Upload {
        /// Path to the JSON intent-definition file.
        file: std::path::PathBuf,

        /// Upload only; do not start a build.
        #[arg(long)]
        no_build: bool,
    },

    /// Build the draft locale and wait for it to finish.
    Build,

    /// Snapshot the draft into a new version and point the alias at it.
    Publish {
        /// Version description (default: "Version with intents uploaded on ...").
        #[arg(short, long)]
        description: Option<String>,

        /// Create the version without repointing the alias.
        #[arg(long)]
        no_repoint: bool,
    },

    /// Point the alias at an existing version.
    Repoint {
        /// Version number to serve.
        #[arg(id = "version_number", value_name = "VERSION")]
        version: String,
    },

    /// Send one utterance and print the recognized turn.
    Say {
        /// The user utterance.
        text: String,

        /// Continue an existing session instead of starting a new one.
        #[arg(long)]
        session: Option<String>,

        #[arg(long, value_enum, default_value_t = Backend::Lex)]
        backend: Backend,
    },

    /// Interactive multi-turn conversation.
    Chat {
        #[arg(long, value_enum, default_value_t = Backend::Lex)]
        backend: Backend,
    },

    /// Dialogflow CX agents (create, list).
    Agent {
        #[command(subcommand)]
        action: AgentCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BotCommand {
    /// Create a bot with one locale, a first version and an alias.
    Create {
        /// Bot name (prompted when omitted).
        #[arg(long)]
        name: Option<String>,

        /// Alias name (default: "{name}Alias").
        #[arg(long)]
        alias: Option<String>,

        /// Locale to create (default: configured locale, else pt_BR).
        #[arg(long)]
        locale: Option<String>,
    },

    /// Show a bot and its alias.
    Show {
        /// Bot id (default: configured BOT_ID).
        bot_id: Option<String>,
    },

    /// Delete a bot and everything it owns.
    #[command(alias = "rm")]
    Delete {
        /// Bot id to delete.
        bot_id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Show the configured bot's status and the version its alias serves.
    Status,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Create an agent.
    Create {
        /// Agent display name.
        #[arg(long, default_value = "DialogFlowPythonAppPrototype")]
        name: String,

        /// Default language code.
        #[arg(long, default_value = "pt-br")]
        language: String,

        /// IANA time zone.
        #[arg(long, default_value = "America/Buenos_Aires")]
        time_zone: String,

        #[command(flatten)]
        parent: AgentParentArgs,
    },

    /// List agents in a project and location.
    List {
        #[command(flatten)]
        parent: AgentParentArgs,
    },
}

/// Where agents live. The project falls back to the `[dialogflow]` section.
#[derive(Debug, clap::Args)]
pub struct AgentParentArgs {
    /// Google Cloud project id.
    #[arg(long, env = "GOOGLE_PROJECT_ID")]
    pub project: Option<String>,

    /// Dialogflow location.
    #[arg(long, default_value = "global")]
    pub location: String,
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List every bot in the region.
    Bots,
    /// List versions of the configured bot.
    Versions,
    /// List aliases of the configured bot.
    Aliases,
    /// List intents in the draft locale.
    Intents,
    /// List slots of one intent in the draft locale.
    Slots {
        /// Intent name.
        intent: String,
    },
}

/// Runtime backend for conversational turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Lex,
    Dialogflow,
}

/// Spinner used while waiting on the bot service.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Colored table cell for a bot status.
pub(crate) fn status_cell(status: BotStatus) -> Cell {
    let color = match status {
        BotStatus::Available => Color::Green,
        BotStatus::Failed => Color::Red,
        s if s.is_transient() => Color::Yellow,
        BotStatus::Inactive | BotStatus::Deleting => Color::DarkGrey,
        _ => Color::White,
    };
    Cell::new(status.as_str()).fg(color)
}

/// Format a service timestamp (UTC).
pub(crate) fn format_timestamp(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match at {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_with_flags() {
        let cli = Cli::try_parse_from(["lexbot", "--json", "upload", "intents.json", "--no-build"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Upload { file, no_build } => {
                assert_eq!(file, std::path::PathBuf::from("intents.json"));
                assert!(no_build);
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn parses_say_with_backend() {
        let cli =
            Cli::try_parse_from(["lexbot", "say", "oi", "--backend", "dialogflow", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Say { text, backend, session } => {
                assert_eq!(text, "oi");
                assert_eq!(backend, Backend::Dialogflow);
                assert!(session.is_none());
            }
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn parses_list_slots() {
        let cli = Cli::try_parse_from(["lexbot", "ls", "slots", "OrderIntent"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List { resource: ListResource::Slots { ref intent } } if intent == "OrderIntent"
        ));
    }

    #[test]
    fn parses_agent_create_defaults() {
        let cli = Cli::try_parse_from(["lexbot", "agent", "create", "--project", "my-project"])
            .unwrap();
        match cli.command {
            Commands::Agent {
                action:
                    AgentCommand::Create {
                        name,
                        language,
                        time_zone,
                        parent,
                    },
            } => {
                assert_eq!(name, "DialogFlowPythonAppPrototype");
                assert_eq!(language, "pt-br");
                assert_eq!(time_zone, "America/Buenos_Aires");
                assert_eq!(parent.project.as_deref(), Some("my-project"));
                assert_eq!(parent.location, "global");
            }
            _ => panic!("expected agent create"),
        }
    }

    #[test]
    fn parses_agent_list_location() {
        let cli =
            Cli::try_parse_from(["lexbot", "agent", "list", "--location", "us-central1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Agent { action: AgentCommand::List { ref parent } } if parent.location == "us-central1"
        ));
    }

    #[test]
    fn repoint_requires_version() {
        assert!(Cli::try_parse_from(["lexbot", "repoint"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
