//! Conversation CLI commands: one-shot `say` and the interactive `chat` loop.

use anyhow::Result;
use console::style;
use dialoguer::Input;
use tracing::Instrument;

use lexbot_core::client::BotRuntimeClient;
use lexbot_core::conversation::{ConversationClient, new_session_id};
use lexbot_observe::bot_attrs;
use lexbot_types::conversation::{SessionId, SessionState, TurnResult};

use super::Backend;
use crate::state::AppState;

/// Lines that end an interactive chat.
const EXIT_COMMANDS: [&str; 3] = ["/quit", "/exit", "/q"];

pub async fn say(
    state: &AppState,
    text: &str,
    session: Option<String>,
    backend: Backend,
    json: bool,
) -> Result<()> {
    let session_id = session.map(SessionId::new).unwrap_or_else(new_session_id);
    match backend {
        Backend::Lex => say_with(&state.lex_conversation()?, &session_id, text, json).await,
        Backend::Dialogflow => {
            say_with(&state.dialogflow_conversation()?, &session_id, text, json).await
        }
    }
}

async fn say_with<R: BotRuntimeClient>(
    client: &ConversationClient<R>,
    session_id: &SessionId,
    text: &str,
    json: bool,
) -> Result<()> {
    let turn = send(client, session_id, text, &SessionState::empty()).await?;

    if json {
        let out = serde_json::json!({
            "session_id": session_id,
            "intent": turn.intent,
            "confidence": turn.confidence_or_sentinel(),
            "dialog_action": turn.dialog_action,
            "response": turn.response_text,
            "session_state": turn.session_state,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    print_turn(&turn);
    println!("  {}", style(format!("session {session_id}")).dim());
    println!();
    Ok(())
}

pub async fn chat(state: &AppState, backend: Backend) -> Result<()> {
    match backend {
        Backend::Lex => chat_with(&state.lex_conversation()?).await,
        Backend::Dialogflow => chat_with(&state.dialogflow_conversation()?).await,
    }
}

/// Read utterances until an exit command, threading the session state from
/// each turn into the next.
async fn chat_with<R: BotRuntimeClient>(client: &ConversationClient<R>) -> Result<()> {
    let session_id = new_session_id();
    let mut session_state = SessionState::empty();

    println!();
    println!(
        "  {} Chatting through {} (session {}). Type {} to leave.",
        style("●").green(),
        style(client.backend()).cyan(),
        style(&session_id).dim(),
        style("/quit").yellow()
    );
    println!();

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }

        match send(client, &session_id, line, &session_state).await {
            Ok(turn) => {
                print_turn(&turn);
                session_state = turn.session_state;
            }
            Err(err) => {
                println!("  {} {err}", style("✗").red().bold());
            }
        }
        println!();
    }

    Ok(())
}

async fn send<R: BotRuntimeClient>(
    client: &ConversationClient<R>,
    session_id: &SessionId,
    text: &str,
    prior_state: &SessionState,
) -> Result<TurnResult> {
    let span = tracing::info_span!(
        "lexbot.turn",
        { bot_attrs::LEXBOT_OPERATION } = bot_attrs::OP_TURN,
        { bot_attrs::LEXBOT_BACKEND } = client.backend(),
        { bot_attrs::SESSION_ID } = %session_id,
    );
    Ok(client
        .send_turn(session_id, text, prior_state)
        .instrument(span)
        .await?)
}

fn print_turn(turn: &TurnResult) {
    let intent = turn.intent.as_deref().unwrap_or("(none)");
    let confidence = match turn.confidence {
        Some(score) => format!("{score:.2}"),
        None => "-".to_string(),
    };
    let action = turn
        .dialog_action
        .as_ref()
        .map(|a| a.as_str())
        .unwrap_or("-");

    println!(
        "  {} {}",
        style("bot").cyan().bold(),
        turn.response_text.as_deref().unwrap_or("")
    );
    println!(
        "  {}",
        style(format!("intent {intent} · confidence {confidence} · action {action}")).dim()
    );
}
