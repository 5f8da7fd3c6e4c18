//! One-utterance conversational turns.
//!
//! [`ConversationClient`] sends an utterance with the prior session state and
//! applies the turn rules in [`resolve_turn`] to the recognizer reply. The
//! session state is handed back to the caller; nothing is kept between turns.

use lexbot_types::conversation::{
    DialogActionType, RecognizedTurn, SessionId, SessionState, TurnResult,
};
use lexbot_types::error::{BotError, ResourceKind, ResourceRef};

use crate::client::BotRuntimeClient;

/// Generate a fresh session id (UUID v7, time-sortable).
pub fn new_session_id() -> SessionId {
    SessionId::new(uuid::Uuid::now_v7().to_string())
}

/// Apply the turn rules to a recognizer reply.
///
/// - The top interpretation names the intent. A top interpretation without
///   an intent resolves to no intent; lower-ranked entries never move up.
/// - Its confidence is used unless the bot is asking for confirmation
///   (`ConfirmIntent`), where the score is not meaningful.
/// - Only the first message becomes the response text, and only when that
///   message carries text.
pub fn resolve_turn(turn: RecognizedTurn) -> TurnResult {
    let RecognizedTurn {
        interpretations,
        dialog_action,
        messages,
        session_state,
    } = turn;

    let top = interpretations.into_iter().next();
    let confirming = matches!(dialog_action, Some(DialogActionType::ConfirmIntent));

    let (intent, confidence) = match top {
        Some(top) if top.intent_name.is_some() => {
            let confidence = if confirming { None } else { top.confidence };
            (top.intent_name, confidence)
        }
        _ => (None, None),
    };

    TurnResult {
        intent,
        confidence,
        dialog_action,
        session_state,
        response_text: messages.into_iter().next().and_then(|m| m.content),
    }
}

/// Sends conversational turns through one runtime backend.
pub struct ConversationClient<R: BotRuntimeClient> {
    runtime: R,
}

impl<R: BotRuntimeClient> ConversationClient<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub fn backend(&self) -> &str {
        self.runtime.name()
    }

    /// Send one utterance within `session_id`, continuing from `prior_state`.
    pub async fn send_turn(
        &self,
        session_id: &SessionId,
        utterance: &str,
        prior_state: &SessionState,
    ) -> Result<TurnResult, BotError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(BotError::MalformedInput(
                "utterance cannot be empty".to_string(),
            ));
        }

        tracing::debug!(
            backend = self.runtime.name(),
            session_id = %session_id,
            has_state = !prior_state.is_empty(),
            "sending turn"
        );

        let recognized = self
            .runtime
            .recognize_text(session_id, utterance, prior_state)
            .await
            .map_err(|e| {
                BotError::from_remote(
                    "recognize_text",
                    ResourceRef::new(ResourceKind::Session, session_id.as_str()),
                    e,
                )
            })?;

        let result = resolve_turn(recognized);
        tracing::info!(
            backend = self.runtime.name(),
            session_id = %session_id,
            intent = result.intent.as_deref().unwrap_or("-"),
            confidence = result.confidence_or_sentinel(),
            "turn resolved"
        );
        Ok(result)
    }
}
