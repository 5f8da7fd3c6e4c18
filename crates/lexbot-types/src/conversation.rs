//! Conversation turn types.
//!
//! A session is identified by a caller-chosen id. The service hands back an
//! opaque session state on every turn; the caller threads it into the next
//! turn to keep multi-turn context. Nothing here persists it.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Caller-chosen conversation session id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session state returned by the service, fed back on the next turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(pub Option<serde_json::Value>);

impl SessionState {
    /// State for the first turn of a session.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        self.0.as_ref()
    }
}

/// What the bot will do next, as reported in the session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogActionType {
    Close,
    ConfirmIntent,
    Delegate,
    ElicitIntent,
    ElicitSlot,
    /// The service returned `None`.
    None,
    /// Any action type this crate does not know about.
    #[serde(untagged)]
    Other(String),
}

impl DialogActionType {
    pub fn as_str(&self) -> &str {
        match self {
            DialogActionType::Close => "Close",
            DialogActionType::ConfirmIntent => "ConfirmIntent",
            DialogActionType::Delegate => "Delegate",
            DialogActionType::ElicitIntent => "ElicitIntent",
            DialogActionType::ElicitSlot => "ElicitSlot",
            DialogActionType::None => "None",
            DialogActionType::Other(s) => s,
        }
    }
}

impl fmt::Display for DialogActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialogActionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Close" => DialogActionType::Close,
            "ConfirmIntent" => DialogActionType::ConfirmIntent,
            "Delegate" => DialogActionType::Delegate,
            "ElicitIntent" => DialogActionType::ElicitIntent,
            "ElicitSlot" => DialogActionType::ElicitSlot,
            "None" => DialogActionType::None,
            other => DialogActionType::Other(other.to_string()),
        })
    }
}

/// One ranked interpretation of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// `None` when the service ranked an interpretation without an intent.
    pub intent_name: Option<String>,
    /// `None` when the service did not score this interpretation.
    pub confidence: Option<f64>,
}

/// One message the bot wants shown to the user.
///
/// Card and payload messages carry no text `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A recognizer reply reshaped out of the vendor wire format, before the
/// turn rules are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedTurn {
    /// Interpretations, best first, in the order the service ranked them.
    pub interpretations: Vec<Interpretation>,
    pub dialog_action: Option<DialogActionType>,
    /// Messages in reply order, including ones without text.
    pub messages: Vec<BotMessage>,
    pub session_state: SessionState,
}

/// Result of one conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Resolved intent (top interpretation), if any.
    pub intent: Option<String>,
    /// Confidence of the top interpretation. Undefined while the bot is
    /// asking the user to confirm, or when nothing was recognized.
    pub confidence: Option<f64>,
    pub dialog_action: Option<DialogActionType>,
    /// State to hand back on the next turn of the same session.
    pub session_state: SessionState,
    /// First message of the reply.
    pub response_text: Option<String>,
}

impl TurnResult {
    /// Value reported when confidence is undefined.
    pub const CONFIDENCE_SENTINEL: f64 = -1.0;

    pub fn confidence_or_sentinel(&self) -> f64 {
        self.confidence.unwrap_or(Self::CONFIDENCE_SENTINEL)
    }

    /// `(intent, dialog action, confidence, response text)`.
    pub fn as_tuple(&self) -> (Option<&str>, Option<&str>, f64, Option<&str>) {
        (
            self.intent.as_deref(),
            self.dialog_action.as_ref().map(|a| a.as_str()),
            self.confidence_or_sentinel(),
            self.response_text.as_deref(),
        )
    }
}
