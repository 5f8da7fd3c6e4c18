use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::status::BotStatus;

/// Errors raised by a bot service adapter for a single remote call.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The service refused the request (validation, conflict, quota, ...).
    #[error("request rejected (HTTP {status}, {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    /// Network failure, timeout, throttling or a 5xx. Safe to retry.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("credentials error: {0}")]
    Credentials(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }
}

/// Kind of remote resource an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bot,
    Locale,
    Version,
    Alias,
    Intent,
    Slot,
    Session,
    Agent,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Bot => write!(f, "bot"),
            ResourceKind::Locale => write!(f, "locale"),
            ResourceKind::Version => write!(f, "version"),
            ResourceKind::Alias => write!(f, "alias"),
            ResourceKind::Intent => write!(f, "intent"),
            ResourceKind::Slot => write!(f, "slot"),
            ResourceKind::Session => write!(f, "session"),
            ResourceKind::Agent => write!(f, "agent"),
        }
    }
}

/// Which resource an error is about: kind, name, and the id of its parent
/// scope (bot id for intents, intent id for slots).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub parent: Option<String>,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            parent: None,
        }
    }

    pub fn in_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} '{}' (in {})", self.kind, self.name, parent),
            None => write!(f, "{} '{}'", self.kind, self.name),
        }
    }
}

/// Errors surfaced by the bot-management workflow.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("{operation} {resource} rejected: {message}")]
    RemoteRejected {
        operation: &'static str,
        resource: ResourceRef,
        message: String,
    },

    #[error("{operation}: {resource} not found")]
    NotFound {
        operation: &'static str,
        resource: ResourceRef,
    },

    #[error("{operation}: bot service unavailable: {message}")]
    TransientUnavailable {
        operation: &'static str,
        message: String,
    },

    #[error("build of bot '{bot_id}' locale '{locale}' failed")]
    BuildFailed { bot_id: String, locale: String },

    #[error("gave up waiting after {waited:?}; last status was {last_status}")]
    PollTimeout {
        waited: Duration,
        last_status: BotStatus,
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    /// Attach operation and resource context to an adapter error.
    pub fn from_remote(operation: &'static str, resource: ResourceRef, err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(_) => BotError::NotFound {
                operation,
                resource,
            },
            RemoteError::Unavailable(message) => BotError::TransientUnavailable {
                operation,
                message: format!("{resource}: {message}"),
            },
            RemoteError::Rejected { .. }
            | RemoteError::Deserialization(_)
            | RemoteError::Credentials(_) => BotError::RemoteRejected {
                operation,
                resource,
                message: err.to_string(),
            },
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, BotError::TransientUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_display() {
        let r = ResourceRef::new(ResourceKind::Slot, "PickupDate").in_parent("INTENT123");
        assert_eq!(r.to_string(), "slot 'PickupDate' (in INTENT123)");
    }

    #[test]
    fn test_from_remote_rejected_keeps_context() {
        let err = BotError::from_remote(
            "create_intent",
            ResourceRef::new(ResourceKind::Intent, "GreetIntent").in_parent("BOT1"),
            RemoteError::Rejected {
                status: 409,
                code: "ConflictException".to_string(),
                message: "name in use".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("create_intent"));
        assert!(msg.contains("GreetIntent"));
        assert!(msg.contains("BOT1"));
        assert!(msg.contains("name in use"));
    }

    #[test]
    fn test_from_remote_not_found() {
        let err = BotError::from_remote(
            "describe_bot",
            ResourceRef::new(ResourceKind::Bot, "X1"),
            RemoteError::NotFound("no such bot".to_string()),
        );
        assert!(matches!(err, BotError::NotFound { .. }));
    }

    #[test]
    fn test_from_remote_unavailable_is_transient() {
        let err = BotError::from_remote(
            "list_intents",
            ResourceRef::new(ResourceKind::Intent, "*"),
            RemoteError::Unavailable("timed out".to_string()),
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_build_failed_display() {
        let err = BotError::BuildFailed {
            bot_id: "X1".to_string(),
            locale: "pt_BR".to_string(),
        };
        assert_eq!(err.to_string(), "build of bot 'X1' locale 'pt_BR' failed");
    }
}
