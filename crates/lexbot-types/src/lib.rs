//! Shared domain types for lexbot.
//!
//! Bots, versions, aliases, intents, slots, Dialogflow agents, conversation
//! turns, remote status, configuration and the error taxonomy. No I/O lives
//! here.

pub mod agent;
pub mod bot;
pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod report;
pub mod status;
