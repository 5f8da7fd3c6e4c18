//! Bot-management workflow and bot service port traits.
//!
//! This crate defines the "ports" ([`client::BotModelsClient`],
//! [`client::BotRuntimeClient`], [`client::AgentAdminClient`]) that the
//! infrastructure layer implements, and the workflow built on them: upsert,
//! publish/repoint, build polling, conversational turns and agent
//! administration. It depends only on `lexbot-types` -- never on
//! `lexbot-infra` or any HTTP crate.

pub mod build;
pub mod client;
pub mod conversation;
pub mod poll;
pub mod publish;
pub mod retry;
pub mod service;
pub mod upsert;

#[cfg(test)]
pub(crate) mod testing;
