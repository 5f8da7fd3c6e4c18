//! Infrastructure layer for lexbot.
//!
//! Implements the bot service ports defined in `lexbot-core`: the Lex V2
//! models and runtime APIs through the AWS SDK, and the Dialogflow CX
//! `detectIntent` runtime and agent administration over REST. Also loads
//! configuration from `config.toml`, `.env` and the environment.

pub mod config;
pub mod dialogflow;
pub mod http;
pub mod lex;
