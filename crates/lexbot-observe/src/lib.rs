//! Observability for lexbot: subscriber setup and the attribute names used
//! on bot-service spans.

pub mod bot_attrs;
pub mod tracing_setup;
