//! Amazon Lex V2 adapters over the AWS SDK: the models (management) API
//! and the runtime (conversation) API.
//!
//! Credentials, region and request signing come from one shared
//! [`SdkConfig`]. SDK-level retries are switched off; the workflow's
//! `RetryPolicy` decides what gets re-sent.

mod convert;
mod error;
mod models;
mod runtime;

pub use aws_config::SdkConfig;
pub use models::LexModelsClient;
pub use runtime::LexRuntimeClient;

use aws_config::{BehaviorVersion, Region};

/// Load the shared AWS configuration for `region` from the standard
/// sources (environment, shared config and credentials files, instance
/// metadata). Credentials resolve on the first call, not here.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

#[cfg(test)]
pub(crate) fn test_sdk_config(session_token: Option<&str>) -> SdkConfig {
    use aws_sdk_lexmodelsv2::config::{Credentials, SharedCredentialsProvider};

    SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            session_token.map(str::to_string),
            None,
            "test",
        )))
        .build()
}
