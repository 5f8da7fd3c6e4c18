//! Bot-management use cases.
//!
//! Services sequence the port calls in `crate::client` and depend on those
//! traits only, never on a concrete adapter.

pub mod agent;
pub mod bot;
pub mod provisioning;

use std::future::Future;

use lexbot_types::error::{BotError, RemoteError, ResourceRef};

use crate::retry::{RetryPolicy, with_retry};

/// Run a read-only remote call with bounded retry on transient failures.
pub(crate) async fn read_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    resource: ResourceRef,
    call: F,
) -> Result<T, BotError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let call = &call;
    let resource = &resource;
    with_retry(policy, operation, move || async move {
        call()
            .await
            .map_err(|e| BotError::from_remote(operation, resource.clone(), e))
    })
    .await
}
