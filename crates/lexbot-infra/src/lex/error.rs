//! AWS SDK failures mapped onto [`RemoteError`].

use aws_sdk_lexmodelsv2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use lexbot_types::error::RemoteError;

use crate::http::status_error;

/// Classify a failed SDK call.
///
/// Service responses go through the same status table as the REST
/// adapters. Timeouts, I/O failures and unreadable responses are
/// transient; anything the SDK refused to send is a rejection.
pub(crate) fn remote_error<E>(err: SdkError<E>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            let service_err = context.err();
            let code = service_err.code().unwrap_or("Unknown").to_string();
            let message = service_err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            tracing::warn!(status, code = %code, message = %message, "lex error response");
            status_error(status, code, message)
        }
        SdkError::TimeoutError(_) => {
            RemoteError::Unavailable(format!("request timed out: {}", DisplayErrorContext(&err)))
        }
        SdkError::DispatchFailure(failure) if failure.is_io() || failure.is_timeout() => {
            RemoteError::Unavailable(format!("request failed: {}", DisplayErrorContext(&err)))
        }
        SdkError::ResponseError(_) => RemoteError::Unavailable(format!(
            "unreadable response: {}",
            DisplayErrorContext(&err)
        )),
        _ => RemoteError::Rejected {
            status: 0,
            code: "RequestNotSent".to_string(),
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

/// A request that could not be assembled from local input.
pub(crate) fn invalid_request(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::Rejected {
        status: 0,
        code: "InvalidRequest".to_string(),
        message: err.to_string(),
    }
}

/// A response missing a field the service documents as always present.
pub(crate) fn missing(field: &str) -> RemoteError {
    RemoteError::Deserialization(format!("response has no {field}"))
}
