//! Dialogflow CX adapters over the v3 REST API.
//!
//! - [`DialogflowSessionClient`]: conversational turns (`sessions:detectIntent`)
//! - [`DialogflowAgentsClient`]: agent creation and listing
//!
//! Both authenticate with an OAuth access token taken from
//! `DIALOGFLOW_ACCESS_TOKEN`.

mod agents;
mod sessions;

pub use agents::DialogflowAgentsClient;
pub use sessions::DialogflowSessionClient;

use reqwest::Url;
use secrecy::SecretString;

use lexbot_types::error::RemoteError;

pub const ACCESS_TOKEN_VAR: &str = "DIALOGFLOW_ACCESS_TOKEN";

/// Read the OAuth access token from `DIALOGFLOW_ACCESS_TOKEN`.
pub fn access_token_from_env() -> Result<SecretString, RemoteError> {
    std::env::var(ACCESS_TOKEN_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| RemoteError::Credentials(format!("{ACCESS_TOKEN_VAR} is not set")))
}

/// Regional API host for an agent location.
fn default_base_url(location: &str) -> String {
    if location == "global" {
        "https://dialogflow.googleapis.com".to_string()
    } else {
        format!("https://{location}-dialogflow.googleapis.com")
    }
}

/// Parse the API base, falling back to the regional host for `location`.
fn base_url(endpoint: Option<String>, location: &str) -> Result<Url, RemoteError> {
    let raw = endpoint.unwrap_or_else(|| default_base_url(location));
    let url = Url::parse(&raw)
        .map_err(|e| RemoteError::Unavailable(format!("invalid endpoint {raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(RemoteError::Unavailable(format!(
            "endpoint {raw} cannot be used as a base URL"
        )));
    }
    Ok(url)
}

/// `{base}/v3/{resource}/{tail...}` with every segment percent-encoded.
///
/// `resource` is a resource name such as `projects/p/locations/l`; it is
/// split on `/` so its separators stay separators. `tail` segments are
/// pushed whole, so a `/` inside one is encoded.
fn api_url(base: &Url, resource: &str, tail: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("v3");
        segments.extend(resource.split('/'));
        segments.extend(tail);
    }
    url
}
