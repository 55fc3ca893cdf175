//! Shared HTTP plumbing for the endpoint modules.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, Instrument, Span};

use crate::BackendError;

/// Joins the configured base with an endpoint path after validating that
/// the base is an absolute http(s) URL.
///
/// # Errors
/// Returns an error if the base cannot be parsed, has no host, or uses an
/// unsupported scheme.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<String, BackendError> {
    let url = url::Url::parse(base).map_err(|err| BackendError::Config(err.to_string()))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(BackendError::Config(format!(
            "unsupported scheme {scheme}"
        )));
    }
    if url.host().is_none() {
        return Err(BackendError::Config("no host specified".to_string()));
    }

    let endpoint = format!("{}{}", base.trim_end_matches('/'), path);
    debug!("endpoint URL: {endpoint}");

    Ok(endpoint)
}

/// The identity and data APIs disagree on the error field name; take the
/// first one present.
pub(crate) fn error_message(json_response: &Value) -> Option<&str> {
    for key in ["error_description", "msg", "message", "error"] {
        if let Some(text) = json_response.get(key).and_then(Value::as_str) {
            return Some(text);
        }
    }
    None
}

/// Sends the request inside the given span and turns non-success statuses
/// into [`BackendError::Api`] with the message extracted from the body.
pub(crate) async fn send(builder: RequestBuilder, span: Span) -> Result<Response, BackendError> {
    let response = builder.send().instrument(span).await?;

    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = error_message(&body)
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"));

    Err(BackendError::Api { status, message })
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|err| BackendError::Decode(err.to_string()))
}
