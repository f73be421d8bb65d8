use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::warn;

use crate::completion::provider::ProviderError;

#[derive(Debug)]
pub(crate) enum RequestFailure {
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
}

impl From<RequestFailure> for ProviderError {
    fn from(failure: RequestFailure) -> Self {
        match failure {
            RequestFailure::Request(source) => Self::Request(source),
            RequestFailure::Api { status, body } => Self::Api { status, body },
        }
    }
}

fn chat_request<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    api_key: &str,
    payload: &T,
    timeout_secs: Option<u64>,
) -> RequestBuilder {
    let request = client.post(url).header("api-key", api_key).json(payload);
    match timeout_secs {
        Some(timeout_secs) => request.timeout(Duration::from_secs(timeout_secs)),
        None => request,
    }
}

/// Sends one chat-completion request. Failures are returned as-is; nothing is retried.
pub(crate) fn send_chat_request<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    api_key: &str,
    payload: &T,
    timeout_secs: Option<u64>,
) -> Result<Response, RequestFailure> {
    let response = chat_request(client, url, api_key, payload, timeout_secs)
        .send()
        .map_err(RequestFailure::Request)?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().unwrap_or_default();
    warn!(%status, "completion endpoint rejected the request");
    Err(RequestFailure::Api { status, body })
}
