//! Shared reqwest plumbing: endpoint construction, response checking, and
//! content extraction.

use crate::backend::FetchedContent;
use docvault_config::VaultConfig;
use docvault_core::{constants::GENERIC_ERROR_MESSAGE, safe_file_name, Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

lazy_static! {
    static ref FILENAME_REGEX: Regex =
        Regex::new(r#"(?i)filename\*?\s*=\s*(?:UTF-8'')?"?([^";]+)"?"#).unwrap();
}

const OCTET_STREAM: &str = "application/octet-stream";

/// How one backend operation names itself in errors
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operation {
    pub name: &'static str,
    /// Message for a 403
    pub forbidden: &'static str,
    /// Message when the server supplies none
    pub fallback: &'static str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Append path segments to the API base URL, percent-encoding each
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::configuration(format!(
                    "API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, mapping transport failures to `Error::Network`.
    ///
    /// Errors and logs name the operation rather than the URL, which may
    /// carry a capability token.
    pub async fn send(&self, request: RequestBuilder, operation: Operation) -> Result<Response> {
        request.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::warn!(
                operation = operation.name,
                error = %e,
                "request did not reach the server"
            );
            Error::network(operation.name, e.to_string())
        })
    }
}

/// Turn a non-success response into the matching error kind
pub(crate) async fn check(response: Response, operation: Operation) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(Error::unauthorized(operation.name)),
        StatusCode::FORBIDDEN => Err(Error::forbidden(operation.name, operation.forbidden)),
        _ => {
            let message = server_message(response).await;
            tracing::debug!(
                operation = operation.name,
                status = status.as_u16(),
                ?message,
                "backend rejected request"
            );
            Err(Error::service(
                operation.name,
                Some(status.as_u16()),
                message.unwrap_or_else(|| operation.fallback.to_string()),
            ))
        }
    }
}

async fn server_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let parsed: ErrorBody = serde_json::from_str(&body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty() && m != GENERIC_ERROR_MESSAGE)
}

/// Read the body and the headers the viewer and download paths care about
pub(crate) async fn read_content(
    response: Response,
    operation: Operation,
) -> Result<FetchedContent> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| {
            Error::network(
                operation.name,
                format!("body read failed: {}", e.without_url()),
            )
        })?;

    Ok(FetchedContent {
        bytes,
        content_type,
        filename,
    })
}

/// Extract the filename from a `Content-Disposition` value.
///
/// Only the final path component survives, so a hint can never name a
/// file outside the directory it is saved into.
pub(crate) fn filename_from_disposition(value: &str) -> Option<String> {
    FILENAME_REGEX
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| safe_file_name(m.as_str()))
}
