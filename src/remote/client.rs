use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use tracing::{debug, info};

use super::sanitize::sanitize_images;
use crate::error::RemoteError;
use crate::models::UploadResponse;

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the per-installation client id
pub const SOURCE_HEADER: &str = "X-Source-UUID";

const PRODUCTION_API_HOST: &str = "api.runlog.io";
const PRODUCTION_SHARE_BASE: &str = "https://runlog.io/c/";
const LOCAL_SHARE_PAGE: &str = "http://localhost:8080/share.html?id=";

// Characters escaped when an id is placed in a URL path or query
const ID_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b':')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b']')
    .add(b'!');

/// Client for the conversation sharing API
#[derive(Debug, Clone)]
pub struct RemoteClient {
    endpoint: String,
    client_id: String,
    http: Client,
}

impl RemoteClient {
    pub fn new(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { endpoint, client_id: client_id.into(), http: Client::new() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload raw log content with images stripped
    ///
    /// # Errors
    ///
    /// - [`RemoteError::ServerError`] for a non-success status
    /// - [`RemoteError::Unreachable`] when no response arrives within [`UPLOAD_TIMEOUT`]
    /// - [`RemoteError::Decode`] when the success body is not an upload response
    pub fn upload(&self, content: &str) -> Result<UploadResponse, RemoteError> {
        let body = sanitize_images(content);
        debug!(bytes = body.len(), "uploading conversation");

        let response = self
            .http
            .post(format!("{}/conversations", self.endpoint))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .header(SOURCE_HEADER, &self.client_id)
            .timeout(UPLOAD_TIMEOUT)
            .body(body)
            .send()
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(upload_status_error(status, &text));
        }

        let uploaded: UploadResponse = serde_json::from_str(&text)?;
        info!(id = %uploaded.id, "conversation uploaded");
        Ok(uploaded)
    }

    /// Delete a previously uploaded conversation
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Unauthorized`] when the record belongs to another client
    /// - [`RemoteError::NotFound`] when the id is unknown
    /// - [`RemoteError::ServerError`] for any other non-success status
    /// - [`RemoteError::Unreachable`] when no response arrives within [`DELETE_TIMEOUT`]
    pub fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(format!("{}/conversations/{}", self.endpoint, encode_id(id)))
            .header(SOURCE_HEADER, &self.client_id)
            .timeout(DELETE_TIMEOUT)
            .send()
            .map_err(map_send_error)?;

        let status = response.status();
        if status.is_success() {
            info!(id, "conversation deleted");
            return Ok(());
        }

        Err(delete_status_error(status, &body_text(response)))
    }

    /// Public URL where an uploaded conversation can be viewed
    pub fn share_url(&self, id: &str) -> String {
        share_url(&self.endpoint, id)
    }
}

/// Derive the share page URL for `id` from the API endpoint
///
/// The production API maps to the public site, any localhost endpoint to the local
/// share page, and other hosts drop their `api.` prefix.
pub fn share_url(endpoint: &str, id: &str) -> String {
    let id = encode_id(id);
    if endpoint.contains(PRODUCTION_API_HOST) {
        format!("{}{}", PRODUCTION_SHARE_BASE, id)
    } else if endpoint.contains("localhost") {
        format!("{}{}", LOCAL_SHARE_PAGE, id)
    } else {
        let ui_host = endpoint
            .trim_end_matches('/')
            .replacen("https://api.", "https://", 1)
            .replacen("http://api.", "http://", 1);
        format!("{}/c/{}", ui_host, id)
    }
}

/// Error message from a JSON error body: `error`, else `errors` joined, else a fallback
pub fn server_error_message(body: &str) -> String {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    if let Some(error) = value.get("error").and_then(Value::as_str)
        && !error.is_empty()
    {
        return error.to_string();
    }

    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        let joined = errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        if !joined.is_empty() {
            return joined;
        }
    }

    "Unknown server error".to_string()
}

pub(crate) fn upload_status_error(status: StatusCode, body: &str) -> RemoteError {
    RemoteError::ServerError { status: status.as_u16(), message: server_error_message(body) }
}

pub(crate) fn delete_status_error(status: StatusCode, body: &str) -> RemoteError {
    match status {
        StatusCode::FORBIDDEN => {
            RemoteError::Unauthorized("You can only delete records you uploaded".to_string())
        }
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        _ => upload_status_error(status, body),
    }
}

fn map_send_error(error: reqwest::Error) -> RemoteError {
    if error.is_connect() || error.is_timeout() {
        RemoteError::Unreachable { source: error }
    } else {
        RemoteError::Transport(error)
    }
}

fn body_text(response: Response) -> String {
    response.text().unwrap_or_default()
}

fn encode_id(id: &str) -> String {
    utf8_percent_encode(id, ID_ENCODE_SET).to_string()
}
