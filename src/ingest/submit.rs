use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::UploadConfig;
use crate::error::IngestError;

pub const FALLBACK_REJECTION_MESSAGE: &str = "Failed to upload archive";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while uploading archive";
pub const FALLBACK_ACCEPTED_MESSAGE: &str = "Archive uploaded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub status: u16,
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait ArchiveSubmitter {
    fn submit(&self, document: &Value) -> Result<SubmitResponse, IngestError>;
}

/// `message` from a JSON response body, if the body is JSON and carries one.
pub fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}

pub fn upload_url(base_url: &str, endpoint_path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint_path)
}

pub struct HttpSubmitter {
    client: Client,
    url: String,
    cookie: Option<String>,
}

impl HttpSubmitter {
    pub fn new(cfg: &UploadConfig) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|err| IngestError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            url: upload_url(&cfg.base_url, &cfg.endpoint_path),
            cookie: cfg.session_cookie.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ArchiveSubmitter for HttpSubmitter {
    fn submit(&self, document: &Value) -> Result<SubmitResponse, IngestError> {
        let body = serde_json::to_vec(document)
            .map_err(|err| IngestError::Transport(format!("failed to encode archive: {err}")))?;
        debug!(url = %self.url, bytes = body.len(), "posting archive");

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().map_err(|err| {
            error!(url = %self.url, error = %err, "error uploading archive");
            IngestError::Transport(err.to_string())
        })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|err| IngestError::Transport(err.to_string()))?;

        Ok(SubmitResponse {
            status,
            message: extract_message(&text),
        })
    }
}
