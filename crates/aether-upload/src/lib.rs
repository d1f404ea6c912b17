#![warn(missing_docs)]
//! # aether-upload
//!
//! ## Purpose
//! Sends the selected file to the prediction endpoint and returns a typed
//! result.
//!
//! ## Responsibilities
//! - Validate the endpoint URL policy (absolute `http`/`https` with a host).
//! - Abstract the wire through [`PredictionTransport`] so the workflow can be
//!   driven by mock endpoints in tests.
//! - Provide the reqwest multipart transport used in production.
//! - Apply the optional request timeout and parse the response contract.
//! - Load files from disk for the headless driver.
//!
//! ## Data flow
//! [`SelectedFile`] -> [`PredictionRequest`] -> [`PredictionTransport::send`]
//! -> raw body -> [`aether_prediction_contract::parse_prediction_response`] ->
//! [`PredictionResult`].
//!
//! ## Ownership and lifetimes
//! Requests own a copy of the payload bytes so the in-flight future does not
//! borrow from workflow state while it is suspended.
//!
//! ## Error model
//! Transport, HTTP status, timeout, and contract failures are all surfaced as
//! [`UploadError`]; the workflow collapses them into one failure path.

use std::path::Path;
use std::time::Duration;

use aether_core::{FileChoice, PredictionResult, SelectedFile};
use aether_prediction_contract::{PredictionContractError, into_result, parse_prediction_response};
use reqwest::multipart::{Form, Part};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Default local prediction endpoint.
pub const DEFAULT_PREDICT_ENDPOINT: &str = "http://127.0.0.1:5000/api/predict";

/// Multipart field name carrying the file.
pub const FILE_FIELD_NAME: &str = "file";

/// One prediction request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// File name forwarded in the multipart part.
    pub file_name: String,
    /// Media type of the part.
    pub media_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl PredictionRequest {
    /// Builds a request carrying a copy of the selected file.
    pub fn from_selected(file: &SelectedFile) -> Self {
        Self {
            file_name: file.file_name().to_string(),
            media_type: file.media_type().to_string(),
            bytes: file.bytes().to_vec(),
        }
    }
}

/// Returns a stable SHA-256 hex digest of the request payload.
///
/// Used to correlate log lines for the same file across retries.
pub fn payload_fingerprint(request: &PredictionRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.file_name.as_bytes());
    hasher.update([0]);
    hasher.update(&request.bytes);
    hex::encode(hasher.finalize())
}

/// Abstract wire used by [`PredictionClient`].
pub trait PredictionTransport: Send + Sync {
    /// Sends one request and resolves to the raw response body.
    fn send(
        &self,
        request: PredictionRequest,
    ) -> impl Future<Output = Result<String, UploadError>> + Send;
}

/// Multipart HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport for a validated endpoint.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the URL violates policy.
    pub fn new(endpoint: &str) -> Result<Self, UploadError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: validate_endpoint(endpoint)?,
        })
    }
}

impl PredictionTransport for HttpTransport {
    async fn send(&self, request: PredictionRequest) -> Result<String, UploadError> {
        let part = Part::bytes(request.bytes)
            .file_name(request.file_name)
            .mime_str(&request.media_type)
            .map_err(|error| UploadError::Transport(error.to_string()))?;
        let form = Form::new().part(FILE_FIELD_NAME, part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|error| UploadError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|error| UploadError::Transport(error.to_string()))
    }
}

/// Client that runs one prediction round trip through a transport.
#[derive(Debug)]
pub struct PredictionClient<T> {
    transport: T,
    timeout: Option<Duration>,
}

impl<T: PredictionTransport> PredictionClient<T> {
    /// Creates a client without a request timeout.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Bounds every request by `timeout`. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the file and parses the response into a prediction result.
    ///
    /// # Errors
    /// Returns [`UploadError::Timeout`] when the configured timeout elapses,
    /// [`UploadError::Contract`] for malformed bodies, and propagates
    /// transport errors as-is.
    pub async fn predict(&self, request: PredictionRequest) -> Result<PredictionResult, UploadError> {
        let fingerprint = payload_fingerprint(&request);
        tracing::debug!(
            stage = "upload",
            action = "send",
            file = %request.file_name,
            bytes = request.bytes.len(),
            %fingerprint,
            "sending prediction request"
        );

        let body = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                .await
                .map_err(|_| UploadError::Timeout(limit))??,
            None => self.transport.send(request).await?,
        };

        let response = parse_prediction_response(&body)?;
        Ok(into_result(response))
    }
}

/// Validates prediction endpoint constraints.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] for unparsable URLs, schemes other
/// than `http`/`https`, or URLs without a host.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, UploadError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UploadError::InvalidEndpoint(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(UploadError::InvalidEndpoint("endpoint has no host".to_string()));
    }

    Ok(parsed)
}

/// Reads a file from disk into a [`FileChoice`].
///
/// # Errors
/// Returns [`UploadError::Read`] when the file cannot be read.
pub async fn load_file(path: &Path) -> Result<FileChoice, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileChoice::new(file_name, bytes))
}

/// Prediction upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Connection or body transfer failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Endpoint answered with a non-success HTTP status.
    #[error("endpoint returned status {0}")]
    Status(u16),
    /// Request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body violated the prediction contract.
    #[error(transparent)]
    Contract(#[from] PredictionContractError),
    /// Local file could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
