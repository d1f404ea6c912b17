//! Shared fixtures for workflow integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use aether_app::Workflow;
use aether_core::FileChoice;
use aether_upload::{PredictionClient, PredictionRequest, PredictionTransport, UploadError};
use tokio::sync::Semaphore;

/// 1x1 transparent PNG, base64 without header.
#[allow(dead_code)]
pub const MASK_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Success body for a survivor detection.
#[allow(dead_code)]
pub fn survivor_body() -> String {
    format!(
        r#"{{"prediction":"Survivor Found","confidence":"92%","mask_image":"{MASK_BASE64}"}}"#
    )
}

/// Success body without a survivor.
#[allow(dead_code)]
pub fn clear_body() -> String {
    r#"{"prediction":"Area Clear","confidence":"81%","mask_image":null}"#.to_string()
}

/// PNG-signature file choice.
#[allow(dead_code)]
pub fn png_choice(name: &str) -> FileChoice {
    FileChoice::new(name, vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0])
}

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String, UploadError>>>,
    pub requests: Mutex<Vec<PredictionRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(responses: Vec<Result<String, UploadError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl PredictionTransport for ScriptedTransport {
    async fn send(&self, request: PredictionRequest) -> Result<String, UploadError> {
        self.requests
            .lock()
            .expect("request log lock should work")
            .push(request);
        self.responses
            .lock()
            .expect("response lock should work")
            .pop_front()
            .unwrap_or_else(|| Err(UploadError::Transport("no scripted response".to_string())))
    }
}

/// Holds every request until a permit is released, tracking concurrency.
#[derive(Debug)]
pub struct GatedTransport {
    pub gate: Semaphore,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
    outcome: Result<String, String>,
}

#[allow(dead_code)]
impl GatedTransport {
    pub fn new(body: String) -> Self {
        Self::with_outcome(Ok(body))
    }

    /// Released requests fail with a transport error.
    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Err(message.to_string()))
    }

    fn with_outcome(outcome: Result<String, String>) -> Self {
        Self {
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            outcome,
        }
    }
}

impl PredictionTransport for GatedTransport {
    async fn send(&self, _request: PredictionRequest) -> Result<String, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|error| UploadError::Transport(error.to_string()))?;
        permit.forget();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcome.clone().map_err(UploadError::Transport)
    }
}

/// Workflow over a transport with default options.
#[allow(dead_code)]
pub fn workflow<T: PredictionTransport>(transport: T) -> Workflow<T> {
    Workflow::new(PredictionClient::new(transport), "test")
}
