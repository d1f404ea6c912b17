#![warn(missing_docs)]
//! # aether-app
//!
//! ## Purpose
//! Orchestrates upload, prediction, report, and ledger playback for `aether`.
//!
//! ## Responsibilities
//! - Sequence file selection, the single in-flight prediction request, and the
//!   UI transitions gated on its outcome ([`Workflow`]).
//! - Keep the latest prediction result as explicit orchestrator state.
//! - Start (and optionally cancel) scripted ledger playback from the report.
//! - Load runtime configuration and install structured logging.
//!
//! ## Data flow
//! File choice -> [`Workflow::select_file`] -> [`Workflow::trigger`] ->
//! prediction client -> result holder -> [`Workflow::open_report`] -> ledger
//! player -> playback panel.
//!
//! ## Ownership and lifetimes
//! Workflow state lives behind one mutex that is never held across an
//! `.await`; requests and scripts are moved out as owned values.
//!
//! ## Error model
//! Expected paths (no file, request already in flight, request failure) are
//! reported as outcome enums. [`WorkflowError`] covers misuse and decode
//! failures; [`AppError`] covers startup.

pub mod config;
pub mod logging;
mod workflow;

use aether_upload::{HttpTransport, PredictionClient, UploadError};
use thiserror::Error;

pub use config::{AppConfig, ConfigError};
pub use workflow::{TriggerOutcome, UploadOutcome, Workflow, WorkflowError, WorkflowSnapshot};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("AETHER_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Builds a workflow talking HTTP to the configured endpoint.
///
/// # Errors
/// Returns [`AppError::Upload`] when the endpoint violates URL policy.
pub fn workflow_from_config(config: &AppConfig) -> Result<Workflow<HttpTransport>, AppError> {
    let transport = HttpTransport::new(&config.endpoint)?;
    let client = PredictionClient::new(transport).with_timeout(config.request_timeout);

    Ok(Workflow::new(client, app_version())
        .with_cancel_playback_on_reopen(config.cancel_playback_on_reopen))
}

/// App startup error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Upload subsystem error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Workflow error.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),
    /// Logging subscriber could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
}
