#![warn(missing_docs)]
//! # aether-prediction-contract
//!
//! ## Purpose
//! Defines the prediction endpoint response schema and client-side mapping
//! helpers.
//!
//! ## Responsibilities
//! - Parse `{ prediction, confidence, mask_image }` payloads.
//! - Map a parsed response into the held [`PredictionResult`].
//! - Turn the header-less base64 mask payload into a renderable data URI.
//!
//! ## Data flow
//! Raw JSON body -> [`parse_prediction_response`] -> [`into_result`] ->
//! result holder -> [`mask_data_uri`] when the report renders.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or missing mandatory fields return [`PredictionContractError`].
//! Label contents are not checked; any string is displayed as received.
//! A missing or undecodable mask is not an error: callers render a placeholder.

use aether_core::{PredictionResult, sniff_media_type, to_data_uri};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media type assumed for mask payloads whose format cannot be sniffed.
pub const DEFAULT_MASK_MEDIA_TYPE: &str = "image/png";

/// Response body returned by the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Status label, for example `Survivor Found`.
    pub prediction: String,
    /// Confidence label, for example `92%`.
    pub confidence: String,
    /// Base64 mask image without a data-URI header.
    #[serde(default)]
    pub mask_image: Option<String>,
}

/// Parses raw JSON into a validated prediction response.
///
/// # Errors
/// Returns [`PredictionContractError::Decode`] for invalid JSON or missing
/// fields.
pub fn parse_prediction_response(raw: &str) -> Result<PredictionResponse, PredictionContractError> {
    let mut parsed: PredictionResponse = serde_json::from_str(raw)?;

    // Servers that emit `""` for "no mask" mean the same thing as `null`.
    if parsed
        .mask_image
        .as_deref()
        .is_some_and(|mask| mask.trim().is_empty())
    {
        parsed.mask_image = None;
    }

    Ok(parsed)
}

/// Converts a parsed response into the result held by the workflow.
pub fn into_result(response: PredictionResponse) -> PredictionResult {
    PredictionResult {
        status_label: response.prediction,
        confidence_label: response.confidence,
        mask_image: response.mask_image,
    }
}

/// Builds a renderable data URI for a base64 mask payload.
///
/// Returns `None` when the payload is absent or is not valid base64, so the
/// report can fall back to its placeholder image.
pub fn mask_data_uri(mask_image: Option<&str>) -> Option<String> {
    let payload = mask_image?.trim();
    let bytes = STANDARD.decode(payload).ok()?;
    if bytes.is_empty() {
        return None;
    }

    let sniffed = sniff_media_type(&bytes);
    let media_type = if sniffed.starts_with("image/") {
        sniffed.as_str()
    } else {
        DEFAULT_MASK_MEDIA_TYPE
    };

    Some(to_data_uri(media_type, &bytes))
}

/// Prediction contract errors.
#[derive(Debug, Error)]
pub enum PredictionContractError {
    /// JSON decode failure.
    #[error("prediction decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
