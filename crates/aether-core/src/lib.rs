#![warn(missing_docs)]
//! # aether-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `aether` workspace.
//!
//! ## Responsibilities
//! - Represent the user's file choice and its decoded, previewable form.
//! - Enumerate workflow states and the latest prediction result.
//! - Derive the survivor classification flag from a status label.
//! - Describe scripted ledger entries and their display colors.
//!
//! ## Data flow
//! The file picker yields a [`FileChoice`]. The upload stage decodes it into a
//! [`SelectedFile`], the request stage turns a server response into a
//! [`PredictionResult`], and the report view derives a [`ClassificationFlag`]
//! that selects the [`LedgerEntry`] script.
//!
//! ## Ownership and lifetimes
//! Every type owns its buffers (`Vec<u8>`, `String`) so values can cross the
//! await point of the prediction request and the playback timer task without
//! borrowing from UI state.
//!
//! ## Error model
//! Nothing here fails. Unknown or empty payloads fall back to
//! [`FALLBACK_MEDIA_TYPE`] for their preview.
//!
//! ## Example
//! ```rust
//! use aether_core::{ClassificationFlag, FileChoice, SelectedFile};
//!
//! let png_magic = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! let file = SelectedFile::from_choice(FileChoice::new("scan.png", png_magic));
//! assert_eq!(file.media_type(), "image/png");
//! assert!(file.preview_uri().starts_with("data:image/png;base64,"));
//! assert!(ClassificationFlag::from_status("Survivor Found").is_positive());
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Keyword that marks a status label as a positive classification.
pub const SURVIVOR_KEYWORD: &str = "SURVIVOR";

/// Media type used when the payload format cannot be recognized.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Raw file delivered by the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChoice {
    /// File name as reported by the picker.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FileChoice {
    /// Creates a file choice from a name and its contents.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// File armed for analysis together with its previewable representation.
///
/// A new choice replaces the selection wholly; selections are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
    preview_uri: String,
}

impl SelectedFile {
    /// Decodes a file choice into a selected file with a data-URI preview.
    ///
    /// The media type is sniffed from the payload's magic bytes. An empty
    /// payload is still a valid choice and is sent as-is.
    pub fn from_choice(choice: FileChoice) -> Self {
        let media_type = sniff_media_type(&choice.bytes);
        let preview_uri = to_data_uri(&media_type, &choice.bytes);

        Self {
            file_name: choice.file_name,
            media_type,
            bytes: choice.bytes,
            preview_uri,
        }
    }

    /// File name reported by the picker.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Sniffed media type, or [`FALLBACK_MEDIA_TYPE`].
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw payload bytes sent to the prediction endpoint.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Displayable `data:` URI for the preview pane.
    pub fn preview_uri(&self) -> &str {
        &self.preview_uri
    }
}

/// Returns the media type for a payload, based on its magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MEDIA_TYPE.to_string())
}

/// Encodes bytes as a `data:<media_type>;base64,` URI.
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Workflow state driving which controls are enabled and which labels show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A file is selected and the trigger is armed.
    FileArmed,
    /// Exactly one prediction request is outstanding.
    RequestInFlight,
    /// The last request settled with a parsed result.
    RequestSucceeded,
    /// The last request failed in transport or parsing.
    RequestFailed,
}

impl WorkflowState {
    /// Returns `true` when a trigger press may start a request.
    pub fn accepts_trigger(self) -> bool {
        !matches!(self, Self::Idle | Self::RequestInFlight)
    }
}

/// Latest prediction produced by a successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Status label as reported by the server (for example `Survivor Found`).
    pub status_label: String,
    /// Confidence label as reported by the server (for example `92%`).
    pub confidence_label: String,
    /// Base64 mask payload without a data-URI header.
    pub mask_image: Option<String>,
}

/// Binary classification derived from a status label. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationFlag(bool);

impl ClassificationFlag {
    /// Case-insensitive substring match against [`SURVIVOR_KEYWORD`].
    pub fn from_status(status_label: &str) -> Self {
        Self(status_label.to_uppercase().contains(SURVIVOR_KEYWORD))
    }

    /// Derives the flag from a held prediction result.
    pub fn from_result(result: &PredictionResult) -> Self {
        Self::from_status(&result.status_label)
    }

    /// Returns `true` when the survivor keyword matched.
    pub fn is_positive(self) -> bool {
        self.0
    }
}

impl From<bool> for ClassificationFlag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

/// Display color of one ledger playback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorTag {
    /// Bright headline text.
    Primary,
    /// Dimmed progress text.
    Muted,
    /// Confirmation highlight.
    Confirmed,
    /// Final accent line.
    Accent,
    /// Idle contract notice.
    Idle,
}

impl ColorTag {
    /// CSS-style hex color for this tag.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Primary => "#fff",
            Self::Muted => "#aaa",
            Self::Confirmed => "#00ff41",
            Self::Accent => "#00f2ff",
            Self::Idle => "#666",
        }
    }
}

/// One scripted ledger line and its offset from playback start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Rendered text.
    pub text: String,
    /// Display color.
    pub color: ColorTag,
    /// Offset from invocation time in milliseconds.
    pub delay_ms: u64,
}

impl LedgerEntry {
    /// Creates a ledger entry.
    pub fn new(text: impl Into<String>, color: ColorTag, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            color,
            delay_ms,
        }
    }
}
