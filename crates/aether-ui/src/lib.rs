#![warn(missing_docs)]
//! # aether-ui
//!
//! ## Purpose
//! Defines the UI-facing state model for the `aether` workflow.
//!
//! ## Responsibilities
//! - Hold the console log (newest first) and the control surface: trigger,
//!   scanning marker, failure indicator, detail entry point, preview.
//! - Hold the ledger playback panel (oldest first) behind a shareable sink.
//! - Project a prediction result into a [`ReportView`] render model.
//!
//! ## Data flow
//! Workflow transitions call the `on_*` reducers on [`UiState`]. The report
//! view is built by the pure [`render_report`] and stored for display. Ledger
//! timers write through [`SharedPlaybackPanel`].
//!
//! ## Ownership and lifetimes
//! `UiState` owns all strings so reducers can run under a short lock without
//! borrowing from the in-flight request.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors.

use std::sync::{Mutex, MutexGuard, PoisonError};

use aether_core::{ClassificationFlag, ColorTag, LedgerEntry, PredictionResult};
use aether_ledger::PlaybackSink;
use aether_prediction_contract::mask_data_uri;
use rand::Rng;

/// Trigger label when a file is armed.
pub const LABEL_INITIATE: &str = "INITIATE ANALYSIS";
/// Trigger label while the request is in flight.
pub const LABEL_CONNECTING: &str = "CONNECTING TO SERVER...";
/// Trigger label after a successful request.
pub const LABEL_COMPLETE: &str = "ANALYSIS COMPLETE";
/// Trigger label after a failed request.
pub const LABEL_FAILED: &str = "CONNECTION FAILED";
/// Label of the detail entry point.
pub const LABEL_OPEN_REPORT: &str = "OPEN TACTICAL MAP";

/// Console message after a file was buffered.
pub const MSG_FILE_ARMED: &str = "IMAGE BUFFERED. READY FOR X-RAY SCAN.";
/// Console message when a request starts.
pub const MSG_UPLINK: &str = "ESTABLISHING UPLINK TO PYTHON BACKEND...";
/// Console message when a request fails.
pub const MSG_CONNECTIVITY_ERROR: &str =
    "ERROR: COULD NOT CONNECT TO BACKEND (Is server.py running?)";

/// Fixed geographic reference shown in every report.
pub const GRID_REFERENCE: &str = "28.6139° N, 77.2090° E";
/// Alt text of the placeholder mask image.
pub const MASK_PLACEHOLDER_ALT: &str = "Waiting for AI Render...";
/// Acknowledgement shown for the dispatch action.
pub const DISPATCH_ACKNOWLEDGEMENT: &str = "> DEPLOYMENT SIGNAL SENT. DRONES EN ROUTE.";

/// Returns the console message logged after a successful request.
pub fn scan_complete_message(status_label: &str) -> String {
    format!("SCAN COMPLETE. SERVER RESPONSE: {status_label}")
}

/// Console panel; the newest line is first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleLog {
    lines: Vec<String>,
}

impl ConsoleLog {
    /// Prepends `> message`.
    pub fn push(&mut self, message: &str) {
        self.lines.insert(0, format!("> {message}"));
    }

    /// Lines, newest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Counts lines whose text equals `> message`.
    pub fn count(&self, message: &str) -> usize {
        let needle = format!("> {message}");
        self.lines.iter().filter(|line| **line == needle).count()
    }
}

/// Enabled/visible flags and labels of the workflow controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Whether the analysis trigger accepts presses.
    pub trigger_enabled: bool,
    /// Current trigger label.
    pub trigger_label: String,
    /// Busy marker shown over the preview while scanning.
    pub scanning: bool,
    /// Shown after a failed request until the next trigger or upload.
    pub failure_indicator: bool,
    /// Whether the report entry point is visible.
    pub detail_visible: bool,
    /// Label of the report entry point.
    pub detail_label: String,
    /// Preview `data:` URI of the selected file.
    pub preview_uri: Option<String>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            trigger_enabled: false,
            trigger_label: LABEL_INITIATE.to_string(),
            scanning: false,
            failure_indicator: false,
            detail_visible: false,
            detail_label: LABEL_OPEN_REPORT.to_string(),
            preview_uri: None,
        }
    }
}

/// Aggregate UI state for the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Console panel.
    pub console: ConsoleLog,
    /// Control surface.
    pub controls: Controls,
    /// Last rendered report.
    pub report: Option<ReportView>,
    /// Whether the report modal is open.
    pub report_open: bool,
}

impl UiState {
    /// Creates default UI state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            console: ConsoleLog::default(),
            controls: Controls::default(),
            report: None,
            report_open: false,
        }
    }

    /// A new file was buffered. The report entry point is hidden so no report
    /// is offered for a file that has not been analyzed.
    ///
    /// `request_in_flight` keeps the trigger disabled until settlement.
    pub fn on_file_armed(&mut self, preview_uri: &str, request_in_flight: bool) {
        self.controls.preview_uri = Some(preview_uri.to_string());
        self.controls.detail_visible = false;
        self.controls.failure_indicator = false;
        if !request_in_flight {
            self.controls.trigger_enabled = true;
            self.controls.trigger_label = LABEL_INITIATE.to_string();
        }
        self.console.push(MSG_FILE_ARMED);
    }

    /// A request was issued.
    pub fn on_request_started(&mut self) {
        self.controls.trigger_enabled = false;
        self.controls.trigger_label = LABEL_CONNECTING.to_string();
        self.controls.scanning = true;
        self.controls.failure_indicator = false;
        self.console.push(MSG_UPLINK);
    }

    /// The request settled with a result for the file still selected.
    pub fn on_request_succeeded(&mut self, status_label: &str) {
        self.controls.scanning = false;
        self.controls.trigger_enabled = true;
        self.controls.trigger_label = LABEL_COMPLETE.to_string();
        self.controls.detail_label = LABEL_OPEN_REPORT.to_string();
        self.controls.detail_visible = true;
        self.console.push(&scan_complete_message(status_label));
    }

    /// The request settled with a result for a file that has since been
    /// replaced. The newly armed file has not been analyzed.
    pub fn on_stale_success(&mut self, status_label: &str) {
        self.controls.scanning = false;
        self.controls.trigger_enabled = true;
        self.controls.trigger_label = LABEL_INITIATE.to_string();
        self.controls.detail_visible = false;
        self.console.push(&scan_complete_message(status_label));
    }

    /// The request failed in transport or parsing.
    pub fn on_request_failed(&mut self) {
        self.controls.scanning = false;
        self.controls.trigger_enabled = true;
        self.controls.trigger_label = LABEL_FAILED.to_string();
        self.controls.failure_indicator = true;
        self.console.push(MSG_CONNECTIVITY_ERROR);
    }

    /// Shows a freshly rendered report.
    pub fn show_report(&mut self, view: ReportView) {
        self.report = Some(view);
        self.report_open = true;
    }

    /// Hides the report modal. The last report stays stored.
    pub fn close_report(&mut self) {
        self.report_open = false;
    }
}

/// One rendered ledger playback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackLine {
    /// Line text.
    pub text: String,
    /// Display color.
    pub color: ColorTag,
}

/// Ledger playback panel; lines are appended in schedule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackPanel {
    /// Whether the panel has been revealed.
    pub visible: bool,
    /// Rendered lines, oldest first.
    pub lines: Vec<PlaybackLine>,
}

/// Playback panel shared between the workflow and ledger timers.
#[derive(Debug, Default)]
pub struct SharedPlaybackPanel {
    panel: Mutex<PlaybackPanel>,
}

impl SharedPlaybackPanel {
    /// Creates an empty hidden panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the panel.
    pub fn snapshot(&self) -> PlaybackPanel {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackPanel> {
        // Reducers never panic mid-update, so a poisoned panel is still valid.
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackSink for SharedPlaybackPanel {
    fn clear(&self) {
        let mut panel = self.lock();
        panel.visible = true;
        panel.lines.clear();
    }

    fn append(&self, entry: LedgerEntry) {
        self.lock().lines.push(PlaybackLine {
            text: entry.text,
            color: entry.color,
        });
    }
}

/// Emphasis of the report status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTone {
    /// Survivor detected.
    Alert,
    /// Anything else.
    Neutral,
}

impl ReportTone {
    /// CSS-style hex color of the status line.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Alert => "#ff3333",
            Self::Neutral => "#fff",
        }
    }
}

/// Mask image shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskImage {
    /// Renderable `data:` URI.
    DataUri(String),
    /// Empty image with [`MASK_PLACEHOLDER_ALT`].
    Placeholder,
}

/// User actions offered by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// Acknowledged locally; no backend effect.
    DispatchDroneRescue,
}

impl ReportAction {
    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::DispatchDroneRescue => "⚠ DISPATCH DRONE RESCUE",
        }
    }

    /// Immediate acknowledgement text.
    pub fn acknowledgement(self) -> &'static str {
        match self {
            Self::DispatchDroneRescue => DISPATCH_ACKNOWLEDGEMENT,
        }
    }
}

/// Render model of the report modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    /// `AETHER-<n>`, fresh per render.
    pub mission_id: String,
    /// Fixed grid reference.
    pub grid_reference: String,
    /// Upper-cased status label.
    pub status: String,
    /// Status emphasis.
    pub tone: ReportTone,
    /// Confidence label as received.
    pub confidence: String,
    /// Mask image or placeholder.
    pub mask: MaskImage,
    /// Offered actions.
    pub actions: Vec<ReportAction>,
}

/// Projects a held result into the report render model.
pub fn render_report<R: Rng + ?Sized>(
    result: &PredictionResult,
    flag: ClassificationFlag,
    rng: &mut R,
) -> ReportView {
    let mission_number: u32 = rng.random_range(0..10_000);
    let mask = match mask_data_uri(result.mask_image.as_deref()) {
        Some(uri) => MaskImage::DataUri(uri),
        None => MaskImage::Placeholder,
    };

    ReportView {
        mission_id: format!("AETHER-{mission_number}"),
        grid_reference: GRID_REFERENCE.to_string(),
        status: result.status_label.to_uppercase(),
        tone: if flag.is_positive() {
            ReportTone::Alert
        } else {
            ReportTone::Neutral
        },
        confidence: result.confidence_label.clone(),
        mask,
        actions: vec![ReportAction::DispatchDroneRescue],
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for UI reducers.

    use super::*;

    #[test]
    fn console_prepends_newest_line() {
        let mut console = ConsoleLog::default();
        console.push("first");
        console.push("second");
        assert_eq!(console.lines(), ["> second", "> first"]);
        assert_eq!(console.count("first"), 1);
    }

    #[test]
    fn request_messages_name_the_python_backend() {
        let mut state = UiState::new("v0.1.0");
        state.on_request_started();
        state.on_request_failed();
        assert_eq!(
            state.console.lines(),
            [
                "> ERROR: COULD NOT CONNECT TO BACKEND (Is server.py running?)",
                "> ESTABLISHING UPLINK TO PYTHON BACKEND...",
            ]
        );
    }

    #[test]
    fn upload_during_flight_keeps_trigger_disabled() {
        let mut state = UiState::new("v0.1.0");
        state.on_file_armed("data:image/png;base64,AA==", false);
        state.on_request_started();
        state.on_file_armed("data:image/png;base64,AQ==", true);

        assert!(!state.controls.trigger_enabled);
        assert_eq!(state.controls.trigger_label, LABEL_CONNECTING);
        assert_eq!(
            state.controls.preview_uri.as_deref(),
            Some("data:image/png;base64,AQ==")
        );
    }

    #[test]
    fn playback_panel_appends_in_order() {
        let panel = SharedPlaybackPanel::new();
        panel.clear();
        panel.append(LedgerEntry::new("a", ColorTag::Primary, 0));
        panel.append(LedgerEntry::new("b", ColorTag::Muted, 400));

        let snapshot = panel.snapshot();
        assert!(snapshot.visible);
        let texts: Vec<&str> = snapshot.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);
    }
}
