//! Upload → predict → report → playback state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aether_core::{ClassificationFlag, FileChoice, PredictionResult, SelectedFile, WorkflowState};
use aether_ledger::{LedgerPlayer, LedgerScript, PlaybackHandle};
use aether_ui::{PlaybackPanel, ReportAction, ReportView, SharedPlaybackPanel, UiState, render_report};
use aether_upload::{PredictionClient, PredictionRequest, PredictionTransport};
use thiserror::Error;

/// Result of offering a file choice to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No file was chosen; nothing changed.
    Ignored,
    /// The file replaced the selection and the workflow is armed.
    Armed,
}

/// Result of one trigger press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// No file is selected; the press is inert.
    NoFileSelected,
    /// A request is already outstanding; the press is inert.
    AlreadyInFlight,
    /// The request settled with a result for the selected file.
    Succeeded(PredictionResult),
    /// The request settled with a result after the selection was replaced.
    Superseded(PredictionResult),
    /// Transport or parse failure; the held result is unchanged.
    Failed(String),
}

/// Copy of the observable workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    /// Current state machine value.
    pub state: WorkflowState,
    /// Name of the selected file.
    pub selected_file: Option<String>,
    /// Latest prediction result.
    pub result: Option<PredictionResult>,
    /// UI projection.
    pub ui: UiState,
    /// Ledger playback panel.
    pub playback: PlaybackPanel,
}

#[derive(Debug)]
struct Session {
    state: WorkflowState,
    selected: Option<SelectedFile>,
    // Bumped on every upload so a settlement can tell whether its file is
    // still the selected one.
    selection_generation: u64,
    result: Option<PredictionResult>,
    ui: UiState,
    // Every run that may still append lines, oldest first.
    playback: Vec<PlaybackHandle>,
}

/// Workflow orchestrator. Clones share the same session.
pub struct Workflow<T> {
    session: Arc<Mutex<Session>>,
    client: Arc<PredictionClient<T>>,
    player: LedgerPlayer<SharedPlaybackPanel>,
    cancel_playback_on_reopen: bool,
}

impl<T> Clone for Workflow<T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            client: Arc::clone(&self.client),
            player: self.player.clone(),
            cancel_playback_on_reopen: self.cancel_playback_on_reopen,
        }
    }
}

impl<T: PredictionTransport> Workflow<T> {
    /// Creates an idle workflow.
    pub fn new(client: PredictionClient<T>, version: impl Into<String>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                state: WorkflowState::Idle,
                selected: None,
                selection_generation: 0,
                result: None,
                ui: UiState::new(version),
                playback: Vec::new(),
            })),
            client: Arc::new(client),
            player: LedgerPlayer::new(Arc::new(SharedPlaybackPanel::new())),
            cancel_playback_on_reopen: false,
        }
    }

    /// When `true`, opening the report again cancels a playback that is still
    /// running. Off by default: playback is fire-and-forget.
    pub fn with_cancel_playback_on_reopen(mut self, enabled: bool) -> Self {
        self.cancel_playback_on_reopen = enabled;
        self
    }

    /// Prediction client used by [`Workflow::trigger`].
    pub fn client(&self) -> &PredictionClient<T> {
        &self.client
    }

    /// Current state machine value.
    pub fn state(&self) -> WorkflowState {
        self.lock().state
    }

    /// Latest prediction result, if any request has succeeded.
    pub fn result(&self) -> Option<PredictionResult> {
        self.lock().result.clone()
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let session = self.lock();
        WorkflowSnapshot {
            state: session.state,
            selected_file: session
                .selected
                .as_ref()
                .map(|file| file.file_name().to_string()),
            result: session.result.clone(),
            ui: session.ui.clone(),
            playback: self.player.sink().snapshot(),
        }
    }

    /// Decodes and arms a file choice. `None` is a no-op; an empty file is
    /// armed like any other.
    ///
    /// The held result is kept; only the report entry point is hidden. A
    /// choice made while a request is in flight replaces the selection but the
    /// trigger stays disabled until that request settles.
    ///
    /// # Errors
    /// Returns [`WorkflowError::Decode`] when the decode task dies.
    pub async fn select_file(&self, choice: Option<FileChoice>) -> Result<UploadOutcome, WorkflowError> {
        let Some(choice) = choice else {
            return Ok(UploadOutcome::Ignored);
        };

        let file = tokio::task::spawn_blocking(move || SelectedFile::from_choice(choice))
            .await
            .map_err(|error| WorkflowError::Decode(error.to_string()))?;

        let mut session = self.lock();
        let in_flight = session.state == WorkflowState::RequestInFlight;
        session.selection_generation += 1;
        if !in_flight {
            session.state = WorkflowState::FileArmed;
        }
        session.ui.on_file_armed(file.preview_uri(), in_flight);
        tracing::info!(
            stage = "upload",
            action = "armed",
            file = file.file_name(),
            media_type = file.media_type(),
            bytes = file.bytes().len(),
            in_flight,
            "file buffered"
        );
        session.selected = Some(file);

        Ok(UploadOutcome::Armed)
    }

    /// Sends the selected file to the prediction endpoint.
    ///
    /// At most one request is outstanding: presses while one is in flight, or
    /// without a selected file, return immediately without side effects.
    /// Failures never propagate; they become [`TriggerOutcome::Failed`].
    pub async fn trigger(&self) -> TriggerOutcome {
        let (request, generation) = {
            let mut session = self.lock();
            match session.state {
                state if state.accepts_trigger() => {}
                WorkflowState::RequestInFlight => {
                    tracing::debug!(stage = "predict", action = "ignored", "request already in flight");
                    return TriggerOutcome::AlreadyInFlight;
                }
                _ => {
                    tracing::debug!(stage = "predict", action = "ignored", "no file selected");
                    return TriggerOutcome::NoFileSelected;
                }
            }
            let Some(file) = session.selected.as_ref() else {
                tracing::debug!(stage = "predict", action = "ignored", "no file selected");
                return TriggerOutcome::NoFileSelected;
            };

            let request = PredictionRequest::from_selected(file);
            session.state = WorkflowState::RequestInFlight;
            session.ui.on_request_started();
            tracing::info!(stage = "predict", action = "start", file = %request.file_name, "uplink requested");
            (request, session.selection_generation)
        };

        let settled = self.client.predict(request).await;

        let mut session = self.lock();
        let current = session.selection_generation == generation;
        match settled {
            Ok(result) => {
                session.result = Some(result.clone());
                if current {
                    session.state = WorkflowState::RequestSucceeded;
                    session.ui.on_request_succeeded(&result.status_label);
                } else {
                    session.state = WorkflowState::FileArmed;
                    session.ui.on_stale_success(&result.status_label);
                }
                tracing::info!(
                    stage = "predict",
                    action = "settled",
                    status = %result.status_label,
                    confidence = %result.confidence_label,
                    has_mask = result.mask_image.is_some(),
                    current,
                    "prediction received"
                );
                if current {
                    TriggerOutcome::Succeeded(result)
                } else {
                    TriggerOutcome::Superseded(result)
                }
            }
            Err(error) => {
                session.state = WorkflowState::RequestFailed;
                session.ui.on_request_failed();
                tracing::warn!(stage = "predict", action = "failed", %error, "prediction request failed");
                TriggerOutcome::Failed(error.to_string())
            }
        }
    }

    /// Renders the report for the held result and starts ledger playback.
    ///
    /// Must be called from within a tokio runtime; rescue playback spawns a
    /// timer task.
    ///
    /// # Errors
    /// Returns [`WorkflowError::ReportUnavailable`] while the report entry
    /// point is hidden.
    pub fn open_report(&self) -> Result<ReportView, WorkflowError> {
        let mut session = self.lock();
        if !session.ui.controls.detail_visible {
            return Err(WorkflowError::ReportUnavailable);
        }
        let Some(result) = session.result.as_ref() else {
            return Err(WorkflowError::ReportUnavailable);
        };

        let flag = ClassificationFlag::from_result(result);
        let mut rng = rand::rng();
        let view = render_report(result, flag, &mut rng);
        let script = LedgerScript::for_flag(flag, &mut rng);

        if self.cancel_playback_on_reopen {
            for previous in session.playback.drain(..) {
                previous.cancel();
            }
        }
        session.playback.retain(|handle| !handle.is_finished());
        session.playback.push(self.player.play(script));
        session.ui.show_report(view.clone());

        tracing::info!(
            stage = "report",
            action = "open",
            mission = %view.mission_id,
            survivor = flag.is_positive(),
            "report opened"
        );
        Ok(view)
    }

    /// Closes the report. Running playback keeps going.
    pub fn close_report(&self) {
        self.lock().ui.close_report();
    }

    /// Acknowledges the report's dispatch action. No backend is contacted.
    ///
    /// # Errors
    /// Returns [`WorkflowError::ReportUnavailable`] when the report is closed.
    pub fn dispatch_rescue(&self) -> Result<&'static str, WorkflowError> {
        if !self.lock().ui.report_open {
            return Err(WorkflowError::ReportUnavailable);
        }
        let action = ReportAction::DispatchDroneRescue;
        tracing::info!(stage = "report", action = "dispatch", "dispatch acknowledged");
        Ok(action.acknowledgement())
    }

    /// Cancels every playback that is still running, including runs started
    /// by earlier report openings. Returns `false` when none was running.
    pub fn cancel_playback(&self) -> bool {
        let mut session = self.lock();
        let mut cancelled = 0_usize;
        for handle in session.playback.drain(..) {
            if !handle.is_finished() {
                handle.cancel();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            tracing::debug!(stage = "ledger", action = "cancel", runs = cancelled, "playback cancelled");
        }
        cancelled > 0
    }

    /// Waits until every started playback has finished.
    pub async fn wait_for_playback(&self) {
        let handles = std::mem::take(&mut self.lock().playback);
        for handle in handles {
            handle.finished().await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // Reducers never panic mid-update, so a poisoned session is still valid.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Workflow errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The decode task did not complete.
    #[error("file decode failed: {0}")]
    Decode(String),
    /// The report entry point is not visible.
    #[error("no analyzed result is available for the report")]
    ReportUnavailable,
}
