//! Integration tests for inert actions without a selected file.

mod common;

use aether_app::{TriggerOutcome, UploadOutcome, WorkflowError};
use aether_core::WorkflowState;

#[tokio::test]
async fn no_file_selected_tests_trigger_is_inert() {
    let workflow = common::workflow(common::ScriptedTransport::new(vec![Ok(
        common::survivor_body(),
    )]));

    assert_eq!(workflow.trigger().await, TriggerOutcome::NoFileSelected);
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.snapshot().ui.console.lines().is_empty());
    assert!(
        workflow
            .client()
            .transport()
            .requests
            .lock()
            .expect("request log lock should work")
            .is_empty()
    );
}

#[tokio::test]
async fn no_file_selected_tests_empty_choice_is_a_no_op() {
    let workflow = common::workflow(common::ScriptedTransport::default());

    let outcome = workflow.select_file(None).await.expect("no-op should succeed");
    assert_eq!(outcome, UploadOutcome::Ignored);
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(!workflow.snapshot().ui.controls.trigger_enabled);
}

#[tokio::test]
async fn no_file_selected_tests_report_requires_a_result() {
    let workflow = common::workflow(common::ScriptedTransport::default());
    assert!(matches!(
        workflow.open_report(),
        Err(WorkflowError::ReportUnavailable)
    ));
    assert!(matches!(
        workflow.dispatch_rescue(),
        Err(WorkflowError::ReportUnavailable)
    ));
}
