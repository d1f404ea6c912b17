//! Integration tests for arming a file without contents.

mod common;

use aether_app::{TriggerOutcome, UploadOutcome};
use aether_core::{FALLBACK_MEDIA_TYPE, FileChoice, WorkflowState};
use aether_ui::MSG_FILE_ARMED;

#[tokio::test]
async fn empty_file_tests_empty_payload_is_armed_and_sent() {
    let workflow = common::workflow(common::ScriptedTransport::new(vec![Ok(
        common::clear_body(),
    )]));

    let outcome = workflow
        .select_file(Some(FileChoice::new("empty.png", Vec::new())))
        .await
        .expect("empty file should arm");
    assert_eq!(outcome, UploadOutcome::Armed);

    let snapshot = workflow.snapshot();
    assert_eq!(snapshot.state, WorkflowState::FileArmed);
    assert!(snapshot.ui.controls.trigger_enabled);
    assert_eq!(snapshot.ui.console.count(MSG_FILE_ARMED), 1);
    assert_eq!(
        snapshot.ui.controls.preview_uri.as_deref(),
        Some("data:application/octet-stream;base64,")
    );

    assert!(matches!(workflow.trigger().await, TriggerOutcome::Succeeded(_)));
    let requests = workflow
        .client()
        .transport()
        .requests
        .lock()
        .expect("request log lock should work");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].file_name, "empty.png");
    assert_eq!(requests[0].media_type, FALLBACK_MEDIA_TYPE);
    assert!(requests[0].bytes.is_empty());
}
