//! Integration test for the version shown in the UI.

mod common;

use aether_app::{APP_VERSION, app_version};

#[test]
fn version_display_tests_version_matches_root_file() {
    let root_version = include_str!("../../../VERSION").trim();
    assert_eq!(app_version(), root_version);
    assert_eq!(APP_VERSION, root_version);
}

#[test]
fn version_display_tests_workflow_carries_version() {
    let workflow = aether_app::Workflow::new(
        aether_upload::PredictionClient::new(common::ScriptedTransport::default()),
        app_version(),
    );
    assert_eq!(workflow.snapshot().ui.version, app_version());
}
