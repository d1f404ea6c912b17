//! Integration tests for the prediction client round trip.

use std::time::Duration;

use aether_upload::{PredictionClient, PredictionRequest, PredictionTransport, UploadError};

struct CannedTransport {
    body: &'static str,
}

impl PredictionTransport for CannedTransport {
    async fn send(&self, _request: PredictionRequest) -> Result<String, UploadError> {
        Ok(self.body.to_string())
    }
}

struct StalledTransport;

impl PredictionTransport for StalledTransport {
    async fn send(&self, _request: PredictionRequest) -> Result<String, UploadError> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

struct RejectingTransport;

impl PredictionTransport for RejectingTransport {
    async fn send(&self, _request: PredictionRequest) -> Result<String, UploadError> {
        Err(UploadError::Status(500))
    }
}

fn fixture_request() -> PredictionRequest {
    PredictionRequest {
        file_name: "scan.png".to_string(),
        media_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn prediction_client_tests_parses_successful_body() {
    let client = PredictionClient::new(CannedTransport {
        body: r#"{"prediction":"Survivor Found","confidence":"92%","mask_image":"AQID"}"#,
    });

    let result = client
        .predict(fixture_request())
        .await
        .expect("canned body should parse");
    assert_eq!(result.status_label, "Survivor Found");
    assert_eq!(result.confidence_label, "92%");
    assert_eq!(result.mask_image.as_deref(), Some("AQID"));
}

#[tokio::test]
async fn prediction_client_tests_rejects_malformed_body() {
    let client = PredictionClient::new(CannedTransport {
        body: "<html>Internal Server Error</html>",
    });

    let error = client
        .predict(fixture_request())
        .await
        .expect_err("html body should fail");
    assert!(matches!(error, UploadError::Contract(_)));
}

#[tokio::test]
async fn prediction_client_tests_propagates_status_failures() {
    let client = PredictionClient::new(RejectingTransport);
    let error = client.predict(fixture_request()).await.expect_err("500 should fail");
    assert!(matches!(error, UploadError::Status(500)));
}

#[tokio::test(start_paused = true)]
async fn prediction_client_tests_times_out_stalled_requests_when_configured() {
    let client =
        PredictionClient::new(StalledTransport).with_timeout(Some(Duration::from_millis(250)));

    let error = client
        .predict(fixture_request())
        .await
        .expect_err("stalled request should time out");
    assert!(matches!(error, UploadError::Timeout(limit) if limit == Duration::from_millis(250)));
}
