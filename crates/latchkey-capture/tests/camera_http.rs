//! HTTP camera against a local mock server.

use latchkey_capture::{CaptureError, HttpCamera, PhotoSource};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg\xFF\xD9";

async fn camera_for(server: &MockServer, timeout: Duration) -> HttpCamera {
    HttpCamera::new(format!("{}/shot.jpg", server.uri()), timeout).unwrap()
}

#[tokio::test]
async fn test_capture_returns_body_and_jpeg_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shot.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG),
        )
        .expect(1)
        .mount(&server)
        .await;

    let photo = camera_for(&server, Duration::from_secs(5))
        .await
        .capture()
        .await
        .unwrap();

    assert_eq!(&photo.bytes[..], JPEG);
    assert_eq!(photo.extension, "jpg");
}

#[tokio::test]
async fn test_png_content_type_selects_png_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shot.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"\x89PNG\r\n\x1a\n".to_vec()),
        )
        .mount(&server)
        .await;

    let photo = camera_for(&server, Duration::from_secs(5))
        .await
        .capture()
        .await
        .unwrap();

    assert_eq!(photo.extension, "png");
}

#[tokio::test]
async fn test_non_success_status_is_capture_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = camera_for(&server, Duration::from_secs(5))
        .await
        .capture()
        .await;

    assert_eq!(result, Err(CaptureError::NonSuccessStatus { status: 503 }));
}

#[tokio::test]
async fn test_slow_camera_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(JPEG)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = camera_for(&server, Duration::from_millis(200))
        .await
        .capture()
        .await;

    assert_eq!(result, Err(CaptureError::Timeout { timeout_ms: 200 }));
}

#[tokio::test]
async fn test_empty_body_is_capture_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = camera_for(&server, Duration::from_secs(5))
        .await
        .capture()
        .await;

    assert_eq!(result, Err(CaptureError::EmptyBody));
}
