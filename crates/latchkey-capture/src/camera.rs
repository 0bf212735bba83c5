//! Network camera client.
//!
//! The camera is any HTTP endpoint that answers a plain `GET` with a still
//! image, such as the `/shot.jpg` endpoint of the Android "IP Webcam" app.

#![allow(async_fn_in_trait)]

use crate::error::{CaptureError, CaptureResult};
use bytes::Bytes;
use latchkey_core::config::CameraConfig;
use latchkey_core::constants::DEFAULT_PHOTO_EXTENSION;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};

/// Image bytes plus the file extension matching their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub bytes: Bytes,
    pub extension: &'static str,
}

impl CapturedPhoto {
    pub fn new(bytes: impl Into<Bytes>, extension: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            extension,
        }
    }

    /// A JPEG photo.
    pub fn jpeg(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, DEFAULT_PHOTO_EXTENSION)
    }
}

/// Source of enrollment photos.
pub trait PhotoSource: Send + Sync {
    /// Take one photo.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] on timeout, transport failure, non-success
    /// status or an empty image.
    async fn capture(&self) -> CaptureResult<CapturedPhoto>;
}

/// Pick the file extension for a `Content-Type` value.
///
/// PNG is recognized explicitly; everything else (including a missing
/// header) is assumed to be JPEG.
pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    match essence.as_deref() {
        Some("image/png") => "png",
        _ => DEFAULT_PHOTO_EXTENSION,
    }
}

/// Camera reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCamera {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpCamera {
    /// Create a camera client with a whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Transport` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> CaptureResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CaptureError::transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &CameraConfig) -> CaptureResult<Self> {
        Self::new(config.url.clone(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, error: reqwest::Error) -> CaptureError {
        if error.is_timeout() {
            CaptureError::Timeout {
                timeout_ms: saturating_millis(self.timeout),
            }
        } else {
            CaptureError::transport(error.to_string())
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PhotoSource for HttpCamera {
    async fn capture(&self) -> CaptureResult<CapturedPhoto> {
        debug!("Requesting photo from {}", self.url);
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::NonSuccessStatus {
                status: status.as_u16(),
            });
        }

        let extension = extension_for(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        if bytes.is_empty() {
            return Err(CaptureError::EmptyBody);
        }

        info!("Captured {} byte {} photo", bytes.len(), extension);
        Ok(CapturedPhoto { bytes, extension })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("image/png"), "png")]
    #[case(Some("IMAGE/PNG; charset=binary"), "png")]
    #[case(Some("image/jpeg"), "jpg")]
    #[case(Some("application/octet-stream"), "jpg")]
    #[case(None, "jpg")]
    fn test_extension_for(#[case] content_type: Option<&str>, #[case] expected: &str) {
        assert_eq!(extension_for(content_type), expected);
    }

    #[rstest]
    #[case(Duration::from_millis(200), 200)]
    #[case(Duration::from_micros(1500), 1)]
    #[case(Duration::MAX, u64::MAX)]
    fn test_saturating_millis(#[case] duration: Duration, #[case] expected: u64) {
        assert_eq!(saturating_millis(duration), expected);
    }

    #[tokio::test]
    async fn test_unreachable_camera_is_transport_error() {
        // Port 9 (discard) on loopback is closed on any sane test host.
        let camera = HttpCamera::new("http://127.0.0.1:9/shot.jpg", Duration::from_secs(2)).unwrap();
        let result = camera.capture().await;
        assert!(matches!(result, Err(CaptureError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let camera = HttpCamera::new("not a url", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            camera.capture().await,
            Err(CaptureError::Transport { .. })
        ));
    }
}
