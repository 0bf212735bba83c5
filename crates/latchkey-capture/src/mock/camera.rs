//! Scripted camera.

use crate::camera::{CapturedPhoto, PhotoSource};
use crate::error::{CaptureError, CaptureResult};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct Shared {
    outcome: CaptureResult<CapturedPhoto>,
    calls: usize,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Camera that returns the same scripted outcome on every capture.
///
/// # Examples
///
/// ```
/// use latchkey_capture::camera::{CapturedPhoto, PhotoSource};
/// use latchkey_capture::error::CaptureError;
/// use latchkey_capture::mock::MockCamera;
///
/// #[tokio::main]
/// async fn main() {
///     let (camera, handle) = MockCamera::new(Ok(CapturedPhoto::jpeg(&b"\xFF\xD8"[..])));
///     assert!(camera.capture().await.is_ok());
///
///     handle.set_outcome(Err(CaptureError::Timeout { timeout_ms: 15000 }));
///     assert!(camera.capture().await.is_err());
///     assert_eq!(handle.calls(), 2);
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    shared: Arc<Mutex<Shared>>,
}

impl MockCamera {
    pub fn new(outcome: CaptureResult<CapturedPhoto>) -> (Self, MockCameraHandle) {
        let shared = Arc::new(Mutex::new(Shared { outcome, calls: 0 }));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockCameraHandle { shared },
        )
    }

    /// Camera returning a small fake JPEG.
    pub fn jpeg() -> (Self, MockCameraHandle) {
        Self::new(Ok(CapturedPhoto::jpeg(&b"\xFF\xD8\xFF\xE0fake-jpeg\xFF\xD9"[..])))
    }

    /// Camera failing with `error`.
    pub fn failing(error: CaptureError) -> (Self, MockCameraHandle) {
        Self::new(Err(error))
    }
}

impl PhotoSource for MockCamera {
    async fn capture(&self) -> CaptureResult<CapturedPhoto> {
        let mut shared = lock(&self.shared);
        shared.calls += 1;
        shared.outcome.clone()
    }
}

/// Handle for steering a [`MockCamera`].
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockCameraHandle {
    pub fn set_outcome(&self, outcome: CaptureResult<CapturedPhoto>) {
        lock(&self.shared).outcome = outcome;
    }

    /// Number of capture calls so far.
    pub fn calls(&self) -> usize {
        lock(&self.shared).calls
    }
}
