//! Recording viewer.

use crate::error::{ViewerError, ViewerResult};
use crate::viewer::{PhotoViewer, TerminateOutcome, ViewerProcess};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct Shared {
    launched: Vec<PathBuf>,
    terminated: usize,
    launch_error: Option<ViewerError>,
    terminate_error: Option<ViewerError>,
    last_timeout: Option<Duration>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Viewer that records launches and terminations instead of spawning.
#[derive(Debug)]
pub struct MockViewer {
    shared: Arc<Mutex<Shared>>,
}

impl MockViewer {
    pub fn new() -> (Self, MockViewerHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockViewerHandle { shared },
        )
    }
}

impl PhotoViewer for MockViewer {
    type Process = MockViewerProcess;

    async fn launch(&self, photo: &Path) -> ViewerResult<MockViewerProcess> {
        let mut shared = lock(&self.shared);
        if let Some(error) = shared.launch_error.clone() {
            return Err(error);
        }
        shared.launched.push(photo.to_path_buf());
        Ok(MockViewerProcess {
            shared: Arc::clone(&self.shared),
        })
    }
}

/// Process handed out by [`MockViewer`].
#[derive(Debug)]
pub struct MockViewerProcess {
    shared: Arc<Mutex<Shared>>,
}

impl ViewerProcess for MockViewerProcess {
    async fn terminate(&mut self, timeout: Duration) -> ViewerResult<TerminateOutcome> {
        let mut shared = lock(&self.shared);
        shared.last_timeout = Some(timeout);
        if let Some(error) = shared.terminate_error.clone() {
            return Err(error);
        }
        shared.terminated += 1;
        Ok(TerminateOutcome::Exited)
    }
}

/// Handle for inspecting and steering a [`MockViewer`].
#[derive(Debug, Clone)]
pub struct MockViewerHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockViewerHandle {
    /// Photos passed to `launch`, oldest first.
    pub fn launched(&self) -> Vec<PathBuf> {
        lock(&self.shared).launched.clone()
    }

    /// Number of successful terminations.
    pub fn terminated(&self) -> usize {
        lock(&self.shared).terminated
    }

    /// Timeout passed to the most recent `terminate` call.
    pub fn last_timeout(&self) -> Option<Duration> {
        lock(&self.shared).last_timeout
    }

    /// Make `launch` fail with `error` (or succeed again with `None`).
    pub fn fail_launch(&self, error: Option<ViewerError>) {
        lock(&self.shared).launch_error = error;
    }

    /// Make `terminate` fail with `error` (or succeed again with `None`).
    pub fn fail_terminate(&self, error: Option<ViewerError>) {
        lock(&self.shared).terminate_error = error;
    }
}
