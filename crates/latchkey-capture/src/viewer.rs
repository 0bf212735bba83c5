//! External photo viewer process.
//!
//! While the door is open the user's enrolled photo is shown full screen by
//! an external program (`feh` by default). The process is started without
//! waiting for it and stopped when the door closes: first politely with
//! SIGTERM, then with SIGKILL if it has not exited within the timeout.

#![allow(async_fn_in_trait)]

use crate::error::{ViewerError, ViewerResult};
use latchkey_core::config::ViewerConfig;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// How a running viewer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The process had already exited on its own.
    AlreadyExited,
    /// The process exited after the termination request.
    Exited,
    /// The process ignored the request and was killed.
    Killed,
}

/// Launches viewer processes.
pub trait PhotoViewer: Send + Sync {
    type Process: ViewerProcess;

    /// Start showing `photo` without waiting for the viewer to exit.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::NotFound` if the program is not installed.
    async fn launch(&self, photo: &Path) -> ViewerResult<Self::Process>;
}

/// A running viewer.
pub trait ViewerProcess: Send {
    /// Ask the viewer to exit, waiting at most `timeout` before killing it.
    async fn terminate(&mut self, timeout: Duration) -> ViewerResult<TerminateOutcome>;
}

/// Viewer backed by an external program.
#[derive(Debug, Clone)]
pub struct ExternalViewer {
    program: String,
    args: Vec<String>,
}

impl ExternalViewer {
    /// `program` is invoked as `program args... <photo>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl PhotoViewer for ExternalViewer {
    type Process = ExternalProcess;

    async fn launch(&self, photo: &Path) -> ViewerResult<ExternalProcess> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(photo)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ViewerError::not_found(&self.program),
                _ => ViewerError::launch_failed(format!("{}: {}", self.program, e)),
            })?;

        info!(
            "Viewer {} started (pid {:?}) for {}",
            self.program,
            child.id(),
            photo.display()
        );
        Ok(ExternalProcess { child })
    }
}

/// Handle on a spawned viewer. Dropping it kills the process.
#[derive(Debug)]
pub struct ExternalProcess {
    child: Child,
}

impl ExternalProcess {
    /// OS process id, if the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

impl ViewerProcess for ExternalProcess {
    async fn terminate(&mut self, timeout: Duration) -> ViewerResult<TerminateOutcome> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("Viewer already exited with {}", status);
            return Ok(TerminateOutcome::AlreadyExited);
        }

        if let Some(pid) = self.child.id() {
            request_termination(pid).await;
        }

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Viewer exited with {}", status);
                Ok(TerminateOutcome::Exited)
            }
            Ok(Err(e)) => Err(ViewerError::process(e.to_string())),
            Err(_) => {
                warn!(
                    "Viewer did not exit within {}ms, killing it",
                    timeout.as_millis()
                );
                self.child
                    .kill()
                    .await
                    .map_err(|e| ViewerError::process(e.to_string()))?;
                Ok(TerminateOutcome::Killed)
            }
        }
    }
}

/// Send SIGTERM. Failures are logged; the caller falls back to SIGKILL.
async fn request_termination(pid: u32) {
    #[cfg(unix)]
    {
        let sent = Command::new("kill")
            .arg("-TERM")
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match sent {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("kill -TERM {} exited with {}", pid, status),
            Err(e) => warn!("Could not run kill for viewer {}: {}", pid, e),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}
