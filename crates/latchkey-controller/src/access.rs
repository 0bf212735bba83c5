//! Access verification: key lookup, door opening, photo display.
//!
//! A granted session always runs its closing phase before returning. The
//! grant path has no early returns: peripheral errors are absorbed by the
//! ports and viewer errors are logged. The open latch is held through an
//! [`OpenLatch`](latchkey_hardware::OpenLatch) guard, so a panic or a
//! dropped session future between opening and closing still closes it.

use crate::error::{SessionError, SessionResult};
use crate::input::{OperatorInput, require_line};
use crate::messages::DisplayMessages;
use crate::rotation::{OpenWindow, RotationSchedule};
use crate::show_error;
use crate::state_machine::{SessionState, StateMachine};
use latchkey_capture::{PhotoViewer, TerminateOutcome, ViewerError, ViewerProcess};
use latchkey_core::config::{PathsConfig, SessionConfig};
use latchkey_hardware::Peripherals;
use latchkey_storage::{Identity, IdentityRepository};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Outcome of a credential lookup.
///
/// An unknown key and a key that does not match exactly are the same
/// `Denied`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Granted(Identity),
    Denied,
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Decision::Granted(identity) => Some(identity),
            Decision::Denied => None,
        }
    }
}

/// Drives access sessions against an identity store and a photo viewer.
///
/// # Examples
///
/// ```no_run
/// use latchkey_capture::ExternalViewer;
/// use latchkey_controller::AccessController;
/// use latchkey_controller::input::ScriptedInput;
/// use latchkey_core::LatchkeyConfig;
/// use latchkey_hardware::Peripherals;
/// use latchkey_storage::InMemoryIdentityRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LatchkeyConfig::default();
/// let mut peripherals = Peripherals::acquire(&config).await?;
/// let mut access = AccessController::new(
///     InMemoryIdentityRepository::new(),
///     ExternalViewer::from_config(&config.viewer),
///     config.paths.clone(),
///     config.session.clone(),
/// );
///
/// let decision = access
///     .verify(&mut peripherals, &mut ScriptedInput::new(["1234"]))
///     .await?;
/// println!("granted: {}", decision.is_granted());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AccessController<R, V> {
    identities: R,
    viewer: V,
    paths: PathsConfig,
    timing: SessionConfig,
    machine: StateMachine,
}

impl<R, V> AccessController<R, V>
where
    R: IdentityRepository,
    V: PhotoViewer,
{
    pub fn new(identities: R, viewer: V, paths: PathsConfig, timing: SessionConfig) -> Self {
        Self {
            identities,
            viewer,
            paths,
            timing,
            machine: StateMachine::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.machine.current_state()
    }

    /// Transition history, for diagnostics.
    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Look up `secret` and move to `Granted` or `Denied`.
    ///
    /// Matching is exact. An empty secret is denied without a lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a previous session was left mid-way (the machine
    /// is neither idle nor awaiting a credential) or if the store lookup
    /// fails. A failed lookup leaves the machine idle.
    pub async fn submit_credential(&mut self, secret: &str) -> SessionResult<Decision> {
        if self.state() == SessionState::Idle {
            self.machine
                .transition_to(SessionState::AwaitingCredential)?;
        }
        self.machine.transition_to(SessionState::Deciding)?;

        let found = if secret.is_empty() {
            None
        } else {
            match self.identities.find_by_credential(secret).await {
                Ok(found) => found,
                Err(e) => {
                    self.machine.reset();
                    return Err(e.into());
                }
            }
        };

        match found {
            Some(identity) => {
                self.machine.transition_to(SessionState::Granted)?;
                Ok(Decision::Granted(identity))
            }
            None => {
                self.machine.transition_to(SessionState::Denied)?;
                Ok(Decision::Denied)
            }
        }
    }

    /// Run one complete access session: prompt, decide, then open and close
    /// the door or show the denial.
    ///
    /// # Errors
    ///
    /// Returns an error if the input ends before a key is entered or the
    /// store lookup fails. In both cases the door was never opened.
    pub async fn verify<I: OperatorInput>(
        &mut self,
        peripherals: &mut Peripherals,
        input: &mut I,
    ) -> SessionResult<Decision> {
        let span = info_span!("verify", session_id = %Uuid::new_v4());
        async {
            let result = self.run(peripherals, input).await;
            if let Err(e) = &result {
                error!("Access session aborted: {}", e);
                if !matches!(e, SessionError::InputClosed) {
                    show_error(peripherals, e, self.timing.notice_hold()).await;
                }
                if !self.machine.current_state().latch_may_be_open() {
                    self.machine.reset();
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run<I: OperatorInput>(
        &mut self,
        peripherals: &mut Peripherals,
        input: &mut I,
    ) -> SessionResult<Decision> {
        self.machine
            .transition_to(SessionState::AwaitingCredential)?;
        peripherals
            .display
            .show(DisplayMessages::ENTER_KEY, "", true, Duration::ZERO)
            .await;
        let secret = require_line(input, "Enter your key: ").await?;

        let decision = self.submit_credential(&secret).await?;
        match &decision {
            Decision::Granted(identity) => self.grant(peripherals, identity).await,
            Decision::Denied => self.deny(peripherals).await,
        }
        Ok(decision)
    }

    async fn grant(&mut self, peripherals: &mut Peripherals, identity: &Identity) {
        info!("Access granted to {} (id {})", identity.name, identity.id);
        peripherals
            .display
            .show(DisplayMessages::ACCESS_OK, &identity.name, true, Duration::ZERO)
            .await;

        let mut viewer = self.start_viewer(peripherals, identity).await;

        self.advance(SessionState::Opening);
        let latch = peripherals.actuator.open_guarded().await;

        self.advance(SessionState::HoldingOpen);
        let window = OpenWindow::start(self.timing.open_window());
        let schedule = RotationSchedule::new(
            &identity.name,
            self.timing.open_window(),
            self.timing.rotation_cadence(),
        );
        for step in &schedule {
            peripherals
                .display
                .show_frame(&step.frame, true, step.hold)
                .await;
        }
        debug!("Open window over after {:?}", window.elapsed());

        self.advance(SessionState::Closing);
        if let Some(process) = viewer.as_mut() {
            self.stop_viewer(process).await;
        }
        latch.close().await;
        peripherals
            .display
            .show(
                DisplayMessages::DOOR_CLOSED,
                "",
                true,
                self.timing.closed_hold(),
            )
            .await;
        peripherals.display.clear().await;

        self.advance(SessionState::Idle);
        info!("Door closed");
    }

    async fn deny(&mut self, peripherals: &mut Peripherals) {
        info!("Access denied");
        peripherals
            .display
            .show(
                DisplayMessages::ACCESS_DENIED,
                DisplayMessages::WRONG_KEY,
                true,
                self.timing.denial_hold(),
            )
            .await;
        peripherals.display.clear().await;
        self.advance(SessionState::Idle);
    }

    /// Launch the viewer on the identity's photo, if the file is there.
    async fn start_viewer(
        &self,
        peripherals: &mut Peripherals,
        identity: &Identity,
    ) -> Option<V::Process> {
        let photo = self.photo_location(identity);
        if !tokio::fs::try_exists(&photo).await.unwrap_or(false) {
            warn!("Photo not found at {}", photo.display());
            peripherals
                .display
                .show(
                    DisplayMessages::PHOTO_NOT_FOUND,
                    "",
                    true,
                    self.timing.notice_hold(),
                )
                .await;
            return None;
        }

        match self.viewer.launch(&photo).await {
            Ok(process) => {
                debug!("Showing {}", photo.display());
                Some(process)
            }
            Err(ViewerError::NotFound { program }) => {
                warn!("Viewer {} is not installed", program);
                peripherals
                    .display
                    .show(
                        DisplayMessages::VIEWER_ERROR,
                        DisplayMessages::NOT_INSTALLED,
                        true,
                        self.timing.notice_hold(),
                    )
                    .await;
                None
            }
            Err(e) => {
                warn!("Could not show photo: {}", e);
                None
            }
        }
    }

    async fn stop_viewer(&self, process: &mut V::Process) {
        match process
            .terminate(self.timing.viewer_terminate_timeout())
            .await
        {
            Ok(TerminateOutcome::Killed) => warn!("Viewer ignored termination and was killed"),
            Ok(outcome) => debug!("Viewer stopped: {:?}", outcome),
            Err(e) => warn!("Viewer termination failed: {}", e),
        }
    }

    /// Absolute path of the identity's photo.
    fn photo_location(&self, identity: &Identity) -> PathBuf {
        let photo = self.paths.resolve(identity.photo());
        std::path::absolute(&photo).unwrap_or(photo)
    }

    /// Transition that cannot fail on the grant and deny paths.
    fn advance(&mut self, state: SessionState) {
        if let Err(e) = self.machine.transition_to(state) {
            warn!("{}", e);
        }
    }
}
