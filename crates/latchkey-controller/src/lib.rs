//! Session logic for the Latchkey door controller.
//!
//! - [`AccessController`] runs access sessions: it reads a key, looks it up,
//!   and on a match opens the door for the configured window while the
//!   person's photo is shown, then closes it again.
//! - [`EnrollmentSession`] registers a new identity with a photo taken by
//!   the network camera.
//! - [`RotationSchedule`] produces the frames shown while the door is open.
//!
//! Both sessions take the [`Peripherals`] and an [`OperatorInput`] per call
//! and run to completion before returning.

pub mod access;
pub mod enrollment;
pub mod error;
pub mod input;
pub mod messages;
pub mod rotation;
pub mod state_machine;
pub mod text;

pub use access::{AccessController, Decision};
pub use enrollment::{Enrolled, EnrollmentDraft, EnrollmentSession};
pub use error::{SessionError, SessionResult};
pub use input::{OperatorInput, ScriptedInput};
pub use rotation::{OpenWindow, RotationSchedule, RotationStep};
pub use state_machine::{SessionState, StateMachine, StateTransition};

use latchkey_hardware::Peripherals;
use std::time::Duration;

/// Show an error as a two-line summary for `hold`, then clear.
pub async fn show_error(peripherals: &mut Peripherals, error: &SessionError, hold: Duration) {
    let display = &mut peripherals.display;
    let (line1, line2) = text::split_two_lines(&error.to_string(), display.columns());
    display.show(&line1, &line2, true, hold).await;
    display.clear().await;
}
