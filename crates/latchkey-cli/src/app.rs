//! Interactive menu loop.

use crate::menu::{MENU, MenuChoice};
use latchkey_capture::{PhotoSource, PhotoViewer};
use latchkey_controller::messages::DisplayMessages;
use latchkey_controller::{
    AccessController, EnrollmentSession, OperatorInput, SessionError, SessionResult,
};
use latchkey_core::config::SessionConfig;
use latchkey_hardware::Peripherals;
use latchkey_storage::IdentityRepository;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

/// The two workflows behind the menu.
pub struct App<R, V, C> {
    access: AccessController<R, V>,
    enrollment: EnrollmentSession<R, C>,
    timing: SessionConfig,
}

impl<R, V, C> App<R, V, C>
where
    R: IdentityRepository,
    V: PhotoViewer,
    C: PhotoSource,
{
    pub fn new(
        access: AccessController<R, V>,
        enrollment: EnrollmentSession<R, C>,
        timing: SessionConfig,
    ) -> Self {
        Self {
            access,
            enrollment,
            timing,
        }
    }

    /// Run the menu until the operator exits or the input ends.
    ///
    /// Workflow failures are reported on the display and the menu is shown
    /// again; they never end the loop.
    pub async fn run<I: OperatorInput>(
        &mut self,
        peripherals: &mut Peripherals,
        input: &mut I,
    ) -> SessionResult<()> {
        let hold = self.timing.notice_hold();
        peripherals
            .display
            .show(
                DisplayMessages::SYSTEM_READY,
                DisplayMessages::CHOOSE_OPTION,
                true,
                hold,
            )
            .await;
        peripherals.display.clear().await;

        loop {
            println!("{MENU}");
            let answer = match input.read_line("Select an option: ").await {
                Ok(Some(answer)) => Some(answer),
                Ok(None) => {
                    info!("Input closed, leaving menu");
                    break;
                }
                Err(SessionError::Io(e)) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Unreadable menu input: {}", e);
                    None
                }
                Err(e) => return Err(e),
            };

            let Some(choice) = answer.as_deref().and_then(MenuChoice::parse) else {
                println!("Invalid option, try again.");
                peripherals
                    .display
                    .show(DisplayMessages::INVALID_OPTION, "", true, hold)
                    .await;
                continue;
            };
            debug!("Menu choice: {}", choice);

            let outcome = match choice {
                MenuChoice::Verify => self
                    .access
                    .verify(peripherals, input)
                    .await
                    .map(|decision| {
                        if decision.is_granted() {
                            println!("Access granted.");
                        } else {
                            println!("Access denied.");
                        }
                    }),
                MenuChoice::Enroll => self
                    .enrollment
                    .enroll(peripherals, input)
                    .await
                    .map(|enrolled| println!("Enrolled with photo {}.", enrolled.photo_path)),
                MenuChoice::Exit => {
                    println!("Exiting...");
                    break;
                }
            };

            match outcome {
                Err(SessionError::InputClosed) => break,
                Err(e) => println!("Operation failed: {e}"),
                Ok(()) => {}
            }

            peripherals
                .display
                .show(
                    DisplayMessages::OPERATION_OK,
                    DisplayMessages::CHOOSE_AGAIN,
                    true,
                    hold,
                )
                .await;
            peripherals.display.clear().await;
        }

        peripherals
            .display
            .show(DisplayMessages::GOODBYE, "", true, hold)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_capture::mock::{MockCamera, MockViewer};
    use latchkey_controller::ScriptedInput;
    use latchkey_core::config::PathsConfig;
    use latchkey_core::{Credential, PersonName};
    use latchkey_hardware::mock::{
        MockActuator, MockActuatorHandle, MockDisplay, MockDisplayHandle,
    };
    use latchkey_hardware::{ActuatorState, AnyActuator, AnyDisplay};
    use latchkey_storage::{InMemoryIdentityRepository, NewIdentity};

    struct Fixture {
        app: App<InMemoryIdentityRepository, MockViewer, MockCamera>,
        peripherals: Peripherals,
        latch: MockActuatorHandle,
        screen: MockDisplayHandle,
        store: InMemoryIdentityRepository,
        _base: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let base = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            base_dir: base.path().to_path_buf(),
            ..PathsConfig::default()
        };
        let timing = SessionConfig::default();
        let store = InMemoryIdentityRepository::new();
        store
            .create(&NewIdentity::new(
                PersonName::new("Ana").unwrap(),
                Credential::new("1234").unwrap(),
                "photos/p.jpg",
            ))
            .await
            .unwrap();

        let (viewer, _) = MockViewer::new();
        let (camera, _) = MockCamera::jpeg();
        let app = App::new(
            AccessController::new(store.clone(), viewer, paths.clone(), timing.clone()),
            EnrollmentSession::new(store.clone(), camera, paths, timing.clone()),
            timing,
        );

        let (actuator, latch) = MockActuator::new();
        let (display, screen) = MockDisplay::new();
        Fixture {
            app,
            peripherals: Peripherals::new(AnyActuator::Mock(actuator), AnyDisplay::Mock(display)),
            latch,
            screen,
            store,
            _base: base,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_then_exit() {
        let mut f = fixture().await;
        let mut input = ScriptedInput::new(["1", "1234", "3"]);

        f.app.run(&mut f.peripherals, &mut input).await.unwrap();

        assert_eq!(f.latch.moves(), vec![ActuatorState::Open, ActuatorState::Closed]);
        assert!(f.screen.saw("System Ready"));
        assert!(f.screen.saw("Operation OK"));
        assert_eq!(f.screen.screen()[0], "Goodbye!");
        assert_eq!(input.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_option_is_rejected_and_prompted_again() {
        let mut f = fixture().await;
        let mut input = ScriptedInput::new(["9", "abc", "3"]);

        f.app.run(&mut f.peripherals, &mut input).await.unwrap();

        assert!(f.screen.saw("Invalid option"));
        assert_eq!(
            input
                .prompts()
                .iter()
                .filter(|p| p.as_str() == "Select an option: ")
                .count(),
            3
        );
        assert!(f.latch.moves().is_empty());
    }

    /// Input whose first line cannot be decoded.
    struct GarbledFirstLine {
        garbled: bool,
        rest: ScriptedInput,
    }

    impl OperatorInput for GarbledFirstLine {
        async fn read_line(&mut self, prompt: &str) -> SessionResult<Option<String>> {
            if !self.garbled {
                self.garbled = true;
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    "stream did not contain valid UTF-8",
                )
                .into());
            }
            self.rest.read_line(prompt).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_answer_is_rejected_and_prompted_again() {
        let mut f = fixture().await;
        let mut input = GarbledFirstLine {
            garbled: false,
            rest: ScriptedInput::new(["3"]),
        };

        f.app.run(&mut f.peripherals, &mut input).await.unwrap();

        assert!(f.screen.saw("Invalid option"));
        assert_eq!(input.rest.prompts(), ["Select an option: "]);
        assert_eq!(f.screen.screen()[0], "Goodbye!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_enrollment_returns_to_menu() {
        let mut f = fixture().await;
        // Same key as Ana: the store rejects it.
        let mut input = ScriptedInput::new(["2", "Bob", "1234", "", "1", "1234", "3"]);

        f.app.run(&mut f.peripherals, &mut input).await.unwrap();

        assert_eq!(f.store.all().len(), 1);
        assert!(f.screen.saw("DB error"));
        assert_eq!(f.latch.moves(), vec![ActuatorState::Open, ActuatorState::Closed]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_leaves_the_loop() {
        let mut f = fixture().await;
        let mut input = ScriptedInput::new(["1"]);

        f.app.run(&mut f.peripherals, &mut input).await.unwrap();

        assert!(f.latch.moves().is_empty());
        assert!(f.screen.saw("Goodbye!"));
    }
}
