//! Mock actuator for testing.

use crate::{
    Result,
    error::PeripheralError,
    traits::DoorActuator,
    types::{ActuatorState, DeviceInfo},
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct Shared {
    moves: Vec<ActuatorState>,
    fail_open: bool,
    fail_close: bool,
    released: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock actuator that records completed moves.
///
/// Failed moves (see [`MockActuatorHandle::fail_open`]) are not recorded.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::MockActuator;
/// use latchkey_hardware::traits::DoorActuator;
/// use latchkey_hardware::ActuatorState;
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut actuator, handle) = MockActuator::new();
///
///     actuator.open().await?;
///     actuator.close().await?;
///
///     assert_eq!(handle.moves(), vec![ActuatorState::Open, ActuatorState::Closed]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockActuator {
    shared: Arc<Mutex<Shared>>,
    settle: Duration,
}

impl MockActuator {
    /// Create a mock that completes moves immediately.
    pub fn new() -> (Self, MockActuatorHandle) {
        Self::with_settle(Duration::ZERO)
    }

    /// Create a mock that sleeps `settle` on every move, like a servo.
    pub fn with_settle(settle: Duration) -> (Self, MockActuatorHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let actuator = Self {
            shared: Arc::clone(&shared),
            settle,
        };
        (actuator, MockActuatorHandle { shared })
    }

    async fn move_to(&mut self, target: ActuatorState) -> Result<()> {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        self.record(target)
    }

    fn record(&self, target: ActuatorState) -> Result<()> {
        let mut shared = lock(&self.shared);
        if shared.released {
            return Err(PeripheralError::unavailable("Mock Actuator (released)"));
        }
        let fail = match target {
            ActuatorState::Open => shared.fail_open,
            ActuatorState::Closed => shared.fail_close,
        };
        if fail {
            return Err(PeripheralError::transient(format!(
                "Injected failure moving to {}",
                target
            )));
        }
        shared.moves.push(target);
        Ok(())
    }
}

impl DoorActuator for MockActuator {
    async fn open(&mut self) -> Result<()> {
        self.move_to(ActuatorState::Open).await
    }

    async fn close(&mut self) -> Result<()> {
        self.move_to(ActuatorState::Closed).await
    }

    fn close_now(&mut self) -> Result<()> {
        self.record(ActuatorState::Closed)
    }

    async fn release(&mut self) -> Result<()> {
        lock(&self.shared).released = true;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Mock Actuator", "mock"))
    }
}

/// Handle for inspecting and steering a [`MockActuator`].
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockActuatorHandle {
    /// Completed moves, oldest first.
    pub fn moves(&self) -> Vec<ActuatorState> {
        lock(&self.shared).moves.clone()
    }

    /// Make subsequent `open` calls fail.
    pub fn fail_open(&self, fail: bool) {
        lock(&self.shared).fail_open = fail;
    }

    /// Make subsequent `close` calls fail.
    pub fn fail_close(&self, fail: bool) {
        lock(&self.shared).fail_close = fail;
    }

    pub fn is_released(&self) -> bool {
        lock(&self.shared).released
    }
}
