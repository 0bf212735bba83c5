//! Enum wrappers for device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn DoorActuator>`
//! is not an option. The configured driver is instead picked at startup and
//! stored in one of these enums, which forward every call with a `match`.
//!
//! # Examples
//!
//! ```
//! use latchkey_hardware::devices::AnyActuator;
//! use latchkey_hardware::mock::MockActuator;
//!
//! let (actuator, _handle) = MockActuator::new();
//! let any_actuator = AnyActuator::Mock(actuator);
//! ```

use crate::drivers::{ConsoleDisplay, ServoActuator, SimulatedActuator};
#[cfg(feature = "lcd-i2c")]
use crate::drivers::{LcdDisplay, LinuxI2cBus};
use crate::mock::{MockActuator, MockDisplay};
use crate::traits::{CharacterDisplay, DoorActuator};
use crate::{DeviceInfo, DisplayGeometry, Result};

/// Enum wrapper for actuator dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyActuator {
    /// Servo on a sysfs PWM channel.
    Servo(ServoActuator),
    /// Log-only actuator.
    Simulated(SimulatedActuator),
    /// Mock actuator for testing.
    Mock(MockActuator),
}

impl DoorActuator for AnyActuator {
    async fn open(&mut self) -> Result<()> {
        match self {
            Self::Servo(device) => device.open().await,
            Self::Simulated(device) => device.open().await,
            Self::Mock(device) => device.open().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Servo(device) => device.close().await,
            Self::Simulated(device) => device.close().await,
            Self::Mock(device) => device.close().await,
        }
    }

    fn close_now(&mut self) -> Result<()> {
        match self {
            Self::Servo(device) => device.close_now(),
            Self::Simulated(device) => device.close_now(),
            Self::Mock(device) => device.close_now(),
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Servo(device) => device.release().await,
            Self::Simulated(device) => device.release().await,
            Self::Mock(device) => device.release().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Servo(device) => device.get_info().await,
            Self::Simulated(device) => device.get_info().await,
            Self::Mock(device) => device.get_info().await,
        }
    }

    fn is_simulated(&self) -> bool {
        match self {
            Self::Servo(device) => device.is_simulated(),
            Self::Simulated(device) => device.is_simulated(),
            Self::Mock(device) => device.is_simulated(),
        }
    }
}

/// Enum wrapper for display dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDisplay {
    /// HD44780 LCD on a Linux I2C bus.
    #[cfg(feature = "lcd-i2c")]
    Lcd(LcdDisplay<LinuxI2cBus>),
    /// Log-only display.
    Console(ConsoleDisplay),
    /// Mock display for testing.
    Mock(MockDisplay),
}

impl CharacterDisplay for AnyDisplay {
    fn geometry(&self) -> DisplayGeometry {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.geometry(),
            Self::Console(device) => device.geometry(),
            Self::Mock(device) => device.geometry(),
        }
    }

    async fn clear(&mut self) -> Result<()> {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.clear().await,
            Self::Console(device) => device.clear().await,
            Self::Mock(device) => device.clear().await,
        }
    }

    async fn write_line(&mut self, row: usize, text: &str) -> Result<()> {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.write_line(row, text).await,
            Self::Console(device) => device.write_line(row, text).await,
            Self::Mock(device) => device.write_line(row, text).await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.release().await,
            Self::Console(device) => device.release().await,
            Self::Mock(device) => device.release().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.get_info().await,
            Self::Console(device) => device.get_info().await,
            Self::Mock(device) => device.get_info().await,
        }
    }

    fn is_simulated(&self) -> bool {
        match self {
            #[cfg(feature = "lcd-i2c")]
            Self::Lcd(device) => device.is_simulated(),
            Self::Console(device) => device.is_simulated(),
            Self::Mock(device) => device.is_simulated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActuatorState;

    #[tokio::test]
    async fn test_any_actuator_forwards_to_mock() {
        let (actuator, handle) = MockActuator::new();
        let mut any = AnyActuator::Mock(actuator);

        any.open().await.unwrap();
        any.close().await.unwrap();
        assert_eq!(handle.moves(), vec![ActuatorState::Open, ActuatorState::Closed]);
        assert!(!any.is_simulated());
    }

    #[tokio::test]
    async fn test_any_display_reports_simulation() {
        let any = AnyDisplay::Console(ConsoleDisplay::new(DisplayGeometry::default()));
        assert!(any.is_simulated());
        assert_eq!(any.get_info().await.unwrap().model, "simulated");
    }
}
