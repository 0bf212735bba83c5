//! Device drivers.

pub mod console;
pub mod lcd;
pub mod servo;

pub use console::{ConsoleDisplay, SimulatedActuator};
#[cfg(feature = "lcd-i2c")]
pub use lcd::LinuxI2cBus;
pub use lcd::{I2cBus, LcdDisplay};
pub use servo::ServoActuator;
