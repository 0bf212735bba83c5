//! Peripheral layer for the Latchkey door controller.
//!
//! Two device families are supported, each behind a trait:
//!
//! - [`DoorActuator`]: the latch. Real driver: a hobby servo on a sysfs PWM
//!   channel. Simulated driver: logs moves.
//! - [`CharacterDisplay`]: a small text display. Real driver: an HD44780 LCD
//!   behind a PCF8574 I2C backpack. Simulated driver: echoes frames to the log.
//!
//! Workflows never touch the traits directly. They receive a [`Peripherals`]
//! value holding an [`ActuatorPort`] and a [`DisplayPort`], which absorb
//! device errors, truncate text to the display width and keep display holds
//! even when writes fail.
//!
//! ```no_run
//! use latchkey_core::LatchkeyConfig;
//! use latchkey_hardware::Peripherals;
//! use std::time::Duration;
//!
//! # async fn example() -> latchkey_hardware::Result<()> {
//! let config = LatchkeyConfig::default();
//! let mut peripherals = Peripherals::acquire(&config).await?;
//!
//! peripherals.display.show("Door Open", "5 sec...", true, Duration::from_secs(1)).await;
//! peripherals.actuator.open().await;
//! peripherals.actuator.close().await;
//!
//! peripherals.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod devices;
pub mod drivers;
pub mod error;
pub mod mock;
pub mod ports;
pub mod traits;
pub mod types;

pub use devices::{AnyActuator, AnyDisplay};
pub use error::{PeripheralError, Result};
pub use ports::{ActuatorPort, DisplayPort, OpenLatch, Peripherals, fit_to_width};
pub use traits::{CharacterDisplay, DoorActuator};
pub use types::{ActuatorState, DeviceInfo, DisplayFrame, DisplayGeometry};
