//! Device trait definitions.
//!
//! The access controller talks to two kinds of peripherals: a door actuator
//! and a character display. Both traits use native `async fn` methods
//! (Edition 2024), so they are NOT object-safe; dynamic selection goes
//! through the enum wrappers in [`devices`](crate::devices).

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, DisplayGeometry};

/// Door latch actuator.
///
/// `open` and `close` return once the move has physically completed (for a
/// servo, after its settle time).
///
/// # Examples
///
/// ```no_run
/// use latchkey_hardware::traits::DoorActuator;
/// use latchkey_hardware::error::Result;
///
/// async fn cycle<A: DoorActuator>(actuator: &mut A) -> Result<()> {
///     actuator.open().await?;
///     actuator.close().await?;
///     actuator.release().await
/// }
/// ```
pub trait DoorActuator: Send + Sync {
    /// Move the latch to the open position.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be written to.
    async fn open(&mut self) -> Result<()>;

    /// Move the latch to the closed position.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be written to.
    async fn close(&mut self) -> Result<()>;

    /// Move the latch to closed without going through the async runtime.
    ///
    /// Used on unwinding and cancellation paths, where nothing can be
    /// awaited. May block the calling thread for the settle time.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be written to.
    fn close_now(&mut self) -> Result<()>;

    /// Stop driving the actuator and hand the hardware back to the kernel.
    ///
    /// Called once on shutdown. Further moves after a release are errors.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;

    /// Whether moves only exist in the logs.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Line-oriented character display.
///
/// Implementations write `text` starting at column 0 of `row` and do not
/// wrap; callers are expected to fit text to [`geometry`](Self::geometry).
pub trait CharacterDisplay: Send + Sync {
    /// Character grid of the display.
    fn geometry(&self) -> DisplayGeometry;

    /// Blank the whole display.
    async fn clear(&mut self) -> Result<()>;

    /// Write text at the start of a row.
    ///
    /// # Errors
    ///
    /// Returns an error if `row` is outside the display or the bus write fails.
    async fn write_line(&mut self, row: usize, text: &str) -> Result<()>;

    /// Clear and power down (backlight off) on shutdown.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;

    /// Whether frames only exist in the logs.
    fn is_simulated(&self) -> bool {
        false
    }
}
