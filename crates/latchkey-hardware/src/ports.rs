//! Workflow-facing ports over the configured devices.
//!
//! The ports are where peripheral failures stop. A failed move or write is
//! logged at `warn` and the call returns normally, so a flaky bus can never
//! abort an access session halfway through. Workflows therefore never branch
//! on whether a device is real or simulated.

use crate::devices::{AnyActuator, AnyDisplay};
use crate::drivers::{ConsoleDisplay, ServoActuator, SimulatedActuator};
use crate::error::Result;
use crate::traits::{CharacterDisplay, DoorActuator};
use crate::types::{ActuatorState, DeviceInfo, DisplayFrame, DisplayGeometry};
use latchkey_core::LatchkeyConfig;
use latchkey_core::config::{ActuatorDriver, DisplayConfig, DisplayDriver};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Truncate to at most `columns` characters, on a character boundary.
pub fn fit_to_width(text: &str, columns: usize) -> &str {
    match text.char_indices().nth(columns) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Door actuator port.
///
/// Tracks the commanded latch position. The position follows the command
/// even when the driver reports an error, since the workflow has no other
/// way to move the latch.
#[derive(Debug)]
pub struct ActuatorPort {
    device: AnyActuator,
    state: ActuatorState,
}

impl ActuatorPort {
    pub fn new(device: AnyActuator) -> Self {
        Self {
            device,
            state: ActuatorState::Closed,
        }
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn is_simulated(&self) -> bool {
        self.device.is_simulated()
    }

    /// Open the latch; returns after the driver's settle time.
    pub async fn open(&mut self) {
        if let Err(e) = self.device.open().await {
            warn!("Actuator open failed: {}", e);
        }
        self.state = ActuatorState::Open;
    }

    /// Close the latch; returns after the driver's settle time.
    pub async fn close(&mut self) {
        if let Err(e) = self.device.close().await {
            warn!("Actuator close failed: {}", e);
        }
        self.state = ActuatorState::Closed;
    }

    /// Open the latch and return a guard that closes it again.
    ///
    /// Close through [`OpenLatch::close`]. If the guard is dropped while the
    /// latch is still open (a panic unwinding, or the owning future being
    /// dropped), the latch is closed synchronously.
    pub async fn open_guarded(&mut self) -> OpenLatch<'_> {
        self.open().await;
        OpenLatch { port: self }
    }

    pub async fn info(&self) -> Option<DeviceInfo> {
        self.device.get_info().await.ok()
    }

    fn close_now(&mut self) {
        if let Err(e) = self.device.close_now() {
            warn!("Actuator close failed: {}", e);
        }
        self.state = ActuatorState::Closed;
    }

    async fn release(&mut self) {
        if let Err(e) = self.device.release().await {
            warn!("Actuator release failed: {}", e);
        }
    }
}

/// An open latch. See [`ActuatorPort::open_guarded`].
#[derive(Debug)]
#[must_use = "dropping the guard closes the latch immediately"]
pub struct OpenLatch<'a> {
    port: &'a mut ActuatorPort,
}

impl OpenLatch<'_> {
    /// Close the latch; returns after the driver's settle time.
    pub async fn close(self) {
        self.port.close().await;
    }
}

impl Drop for OpenLatch<'_> {
    fn drop(&mut self) {
        if self.port.state == ActuatorState::Open {
            warn!("Latch guard dropped while open, closing it now");
            self.port.close_now();
        }
    }
}

/// Two-line display port.
#[derive(Debug)]
pub struct DisplayPort {
    device: AnyDisplay,
    geometry: DisplayGeometry,
}

impl DisplayPort {
    pub fn new(device: AnyDisplay) -> Self {
        let geometry = device.geometry();
        Self { device, geometry }
    }

    /// Open the configured display, falling back to the console display
    /// when the LCD cannot be initialized.
    pub async fn open(config: &DisplayConfig) -> Self {
        Self::new(open_display(config).await)
    }

    pub fn columns(&self) -> usize {
        self.geometry.columns
    }

    pub fn is_simulated(&self) -> bool {
        self.device.is_simulated()
    }

    /// Show a frame and keep it up for `hold`.
    ///
    /// Lines are cut to the display width. An empty `line2` leaves the second
    /// row untouched. `hold` is honored even when every write fails.
    pub async fn show(&mut self, line1: &str, line2: &str, clear_first: bool, hold: Duration) {
        if clear_first {
            self.clear().await;
        }

        self.write(0, line1).await;
        if !line2.is_empty() && self.geometry.rows > 1 {
            self.write(1, line2).await;
        }

        if !hold.is_zero() {
            tokio::time::sleep(hold).await;
        }
    }

    /// [`show`](Self::show) for a prepared frame.
    pub async fn show_frame(&mut self, frame: &DisplayFrame, clear_first: bool, hold: Duration) {
        self.show(&frame.line1, &frame.line2, clear_first, hold).await;
    }

    pub async fn clear(&mut self) {
        if let Err(e) = self.device.clear().await {
            warn!("Display clear failed: {}", e);
        }
    }

    pub async fn info(&self) -> Option<DeviceInfo> {
        self.device.get_info().await.ok()
    }

    async fn write(&mut self, row: usize, text: &str) {
        let text = fit_to_width(text, self.geometry.columns);
        if let Err(e) = self.device.write_line(row, text).await {
            warn!("Display write to row {} failed: {}", row, e);
        }
    }

    async fn release(&mut self) {
        if let Err(e) = self.device.release().await {
            warn!("Display release failed: {}", e);
        }
    }
}

/// The door actuator and the display, acquired together at startup.
///
/// Hardware is released by [`shutdown`](Self::shutdown) on the normal path.
/// On any other path (early return, `?`, panic unwinding) the drivers' own
/// `Drop` implementations disable the servo output and blank the LCD when
/// this value goes out of scope.
#[derive(Debug)]
pub struct Peripherals {
    pub actuator: ActuatorPort,
    pub display: DisplayPort,
}

impl Peripherals {
    pub fn new(actuator: AnyActuator, display: AnyDisplay) -> Self {
        Self {
            actuator: ActuatorPort::new(actuator),
            display: DisplayPort::new(display),
        }
    }

    /// Build the configured devices.
    ///
    /// A display that cannot be initialized is replaced by the console
    /// display.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured servo cannot be initialized.
    pub async fn acquire(config: &LatchkeyConfig) -> Result<Self> {
        let display = DisplayPort::open(&config.display).await;

        let actuator = match config.actuator.driver {
            ActuatorDriver::Servo => {
                AnyActuator::Servo(ServoActuator::open_channel(&config.actuator).await?)
            }
            ActuatorDriver::Simulated => {
                info!("Actuator driver is simulated; latch moves will only be logged");
                AnyActuator::Simulated(SimulatedActuator::new())
            }
        };

        Ok(Self {
            actuator: ActuatorPort::new(actuator),
            display,
        })
    }

    /// Clear the display and release both devices.
    pub async fn shutdown(mut self) {
        debug!("Releasing peripherals");
        self.display.release().await;
        self.actuator.release().await;
    }
}

async fn open_display(config: &DisplayConfig) -> AnyDisplay {
    let geometry = DisplayGeometry::new(config.columns, config.rows);
    match config.driver {
        DisplayDriver::Console => AnyDisplay::Console(ConsoleDisplay::new(geometry)),
        DisplayDriver::Lcd => match open_lcd(config, geometry).await {
            Ok(display) => display,
            Err(e) => {
                warn!("LCD unavailable, falling back to console output: {}", e);
                AnyDisplay::Console(ConsoleDisplay::new(geometry))
            }
        },
    }
}

#[cfg(feature = "lcd-i2c")]
async fn open_lcd(config: &DisplayConfig, geometry: DisplayGeometry) -> Result<AnyDisplay> {
    use crate::drivers::{LcdDisplay, LinuxI2cBus};

    let bus = LinuxI2cBus::open(&config.i2c_bus, config.i2c_address)?;
    let lcd = LcdDisplay::initialize(bus, geometry).await?;
    info!(
        "LCD ready on {}@0x{:02x}",
        config.i2c_bus.display(),
        config.i2c_address
    );
    Ok(AnyDisplay::Lcd(lcd))
}

#[cfg(not(feature = "lcd-i2c"))]
async fn open_lcd(_config: &DisplayConfig, _geometry: DisplayGeometry) -> Result<AnyDisplay> {
    Err(crate::error::PeripheralError::unsupported(
        "LCD support not compiled in (feature lcd-i2c)",
    ))
}
