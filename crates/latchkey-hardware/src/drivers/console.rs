//! Simulated peripherals for installations without a servo or an LCD.
//!
//! Both devices succeed on every call. Their only output is `tracing`
//! events, so an operator watching the console still sees what the door
//! would have done.

use crate::error::Result;
use crate::traits::{CharacterDisplay, DoorActuator};
use crate::types::{ActuatorState, DeviceInfo, DisplayGeometry};
use tracing::{debug, info};

/// Display that echoes frames to the log on target `latchkey::display`.
#[derive(Debug, Clone)]
pub struct ConsoleDisplay {
    geometry: DisplayGeometry,
    lines: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new(geometry: DisplayGeometry) -> Self {
        Self {
            geometry,
            lines: vec![String::new(); geometry.rows],
        }
    }

    /// Current (simulated) screen contents.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl CharacterDisplay for ConsoleDisplay {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    async fn clear(&mut self) -> Result<()> {
        self.lines.iter_mut().for_each(String::clear);
        debug!(target: "latchkey::display", "clear");
        Ok(())
    }

    async fn write_line(&mut self, row: usize, text: &str) -> Result<()> {
        let text: String = text.chars().take(self.geometry.columns).collect();
        info!(target: "latchkey::display", "L{}: {}", row + 1, text);
        if let Some(line) = self.lines.get_mut(row) {
            *line = text;
        }
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.lines.iter_mut().for_each(String::clear);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Console Display", "simulated"))
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Actuator that only logs its moves.
#[derive(Debug, Clone)]
pub struct SimulatedActuator {
    state: ActuatorState,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self {
            state: ActuatorState::Closed,
        }
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorActuator for SimulatedActuator {
    async fn open(&mut self) -> Result<()> {
        info!("[simulated] latch -> Open");
        self.state = ActuatorState::Open;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        info!("[simulated] latch -> Closed");
        self.state = ActuatorState::Closed;
        Ok(())
    }

    fn close_now(&mut self) -> Result<()> {
        if self.state == ActuatorState::Open {
            info!("[simulated] latch -> Closed (immediate)");
        }
        self.state = ActuatorState::Closed;
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Simulated Actuator", "simulated"))
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
