//! Types shared by the device traits and the ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical position of the door latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuatorState {
    Closed,
    Open,
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
        }
    }
}

/// Two lines of text for a character display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayFrame {
    pub line1: String,
    pub line2: String,
}

impl DisplayFrame {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}

/// Character grid of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub columns: usize,
    pub rows: usize,
}

impl DisplayGeometry {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            columns: latchkey_core::constants::DEFAULT_DISPLAY_COLUMNS,
            rows: latchkey_core::constants::DEFAULT_DISPLAY_ROWS,
        }
    }
}

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "SG90 Servo", "Console Display").
    pub name: String,

    /// Driver or model identifier.
    pub model: String,

    /// Bus or kernel path the device is attached to, if any.
    pub location: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            location: None,
        }
    }

    /// Set the bus location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
