//! Mock display for testing.

use crate::{
    Result,
    error::PeripheralError,
    traits::CharacterDisplay,
    types::{DeviceInfo, DisplayGeometry},
};
use std::sync::{Arc, Mutex, MutexGuard};

/// One call received by a [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Write { row: usize, text: String },
}

#[derive(Debug)]
struct Shared {
    ops: Vec<DisplayOp>,
    screen: Vec<String>,
    fail_writes: bool,
    released: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock display that records every successful call.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::{DisplayOp, MockDisplay};
/// use latchkey_hardware::traits::CharacterDisplay;
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut display, handle) = MockDisplay::new();
///
///     display.clear().await?;
///     display.write_line(0, "Door Open").await?;
///
///     assert_eq!(handle.screen()[0], "Door Open");
///     assert_eq!(handle.ops()[0], DisplayOp::Clear);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    shared: Arc<Mutex<Shared>>,
    geometry: DisplayGeometry,
}

impl MockDisplay {
    /// Create a 16x2 mock display.
    pub fn new() -> (Self, MockDisplayHandle) {
        Self::with_geometry(DisplayGeometry::default())
    }

    pub fn with_geometry(geometry: DisplayGeometry) -> (Self, MockDisplayHandle) {
        let shared = Arc::new(Mutex::new(Shared {
            ops: Vec::new(),
            screen: vec![String::new(); geometry.rows],
            fail_writes: false,
            released: false,
        }));
        let display = Self {
            shared: Arc::clone(&shared),
            geometry,
        };
        (display, MockDisplayHandle { shared })
    }

    fn check(shared: &Shared) -> Result<()> {
        if shared.released {
            return Err(PeripheralError::unavailable("Mock Display (released)"));
        }
        if shared.fail_writes {
            return Err(PeripheralError::transient("Injected display failure"));
        }
        Ok(())
    }
}

impl CharacterDisplay for MockDisplay {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    async fn clear(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        Self::check(&shared)?;
        shared.screen.iter_mut().for_each(String::clear);
        shared.ops.push(DisplayOp::Clear);
        Ok(())
    }

    async fn write_line(&mut self, row: usize, text: &str) -> Result<()> {
        let mut shared = lock(&self.shared);
        Self::check(&shared)?;
        let Some(line) = shared.screen.get_mut(row) else {
            return Err(PeripheralError::configuration(format!("Row {} out of range", row)));
        };
        *line = text.to_string();
        shared.ops.push(DisplayOp::Write {
            row,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        lock(&self.shared).released = true;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Mock Display", "mock"))
    }
}

/// Handle for inspecting and steering a [`MockDisplay`].
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockDisplayHandle {
    /// Every successful call, oldest first.
    pub fn ops(&self) -> Vec<DisplayOp> {
        lock(&self.shared).ops.clone()
    }

    /// Text written to the display, in order, ignoring clears.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.shared)
            .ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Write { text, .. } => Some(text.clone()),
                DisplayOp::Clear => None,
            })
            .collect()
    }

    /// Current screen contents, one string per row.
    pub fn screen(&self) -> Vec<String> {
        lock(&self.shared).screen.clone()
    }

    /// Whether any write contained `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.writes().iter().any(|text| text.contains(needle))
    }

    /// Make every subsequent call fail.
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.shared).fail_writes = fail;
    }

    pub fn is_released(&self) -> bool {
        lock(&self.shared).released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes_and_screen() {
        let (mut display, handle) = MockDisplay::new();

        display.write_line(0, "Welcome").await.unwrap();
        display.write_line(1, "Ana").await.unwrap();
        assert_eq!(handle.screen(), vec!["Welcome", "Ana"]);
        assert!(handle.saw("Ana"));

        display.clear().await.unwrap();
        assert_eq!(handle.screen(), vec!["", ""]);
        assert_eq!(handle.writes(), vec!["Welcome", "Ana"]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let (mut display, handle) = MockDisplay::new();
        handle.fail_writes(true);

        assert!(display.write_line(0, "x").await.is_err());
        assert!(handle.ops().is_empty());
    }

    #[tokio::test]
    async fn test_row_out_of_range() {
        let (mut display, _handle) = MockDisplay::new();
        assert!(display.write_line(2, "x").await.is_err());
    }
}
