//! Mock device implementations for testing and development.
//!
//! Each mock comes with a cloneable handle that shares its state, so a test
//! can hand the device to a port and still inspect what it received.

pub mod actuator;
pub mod display;

pub use actuator::{MockActuator, MockActuatorHandle};
pub use display::{DisplayOp, MockDisplay, MockDisplayHandle};
