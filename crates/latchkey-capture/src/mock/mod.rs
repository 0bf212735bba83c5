//! In-process doubles for the camera and the viewer.
//!
//! Like the hardware mocks, each double is paired with a cloneable handle
//! that shares its state with the device under test.

pub mod camera;
pub mod viewer;

pub use camera::{MockCamera, MockCameraHandle};
pub use viewer::{MockViewer, MockViewerHandle, MockViewerProcess};
