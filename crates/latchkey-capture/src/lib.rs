//! External collaborators of the access controller: the network camera used
//! at enrollment and the photo viewer shown while the door is open.
//!
//! Both sit behind traits ([`PhotoSource`], [`PhotoViewer`]) so the session
//! logic can be exercised with the doubles in [`mock`].

pub mod camera;
pub mod error;
pub mod mock;
pub mod viewer;

pub use camera::{CapturedPhoto, HttpCamera, PhotoSource, extension_for};
pub use error::{CaptureError, CaptureResult, ViewerError, ViewerResult};
pub use viewer::{ExternalProcess, ExternalViewer, PhotoViewer, TerminateOutcome, ViewerProcess};
