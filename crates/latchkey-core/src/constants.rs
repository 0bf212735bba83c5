//! Default values shared across the Latchkey workspace.
//!
//! Configuration falls back to these values when a key is absent from the
//! TOML file. They describe the reference installation: an SG90-class servo
//! on a 50 Hz PWM channel and a 16x2 character LCD behind a PCF8574 I2C
//! expander.
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//! use std::time::Duration;
//!
//! let window = Duration::from_millis(DEFAULT_OPEN_WINDOW_MS);
//! assert_eq!(window.as_secs(), 5);
//! assert_eq!(DEFAULT_DISPLAY_COLUMNS, 16);
//! ```

// ============================================================================
// Display geometry
// ============================================================================

/// Columns per line on the reference LCD.
pub const DEFAULT_DISPLAY_COLUMNS: usize = 16;

/// Lines on the reference LCD.
pub const DEFAULT_DISPLAY_ROWS: usize = 2;

/// Default I2C character device for the LCD backpack.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Default 7-bit address of the PCF8574 expander.
pub const DEFAULT_I2C_ADDRESS: u16 = 0x27;

// ============================================================================
// Servo / PWM
// ============================================================================

/// Default sysfs PWM chip index.
pub const DEFAULT_PWM_CHIP: u32 = 0;

/// Default PWM channel on the chip.
pub const DEFAULT_PWM_CHANNEL: u32 = 0;

/// PWM period for a 50 Hz hobby servo, in nanoseconds.
pub const DEFAULT_PWM_PERIOD_NS: u64 = 20_000_000;

/// Pulse width for the closed position (2.5% duty, roughly 0 degrees).
pub const DEFAULT_CLOSED_DUTY_NS: u64 = 500_000;

/// Pulse width for the open position (7.5% duty, roughly 90 degrees).
pub const DEFAULT_OPEN_DUTY_NS: u64 = 1_500_000;

/// Time the servo is given to finish a move before the pulse is stopped.
pub const DEFAULT_SETTLE_MS: u64 = 1_000;

// ============================================================================
// Session timing
// ============================================================================

/// How long the door stays open after a grant.
pub const DEFAULT_OPEN_WINDOW_MS: u64 = 5_000;

/// Interval between rotating frames while the door is open.
pub const DEFAULT_ROTATION_CADENCE_MS: u64 = 1_500;

/// How long the denial frame stays on screen.
pub const DEFAULT_DENIAL_HOLD_MS: u64 = 2_000;

/// Hold for short notices (photo missing, viewer missing, enrollment steps).
pub const DEFAULT_NOTICE_HOLD_MS: u64 = 2_000;

/// Hold for the "door closed" frame before the display is cleared.
pub const DEFAULT_CLOSED_HOLD_MS: u64 = 1_500;

/// Bounded wait for the photo viewer to exit after a termination request.
pub const DEFAULT_VIEWER_TERMINATE_TIMEOUT_MS: u64 = 3_000;

// ============================================================================
// External collaborators
// ============================================================================

/// Camera request timeout.
pub const DEFAULT_CAMERA_TIMEOUT_SECS: u64 = 15;

/// Snapshot endpoint of the IP Webcam app on the reference setup.
pub const DEFAULT_CAMERA_URL: &str = "http://127.0.0.1:8080/shot.jpg";

/// External image viewer.
pub const DEFAULT_VIEWER_PROGRAM: &str = "feh";

/// Fullscreen, zoom to fit, no pointer.
pub const DEFAULT_VIEWER_ARGS: &[&str] = &["-F", "-Z", "--hide-pointer"];

// ============================================================================
// Filesystem
// ============================================================================

/// SQLite database file, relative to the base directory.
pub const DEFAULT_DATABASE_FILE: &str = "latchkey.db";

/// Photo directory, relative to the base directory.
pub const DEFAULT_PHOTOS_DIR: &str = "photos";

/// Configuration file looked up in the base directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "latchkey.toml";

/// Extension used when the camera does not report a usable content type.
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

/// Replacement for characters that are not alphanumeric in photo filenames.
pub const FILENAME_FILLER: char = '_';

/// Timestamp layout embedded in photo filenames (`yyyyMMdd_HHmmss`).
pub const PHOTO_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
