//! Display messages for the 16x2 LCD.
//!
//! All lines fit in 16 columns; formatted lines are cut by the display port
//! when a name makes them longer.
//!
//! # Usage
//!
//! ```
//! use latchkey_controller::messages::DisplayMessages;
//!
//! assert_eq!(DisplayMessages::ACCESS_DENIED, "Access Denied");
//! ```

use std::time::Duration;

/// Fixed display text.
pub struct DisplayMessages;

impl DisplayMessages {
    // Menu

    /// Startup banner, line 1.
    pub const SYSTEM_READY: &'static str = "System Ready";
    /// Startup banner, line 2.
    pub const CHOOSE_OPTION: &'static str = "Choose option";
    /// Shown after every completed workflow.
    pub const OPERATION_OK: &'static str = "Operation OK";
    pub const CHOOSE_AGAIN: &'static str = "Choose again";
    pub const INVALID_OPTION: &'static str = "Invalid option";
    pub const GOODBYE: &'static str = "Goodbye!";

    // Access

    /// Prompt frame while the operator types a key.
    pub const ENTER_KEY: &'static str = "Enter key:";
    /// Line 1 of the grant frame; the name goes on line 2.
    pub const ACCESS_OK: &'static str = "Access OK:";
    pub const PHOTO_NOT_FOUND: &'static str = "Photo not found";
    pub const VIEWER_ERROR: &'static str = "Error: viewer";
    pub const NOT_INSTALLED: &'static str = "not installed";
    pub const WELCOME: &'static str = "Welcome";
    pub const DOOR_OPEN: &'static str = "Door Open";
    pub const DOOR_CLOSED: &'static str = "Door Closed";
    pub const ACCESS_DENIED: &'static str = "Access Denied";
    pub const WRONG_KEY: &'static str = "Wrong key";

    // Enrollment

    pub const NEW_USER: &'static str = "New user";
    pub const ENTER_DATA: &'static str = "Enter data";
    pub const NAME: &'static str = "Name:";
    pub const TAKING_PHOTO: &'static str = "Taking photo";
    pub const PLEASE_WAIT: &'static str = "Please wait";
    pub const PHOTO_SAVED: &'static str = "Photo saved!";
    pub const REGISTERED: &'static str = "Registered";
    pub const DB_ERROR: &'static str = "DB error";
    pub const REGISTER_FAILED: &'static str = "Register failed";

    // Startup

    /// Fatal setup notice when the servo cannot be initialized.
    pub const SERVO_ERROR: &'static str = "Servo error";
    pub const EXITING: &'static str = "Exiting...";
}

/// Line 2 of the door-open frame: `"5 sec..."`.
pub fn open_for(window: Duration) -> String {
    if window.subsec_millis() == 0 {
        format!("{} sec...", window.as_secs())
    } else {
        format!("{:.1} sec...", window.as_secs_f64())
    }
}

/// Line 1 of the enrollment key frame, shortening the name so the colon
/// stays on screen: `"Key for Bob:"`.
pub fn key_for(name: &str, columns: usize) -> String {
    const PREFIX: &str = "Key for ";
    let room = columns.saturating_sub(PREFIX.len() + 1);
    let name = latchkey_hardware::fit_to_width(name, room);
    format!("{PREFIX}{name}:")
}

/// Line 1 of the enrollment success frame: `"User Bob"`.
pub fn user(name: &str) -> String {
    format!("User {name}")
}
