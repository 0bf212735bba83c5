//! Top-level menu.

use std::fmt;

/// Text printed before every menu prompt.
pub const MENU: &str = "\n--- Latchkey ---\n1. Verify access\n2. Enroll new user\n3. Exit";

/// A valid menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Verify,
    Enroll,
    Exit,
}

impl MenuChoice {
    /// Parse an operator's answer. Surrounding whitespace is ignored;
    /// anything other than `1`, `2` or `3` is rejected.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Verify),
            "2" => Some(Self::Enroll),
            "3" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Verify => "verify",
            Self::Enroll => "enroll",
            Self::Exit => "exit",
        };
        f.write_str(label)
    }
}
