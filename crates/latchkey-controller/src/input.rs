//! Operator input.
//!
//! Sessions read the key and the enrollment data through [`OperatorInput`].
//! The binary implements it over stdin; [`ScriptedInput`] replays canned
//! lines.

#![allow(async_fn_in_trait)]

use crate::error::{SessionError, SessionResult};
use std::collections::VecDeque;

/// Line-oriented operator input.
pub trait OperatorInput: Send {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    async fn read_line(&mut self, prompt: &str) -> SessionResult<Option<String>>;
}

/// Read a line, treating end of input as [`SessionError::InputClosed`].
pub(crate) async fn require_line<I: OperatorInput>(
    input: &mut I,
    prompt: &str,
) -> SessionResult<String> {
    input
        .read_line(prompt)
        .await?
        .ok_or(SessionError::InputClosed)
}

/// Input that replays a fixed list of lines.
///
/// # Examples
///
/// ```
/// use latchkey_controller::input::{OperatorInput, ScriptedInput};
///
/// #[tokio::main]
/// async fn main() {
///     let mut input = ScriptedInput::new(["1234"]);
///     assert_eq!(input.read_line("Key: ").await.unwrap(), Some("1234".to_string()));
///     assert_eq!(input.read_line("Key: ").await.unwrap(), None);
///     assert_eq!(input.prompts(), ["Key: ", "Key: "]);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, oldest first.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl OperatorInput for ScriptedInput {
    async fn read_line(&mut self, prompt: &str) -> SessionResult<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_require_line_maps_end_of_input() {
        let mut input = ScriptedInput::new(["Ana"]);

        assert_eq!(require_line(&mut input, "Name: ").await.unwrap(), "Ana");
        assert!(matches!(
            require_line(&mut input, "Key: ").await,
            Err(SessionError::InputClosed)
        ));
        assert_eq!(input.remaining(), 0);
    }

    #[tokio::test]
    async fn test_lines_are_not_trimmed() {
        let mut input = ScriptedInput::new([" 1234 "]);
        assert_eq!(
            input.read_line("Key: ").await.unwrap().as_deref(),
            Some(" 1234 ")
        );
    }
}
