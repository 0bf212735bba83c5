//! Operator input from the terminal.
//!
//! Lines are decoded lossily: bytes that are not UTF-8 become U+FFFD, so a
//! stray byte typed at the terminal is just an unknown answer.

use latchkey_controller::{OperatorInput, SessionResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// Reads lines from stdin, writing each prompt to stdout first.
#[derive(Debug)]
pub struct StdinInput<R = BufReader<Stdin>> {
    reader: R,
    buf: Vec<u8>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> OperatorInput for StdinInput<R> {
    async fn read_line(&mut self, prompt: &str) -> SessionResult<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
