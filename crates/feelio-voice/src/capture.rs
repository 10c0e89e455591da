//! Line-based utterance capture with a per-line timeout.

use async_trait::async_trait;
use feelio_core::UtteranceSource;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

/// Reads one utterance per line. Timeouts, blank lines and read errors yield `None`.
pub struct LineCapture<R> {
    lines: Lines<R>,
    timeout: Duration,
    closed: bool,
}

/// Capture from the terminal.
pub type ConsoleCapture = LineCapture<BufReader<Stdin>>;

impl ConsoleCapture {
    pub fn stdin(timeout: Duration) -> Self {
        LineCapture::new(BufReader::new(tokio::io::stdin()), timeout)
    }
}

impl<R: AsyncBufRead + Unpin> LineCapture<R> {
    pub fn new(reader: R, timeout: Duration) -> Self {
        Self {
            lines: reader.lines(),
            timeout,
            closed: false,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> UtteranceSource for LineCapture<R> {
    async fn capture(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        match tokio::time::timeout(self.timeout, self.lines.next_line()).await {
            Err(_) => {
                debug!(target: "feelio::voice", "no input before timeout");
                None
            }
            Ok(Ok(Some(line))) => {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.to_string())
                }
            }
            Ok(Ok(None)) => {
                debug!(target: "feelio::voice", "input closed");
                self.closed = true;
                None
            }
            Ok(Err(e)) => {
                warn!(target: "feelio::voice", error = %e, "could not read input");
                None
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_trimmed_lines_and_skips_blanks() {
        let input: &[u8] = b"  hello there \n\n   \nbye\n";
        let mut capture = LineCapture::new(input, Duration::from_secs(1));
        assert_eq!(capture.capture().await.as_deref(), Some("hello there"));
        assert_eq!(capture.capture().await, None);
        assert_eq!(capture.capture().await, None);
        assert_eq!(capture.capture().await.as_deref(), Some("bye"));
        assert!(!capture.is_closed());
        assert_eq!(capture.capture().await, None);
        assert!(capture.is_closed());
    }

    #[tokio::test]
    async fn silence_times_out_to_none() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut capture = LineCapture::new(BufReader::new(reader), Duration::from_millis(20));
        assert_eq!(capture.capture().await, None);
        assert!(!capture.is_closed());
    }
}
