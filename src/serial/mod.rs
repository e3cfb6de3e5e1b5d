pub mod reader;

use thiserror::Error;

/// A decoded, whitespace-trimmed line read from the door sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorLine {
    pub text: String,
}

/// Longest line the framer will accumulate before giving up on it.
const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("line exceeded {} bytes without a terminator", MAX_LINE_LEN)]
    TooLong,
}

/// Accumulates raw serial bytes and yields newline-terminated lines.
///
/// Lines are decoded as UTF-8 and trimmed; a trailing CR is covered by the
/// trim. Empty lines are dropped since they can never classify as a door
/// state. Non-UTF-8 lines and lines that blow past MAX_LINE_LEN are
/// discarded and reported as errors, never propagated as a fault.
pub struct LineFramer {
    buf: Vec<u8>,
    overflowed: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed raw bytes in, get every line completed by this chunk out.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<SensorLine, DecodeError>> {
        let mut out = Vec::new();

        for &byte in bytes {
            if byte != b'\n' {
                if self.buf.len() >= MAX_LINE_LEN {
                    self.buf.clear();
                    if !self.overflowed {
                        self.overflowed = true;
                        out.push(Err(DecodeError::TooLong));
                    }
                    continue;
                }
                self.buf.push(byte);
                continue;
            }

            let raw = std::mem::take(&mut self.buf);
            if std::mem::take(&mut self.overflowed) {
                // Tail of a discarded over-long line; already reported.
                continue;
            }
            match std::str::from_utf8(&raw) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        out.push(Ok(SensorLine {
                            text: trimmed.to_string(),
                        }));
                    }
                }
                Err(e) => out.push(Err(DecodeError::InvalidUtf8(e))),
            }
        }

        out
    }
}
