// src/transport/framer.rs
//! Line framing over a raw byte stream

/// Buffers bytes across polls and emits complete, non-empty lines.
///
/// Both `\r` and `\n` terminate a line. Bytes after the last terminator are
/// kept until the next `push`; they are never emitted on their own.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    /// Append newly received bytes and return the lines they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &b in bytes {
            if b == b'\n' || b == b'\r' {
                if !self.buffer.is_empty() {
                    let line = String::from_utf8_lossy(&self.buffer).trim().to_string();
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    self.buffer.clear();
                }
            } else {
                self.buffer.push(b);
            }
        }

        lines
    }

    /// Bytes waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
