//! Newline framing for child process output
//!
//! [`LineFramer`] is a `tokio_util` decoder that splits a byte stream on `\n`.
//! Framing happens on raw bytes, so a multi-byte UTF-8 sequence split across two
//! reads is reassembled before decoding. Each line is decoded lossily.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::transport::subprocess::config::DEFAULT_MAX_LINE_BYTES;

/// Line decoder that keeps the trailing partial line until more bytes arrive
///
/// At end of stream a non-empty trailing fragment is emitted as a final line.
/// A run of more than `max_line_bytes` without a newline is emitted as a line
/// of exactly `max_line_bytes` so the buffer stays bounded.
#[derive(Debug, Clone)]
pub struct LineFramer {
    max_line_bytes: usize,
    /// Bytes of the buffer already searched for a newline
    next_index: usize,
}

impl LineFramer {
    /// Create a framer with the given line limit
    #[must_use]
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            max_line_bytes: max_line_bytes.max(1),
            next_index: 0,
        }
    }

    /// Maximum bytes held for one unterminated line
    #[must_use]
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for LineFramer {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let read_to = src.len();
        let start = self.next_index.min(read_to);

        if let Some(offset) = src[start..read_to].iter().position(|b| *b == b'\n') {
            let newline = start + offset;
            self.next_index = 0;
            let frame = src.split_to(newline + 1);
            return Ok(Some(decode_line(&frame[..newline])));
        }

        if read_to >= self.max_line_bytes {
            self.next_index = 0;
            let frame = src.split_to(self.max_line_bytes);
            return Ok(Some(decode_line(&frame)));
        }

        self.next_index = read_to;
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        self.next_index = 0;
        if src.is_empty() {
            Ok(None)
        } else {
            let rest = src.split();
            Ok(Some(decode_line(&rest)))
        }
    }
}
