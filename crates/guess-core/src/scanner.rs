//! Whitespace-delimited integer extraction.
//!
//! Mirrors formatted stream extraction: leading whitespace (including
//! newlines) is skipped, an optional sign and at least one decimal digit form
//! the number, and the first byte that is not a digit is left in the stream
//! for the next read. `12abc` therefore yields `12` and then a malformed read.

use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("end of input")]
    EndOfInput,

    #[error("malformed integer token")]
    Malformed,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub struct IntScanner<R> {
    inner: R,
}

impl<R: BufRead> IntScanner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn next_i32(&mut self) -> Result<i32, ScanError> {
        loop {
            match self.peek()? {
                Some(b) if is_space(b) => self.inner.consume(1),
                Some(_) => break,
                None => return Err(ScanError::EndOfInput),
            }
        }

        let mut negative = false;
        if let Some(sign @ (b'+' | b'-')) = self.peek()? {
            negative = sign == b'-';
            self.inner.consume(1);
        }

        // Accumulate in i64 and stop growing once out of i32 range, but keep
        // consuming digits so the whole token is gone either way.
        let limit = i64::from(i32::MAX) + 1;
        let mut value: i64 = 0;
        let mut digits = 0usize;
        while let Some(b) = self.peek()? {
            if !b.is_ascii_digit() {
                break;
            }
            self.inner.consume(1);
            digits += 1;
            if value <= limit {
                value = value * 10 + i64::from(b - b'0');
            }
        }

        if digits == 0 {
            return Err(ScanError::Malformed);
        }

        let signed = if negative { -value } else { value };
        i32::try_from(signed).map_err(|_| ScanError::Malformed)
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// C `isspace` set: space, \t, \n, \v, \f, \r.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}
