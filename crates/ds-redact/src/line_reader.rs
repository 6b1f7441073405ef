//! Newline-delimited line reading with no maximum line length.

use std::io::{self, BufRead, BufReader, Read};

/// Reads a byte source as a lazy sequence of lines.
///
/// Lines are returned without their terminator (`\n` or `\r\n`); a final
/// unterminated segment still counts as one line. Arbitrarily long lines
/// are reassembled transparently. End of stream is `Ok(None)`.
pub struct LineReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            inner: BufReader::new(source),
        }
    }

    /// Read the next logical line.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let n = self.inner.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
