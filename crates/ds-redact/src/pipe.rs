//! Bounded in-process byte pipe connecting redactor stages.
//!
//! Each stage writes its output into a [`PipeWriter`] from a background
//! thread while the next stage reads from the paired [`PipeReader`]. The
//! buffer is bounded, so a consumer that stops reading blocks the producer
//! at its next write. Closing the writer with an error delivers that error
//! to the reader after the buffered bytes drain; dropping the reader turns
//! subsequent writes into `BrokenPipe` errors so the producing stage
//! unwinds.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};

const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Default)]
struct State {
    buf: VecDeque<u8>,
    write_closed: bool,
    reader_gone: bool,
    // io::Error is not Clone; keep enough to re-materialize it on every read.
    error: Option<(io::ErrorKind, String)>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    cond: Condvar,
}

/// Create a connected reader/writer pair.
pub(crate) fn pipe() -> (PipeReader, PipeWriter) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::default()),
        cond: Condvar::new(),
    });
    (
        PipeReader {
            shared: Arc::clone(&shared),
        },
        PipeWriter {
            shared,
            closed: false,
        },
    )
}

/// Read half of a stage pipe.
#[derive(Debug)]
pub(crate) struct PipeReader {
    shared: Arc<Shared>,
}

/// Write half of a stage pipe.
#[derive(Debug)]
pub(crate) struct PipeWriter {
    shared: Arc<Shared>,
    closed: bool,
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock().expect("pipe lock poisoned");
        loop {
            if !state.buf.is_empty() {
                let n = out.len().min(state.buf.len());
                for (slot, byte) in out[..n].iter_mut().zip(state.buf.drain(..n)) {
                    *slot = byte;
                }
                self.shared.cond.notify_all();
                return Ok(n);
            }
            if state.write_closed {
                return match &state.error {
                    Some((kind, msg)) => Err(io::Error::new(*kind, msg.clone())),
                    None => Ok(0),
                };
            }
            state = self
                .shared
                .cond
                .wait(state)
                .expect("pipe lock poisoned");
        }
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock().expect("pipe lock poisoned");
        state.reader_gone = true;
        state.buf.clear();
        self.shared.cond.notify_all();
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock().expect("pipe lock poisoned");
        loop {
            if state.reader_gone {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "redaction pipe reader closed",
                ));
            }
            if state.write_closed {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "write after pipe close",
                ));
            }
            let space = PIPE_CAPACITY - state.buf.len();
            if space > 0 {
                let n = data.len().min(space);
                state.buf.extend(&data[..n]);
                self.shared.cond.notify_all();
                return Ok(n);
            }
            state = self
                .shared
                .cond
                .wait(state)
                .expect("pipe lock poisoned");
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PipeWriter {
    /// Close the write half. With `Some(err)` the reader observes `err`
    /// once the buffered bytes drain; with `None` it observes EOF.
    pub(crate) fn close(&mut self, err: Option<io::Error>) {
        let mut state = self.shared.state.lock().expect("pipe lock poisoned");
        if state.write_closed {
            return;
        }
        state.write_closed = true;
        state.error = err.map(|e| (e.kind(), e.to_string()));
        self.closed = true;
        self.shared.cond.notify_all();
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        if !self.closed {
            self.close(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_roundtrip_across_threads() {
        let (mut reader, mut writer) = pipe();
        let producer = thread::spawn(move || {
            for _ in 0..100 {
                writer.write_all(b"0123456789").unwrap();
            }
        });

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        producer.join().unwrap();
        assert_eq!(out.len(), 1000);
        assert!(out.chunks(10).all(|c| c == b"0123456789"));
    }

    #[test]
    fn test_error_delivered_after_buffered_bytes() {
        let (mut reader, mut writer) = pipe();
        writer.write_all(b"partial").unwrap();
        writer.close(Some(io::Error::new(
            io::ErrorKind::InvalidData,
            "bad document",
        )));

        let mut buf = [0u8; 7];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"partial");

        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("bad document"));

        // the error is sticky
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_clean_close_is_eof() {
        let (mut reader, mut writer) = pipe();
        writer.write_all(b"done").unwrap();
        drop(writer);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"done");
    }

    #[test]
    fn test_dropped_reader_breaks_writes() {
        let (reader, mut writer) = pipe();
        drop(reader);

        let err = writer.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_backpressure_blocks_until_read() {
        let (mut reader, mut writer) = pipe();
        let producer = thread::spawn(move || {
            let big = vec![b'a'; PIPE_CAPACITY + 1];
            writer.write_all(&big).unwrap();
        });

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        producer.join().unwrap();
        assert_eq!(out.len(), PIPE_CAPACITY + 1);
    }
}
