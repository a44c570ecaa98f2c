//! Standard input and output handles.
//!
//! Output handles are UTF-8 text sinks, buffered either per line or per
//! block as configured. The driver flushes them on every exit path of
//! [`run_program`](crate::run_program), so no output is lost when the
//! program fails.

use std::fmt;
use std::io::{self, BufRead, BufReader, BufWriter, LineWriter, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::RuntimeConfig;

/// In-memory output, shared between a handle and its reader.
#[derive(Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Buffering discipline of an output handle.
enum Sink {
    Line(LineWriter<Box<dyn Write>>),
    Block(BufWriter<Box<dyn Write>>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Line(w) => w,
            Self::Block(w) => w,
        }
    }
}

/// A text output stream.
pub struct OutputHandle {
    name: &'static str,
    sink: Sink,
    capture: Option<CaptureBuffer>,
}

impl OutputHandle {
    /// Creates a handle writing to `target`.
    #[must_use]
    pub fn new(name: &'static str, target: Box<dyn Write>, config: &RuntimeConfig) -> Self {
        let sink = if config.line_buffered {
            Sink::Line(LineWriter::with_capacity(config.buffer_capacity, target))
        } else {
            Sink::Block(BufWriter::with_capacity(config.buffer_capacity, target))
        };
        Self {
            name,
            sink,
            capture: None,
        }
    }

    /// Creates a handle writing to memory.
    #[must_use]
    pub fn capture(name: &'static str, config: &RuntimeConfig) -> Self {
        let buffer = CaptureBuffer::default();
        let mut handle = Self::new(name, Box::new(buffer.clone()), config);
        handle.capture = Some(buffer);
        handle
    }

    /// Standard output, or memory if the configuration captures output.
    #[must_use]
    pub fn stdout(config: &RuntimeConfig) -> Self {
        if config.capture_output {
            Self::capture("stdout", config)
        } else {
            Self::new("stdout", Box::new(io::stdout()), config)
        }
    }

    /// Standard error, or memory if the configuration captures output.
    #[must_use]
    pub fn stderr(config: &RuntimeConfig) -> Self {
        if config.capture_output {
            Self::capture("stderr", config)
        } else {
            Self::new("stderr", Box::new(io::stderr()), config)
        }
    }

    /// Name of the stream, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Writes a string.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.sink.writer().write_all(s.as_bytes())
    }

    /// Writes a string followed by a newline.
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        let w = self.sink.writer();
        w.write_all(s.as_bytes())?;
        w.write_all(b"\n")
    }

    /// Writes out everything buffered so far.
    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.writer().flush()
    }

    /// Returns the output that reached memory, if this handle captures.
    ///
    /// Output still held in the handle's buffer is not included.
    #[must_use]
    pub fn captured(&self) -> Option<String> {
        self.capture.as_ref().map(CaptureBuffer::contents)
    }
}

impl fmt::Write for OutputHandle {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        OutputHandle::write_str(self, s).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHandle")
            .field("name", &self.name)
            .field("line_buffered", &matches!(self.sink, Sink::Line(_)))
            .field("captured", &self.capture.is_some())
            .finish()
    }
}

/// A text input stream.
pub struct InputHandle {
    reader: BufReader<Box<dyn Read>>,
}

impl InputHandle {
    /// Creates a handle reading from `source`.
    #[must_use]
    pub fn new(source: Box<dyn Read>) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(Box::new(io::stdin()))
    }

    /// An input stream with nothing to read.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Box::new(io::empty()))
    }

    /// Reads one line without its terminator.
    ///
    /// Returns `None` at end of input. Invalid UTF-8 is an error.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

impl fmt::Debug for InputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_buffered_flushes_at_newline() {
        let mut out = OutputHandle::capture("stdout", &RuntimeConfig::captured());
        out.write_str("partial").unwrap();
        assert_eq!(out.captured().as_deref(), Some(""));
        out.write_line(" line").unwrap();
        assert_eq!(out.captured().as_deref(), Some("partial line\n"));
    }

    #[test]
    fn test_block_buffered_waits_for_flush() {
        let config = RuntimeConfig {
            line_buffered: false,
            ..RuntimeConfig::captured()
        };
        let mut out = OutputHandle::capture("stdout", &config);
        out.write_line("held").unwrap();
        assert_eq!(out.captured().as_deref(), Some(""));
        out.flush().unwrap();
        assert_eq!(out.captured().as_deref(), Some("held\n"));
    }

    #[test]
    fn test_fmt_write() {
        use std::fmt::Write as _;
        let mut out = OutputHandle::capture("stderr", &RuntimeConfig::captured());
        writeln!(out, "{} + {} = {}", 1, 2, 3).unwrap();
        assert_eq!(out.captured().as_deref(), Some("1 + 2 = 3\n"));
    }

    #[test]
    fn test_process_handles_do_not_capture() {
        let out = OutputHandle::stdout(&RuntimeConfig::default());
        assert_eq!(out.name(), "stdout");
        assert_eq!(out.captured(), None);
    }

    #[test]
    fn test_read_lines() {
        let mut input = InputHandle::new(Box::new(Cursor::new("one\r\ntwo\nlast")));
        assert_eq!(input.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(input.read_line().unwrap().as_deref(), Some("two"));
        assert_eq!(input.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(input.read_line().unwrap(), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(InputHandle::empty().read_line().unwrap(), None);
    }
}
