//! Report line sinks
//!
//! The runner never buffers report text itself. Each event becomes one
//! indented line handed to an [`OutputSink`], and the sink is flushed after
//! every test so report lines interleave deterministically with whatever the
//! tests print directly.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Destination stream of a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Line-oriented text sink
pub trait OutputSink {
    fn open(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush_stdout()?;
        self.flush_stderr()
    }

    /// Write one line indented by `level` spaces
    fn write_formatted(
        &mut self,
        stream: Stream,
        level: usize,
        args: fmt::Arguments<'_>,
    ) -> io::Result<()>;

    fn flush_stdout(&mut self) -> io::Result<()>;

    fn flush_stderr(&mut self) -> io::Result<()>;

    fn write_stdout(&mut self, level: usize, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_formatted(Stream::Stdout, level, args)
    }

    fn write_stderr(&mut self, level: usize, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_formatted(Stream::Stderr, level, args)
    }
}

fn write_line(out: &mut impl Write, level: usize, args: fmt::Arguments<'_>) -> io::Result<()> {
    write!(out, "{:level$}", "")?;
    out.write_fmt(args)?;
    out.write_all(b"\n")
}

/// Sink writing to the process stdout and stderr
#[derive(Debug, Default)]
pub struct StdSink;

impl StdSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for StdSink {
    fn write_formatted(
        &mut self,
        stream: Stream,
        level: usize,
        args: fmt::Arguments<'_>,
    ) -> io::Result<()> {
        match stream {
            Stream::Stdout => write_line(&mut io::stdout().lock(), level, args),
            Stream::Stderr => write_line(&mut io::stderr().lock(), level, args),
        }
    }

    fn flush_stdout(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }

    fn flush_stderr(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[derive(Debug, Default)]
struct MemoryBuffers {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    open: bool,
}

/// In-memory sink
///
/// Clones share the same buffers, so a handle kept by the caller can read
/// what the runner wrote after the runner is gone.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffers: Rc<RefCell<MemoryBuffers>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.buffers.borrow().stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.buffers.borrow().stderr).into_owned()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout().lines().map(str::to_string).collect()
    }

    pub fn is_open(&self) -> bool {
        self.buffers.borrow().open
    }
}

impl OutputSink for MemorySink {
    fn open(&mut self) -> io::Result<()> {
        self.buffers.borrow_mut().open = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.buffers.borrow_mut().open = false;
        Ok(())
    }

    fn write_formatted(
        &mut self,
        stream: Stream,
        level: usize,
        args: fmt::Arguments<'_>,
    ) -> io::Result<()> {
        let mut buffers = self.buffers.borrow_mut();
        match stream {
            Stream::Stdout => write_line(&mut buffers.stdout, level, args),
            Stream::Stderr => write_line(&mut buffers.stderr, level, args),
        }
    }

    fn flush_stdout(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn flush_stderr(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_indents() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write_stdout(0, format_args!("1..{}", 2)).unwrap();
        writer.write_stdout(4, format_args!("ok {} - {}", 1, "x")).unwrap();
        writer.write_stderr(2, format_args!("# oops")).unwrap();

        assert_eq!(sink.stdout_lines(), vec!["1..2", "    ok 1 - x"]);
        assert_eq!(sink.stderr(), "  # oops\n");
    }

    #[test]
    fn test_memory_sink_open_close() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        assert!(!sink.is_open());
        writer.open().unwrap();
        assert!(sink.is_open());
        writer.close().unwrap();
        assert!(!sink.is_open());
    }
}
