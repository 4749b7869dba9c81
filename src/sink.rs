use std::fs::{File, OpenOptions};
use std::io::Result;
use std::os::fd::{AsRawFd, RawFd};

use arrayvec::ArrayVec;

use crate::ffi::syscall::write_fd;

const MAX_LINE: usize = 128;

/// Destination for the fixed short diagnostic/debug lines the engine emits.
///
/// Writes go through a single raw `write` call on a stack buffer, so a line
/// can be emitted from signal context. Write failures are deliberately
/// swallowed: the sink is a best-effort channel and has nowhere to report
/// its own errors to.
pub enum Sink {
    Stderr,
    Stdout,
    File(File),
}

impl Sink {
    /// A sink backed by the kernel tracing log (`trace_marker`), so
    /// diagnostics interleave with the trace being captured.
    pub fn trace_marker() -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open("/sys/kernel/tracing/trace_marker")
            .or_else(|_| {
                // Pre-4.1 debugfs mount point.
                OpenOptions::new()
                    .write(true)
                    .open("/sys/kernel/debug/tracing/trace_marker")
            })?;
        Ok(Self::File(file))
    }

    pub(crate) fn fd(&self) -> RawFd {
        match self {
            Self::Stderr => libc::STDERR_FILENO,
            Self::Stdout => libc::STDOUT_FILENO,
            Self::File(file) => file.as_raw_fd(),
        }
    }

    pub(crate) fn line(&self, msg: &str) {
        line_to(self.fd(), msg);
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::Stderr
    }
}

/// Writes `msg` plus a trailing newline to `fd`. Async-signal-safe: no
/// allocation, no locks, one `write(2)`. Messages longer than the stack
/// buffer are truncated.
pub(crate) fn line_to(fd: RawFd, msg: &str) {
    let mut buf = ArrayVec::<u8, MAX_LINE>::new();
    let len = msg.len().min(MAX_LINE - 1);
    let _ = buf.try_extend_from_slice(&msg.as_bytes()[..len]);
    let _ = buf.try_push(b'\n');
    let _ = write_fd(fd, &buf);
}
