use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};

use crate::config::{attr, Opts, Owner};
use crate::error::{Error, Result};
use crate::event::{Event, Software};
use crate::ffi::syscall::{close_fd, fcntl_arg, fcntl_argp, gettid, ioctl_arg, perf_event_open};
use crate::ffi::{bindings as b, Attr};
use crate::sink::Sink;

mod list;
#[cfg(test)]
mod test;

pub use list::*;

/// Whether the descriptor currently holds a kernel handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FdState {
    Closed,
    Open,
}

/// Outcome of the last lifecycle operation on the descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpStatus {
    Ok,
    Error,
}

/// One kernel performance counter and its fd lifecycle.
///
/// The handle is held as `Option<File>`: `Some` iff the descriptor is open,
/// so a valid fd cannot outlive the `Open` state by construction.
pub struct EventDesc {
    attr: Attr,
    owner: Owner,
    fd: Option<File>,
    status: OpStatus,
}

impl EventDesc {
    pub fn new(event: impl Into<Event>, opts: &Opts) -> Self {
        Self {
            attr: attr::from(event.into().0, opts),
            owner: opts.owner,
            fd: None,
            status: OpStatus::Ok,
        }
    }

    pub fn state(&self) -> FdState {
        if self.fd.is_some() {
            FdState::Open
        } else {
            FdState::Closed
        }
    }

    pub fn status(&self) -> OpStatus {
        self.status
    }

    pub(crate) fn attr(&self) -> &Attr {
        &self.attr
    }

    pub(crate) fn raw_fd(&self) -> Option<RawFd> {
        self.fd.as_ref().map(|it| it.as_raw_fd())
    }

    /// Obtains a fresh kernel handle for the calling task (any CPU,
    /// ungrouped) and routes its overflow notifications to `signo`.
    /// An already-open descriptor is closed first, never left with two
    /// handles. Stops at the first failing sub-step.
    pub(crate) fn open(&mut self, signo: i32, sink: &Sink, debug: bool) -> Result<()> {
        if self.fd.is_some() {
            self.close(sink)?;
        }

        if debug {
            sink.line("opening event descriptor");
        }

        let file = match perf_event_open(&self.attr, 0, -1, -1, b::PERF_FLAG_FD_CLOEXEC) {
            Ok(it) => it,
            Err(e) => {
                self.status = OpStatus::Error;
                sink.line("failed to open perf event descriptor");
                return Err(Error::DescriptorOpenFailed(e));
            }
        };
        let file = self.fd.insert(file);

        let owner = match self.owner {
            Owner::CallingThread => b::f_owner_ex {
                type_: b::F_OWNER_TID,
                pid: gettid(),
            },
            Owner::Process => b::f_owner_ex {
                type_: b::F_OWNER_PID,
                pid: unsafe { libc::getpid() },
            },
        };
        if let Err(e) = fcntl_argp(file, b::F_SETOWN_EX, &owner) {
            self.status = OpStatus::Error;
            sink.line("failed to set descriptor owner");
            return Err(Error::OwnerAssignFailed(e));
        }

        if let Err(e) = fcntl_arg(file, b::F_SETSIG, signo) {
            self.status = OpStatus::Error;
            sink.line("failed to set descriptor notification signal");
            return Err(Error::AsyncModeFailed(e));
        }

        let flags = match fcntl_arg(file, libc::F_GETFL, 0) {
            Ok(it) => it,
            Err(e) => {
                self.status = OpStatus::Error;
                sink.line("failed to read descriptor flags");
                return Err(Error::AsyncModeFailed(e));
            }
        };
        if let Err(e) = fcntl_arg(file, libc::F_SETFL, flags | libc::O_ASYNC) {
            self.status = OpStatus::Error;
            sink.line("failed to enable async notification");
            return Err(Error::AsyncModeFailed(e));
        }

        self.status = OpStatus::Ok;
        Ok(())
    }

    /// Arms exactly one overflow notification; the counter auto-disables
    /// once it fires.
    pub(crate) fn trigger_one_sample(&self, sink: &Sink) -> Result<()> {
        let Some(file) = self.fd.as_ref() else {
            sink.line("cannot arm a closed event descriptor");
            let e = io::Error::from_raw_os_error(libc::EBADF);
            return Err(Error::TriggerFailed(e));
        };

        match ioctl_arg(file.as_raw_fd(), b::PERF_IOC_OP_REFRESH, 1) {
            Ok(_) => Ok(()),
            Err(e) => {
                sink.line("failed to arm event descriptor");
                Err(Error::TriggerFailed(e))
            }
        }
    }

    /// Releases the kernel handle. A close on a closed descriptor is a
    /// no-op success; a successful close also clears a previous error
    /// status. On a failed `close(2)` the handle is gone either way, so
    /// the descriptor ends Closed with status Error.
    pub(crate) fn close(&mut self, sink: &Sink) -> Result<()> {
        let Some(file) = self.fd.take() else {
            return Ok(());
        };

        if let Err(e) = close_fd(file.into_raw_fd()) {
            self.status = OpStatus::Error;
            sink.line("failed to close event descriptor");
            return Err(Error::DescriptorCloseFailed(e));
        }

        self.status = OpStatus::Ok;
        Ok(())
    }
}

impl Default for EventDesc {
    /// A dummy software counter that counts nothing: disabled, kernel and
    /// hypervisor excluded, non-inherited, one-sample wakeup.
    fn default() -> Self {
        Self::new(Software::Dummy, &Opts::default())
    }
}
