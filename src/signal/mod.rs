use std::mem::MaybeUninit;

use crate::error::{Error, Result};
use crate::ffi::syscall;
use crate::sink::Sink;

mod ring;
#[cfg(test)]
mod test;

pub(crate) use ring::Ring;

pub(crate) type HandlerFn = extern "C" fn(i32, *mut libc::siginfo_t, *mut libc::c_void);

/// Binds `signo` to `handler` with `SA_SIGINFO` delivery, so the handler
/// receives the descriptor that triggered it and not just the number.
///
/// With `check` set, the current disposition is inspected first: anything
/// that is neither default nor ignore means some other subsystem already
/// handles this signal, and installing would silently override it. The
/// check happens before `sigaction` so a conflicting handler is left
/// untouched.
pub(crate) fn install(
    signo: i32,
    handler: HandlerFn,
    check: bool,
    sink: &Sink,
    debug: bool,
) -> Result<()> {
    if check {
        let mut old = MaybeUninit::uninit();
        if let Err(e) = syscall::sigaction(signo, None, &mut old) {
            sink.line("failed to query signal disposition");
            return Err(Error::SignalInstallFailed(e));
        }
        let old = unsafe { old.assume_init() };
        if old.sa_sigaction != libc::SIG_DFL && old.sa_sigaction != libc::SIG_IGN {
            sink.line("signal already has a non-default handler");
            return Err(Error::SignalInstallConflict { signo });
        }
    }

    let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
    act.sa_sigaction = handler as usize;
    act.sa_flags = libc::SA_SIGINFO | libc::SA_RESTART;
    unsafe { libc::sigemptyset(&mut act.sa_mask) };

    let mut old = MaybeUninit::uninit();
    if let Err(e) = syscall::sigaction(signo, Some(&act), &mut old) {
        sink.line("failed to install signal handler");
        return Err(Error::SignalInstallFailed(e));
    }

    if debug {
        sink.line("signal handler installed");
    }

    Ok(())
}
