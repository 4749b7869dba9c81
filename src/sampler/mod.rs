use std::collections::HashMap;
use std::os::fd::{IntoRawFd, RawFd};
use std::path::Path;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::config::{Config, OnStartError, SampleHook};
use crate::desc::{EventId, EventList};
use crate::error::{Error, Result};
use crate::ffi::bindings as b;
use crate::ffi::syscall::{eventfd, ioctl_arg, read_fd, write_fd};
use crate::signal::{self, Ring};
use crate::sink::{line_to, Sink};

#[cfg(test)]
mod test;

// "The official way of knowing if perf_event_open() support is enabled is
// checking for the existence of the file
// /proc/sys/kernel/perf_event_paranoid." (perf_event_open(2))
const PROBE_PATH: &str = "/proc/sys/kernel/perf_event_paranoid";

/// The handler-visible slice of an installed sampler.
///
/// Published through [`DISPATCH`] and immutable afterwards. A later install
/// swaps in a fresh context; the replaced one is intentionally leaked, since
/// a handler invocation may still be executing against it.
struct DispatchCtx {
    ring: Ring,
    wake_fd: RawFd,
    sink_fd: RawFd,
    debug: bool,
}

static DISPATCH: AtomicPtr<DispatchCtx> = AtomicPtr::new(null_mut());

/// The signal-context half of sample dispatch.
///
/// Runs by preempting whatever the target thread was executing, so it is
/// confined to async-signal-safe steps: extract the originating fd from the
/// delivered context, queue it, and poke the worker's eventfd. Everything
/// else, including the user callback and the re-arm, happens on the worker.
extern "C" fn dispatch(_signo: i32, info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    let ctx = DISPATCH.load(Ordering::Acquire);
    if ctx.is_null() {
        return;
    }
    let ctx = unsafe { &*ctx };

    // `F_SETSIG` delivery fills the SIGPOLL union member of siginfo.
    let fd = unsafe { (*(info as *const b::poll_info)).si_fd };

    if ctx.debug {
        line_to(ctx.sink_fd, "sample signal received");
    }

    if !ctx.ring.push(fd) {
        // Counted by the ring; nothing else is safe to do here.
        return;
    }
    let _ = write_fd(ctx.wake_fd, &1u64.to_ne_bytes());
}

fn lock_fds(fds: &Mutex<HashMap<RawFd, EventId>>) -> MutexGuard<'_, HashMap<RawFd, EventId>> {
    match fds.lock() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    }
}

/// The worker half of sample dispatch: wakes on the eventfd, resolves each
/// queued fd to its descriptor, runs the user hook in ordinary thread
/// context, and re-arms the counter for exactly one more sample.
struct Dispatcher {
    ctx: &'static DispatchCtx,
    fds: Arc<Mutex<HashMap<RawFd, EventId>>>,
    hook: Option<Box<dyn SampleHook>>,
    sink_fd: RawFd,
    debug: bool,
}

impl Dispatcher {
    fn drain(&self) {
        while let Some(fd) = self.ctx.ring.pop() {
            if self.debug {
                line_to(self.sink_fd, "dispatching sample");
            }

            let id = lock_fds(&self.fds).get(&fd).copied();
            let Some(id) = id else {
                // The descriptor raced with a close; the sample is gone.
                continue;
            };

            if let Some(hook) = self.hook.as_ref() {
                hook.on_sample(id);
            }

            // One callback per overflow: permit exactly one more. There is
            // no caller to report a failure to, so a descriptor whose
            // re-arm fails just falls silent.
            if ioctl_arg(fd, b::PERF_IOC_OP_REFRESH, 1).is_err() {
                line_to(self.sink_fd, "failed to re-arm event descriptor");
            }
        }
    }

    fn run(&self, running: &AtomicBool) {
        let mut buf = [0u8; 8];
        while running.load(Ordering::Acquire) {
            let _ = read_fd(self.ctx.wake_fd, &mut buf);
            self.drain();
        }
    }
}

/// An installed sampling engine: the context object that replaces the
/// prototype's process-wide mutable configuration. Created once by
/// [`install`][Self::install], immutable in its signal-facing parts
/// thereafter.
pub struct Sampler {
    signo: i32,
    sink: Sink,
    debug: bool,
    events: EventList,
    on_start_error: OnStartError,
    fds: Arc<Mutex<HashMap<RawFd, EventId>>>,
    ctx: &'static DispatchCtx,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Sampler {
    /// Takes ownership of a fully populated configuration, probes for
    /// kernel perf support, resolves the signal number (once, for both
    /// the handler and every later descriptor arming), installs the
    /// dispatcher on it and spawns the worker thread.
    ///
    /// From this point the configured signal is bound to sample dispatch
    /// for the rest of the process lifetime.
    pub fn install(config: Config) -> Result<Self> {
        Self::install_with_probe(config, Path::new(PROBE_PATH))
    }

    pub(crate) fn install_with_probe(config: Config, probe: &Path) -> Result<Self> {
        if !probe.exists() {
            config.sink.line("perf events not supported by this kernel");
            return Err(Error::KernelUnsupported);
        }

        let signo = config.signal.unwrap_or(libc::SIGIO);

        let wake = match eventfd(0, 0) {
            Ok(it) => it,
            Err(e) => {
                config.sink.line("failed to create worker wake descriptor");
                return Err(Error::SignalInstallFailed(e));
            }
        };

        // Leaked on purpose: the handler may outlive any Sampler, so the
        // context it reads is never freed.
        let ctx: &'static DispatchCtx = Box::leak(Box::new(DispatchCtx {
            ring: Ring::new(),
            wake_fd: wake.into_raw_fd(),
            sink_fd: config.sink.fd(),
            debug: config.debug,
        }));

        signal::install(signo, dispatch, config.check_signal, &config.sink, config.debug)?;
        DISPATCH.store(ctx as *const DispatchCtx as *mut _, Ordering::Release);

        let fds = Arc::new(Mutex::new(HashMap::new()));
        let running = Arc::new(AtomicBool::new(true));

        let dispatcher = Dispatcher {
            ctx,
            fds: Arc::clone(&fds),
            hook: config.hook,
            sink_fd: config.sink.fd(),
            debug: config.debug,
        };
        let worker = {
            let running = Arc::clone(&running);
            let spawned = thread::Builder::new()
                .name("perf-sampler".into())
                .spawn(move || dispatcher.run(&running));
            match spawned {
                Ok(it) => it,
                Err(e) => {
                    config.sink.line("failed to spawn sample worker");
                    return Err(Error::SignalInstallFailed(e));
                }
            }
        };

        Ok(Self {
            signo,
            sink: config.sink,
            debug: config.debug,
            events: config.events,
            on_start_error: config.on_start_error,
            fds,
            ctx,
            running,
            worker: Some(worker),
        })
    }

    /// Opens and arms every descriptor in insertion order. Fails fast: the
    /// first failure stops the walk, later descriptors are never touched.
    /// What happens to the earlier ones is the configured
    /// [`OnStartError`] policy.
    pub fn start_all(&mut self) -> Result<()> {
        let ids: Vec<_> = self.events.ids().collect();
        for (i, id) in ids.iter().enumerate() {
            if let Err(e) = self.start_one(*id) {
                if let OnStartError::Rollback = self.on_start_error {
                    for done in &ids[..=i] {
                        let _ = self.close_one(*done);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Closes every descriptor in insertion order, fail-fast.
    pub fn stop_all(&mut self) -> Result<()> {
        let ids: Vec<_> = self.events.ids().collect();
        for id in ids {
            self.close_one(id)?;
        }
        Ok(())
    }

    fn start_one(&mut self, id: EventId) -> Result<()> {
        let Some(desc) = self.events.get_mut(id) else {
            return Ok(());
        };

        // A reopen gets a fresh fd; drop the stale mapping first.
        if let Some(old) = desc.raw_fd() {
            lock_fds(&self.fds).remove(&old);
        }

        desc.open(self.signo, &self.sink, self.debug)?;

        // Publish the mapping before arming, so a delivery cannot beat it.
        if let Some(fd) = desc.raw_fd() {
            lock_fds(&self.fds).insert(fd, id);
        }

        desc.trigger_one_sample(&self.sink)
    }

    fn close_one(&mut self, id: EventId) -> Result<()> {
        let Some(desc) = self.events.get_mut(id) else {
            return Ok(());
        };

        if let Some(fd) = desc.raw_fd() {
            lock_fds(&self.fds).remove(&fd);
        }

        desc.close(&self.sink)
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    /// The list stays append-only; descriptors added here are picked up by
    /// the next `start_all`.
    pub fn events_mut(&mut self) -> &mut EventList {
        &mut self.events
    }

    /// Overflow deliveries discarded because the dispatch queue was full.
    pub fn dropped_samples(&self) -> u64 {
        self.ctx.ring.dropped()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Unpublish our context so the handler goes quiet, unless a later
        // install already replaced it. The signal disposition itself stays
        // installed, and the context allocation stays live for any handler
        // invocation still in flight.
        let ctx = self.ctx as *const DispatchCtx as *mut DispatchCtx;
        let _ = DISPATCH.compare_exchange(ctx, null_mut(), Ordering::AcqRel, Ordering::Relaxed);

        self.running.store(false, Ordering::Release);
        let _ = write_fd(self.ctx.wake_fd, &1u64.to_ne_bytes());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
