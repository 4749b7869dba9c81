use std::collections::HashMap;
use std::fs::{self, File};
use std::os::fd::{AsRawFd, FromRawFd};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::{DispatchCtx, Dispatcher, Sampler, PROBE_PATH};
use crate::config::{Config, OnStartError, Opts, SampleHook};
use crate::desc::{EventDesc, EventId, FdState, OpStatus};
use crate::error::Error;
use crate::event::{Raw, Software};
use crate::ffi::bindings::{f_owner_ex, F_OWNER_TID, F_SETOWN_EX, F_SETSIG};
use crate::ffi::syscall::{fcntl_arg, fcntl_argp, gettid, write_fd};
use crate::signal::Ring;
use crate::sink::Sink;

// Only one dispatch context is published at a time, so tests that install
// a sampler take this lock for their whole body.
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

fn install_lock() -> MutexGuard<'static, ()> {
    match INSTALL_LOCK.lock() {
        Ok(it) => it,
        Err(poison) => poison.into_inner(),
    }
}

fn perf_available() -> bool {
    if !Path::new(PROBE_PATH).exists() {
        return false;
    }
    let sink = Sink::Stderr;
    let mut desc = EventDesc::default();
    let ok = desc.open(libc::SIGIO, &sink, false).is_ok();
    let _ = desc.close(&sink);
    ok
}

fn counting_hook() -> (Arc<AtomicUsize>, Box<dyn SampleHook>) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    let hook = Box::new(move |_id: EventId| {
        inner.fetch_add(1, Ordering::SeqCst);
    });
    (count, hook)
}

// An event type id no PMU registers, so `open` always fails.
fn bad_event() -> Raw {
    Raw {
        ty: u32::MAX,
        config: 0,
    }
}

#[test]
fn test_install_fails_without_probe_path() {
    let missing = std::env::temp_dir().join(format!("perf-sampler-{}", uuid::Uuid::new_v4()));
    let Err(err) = Sampler::install_with_probe(Config::new(), &missing) else {
        panic!("install must fail without the probe path");
    };
    assert!(matches!(err, Error::KernelUnsupported));
}

#[test]
fn test_install_with_mock_probe() {
    let _guard = install_lock();
    let probe = std::env::temp_dir().join(format!("perf-sampler-{}", uuid::Uuid::new_v4()));
    fs::write(&probe, "2\n").unwrap();

    let mut config = Config::new();
    config.signal = Some(libc::SIGUSR2);
    let sampler = Sampler::install_with_probe(config, &probe).unwrap();
    assert_eq!(sampler.dropped_samples(), 0);

    drop(sampler);
    fs::remove_file(&probe).unwrap();
}

#[test]
fn test_start_all_fail_fast() {
    let _guard = install_lock();
    if !perf_available() {
        eprintln!("skipping: perf_event_open not permitted here");
        return;
    }

    let mut config = Config::new();
    config.signal = Some(libc::SIGVTALRM);
    config.check_signal = false;
    let opts = Opts::default();
    config.events.push(Software::Dummy, &opts);
    config.events.push(bad_event(), &opts);
    config.events.push(Software::Dummy, &opts);

    let mut sampler = Sampler::install(config).unwrap();
    let err = sampler.start_all().unwrap_err();
    assert!(matches!(err, Error::DescriptorOpenFailed(_)));

    let states: Vec<_> = sampler
        .events()
        .iter()
        .map(|(_, it)| (it.state(), it.status()))
        .collect();
    // The one before the failure stays open, the failing one ends in
    // error, the one after is never attempted.
    assert_eq!(states[0], (FdState::Open, OpStatus::Ok));
    assert_eq!(states[1], (FdState::Closed, OpStatus::Error));
    assert_eq!(states[2], (FdState::Closed, OpStatus::Ok));

    sampler.stop_all().unwrap();
    let states: Vec<_> = sampler
        .events()
        .iter()
        .map(|(_, it)| (it.state(), it.status()))
        .collect();
    // Closing the already-closed failed descriptor is a no-op, so its
    // error status sticks around.
    assert_eq!(states[0], (FdState::Closed, OpStatus::Ok));
    assert_eq!(states[1], (FdState::Closed, OpStatus::Error));
    assert_eq!(states[2], (FdState::Closed, OpStatus::Ok));
}

#[test]
fn test_start_all_rollback_closes_earlier() {
    let _guard = install_lock();
    if !perf_available() {
        eprintln!("skipping: perf_event_open not permitted here");
        return;
    }

    let mut config = Config::new();
    config.signal = Some(libc::SIGXCPU);
    config.check_signal = false;
    config.on_start_error = OnStartError::Rollback;
    let opts = Opts::default();
    config.events.push(Software::Dummy, &opts);
    config.events.push(bad_event(), &opts);

    let mut sampler = Sampler::install(config).unwrap();
    sampler.start_all().unwrap_err();

    let (_, first) = sampler.events().iter().next().unwrap();
    assert_eq!(first.state(), FdState::Closed);
}

#[test]
fn test_drain_runs_hook_once_per_delivery() {
    let ctx: &'static DispatchCtx = Box::leak(Box::new(DispatchCtx {
        ring: Ring::new(),
        wake_fd: -1,
        sink_fd: libc::STDERR_FILENO,
        debug: false,
    }));

    let fds = Arc::new(Mutex::new(HashMap::new()));
    fds.lock().unwrap().insert(7, EventId(0));

    let (count, hook) = counting_hook();
    let dispatcher = Dispatcher {
        ctx,
        fds,
        hook: Some(hook),
        sink_fd: libc::STDERR_FILENO,
        debug: false,
    };

    assert!(ctx.ring.push(7));
    assert!(ctx.ring.push(99)); // unknown fd, raced with a close

    dispatcher.drain();

    // One hook call for the known descriptor; the stale one is skipped,
    // and the failed re-arm on the fake fd is only logged.
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.ring.pop(), None);
}

// A pipe read end with `F_SETSIG` and `O_ASYNC` raises the configured
// signal with `si_fd` filled when data arrives, the same kernel path an
// overflowing counter takes. That drives the installed handler itself,
// not just the worker behind it.
#[test]
fn test_signal_delivery_drives_dispatch() {
    let _guard = install_lock();

    let probe = std::env::temp_dir().join(format!("perf-sampler-{}", uuid::Uuid::new_v4()));
    fs::write(&probe, "2\n").unwrap();

    let mut config = Config::new();
    config.signal = Some(libc::SIGUSR1);
    let (count, hook) = counting_hook();
    config.hook = Some(hook);

    let sampler = Sampler::install_with_probe(config, &probe).unwrap();

    let mut pair = [0i32; 2];
    assert_eq!(unsafe { libc::pipe(pair.as_mut_ptr()) }, 0);
    let rd = unsafe { File::from_raw_fd(pair[0]) };
    let wr = unsafe { File::from_raw_fd(pair[1]) };

    // Route the pipe's readiness signal to this thread, with si_fd.
    let owner = f_owner_ex {
        type_: F_OWNER_TID,
        pid: gettid(),
    };
    fcntl_argp(&rd, F_SETOWN_EX, &owner).unwrap();
    fcntl_arg(&rd, F_SETSIG, libc::SIGUSR1).unwrap();
    let flags = fcntl_arg(&rd, libc::F_GETFL, 0).unwrap();
    fcntl_arg(&rd, libc::F_SETFL, flags | libc::O_ASYNC).unwrap();

    sampler
        .fds
        .lock()
        .unwrap()
        .insert(rd.as_raw_fd(), EventId(0));

    write_fd(wr.as_raw_fd(), b"!").unwrap();

    for _ in 0..200 {
        if count.load(Ordering::SeqCst) == 1 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    // Delivered through the handler: si_fd resolved to the registered
    // descriptor and the hook ran once. The failed re-arm on the pipe fd
    // is only logged.
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(sampler.dropped_samples(), 0);

    drop(sampler);
    fs::remove_file(&probe).unwrap();
}

#[test]
fn test_one_shot_loop_end_to_end() {
    let _guard = install_lock();
    if !perf_available() {
        eprintln!("skipping: perf_event_open not permitted here");
        return;
    }

    let mut config = Config::new();
    config.signal = None; // platform default, SIGIO
    config.check_signal = false;
    let (count, hook) = counting_hook();
    config.hook = Some(hook);
    config.events.push(Software::Dummy, &Opts::default());

    let mut sampler = Sampler::install(config).unwrap();
    sampler.start_all().unwrap();

    let fd = {
        let (_, desc) = sampler.events().iter().next().unwrap();
        assert_eq!(desc.state(), FdState::Open);
        assert_eq!(desc.status(), OpStatus::Ok);
        desc.raw_fd().unwrap()
    };

    // A dummy counter never overflows on its own; deliver the wakeup the
    // handler would have queued for this descriptor.
    assert!(sampler.ctx.ring.push(fd));
    write_fd(sampler.ctx.wake_fd, &1u64.to_ne_bytes()).unwrap();

    for _ in 0..200 {
        if count.load(Ordering::SeqCst) == 1 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Re-armed by the worker, still open.
    let (_, desc) = sampler.events().iter().next().unwrap();
    assert_eq!(desc.state(), FdState::Open);
    assert_eq!(desc.status(), OpStatus::Ok);

    sampler.stop_all().unwrap();
    let (_, desc) = sampler.events().iter().next().unwrap();
    assert_eq!(desc.state(), FdState::Closed);
}
