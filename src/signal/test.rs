use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::ring::Ring;
use super::install;
use crate::error::Error;
use crate::sink::Sink;

#[test]
fn test_ring_fifo() {
    let ring = Ring::new();
    assert_eq!(ring.pop(), None);

    assert!(ring.push(1));
    assert!(ring.push(2));
    assert!(ring.push(3));

    assert_eq!(ring.pop(), Some(1));
    assert_eq!(ring.pop(), Some(2));
    assert_eq!(ring.pop(), Some(3));
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_ring_overflow_drops() {
    let ring = Ring::new();
    let mut accepted = 0;
    for fd in 0..300 {
        if ring.push(fd) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 256);
    assert_eq!(ring.dropped(), 300 - 256);

    for fd in 0..256 {
        assert_eq!(ring.pop(), Some(fd));
    }
    assert_eq!(ring.pop(), None);
}

// `Owner::Process` delivery can run the handler on several threads at
// once, so pushes must survive racing with each other.
#[test]
fn test_ring_concurrent_producers() {
    const PER_THREAD: i32 = 20_000;

    let ring = Arc::new(Ring::new());
    let producers: Vec<_> = (0..2)
        .map(|_| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for fd in 0..PER_THREAD {
                    // Retry on full; the consumer is draining concurrently.
                    while !ring.push(fd) {
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    let deadline = Instant::now() + Duration::from_secs(30);
    let mut seen = 0u32;
    while seen < 2 * PER_THREAD as u32 {
        match ring.pop() {
            Some(fd) => {
                assert!((0..PER_THREAD).contains(&fd));
                seen += 1;
            }
            None => {
                assert!(Instant::now() < deadline, "stalled after {seen} pops");
                thread::yield_now();
            }
        }
    }

    for it in producers {
        it.join().unwrap();
    }
    assert_eq!(ring.pop(), None);
}

extern "C" fn noop_handler(_: i32, _: *mut libc::siginfo_t, _: *mut libc::c_void) {}

#[test]
fn test_checked_install_rejects_occupied_signal() {
    let sink = Sink::Stderr;

    // Occupy the signal first, without the conflict check.
    install(libc::SIGURG, noop_handler, false, &sink, false).unwrap();

    let err = install(libc::SIGURG, noop_handler, true, &sink, false).unwrap_err();
    assert!(matches!(
        err,
        Error::SignalInstallConflict { signo } if signo == libc::SIGURG
    ));

    unsafe { libc::signal(libc::SIGURG, libc::SIG_DFL) };
}

#[test]
fn test_checked_install_on_default_disposition() {
    let sink = Sink::Stderr;
    install(libc::SIGWINCH, noop_handler, true, &sink, false).unwrap();
    unsafe { libc::signal(libc::SIGWINCH, libc::SIG_DFL) };
}
