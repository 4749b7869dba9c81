//! One-shot, signal-driven sampling engine for Linux perf events.
//!
//! Each configured counter is armed for exactly one overflow notification.
//! When the kernel delivers it, a minimal signal handler queues the event
//! and a worker thread invokes the injected sample hook, then re-arms the
//! counter for the next sample. One delivered overflow, one callback, one
//! re-arm: a self-sustaining one-sample-at-a-time loop with no streaming
//! machinery behind it.
//!
//! ## Example
//!
//! Sample cache misses on the current process and let a tracing hook run
//! once per overflow.
//!
//! ```no_run
//! use perf_sampler::config::{Config, Opts, SampleOn};
//! use perf_sampler::desc::EventId;
//! use perf_sampler::event::Hardware;
//! use perf_sampler::sampler::Sampler;
//!
//! let mut config = Config::new();
//! let mut opts = Opts::default();
//! opts.sample_on = SampleOn::Count(10_000); // One sample per 10k misses.
//! config.events.push(Hardware::CacheMiss, &opts);
//! config.hook = Some(Box::new(|id: EventId| {
//!     // Unwind and emit a trace sample here.
//!     let _ = id;
//! }));
//!
//! let mut sampler = Sampler::install(config).unwrap();
//! sampler.start_all().unwrap(); // Arm every descriptor for one sample.
//!
//! // ... traced workload runs, one hook call per overflow ...
//!
//! sampler.stop_all().unwrap(); // Close every descriptor.
//! ```
//!
//! The configuration is expected to come from an external loader; this
//! crate only consumes the finished [`Config`][config::Config]. The hook
//! runs on an ordinary worker thread, not in signal context, so it may
//! allocate and block like regular code.

pub mod config;
pub mod desc;
pub mod error;
pub mod event;
mod ffi;
pub mod sampler;
mod signal;
pub mod sink;
