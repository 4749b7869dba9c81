use crate::desc::{EventId, EventList};
use crate::sink::Sink;

pub(crate) mod attr;

/// Per-event counting and delivery options.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opts {
    pub sample_on: SampleOn,
    pub exclude: Priv,

    /// New child tasks inherit the counter.
    pub inherit: bool,

    /// How many overflows accumulate before the kernel wakes us up.
    /// One-shot sampling wants this at 1.
    pub wakeup: u32,

    /// Which task identity owns the descriptor for signal delivery.
    pub owner: Owner,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            sample_on: SampleOn::default(),
            exclude: Priv::default(),
            inherit: false,
            wakeup: 1,
            owner: Owner::default(),
        }
    }
}

/// Overflow cadence: every `Count` events, or `Freq` times per second.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleOn {
    Count(u64),
    Freq(u64),
}

impl Default for SampleOn {
    fn default() -> Self {
        Self::Count(1000)
    }
}

/// Privilege levels excluded from counting. Kernel and hypervisor are
/// excluded by default, so an unconfigured event samples only the user
/// space of its own process.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priv {
    pub user: bool,
    pub kernel: bool,
    pub hv: bool,
    pub idle: bool,
}

impl Default for Priv {
    fn default() -> Self {
        Self {
            user: false,
            kernel: true,
            hv: true,
            idle: false,
        }
    }
}

/// The task identity the kernel targets with overflow signals.
///
/// The prototype always bound descriptors to the opening thread, which in a
/// multi-threaded host means that thread is always the one interrupted.
/// That choice is surfaced here instead of being baked in.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Owner {
    /// Deliver to the thread that opened the descriptor.
    #[default]
    CallingThread,

    /// Deliver to the process; the kernel picks an eligible thread.
    Process,
}

/// What `start_all` does with descriptors it already opened when a later
/// one fails.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OnStartError {
    /// Leave them armed and running.
    #[default]
    LeaveRunning,

    /// Close them (best effort) before returning the error.
    Rollback,
}

/// The capability the tracing collaborator injects: called once per
/// delivered sample, from the worker thread.
pub trait SampleHook: Send + Sync {
    fn on_sample(&self, id: EventId);
}

impl<F: Fn(EventId) + Send + Sync> SampleHook for F {
    fn on_sample(&self, id: EventId) {
        self(id)
    }
}

/// The finished configuration an external loader hands to
/// [`Sampler::install`][crate::sampler::Sampler::install].
#[derive(Default)]
pub struct Config {
    /// Signal number to deliver overflows on; `None` resolves to `SIGIO`
    /// at install time.
    pub signal: Option<i32>,

    pub sink: Sink,
    pub debug: bool,
    pub events: EventList,
    pub hook: Option<Box<dyn SampleHook>>,

    /// Refuse to install over a pre-existing non-default signal handler.
    pub check_signal: bool,

    pub on_start_error: OnStartError,
}

impl Config {
    pub fn new() -> Self {
        Self {
            check_signal: true,
            ..Default::default()
        }
    }
}
