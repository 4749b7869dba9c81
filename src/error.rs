use std::io;

use thiserror::Error;

/// Failure kinds of the sampling engine.
///
/// None of these are retried anywhere in the crate; each one is also
/// reported as a fixed short line on the configured
/// [`Sink`][crate::sink::Sink] by the operation that detects it.
#[derive(Debug, Error)]
pub enum Error {
    /// The feature-probe path is absent, perf events are unusable.
    #[error("perf events not supported by this kernel")]
    KernelUnsupported,

    #[error("failed to install signal handler")]
    SignalInstallFailed(#[source] io::Error),

    /// Installing would silently override a pre-existing handler.
    #[error("signal {signo} already has a non-default handler")]
    SignalInstallConflict { signo: i32 },

    #[error("failed to open event descriptor")]
    DescriptorOpenFailed(#[source] io::Error),

    #[error("failed to assign descriptor owner")]
    OwnerAssignFailed(#[source] io::Error),

    #[error("failed to set up async signal delivery")]
    AsyncModeFailed(#[source] io::Error),

    #[error("failed to arm the descriptor for one sample")]
    TriggerFailed(#[source] io::Error),

    #[error("failed to close event descriptor")]
    DescriptorCloseFailed(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
