use super::{Event, EventConfig};
use crate::ffi::bindings as b;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Software {
    CpuClock,
    TaskClock,

    PageFault,
    MinorPageFault,
    MajorPageFault,

    EmuFault,
    AlignFault,

    CtxSwitch,
    CpuMigration,

    /// A placeholder counter that counts nothing.
    Dummy,
}

impl From<&Software> for Event {
    fn from(value: &Software) -> Self {
        let config = match value {
            Software::CpuClock => b::PERF_COUNT_SW_CPU_CLOCK,
            Software::TaskClock => b::PERF_COUNT_SW_TASK_CLOCK,

            Software::PageFault => b::PERF_COUNT_SW_PAGE_FAULTS,
            Software::MinorPageFault => b::PERF_COUNT_SW_PAGE_FAULTS_MIN,
            Software::MajorPageFault => b::PERF_COUNT_SW_PAGE_FAULTS_MAJ,

            Software::EmuFault => b::PERF_COUNT_SW_EMULATION_FAULTS,
            Software::AlignFault => b::PERF_COUNT_SW_ALIGNMENT_FAULTS,

            Software::CtxSwitch => b::PERF_COUNT_SW_CONTEXT_SWITCHES,
            Software::CpuMigration => b::PERF_COUNT_SW_CPU_MIGRATIONS,

            Software::Dummy => b::PERF_COUNT_SW_DUMMY,
        };

        Self(EventConfig {
            ty: b::PERF_TYPE_SOFTWARE,
            config,
        })
    }
}

impl From<Software> for Event {
    fn from(value: Software) -> Self {
        (&value).into()
    }
}
