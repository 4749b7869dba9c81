#![allow(non_camel_case_types, dead_code)]

// https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L32
pub const PERF_TYPE_HARDWARE: u32 = 0;
pub const PERF_TYPE_SOFTWARE: u32 = 1;
pub const PERF_TYPE_HW_CACHE: u32 = 3;

pub const PERF_COUNT_HW_CPU_CYCLES: u64 = 0;
pub const PERF_COUNT_HW_INSTRUCTIONS: u64 = 1;
pub const PERF_COUNT_HW_CACHE_REFERENCES: u64 = 2;
pub const PERF_COUNT_HW_CACHE_MISSES: u64 = 3;
pub const PERF_COUNT_HW_BRANCH_INSTRUCTIONS: u64 = 4;
pub const PERF_COUNT_HW_BRANCH_MISSES: u64 = 5;
pub const PERF_COUNT_HW_BUS_CYCLES: u64 = 6;
pub const PERF_COUNT_HW_STALLED_CYCLES_FRONTEND: u64 = 7;
pub const PERF_COUNT_HW_STALLED_CYCLES_BACKEND: u64 = 8;
pub const PERF_COUNT_HW_REF_CPU_CYCLES: u64 = 9;

pub const PERF_COUNT_HW_CACHE_L1D: u64 = 0;
pub const PERF_COUNT_HW_CACHE_L1I: u64 = 1;
pub const PERF_COUNT_HW_CACHE_LL: u64 = 2;
pub const PERF_COUNT_HW_CACHE_DTLB: u64 = 3;
pub const PERF_COUNT_HW_CACHE_ITLB: u64 = 4;
pub const PERF_COUNT_HW_CACHE_BPU: u64 = 5;
pub const PERF_COUNT_HW_CACHE_NODE: u64 = 6;

pub const PERF_COUNT_HW_CACHE_OP_READ: u64 = 0;
pub const PERF_COUNT_HW_CACHE_OP_WRITE: u64 = 1;
pub const PERF_COUNT_HW_CACHE_OP_PREFETCH: u64 = 2;

pub const PERF_COUNT_HW_CACHE_RESULT_ACCESS: u64 = 0;
pub const PERF_COUNT_HW_CACHE_RESULT_MISS: u64 = 1;

pub const PERF_COUNT_SW_CPU_CLOCK: u64 = 0;
pub const PERF_COUNT_SW_TASK_CLOCK: u64 = 1;
pub const PERF_COUNT_SW_PAGE_FAULTS: u64 = 2;
pub const PERF_COUNT_SW_CONTEXT_SWITCHES: u64 = 3;
pub const PERF_COUNT_SW_CPU_MIGRATIONS: u64 = 4;
pub const PERF_COUNT_SW_PAGE_FAULTS_MIN: u64 = 5;
pub const PERF_COUNT_SW_PAGE_FAULTS_MAJ: u64 = 6;
pub const PERF_COUNT_SW_ALIGNMENT_FAULTS: u64 = 7;
pub const PERF_COUNT_SW_EMULATION_FAULTS: u64 = 8;
pub const PERF_COUNT_SW_DUMMY: u64 = 9;

pub const PERF_SAMPLE_IP: u64 = 1 << 0;

// _IO('$', n), see include/uapi/linux/perf_event.h
pub const PERF_IOC_OP_ENABLE: u64 = 0x2400;
pub const PERF_IOC_OP_DISABLE: u64 = 0x2401;
pub const PERF_IOC_OP_REFRESH: u64 = 0x2402;
pub const PERF_IOC_OP_RESET: u64 = 0x2403;

pub const PERF_FLAG_FD_CLOEXEC: u64 = 1 << 3;

// Bits of the `perf_event_attr` flag word, in declaration order:
// https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L386
pub const ATTR_BIT_DISABLED: u64 = 1 << 0;
pub const ATTR_BIT_INHERIT: u64 = 1 << 1;
pub const ATTR_BIT_EXCLUDE_USER: u64 = 1 << 4;
pub const ATTR_BIT_EXCLUDE_KERNEL: u64 = 1 << 5;
pub const ATTR_BIT_EXCLUDE_HV: u64 = 1 << 6;
pub const ATTR_BIT_EXCLUDE_IDLE: u64 = 1 << 7;
pub const ATTR_BIT_FREQ: u64 = 1 << 10;

// Full layout through `config3` (Linux 6.3). `perf_copy_attr` accepts an
// attr larger than the kernel knows as long as the trailing bytes are zero,
// so passing the full struct to older kernels is fine.
// https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L382
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct perf_event_attr {
    pub type_: u32,
    pub size: u32,
    pub config: u64,
    pub sample_period: u64, // union with sample_freq
    pub sample_type: u64,
    pub read_format: u64,
    pub flags: u64, // the bitfield word, see `ATTR_BIT_*`
    pub wakeup_events: u32, // union with wakeup_watermark
    pub bp_type: u32,
    pub config1: u64,
    pub config2: u64,
    pub branch_sample_type: u64,
    pub sample_regs_user: u64,
    pub sample_stack_user: u32,
    pub clockid: i32,
    pub sample_regs_intr: u64,
    pub aux_watermark: u32,
    pub sample_max_stack: u16,
    pub __reserved_2: u16,
    pub aux_sample_size: u32,
    pub __reserved_3: u32,
    pub sig_data: u64,
    pub config3: u64,
}

// `F_SETOWN_EX` and friends are absent from the libc crate.
pub const F_SETOWN_EX: i32 = 15;
pub const F_SETSIG: i32 = 10;
pub const F_OWNER_TID: i32 = 0;
pub const F_OWNER_PID: i32 = 1;

#[repr(C)]
pub struct f_owner_ex {
    pub type_: i32,
    pub pid: libc::pid_t,
}

// The SIGPOLL part of the glibc `siginfo_t` union. With `F_SETSIG` in
// effect the kernel fills `si_fd` with the descriptor that became ready,
// which is how the dispatcher resolves the originating counter.
// https://github.com/torvalds/linux/blob/v6.13/include/uapi/asm-generic/siginfo.h#L120
#[repr(C)]
pub struct poll_info {
    pub si_signo: i32,
    pub si_errno: i32,
    pub si_code: i32,
    #[cfg(target_pointer_width = "64")]
    pub __pad0: i32,
    pub si_band: libc::c_long,
    pub si_fd: i32,
}
