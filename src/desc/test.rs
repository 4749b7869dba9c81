use super::{EventDesc, EventList, FdState, OpStatus};
use crate::config::{Opts, SampleOn};
use crate::error::Error;
use crate::event::Software;
use crate::ffi::bindings as b;
use crate::sink::Sink;

#[test]
fn test_default_desc_counts_nothing() {
    let desc = EventDesc::default();
    assert_eq!(desc.state(), FdState::Closed);
    assert_eq!(desc.status(), OpStatus::Ok);

    let attr = desc.attr();
    assert_eq!(attr.type_, b::PERF_TYPE_SOFTWARE);
    assert_eq!(attr.config, b::PERF_COUNT_SW_DUMMY);
    assert_eq!(attr.sample_period, 1000);
    assert_eq!(attr.wakeup_events, 1);
    assert_ne!(attr.flags & b::ATTR_BIT_DISABLED, 0);
    assert_ne!(attr.flags & b::ATTR_BIT_EXCLUDE_KERNEL, 0);
    assert_ne!(attr.flags & b::ATTR_BIT_EXCLUDE_HV, 0);
    assert_eq!(attr.flags & b::ATTR_BIT_INHERIT, 0);
}

#[test]
fn test_list_preserves_insertion_order() {
    let mut list = EventList::new();
    for period in [100, 200, 300] {
        let mut opts = Opts::default();
        opts.sample_on = SampleOn::Count(period);
        list.push(Software::Dummy, &opts);
    }

    let periods: Vec<_> = list.iter().map(|(_, it)| it.attr().sample_period).collect();
    assert_eq!(periods, [100, 200, 300]);

    let mut opts = Opts::default();
    opts.sample_on = SampleOn::Count(400);
    list.push(Software::Dummy, &opts);
    let periods: Vec<_> = list.iter().map(|(_, it)| it.attr().sample_period).collect();
    assert_eq!(periods, [100, 200, 300, 400]);
}

#[test]
fn test_close_on_closed_is_noop() {
    let sink = Sink::Stderr;
    let mut desc = EventDesc::default();
    desc.close(&sink).unwrap();
    assert_eq!(desc.state(), FdState::Closed);
    assert_eq!(desc.status(), OpStatus::Ok);
}

#[test]
fn test_trigger_on_closed_fails() {
    let sink = Sink::Stderr;
    let desc = EventDesc::default();
    let err = desc.trigger_one_sample(&sink).unwrap_err();
    assert!(matches!(err, Error::TriggerFailed(_)));
}

#[test]
fn test_open_reopen_close() {
    let sink = Sink::Stderr;
    let mut desc = EventDesc::default();
    if desc.open(libc::SIGIO, &sink, false).is_err() {
        eprintln!("skipping: perf_event_open not permitted here");
        return;
    }
    assert_eq!(desc.state(), FdState::Open);
    assert_eq!(desc.status(), OpStatus::Ok);

    // Reopen while open closes first and ends with a fresh handle.
    desc.open(libc::SIGIO, &sink, false).unwrap();
    assert_eq!(desc.state(), FdState::Open);
    assert_eq!(desc.status(), OpStatus::Ok);

    desc.trigger_one_sample(&sink).unwrap();

    desc.close(&sink).unwrap();
    assert_eq!(desc.state(), FdState::Closed);
    assert_eq!(desc.status(), OpStatus::Ok);
}
