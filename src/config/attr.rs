use super::{Opts, SampleOn};
use crate::event::EventConfig;
use crate::ffi::{bindings as b, Attr};

/// Builds the kernel attr for one descriptor. Counters always start
/// disabled; arming happens later through refresh-by-one.
pub(crate) fn from(event_cfg: EventConfig, opts: &Opts) -> Attr {
    let mut attr = Attr {
        size: size_of::<Attr>() as _,
        ..Default::default()
    };

    attr.type_ = event_cfg.ty;
    attr.config = event_cfg.config;

    attr.flags |= b::ATTR_BIT_DISABLED;
    attr.sample_type = b::PERF_SAMPLE_IP;

    match opts.sample_on {
        SampleOn::Count(val) => attr.sample_period = val,
        SampleOn::Freq(val) => {
            attr.flags |= b::ATTR_BIT_FREQ;
            attr.sample_period = val; // union with sample_freq
        }
    }

    macro_rules! when {
        ($bool:ident, $flag:ident) => {
            if opts.exclude.$bool {
                attr.flags |= b::$flag;
            }
        };
    }
    when!(user, ATTR_BIT_EXCLUDE_USER);
    when!(kernel, ATTR_BIT_EXCLUDE_KERNEL);
    when!(hv, ATTR_BIT_EXCLUDE_HV);
    when!(idle, ATTR_BIT_EXCLUDE_IDLE);

    if opts.inherit {
        attr.flags |= b::ATTR_BIT_INHERIT;
    }

    attr.wakeup_events = opts.wakeup;

    attr
}
