use super::{Event, EventConfig};

/// Any other kernel-defined counter category.
///
/// The type value to use can be found in the sysfs filesystem: there is a
/// subdirectory per PMU instance under `/sys/bus/event_source/devices`, and
/// each contains a `type` file whose content is the integer to put here.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Raw {
    pub ty: u32,
    pub config: u64,
}

impl From<&Raw> for Event {
    fn from(value: &Raw) -> Self {
        Self(EventConfig {
            ty: value.ty,
            config: value.config,
        })
    }
}

impl From<Raw> for Event {
    fn from(value: Raw) -> Self {
        (&value).into()
    }
}
