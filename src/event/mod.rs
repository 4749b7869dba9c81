pub mod hw;
pub mod raw;
pub mod sw;

pub use hw::Hardware;
pub use raw::Raw;
pub use sw::Software;

#[derive(Clone, Debug)]
pub struct Event(pub(crate) EventConfig);

#[derive(Clone, Copy, Debug)]
pub(crate) struct EventConfig {
    pub ty: u32,
    pub config: u64,
}
