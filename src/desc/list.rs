use super::EventDesc;
use crate::config::Opts;
use crate::event::Event;

/// Stable handle to a descriptor in an [`EventList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(pub(crate) usize);

/// Append-only, insertion-ordered collection of event descriptors.
///
/// Insertion order is semantically meaningful: it is the order `start_all`
/// and `stop_all` walk the descriptors in. Ids stay valid for the lifetime
/// of the list since descriptors are never removed.
#[derive(Default)]
pub struct EventList {
    descs: Vec<EventDesc>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a descriptor from `event` and `opts` and appends it.
    pub fn push(&mut self, event: impl Into<Event>, opts: &Opts) -> EventId {
        self.push_desc(EventDesc::new(event, opts))
    }

    /// Appends an already-built descriptor at the tail.
    pub fn push_desc(&mut self, desc: EventDesc) -> EventId {
        let id = EventId(self.descs.len());
        self.descs.push(desc);
        id
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&EventDesc> {
        self.descs.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: EventId) -> Option<&mut EventDesc> {
        self.descs.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &EventDesc)> {
        self.descs.iter().enumerate().map(|(i, it)| (EventId(i), it))
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = EventId> {
        (0..self.descs.len()).map(EventId)
    }
}
