use std::sync::atomic::{AtomicI32, AtomicU64, AtomicUsize, Ordering};

// Power of two, so wrapping indices can be masked.
const CAP: usize = 256;

// Marks a slot with no value in it; fds are never negative.
const EMPTY: i32 = -1;

/// Fixed-capacity queue of raw fds: single consumer, any number of
/// producers.
///
/// The producer side runs in signal context: `push` takes no locks and
/// never allocates. With `Owner::Process` delivery the kernel may run the
/// handler on several threads at once, so a producer claims its index
/// with a CAS before writing the slot. Overflow drops the delivery and
/// counts it; the counter involved stays disabled until its next explicit
/// re-arm, which is the least bad option available inside a handler.
pub(crate) struct Ring {
    slots: [AtomicI32; CAP],
    head: AtomicUsize,
    tail: AtomicUsize,
    dropped: AtomicU64,
}

impl Ring {
    pub fn new() -> Self {
        Self {
            slots: [const { AtomicI32::new(EMPTY) }; CAP],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Producer side. Returns `false` when the ring is full.
    pub fn push(&self, fd: i32) -> bool {
        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            if head.wrapping_sub(tail) >= CAP {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            // Claim the index before touching the slot, so two handler
            // invocations cannot land on the same one.
            match self.head.compare_exchange_weak(
                head,
                head.wrapping_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(it) => head = it,
            }
        }

        // The release pairs with the consumer's acquire swap of the slot.
        self.slots[head & (CAP - 1)].store(fd, Ordering::Release);
        true
    }

    /// Consumer side. Returns `None` when the ring is empty, or when the
    /// next index is claimed but its value is not visible yet. The latter
    /// resolves itself: the producer's wake-up poke follows its slot
    /// store, so the consumer is woken again once the value is there.
    pub fn pop(&self) -> Option<i32> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }

        let fd = self.slots[tail & (CAP - 1)].swap(EMPTY, Ordering::Acquire);
        if fd == EMPTY {
            return None;
        }
        // Pairs with the producer's acquire of `tail`: the slot must be
        // emptied before a producer may claim this index again.
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(fd)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
