//! Bounded per-client event queue with `SYN_DROPPED` overflow signalling.
//!
//! The queue is a ring of `capacity + 1` slots addressed by `head` (next slot
//! to read) and `tail` (next slot to write); one slot always stays free so
//! that `head == tail` means empty. When the ring is full the last written
//! event is replaced by a `SYN_DROPPED` marker and the incoming event is
//! discarded. At most one trailing drop marker exists at any time: further
//! overflows coalesce into it until the consumer makes room.

use crate::codes::EV_CNT;
use crate::event::InputEvent;
use std::fmt::Write as _;

/// Default number of events a client can hold.
pub const DEFAULT_CAPACITY: usize = 16;

/// What happened to an event offered to [`EventQueue::try_push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The event was appended.
    Inserted,
    /// The queue was full; the last event was replaced by `SYN_DROPPED`.
    DropMarkerInserted,
    /// The queue was full and already ends in `SYN_DROPPED`; nothing changed.
    Coalesced,
}

/// Counters describing a queue's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Events appended.
    pub inserted: u64,
    /// Drop markers written on overflow.
    pub drop_markers: u64,
    /// Overflows absorbed by an existing drop marker.
    pub coalesced: u64,
}

impl QueueStats {
    /// Total number of events offered while full.
    pub fn overflows(&self) -> u64 {
        self.drop_markers + self.coalesced
    }
}

/// Fixed-capacity ring buffer of events.
#[derive(Debug, Clone)]
pub struct EventQueue {
    slots: Box<[InputEvent]>,
    head: usize,
    tail: usize,
    stats: QueueStats,
}

impl EventQueue {
    /// Create a queue holding up to `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![InputEvent::default(); capacity.max(1) + 1].into_boxed_slice(),
            head: 0,
            tail: 0,
            stats: QueueStats::default(),
        }
    }

    /// Maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.next(self.tail) == self.head
    }

    /// Index of the next slot to read.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Index of the next slot to write.
    pub fn tail(&self) -> usize {
        self.tail
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Offer `event` to the queue.
    pub fn try_push(&mut self, event: InputEvent) -> PushOutcome {
        if !self.is_full() {
            self.slots[self.tail] = event;
            self.tail = self.next(self.tail);
            self.stats.inserted += 1;
            return PushOutcome::Inserted;
        }

        // Full implies len >= 1, so the last written slot is queued.
        let last = self.prev(self.tail);
        if self.slots[last].is_dropped() {
            self.stats.coalesced += 1;
            return PushOutcome::Coalesced;
        }

        log::debug!(
            "event queue overflow at slot {}: replacing {} with SYN_DROPPED",
            last,
            self.slots[last]
        );
        self.slots[last] = InputEvent::dropped(event.time);
        self.stats.drop_markers += 1;
        PushOutcome::DropMarkerInserted
    }

    /// Remove and return the oldest event.
    pub fn pop(&mut self) -> Option<InputEvent> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.head];
        self.head = self.next(self.head);
        Some(event)
    }

    /// Remove up to `max` events, oldest first.
    pub fn drain(&mut self, max: usize) -> Vec<InputEvent> {
        let count = max.min(self.len());
        let mut events = Vec::with_capacity(count);
        while events.len() < count {
            match self.pop() {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// Copy the queued events in order without consuming them.
    pub fn snapshot(&self) -> Vec<InputEvent> {
        self.iter().copied().collect()
    }

    /// Iterate over queued events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> + '_ {
        let size = self.slots.len();
        (0..self.len()).map(move |i| &self.slots[(self.head + i) % size])
    }

    /// Discard every queued event.
    pub fn clear(&mut self) {
        self.head = self.tail;
    }

    /// Remove every event of `event_type` (all types when `event_type` is
    /// `EV_CNT`), then any `SYN_REPORT` that directly follows another kept
    /// `SYN_REPORT`. Survivors keep their relative order.
    ///
    /// A `SYN_REPORT` at the head is kept: it closes a group the consumer has
    /// already partly read.
    ///
    /// Returns the number of events removed.
    pub fn filter(&mut self, event_type: u16) -> usize {
        let before = self.len();
        let size = self.slots.len();
        let mut read = self.head;
        let mut write = self.head;
        let mut last_was_syn = false;

        while read != self.tail {
            let event = self.slots[read];
            read = (read + 1) % size;

            if event_type == EV_CNT || event.event_type == event_type {
                continue;
            }
            if event.is_sync_report() {
                if last_was_syn {
                    continue;
                }
                last_was_syn = true;
            } else {
                last_was_syn = false;
            }

            self.slots[write] = event;
            write = (write + 1) % size;
        }

        self.tail = write;
        before - self.len()
    }

    /// Render every slot with head and tail markers.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, event) in self.slots.iter().enumerate() {
            let _ = write!(out, "\t[{}] {}", i, event);
            if i == self.head {
                out.push_str(" <- head");
            }
            if i == self.tail {
                out.push_str(" <- tail");
            }
            out.push('\n');
        }
        out
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    #[inline]
    fn prev(&self, index: usize) -> usize {
        (index + self.slots.len() - 1) % self.slots.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
