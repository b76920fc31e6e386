use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::mem;
use std::time::Duration;

use foldhash::{HashMap, HashMapExt};

/// Position of an entry in the schedule: the frame-clock deadline, then the order in which
/// entries were scheduled (so entries with equal deadlines fire in scheduling order).
type Slot = (Duration, u64);

/// Destroy actions waiting for their delay to elapse, keyed by the object they act upon.
///
/// Time only moves when [`advance()`][Self::advance] is called, typically once per frame with
/// the frame's elapsed time as measured by the engine. There is at most one pending action per
/// object: scheduling again replaces the earlier action.
#[derive(Debug)]
pub(crate) struct DelayedDestroys<O> {
    /// Total time the schedule has been advanced by.
    now: Duration,

    next_sequence: u64,

    queue: BTreeMap<Slot, O>,

    /// Reverse index of `queue`, used for cancellation and replacement.
    pending: HashMap<O, Slot>,
}

impl<O> DelayedDestroys<O>
where
    O: Copy + Eq + Hash + Debug,
{
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            queue: BTreeMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Schedules `object` to be handed out by [`advance()`][Self::advance] once `delay` has
    /// elapsed, replacing any action already pending for it.
    ///
    /// Returns the deadline on the schedule's clock.
    pub(crate) fn schedule(&mut self, object: O, delay: Duration) -> Duration {
        let deadline = self.now.saturating_add(delay);
        let slot = (deadline, self.next_sequence);

        // A u64 sequence number cannot realistically wrap within the lifetime of a process.
        self.next_sequence = self.next_sequence.wrapping_add(1);

        if let Some(previous) = self.pending.insert(object, slot) {
            self.queue.remove(&previous);
        }

        self.queue.insert(slot, object);

        deadline
    }

    /// Removes the pending action for `object`, if any.
    ///
    /// Returns whether an action was pending.
    pub(crate) fn cancel(&mut self, object: O) -> bool {
        match self.pending.remove(&object) {
            Some(slot) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Moves the clock forward by `elapsed` and returns every object whose deadline has been
    /// reached, earliest deadline first.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> Vec<O> {
        self.now = self.now.saturating_add(elapsed);

        let mut due = Vec::new();

        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > self.now {
                break;
            }

            let object = entry.remove();
            self.pending.remove(&object);
            due.push(object);
        }

        due
    }

    /// Removes every entry without moving the clock and returns the objects, earliest
    /// deadline first.
    pub(crate) fn drain(&mut self) -> Vec<O> {
        self.pending.clear();

        mem::take(&mut self.queue).into_values().collect()
    }

    pub(crate) fn is_pending(&self, object: O) -> bool {
        self.pending.contains_key(&object)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn now(&self) -> Duration {
        self.now
    }
}
