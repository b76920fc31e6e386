use std::collections::VecDeque;
use std::fmt::Debug;
use std::mem;

use tracing::{debug, trace};

use crate::{DestroyScope, Host};

/// Recycles instances of a single prototype.
///
/// Every instance the pool tracks is either *active* (handed out to a caller, who is expected
/// to return it) or *idle* (waiting in the pool to be handed out again). An instance is never
/// in both sets and never in neither, so `active_count() + idle_count() == total_count()`
/// holds at every observation.
///
/// The pool does not own the host. Every operation that touches engine objects takes the
/// [`Host`] as a parameter.
///
/// # Hot and cold start
///
/// A new pool pre-populates `capacity` instances. If copies of the prototype start out active
/// (see [`Host::is_active_by_default()`]), the pre-populated instances are treated as already
/// handed out and count as active. Otherwise they are idle and only become active when
/// [`acquire()`][Self::acquire] hands them out.
///
/// # Growth
///
/// The pool has no upper bound. When no idle instance is available, [`acquire()`][Self::acquire]
/// instantiates a fresh copy of the prototype.
///
/// # Example
///
/// ```rust
/// use prefab_pool::Pool;
/// use prefab_pool::fake::FakeHost;
///
/// let mut host = FakeHost::new();
/// let prototype = host.spawn(false);
///
/// let mut pool = Pool::new(&mut host, prototype, 3, None);
/// assert_eq!(pool.idle_count(), 3);
///
/// let bullet = pool.acquire(&mut host);
/// assert!(host.is_active(bullet));
/// assert_eq!(pool.active_count(), 1);
///
/// assert!(pool.release(&mut host, bullet));
/// assert!(!host.is_active(bullet));
/// assert_eq!(pool.idle_count(), 3);
///
/// pool.destroy_all(&mut host);
/// assert_eq!(host.live_count(), 1); // Only the prototype is left.
/// ```
#[derive(Debug)]
pub struct Pool<O> {
    /// New instances are copies of this. The pool never modifies it.
    prototype: O,

    /// Where new instances are attached in the engine's object hierarchy.
    parent: Option<O>,

    /// Instances currently handed out. Order carries no meaning, so we remove by swapping.
    released: Vec<O>,

    /// Instances waiting to be handed out, oldest first.
    collected: VecDeque<O>,

    /// Idle entries found to be destroyed out of band since the owner last asked.
    discarded: Vec<O>,
}

impl<O> Pool<O>
where
    O: Copy + Eq + Debug,
{
    /// Creates a pool and pre-populates it with `capacity` copies of `prototype`.
    ///
    /// The new instances are idle unless copies of the prototype start out active, in which
    /// case they are counted as active (already handed out).
    #[must_use]
    pub fn new<H>(host: &mut H, prototype: O, capacity: usize, parent: Option<O>) -> Self
    where
        H: Host<Object = O>,
    {
        let mut released = Vec::with_capacity(capacity);
        let mut collected = VecDeque::with_capacity(capacity);

        let starts_active = host.is_active_by_default(prototype);

        for _ in 0..capacity {
            let instance = host.instantiate(prototype, parent);

            if starts_active {
                released.push(instance);
            } else {
                collected.push_back(instance);
            }
        }

        Self {
            prototype,
            parent,
            released,
            collected,
            discarded: Vec::new(),
        }
    }

    /// Hands out an instance, reusing an idle one if possible.
    ///
    /// Idle instances that were destroyed without going through the pool are skipped. If no
    /// live idle instance remains, a new copy of the prototype is instantiated.
    ///
    /// The returned instance is active and counted as handed out.
    pub fn acquire<H>(&mut self, host: &mut H) -> O
    where
        H: Host<Object = O>,
    {
        let instance = loop {
            match self.collected.pop_front() {
                Some(candidate) if host.is_alive(candidate) => break candidate,
                Some(stale) => {
                    debug!(object = ?stale, "skipping idle instance destroyed outside its pool");
                    self.discarded.push(stale);
                }
                None => {
                    let fresh = host.instantiate(self.prototype, self.parent);
                    trace!(
                        object = ?fresh,
                        prototype = ?self.prototype,
                        "pool grew by one instance"
                    );
                    break fresh;
                }
            }
        };

        host.set_active(instance, true);
        self.released.push(instance);

        instance
    }

    /// Takes an instance back into the pool.
    ///
    /// The object is always deactivated. It only becomes idle (available for reuse) if it was
    /// handed out by this pool and not yet returned; otherwise the pool ignores it after
    /// deactivating it.
    ///
    /// Returns whether the object was taken back.
    pub fn release<H>(&mut self, host: &mut H, object: O) -> bool
    where
        H: Host<Object = O>,
    {
        host.set_active(object, false);

        let Some(index) = self.released.iter().position(|candidate| *candidate == object) else {
            debug!(?object, "released object is not in the active set of its pool");
            return false;
        };

        self.released.swap_remove(index);
        self.collected.push_back(object);

        true
    }

    /// Destroys the instances selected by `scope` and stops tracking them.
    ///
    /// The pool remains usable afterwards and will instantiate new copies when asked for more
    /// instances than it has idle.
    ///
    /// Returns the objects that were removed from the pool.
    pub fn destroy<H>(&mut self, host: &mut H, scope: DestroyScope) -> Vec<O>
    where
        H: Host<Object = O>,
    {
        let mut removed = Vec::new();

        if scope.includes_active() {
            removed.append(&mut self.released);
        }

        if scope.includes_idle() {
            removed.extend(self.collected.drain(..));
        }

        for &object in &removed {
            // Objects destroyed out of band are still tracked until we notice. Nothing to do.
            if host.is_alive(object) {
                host.destroy(object);
            }
        }

        removed
    }

    /// Destroys every instance of the pool, active or idle, and consumes the pool.
    ///
    /// Returns the objects that were removed from the pool.
    pub fn destroy_all<H>(mut self, host: &mut H) -> Vec<O>
    where
        H: Host<Object = O>,
    {
        self.destroy(host, DestroyScope::All)
    }

    /// The prototype that new instances are copied from.
    #[must_use]
    pub fn prototype(&self) -> O {
        self.prototype
    }

    /// The parent that new instances are attached under, if any.
    #[must_use]
    pub fn parent(&self) -> Option<O> {
        self.parent
    }

    /// Number of instances currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.released.len()
    }

    /// Number of instances waiting to be handed out.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.collected.len()
    }

    /// Number of instances the pool is tracking.
    #[must_use]
    pub fn total_count(&self) -> usize {
        // Both collections live in memory at the same time, so this cannot overflow.
        self.active_count().wrapping_add(self.idle_count())
    }

    /// Whether the object is an instance currently handed out by this pool.
    #[must_use]
    pub fn is_active(&self, object: O) -> bool {
        self.released.contains(&object)
    }

    /// Whether the object is an instance waiting in this pool.
    #[must_use]
    pub fn is_idle(&self, object: O) -> bool {
        self.collected.contains(&object)
    }

    /// Iterates over every tracked instance, active ones first.
    pub fn instances(&self) -> impl Iterator<Item = O> + '_ {
        self.released.iter().chain(self.collected.iter()).copied()
    }

    /// Hands over the stale idle entries skipped by [`acquire()`][Self::acquire] so far.
    pub(crate) fn take_discarded(&mut self) -> Vec<O> {
        mem::take(&mut self.discarded)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::MockHost;
    use crate::fake::FakeHost;

    fn assert_counts_consistent<O: Copy + Eq + Debug>(pool: &Pool<O>) {
        assert_eq!(pool.active_count() + pool.idle_count(), pool.total_count());
    }

    #[test]
    fn cold_start_puts_instances_in_idle_set() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);

        let pool = Pool::new(&mut host, prototype, 3, None);

        assert_eq!(pool.idle_count(), 3);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(host.instantiated_count(), 3);
        assert!(pool.instances().all(|instance| !host.is_active(instance)));
    }

    #[test]
    fn hot_start_puts_instances_in_active_set() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(true);

        let pool = Pool::new(&mut host, prototype, 2, None);

        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.idle_count(), 0);
        assert!(pool.instances().all(|instance| host.is_active(instance)));
    }

    #[test]
    fn construction_does_not_toggle_activation() {
        let mut host = MockHost::new();
        host.expect_is_active_by_default()
            .with(eq(1))
            .return_const(false);

        let mut next_id = 100;
        host.expect_instantiate()
            .with(eq(1), eq(Some(50)))
            .times(3)
            .returning(move |_, _| {
                next_id += 1;
                next_id
            });

        // Any set_active() call would panic because there is no expectation for it.
        let pool = Pool::new(&mut host, 1, 3, Some(50));

        assert_eq!(pool.instances().collect::<Vec<_>>(), vec![101, 102, 103]);
        assert_eq!(pool.parent(), Some(50));
        assert_eq!(pool.prototype(), 1);
    }

    #[test]
    fn acquire_reuses_idle_instances_in_insertion_order() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        let idle: Vec<_> = pool.instances().collect();

        let first = pool.acquire(&mut host);
        let second = pool.acquire(&mut host);

        assert_eq!(vec![first, second], idle);
        assert!(host.is_active(first));
        assert!(host.is_active(second));
        assert!(pool.is_active(first));
        assert_eq!(host.instantiated_count(), 2);
        assert_counts_consistent(&pool);
    }

    #[test]
    fn acquire_grows_when_idle_set_is_empty() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let parent = host.spawn(true);
        let mut pool = Pool::new(&mut host, prototype, 1, Some(parent));

        let reused = pool.acquire(&mut host);
        let grown = pool.acquire(&mut host);

        assert_ne!(reused, grown);
        assert_eq!(pool.total_count(), 2);
        assert_eq!(pool.active_count(), 2);
        assert_eq!(host.prototype_of(grown), Some(prototype));
        assert_eq!(host.parent_of(grown), Some(parent));
        assert!(host.is_active(grown));
        assert_counts_consistent(&pool);
    }

    #[test]
    fn acquire_skips_instances_destroyed_out_of_band() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 3, None);

        let idle: Vec<_> = pool.instances().collect();
        host.destroy(idle[0]);
        host.destroy(idle[1]);

        let acquired = pool.acquire(&mut host);

        assert_eq!(acquired, idle[2]);
        assert_eq!(pool.take_discarded(), vec![idle[0], idle[1]]);
        assert!(pool.take_discarded().is_empty());
        assert_eq!(pool.total_count(), 1);
        assert_counts_consistent(&pool);
    }

    #[test]
    fn acquire_grows_when_every_idle_instance_is_stale() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        for instance in pool.instances().collect::<Vec<_>>() {
            host.destroy(instance);
        }

        let acquired = pool.acquire(&mut host);

        assert!(host.is_alive(acquired));
        assert_eq!(host.instantiated_count(), 3);
        assert_eq!(pool.take_discarded().len(), 2);
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn release_returns_instance_to_idle_set() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 1, None);

        let instance = pool.acquire(&mut host);
        assert!(pool.release(&mut host, instance));

        assert!(!host.is_active(instance));
        assert!(pool.is_idle(instance));
        assert!(!pool.is_active(instance));
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn released_instance_goes_to_back_of_queue() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        let first = pool.acquire(&mut host);
        pool.release(&mut host, first);

        let next = pool.acquire(&mut host);
        assert_ne!(next, first);

        let after = pool.acquire(&mut host);
        assert_eq!(after, first);
    }

    #[test]
    fn double_release_deactivates_but_does_not_enqueue_twice() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 1, None);

        let instance = pool.acquire(&mut host);
        assert!(pool.release(&mut host, instance));
        assert!(!pool.release(&mut host, instance));

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn foreign_release_deactivates_only() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let stranger = host.spawn(true);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        assert!(!pool.release(&mut host, stranger));

        assert!(!host.is_active(stranger));
        assert!(host.is_alive(stranger));
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn foreign_release_with_mock_only_deactivates() {
        let mut host = MockHost::new();
        host.expect_is_active_by_default().return_const(false);
        host.expect_set_active()
            .with(eq(9), eq(false))
            .times(1)
            .return_const(());

        let mut pool = Pool::new(&mut host, 1, 0, None);

        assert!(!pool.release(&mut host, 9));
        assert_eq!(pool.total_count(), 0);
    }

    #[test]
    fn destroy_idle_keeps_active_instances() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 3, None);

        let in_use = pool.acquire(&mut host);
        let removed = pool.destroy(&mut host, DestroyScope::Idle);

        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|object| !host.is_alive(*object)));
        assert!(host.is_alive(in_use));
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn destroy_active_keeps_idle_instances() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 3, None);

        let in_use = pool.acquire(&mut host);
        let removed = pool.destroy(&mut host, DestroyScope::Active);

        assert_eq!(removed, vec![in_use]);
        assert!(!host.is_alive(in_use));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn pool_regrows_after_partial_destroy() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        pool.destroy(&mut host, DestroyScope::All);
        assert_eq!(pool.total_count(), 0);

        let fresh = pool.acquire(&mut host);
        assert!(host.is_alive(fresh));
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn destroy_all_destroys_both_sets() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        let _first = pool.acquire(&mut host);
        let _second = pool.acquire(&mut host);
        let _third = pool.acquire(&mut host);
        let spare = pool.acquire(&mut host);
        pool.release(&mut host, spare);

        let removed = pool.destroy_all(&mut host);

        assert_eq!(removed.len(), 4);
        assert_eq!(host.destroyed_count(), 4);
        assert!(host.is_alive(prototype));
    }

    #[test]
    fn destroy_skips_instances_already_gone() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        let first = pool.instances().next().expect("pool was populated with two instances");
        host.destroy(first);

        let removed = pool.destroy_all(&mut host);

        assert_eq!(removed.len(), 2);
        assert_eq!(host.destroyed_count(), 2);
    }

    #[test]
    fn counts_stay_consistent_through_mixed_operations() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let mut pool = Pool::new(&mut host, prototype, 2, None);

        let mut handed_out = Vec::new();
        let mut previous_total = pool.total_count();

        for round in 0..20 {
            if round % 3 == 2 {
                if let Some(instance) = handed_out.pop() {
                    pool.release(&mut host, instance);
                }
            } else {
                handed_out.push(pool.acquire(&mut host));
            }

            assert_counts_consistent(&pool);
            assert!(pool.total_count() >= previous_total);
            previous_total = pool.total_count();
        }
    }
}
