use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use foldhash::{HashMap, HashMapExt};
use tracing::{debug, trace};

use crate::key::generate_registry_id;
use crate::schedule::DelayedDestroys;
use crate::{DestroyScope, Error, Host, Pool, PoolKey, PoolRegistryBuilder, Result};

/// Dispatches pooling requests to the pool of each object's prototype.
///
/// The registry holds one [`Pool`] per registered prototype. Requests name an object and the
/// registry works out which pool, if any, the object belongs to:
///
/// * A registered prototype resolves to its own pool.
/// * An instance created by a pool resolves to that pool for as long as the pool tracks it.
/// * Anything else is unpooled and is handled by calling the [`Host`] directly.
///
/// This lets the same call site work whether or not a pool was set up for a kind of object,
/// at the cost of silently losing the benefit of pooling if nobody registered one.
///
/// # Lifetime
///
/// The registry is an ordinary value; create one with [`new()`][Self::new] or
/// [`builder()`][Self::builder] at session start and hand it to the code that needs pooling.
/// Because the registry does not own the host, it cannot destroy engine objects when dropped.
/// Call [`shutdown()`][Self::shutdown] to destroy every pooled instance before dropping it.
///
/// # Delayed destroy
///
/// [`destroy_after()`][Self::destroy_after] never blocks. The action is recorded on a frame
/// clock that only moves when [`update()`][Self::update] is called, and it fires on the first
/// update at which its delay has elapsed. When it fires it resolves the object against the
/// registry as it is at that moment, exactly as an immediate [`destroy()`][Self::destroy] would.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use prefab_pool::PoolRegistry;
/// use prefab_pool::fake::FakeHost;
///
/// let mut host = FakeHost::new();
/// let bullet = host.spawn(false);
///
/// let mut registry = PoolRegistry::new();
/// let key = registry.create_pool(&mut host, bullet, 3, None);
///
/// let shot = registry.acquire(&mut host, bullet);
/// assert_eq!(registry.active_count(key), Some(1));
///
/// // The bullet expires after half a second of game time.
/// registry.destroy_after(shot, Duration::from_millis(500));
/// registry.update(&mut host, Duration::from_millis(250));
/// assert_eq!(registry.active_count(key), Some(1));
///
/// registry.update(&mut host, Duration::from_millis(250));
/// assert_eq!(registry.active_count(key), Some(0));
/// assert_eq!(registry.idle_count(key), Some(3));
///
/// registry.shutdown(&mut host);
/// ```
#[derive(Debug)]
pub struct PoolRegistry<O> {
    /// Stamped into every key we issue so keys from other registries never resolve here.
    registry_id: u64,

    next_key_index: u64,

    pools: HashMap<PoolKey, Pool<O>>,

    keys_by_prototype: HashMap<O, PoolKey>,

    /// The pool each tracked instance came from.
    owners: HashMap<O, PoolKey>,

    delayed: DelayedDestroys<O>,

    cancel_pending_on_acquire: bool,
}

impl<O> PoolRegistry<O>
where
    O: Copy + Eq + Hash + Debug,
{
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`PoolRegistry`].
    ///
    /// Use this when you want to customize the registry configuration beyond the defaults.
    pub fn builder() -> PoolRegistryBuilder<O> {
        PoolRegistryBuilder::new()
    }

    pub(crate) fn new_inner(cancel_pending_on_acquire: bool) -> Self {
        Self {
            registry_id: generate_registry_id(),
            next_key_index: 0,
            pools: HashMap::new(),
            keys_by_prototype: HashMap::new(),
            owners: HashMap::new(),
            delayed: DelayedDestroys::new(),
            cancel_pending_on_acquire,
        }
    }

    /// Creates a pool for `prototype`, pre-populated with `capacity` instances attached under
    /// `parent`.
    ///
    /// If a pool for the prototype already exists, nothing is created and the existing key is
    /// returned. The capacity and parent of the second call are ignored.
    pub fn create_pool<H>(
        &mut self,
        host: &mut H,
        prototype: O,
        capacity: usize,
        parent: Option<O>,
    ) -> PoolKey
    where
        H: Host<Object = O>,
    {
        if let Some(&key) = self.keys_by_prototype.get(&prototype) {
            trace!(%key, ?prototype, "pool already exists for prototype");
            return key;
        }

        let key = PoolKey::new(self.registry_id, self.next_key_index);
        self.next_key_index = self
            .next_key_index
            .checked_add(1)
            .expect("a registry cannot create 2^64 pools in the lifetime of a process");

        let pool = Pool::new(host, prototype, capacity, parent);

        for instance in pool.instances() {
            self.owners.insert(instance, key);
        }

        debug!(
            %key,
            ?prototype,
            capacity,
            active = pool.active_count(),
            idle = pool.idle_count(),
            "created pool"
        );

        self.keys_by_prototype.insert(prototype, key);
        self.pools.insert(key, pool);

        key
    }

    /// Destroys every instance of the pool, active or idle, and removes the pool.
    ///
    /// Delayed destroys pending for its instances are cancelled. Does nothing if there is no
    /// pool for `key`.
    pub fn destroy_pool<H>(&mut self, host: &mut H, key: PoolKey)
    where
        H: Host<Object = O>,
    {
        let Some(pool) = self.pools.remove(&key) else {
            trace!(%key, "no pool to destroy");
            return;
        };

        self.keys_by_prototype.remove(&pool.prototype());

        let removed = pool.destroy_all(host);
        self.forget(&removed);

        debug!(%key, destroyed = removed.len(), "destroyed pool");
    }

    /// Destroys the instances of one pool selected by `scope`, keeping the pool registered.
    ///
    /// Does nothing if there is no pool for `key`.
    pub fn destroy_instances<H>(&mut self, host: &mut H, key: PoolKey, scope: DestroyScope)
    where
        H: Host<Object = O>,
    {
        let Some(pool) = self.pools.get_mut(&key) else {
            trace!(%key, ?scope, "no pool to destroy instances of");
            return;
        };

        let removed = pool.destroy(host, scope);
        self.forget(&removed);

        debug!(%key, ?scope, destroyed = removed.len(), "destroyed pool instances");
    }

    /// Hands out an active instance of `origin`'s kind.
    ///
    /// `origin` is normally the prototype a pool was created for but may also be an instance
    /// of such a pool. If it resolves to a pool, the pool hands out an instance. Otherwise a
    /// one-off copy of `origin` is instantiated and activated; it is not pooled.
    pub fn acquire<H>(&mut self, host: &mut H, origin: O) -> O
    where
        H: Host<Object = O>,
    {
        if let Some(key) = self.resolve_origin(origin) {
            if let Some(instance) = self.acquire_pooled(host, key) {
                return instance;
            }
        }

        let instance = host.instantiate(origin, None);
        host.set_active(instance, true);

        trace!(?origin, object = ?instance, "instantiated unpooled object");

        instance
    }

    /// Returns an object to its pool, deactivating it.
    ///
    /// An unpooled object is only deactivated. A pooled object that its pool does not consider
    /// handed out (e.g. one returned twice) is also only deactivated.
    pub fn release<H>(&mut self, host: &mut H, object: O)
    where
        H: Host<Object = O>,
    {
        if self.recycle(host, object).is_none() {
            trace!(?object, "deactivating unpooled object");
            host.set_active(object, false);
        }
    }

    /// Gets rid of an object.
    ///
    /// A pooled object is returned to its pool instead of being destroyed, exactly like
    /// [`release()`][Self::release] would. An unpooled object is destroyed and any delayed
    /// destroy still pending for it is cancelled.
    pub fn destroy<H>(&mut self, host: &mut H, object: O)
    where
        H: Host<Object = O>,
    {
        if self.recycle(host, object).is_none() {
            self.delayed.cancel(object);

            trace!(?object, "destroying unpooled object");
            host.destroy(object);
        }
    }

    /// Schedules [`destroy()`][Self::destroy] of `object` once `delay` of frame time has
    /// elapsed, replacing any delayed destroy already pending for the object.
    ///
    /// Time is measured by [`update()`][Self::update]; nothing happens until it is called.
    pub fn destroy_after(&mut self, object: O, delay: Duration) {
        let deadline = self.delayed.schedule(object, delay);

        trace!(?object, ?delay, ?deadline, "scheduled delayed destroy");
    }

    /// Cancels the delayed destroy pending for `object`.
    ///
    /// Returns whether one was pending.
    pub fn cancel_delayed_destroy(&mut self, object: O) -> bool {
        self.delayed.cancel(object)
    }

    /// Advances the frame clock by `elapsed` and performs every delayed destroy that is due,
    /// earliest deadline first.
    pub fn update<H>(&mut self, host: &mut H, elapsed: Duration)
    where
        H: Host<Object = O>,
    {
        for object in self.delayed.advance(elapsed) {
            trace!(?object, "delayed destroy is due");

            if self.recycle(host, object).is_some() {
                continue;
            }

            // The engine may have destroyed it already while the action was pending.
            if host.is_alive(object) {
                host.destroy(object);
            }
        }
    }

    /// Like [`acquire()`][Self::acquire] but for an explicit pool, without any fallback.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPool`] if there is no pool for `key`.
    pub fn try_acquire<H>(&mut self, host: &mut H, key: PoolKey) -> Result<O>
    where
        H: Host<Object = O>,
    {
        self.acquire_pooled(host, key)
            .ok_or(Error::UnknownPool { key })
    }

    /// Returns `object` to the pool identified by `key`, reporting anything unexpected.
    ///
    /// The object is deactivated in every case except [`Error::UnknownPool`].
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPool`] if there is no pool for `key`. [`Error::NotReleased`] if that pool
    /// does not consider the object handed out.
    pub fn try_release<H>(&mut self, host: &mut H, key: PoolKey, object: O) -> Result<()>
    where
        H: Host<Object = O>,
    {
        let pool = self
            .pools
            .get_mut(&key)
            .ok_or(Error::UnknownPool { key })?;

        if pool.release(host, object) {
            Ok(())
        } else {
            Err(Error::NotReleased { key })
        }
    }

    /// The key of the pool registered for `prototype`, if any.
    #[must_use]
    pub fn key_of(&self, prototype: O) -> Option<PoolKey> {
        self.keys_by_prototype.get(&prototype).copied()
    }

    /// The key of the pool that created `object` and still tracks it, if any.
    #[must_use]
    pub fn owner_of(&self, object: O) -> Option<PoolKey> {
        self.owners.get(&object).copied()
    }

    /// The pool for `key`, if it exists.
    #[must_use]
    pub fn pool(&self, key: PoolKey) -> Option<&Pool<O>> {
        self.pools.get(&key)
    }

    /// Whether there is a pool for `key`.
    #[must_use]
    pub fn contains_pool(&self, key: PoolKey) -> bool {
        self.pools.contains_key(&key)
    }

    /// Number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Number of instances the pool has handed out, or `None` if there is no pool for `key`.
    #[must_use]
    pub fn active_count(&self, key: PoolKey) -> Option<usize> {
        self.pools.get(&key).map(Pool::active_count)
    }

    /// Number of instances waiting in the pool, or `None` if there is no pool for `key`.
    #[must_use]
    pub fn idle_count(&self, key: PoolKey) -> Option<usize> {
        self.pools.get(&key).map(Pool::idle_count)
    }

    /// Number of instances the pool is tracking, or `None` if there is no pool for `key`.
    #[must_use]
    pub fn total_count(&self, key: PoolKey) -> Option<usize> {
        self.pools.get(&key).map(Pool::total_count)
    }

    /// Number of delayed destroys that have not fired yet.
    #[must_use]
    pub fn pending_destroy_count(&self) -> usize {
        self.delayed.len()
    }

    /// Whether a delayed destroy is pending for `object`.
    #[must_use]
    pub fn is_destroy_pending(&self, object: O) -> bool {
        self.delayed.is_pending(object)
    }

    /// Total frame time passed to [`update()`][Self::update] so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.delayed.now()
    }

    /// Destroys every pool and the registry itself.
    ///
    /// Delayed destroys still pending for objects without a pool are performed right away,
    /// as the registry's frame clock stops here. Those pending for pooled instances are moot
    /// because the instances are destroyed together with their pools.
    pub fn shutdown<H>(mut self, host: &mut H)
    where
        H: Host<Object = O>,
    {
        let keys: Vec<_> = self.pools.keys().copied().collect();

        for &key in &keys {
            self.destroy_pool(host, key);
        }

        // Destroying the pools cancelled the timers of their instances, so what is left
        // belongs to unpooled objects.
        let leftovers = self.delayed.drain();
        let mut destroyed = 0_usize;

        for object in leftovers {
            if host.is_alive(object) {
                trace!(?object, "destroying unpooled object early on shutdown");
                host.destroy(object);
                destroyed = destroyed.wrapping_add(1);
            }
        }

        debug!(
            pools = keys.len(),
            early_delayed_destroys = destroyed,
            "registry shut down"
        );
    }

    /// The pool to hand out an instance of `origin`'s kind from.
    ///
    /// A registered prototype takes precedence, so a pooled instance that also serves as the
    /// prototype of another pool asks that other pool for copies of itself.
    fn resolve_origin(&self, origin: O) -> Option<PoolKey> {
        self.key_of(origin).or_else(|| self.owner_of(origin))
    }

    /// The pool to return `object` to.
    ///
    /// The pool that created the object takes precedence over a pool the object is the
    /// prototype of, so instances always go back where they came from.
    fn resolve_returned(&self, object: O) -> Option<PoolKey> {
        self.owner_of(object).or_else(|| self.key_of(object))
    }

    fn acquire_pooled<H>(&mut self, host: &mut H, key: PoolKey) -> Option<O>
    where
        H: Host<Object = O>,
    {
        let pool = self.pools.get_mut(&key)?;

        let instance = pool.acquire(host);
        let discarded = pool.take_discarded();

        self.forget(&discarded);
        self.owners.insert(instance, key);

        if self.cancel_pending_on_acquire && self.delayed.cancel(instance) {
            debug!(%key, object = ?instance, "cancelled stale delayed destroy of reused instance");
        }

        trace!(%key, object = ?instance, "acquired pooled instance");

        Some(instance)
    }

    /// Returns `object` to its pool if it has one.
    ///
    /// Returns `None` if the object does not resolve to a pool, otherwise whether the pool took
    /// the object back.
    fn recycle<H>(&mut self, host: &mut H, object: O) -> Option<bool>
    where
        H: Host<Object = O>,
    {
        let key = self.resolve_returned(object)?;
        let pool = self.pools.get_mut(&key)?;

        let recycled = pool.release(host, object);

        trace!(%key, ?object, recycled, "returned object to pool");

        Some(recycled)
    }

    /// Drops all bookkeeping for objects that no pool tracks any more.
    fn forget(&mut self, objects: &[O]) {
        for object in objects {
            self.owners.remove(object);
            self.delayed.cancel(*object);
        }
    }
}

impl<O> Default for PoolRegistry<O>
where
    O: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
