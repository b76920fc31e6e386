use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique registry IDs.
static REGISTRY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique registry ID.
pub(crate) fn generate_registry_id() -> u64 {
    REGISTRY_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Identifies one pool in a [`PoolRegistry`][crate::PoolRegistry].
///
/// Keys are issued by [`PoolRegistry::create_pool()`][crate::PoolRegistry::create_pool] and
/// are never reused by the registry that issued them, even after the pool is destroyed. A key
/// remembers which registry issued it, so presenting it to a different registry behaves
/// exactly like presenting the key of a destroyed pool: the registry reports that it has no
/// such pool.
///
/// # Example
///
/// ```rust
/// use prefab_pool::PoolRegistry;
/// use prefab_pool::fake::FakeHost;
///
/// let mut host = FakeHost::new();
/// let prototype = host.spawn(false);
///
/// let mut registry = PoolRegistry::new();
/// let key = registry.create_pool(&mut host, prototype, 2, None);
///
/// assert_eq!(registry.key_of(prototype), Some(key));
/// assert_eq!(registry.idle_count(key), Some(2));
///
/// let other_registry = PoolRegistry::new();
/// assert_eq!(other_registry.idle_count(key), None);
/// # other_registry.shutdown(&mut host);
/// # registry.shutdown(&mut host);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PoolKey {
    registry_id: u64,
    index: u64,
}

impl PoolKey {
    pub(crate) fn new(registry_id: u64, index: u64) -> Self {
        Self { registry_id, index }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool {}.{}", self.registry_id, self.index)
    }
}
