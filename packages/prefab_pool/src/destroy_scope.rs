/// Selects which instances of a pool are destroyed by a partial teardown.
///
/// # Examples
///
/// ```
/// use prefab_pool::{DestroyScope, PoolRegistry};
/// use prefab_pool::fake::FakeHost;
///
/// let mut host = FakeHost::new();
/// let prototype = host.spawn(false);
///
/// let mut registry = PoolRegistry::new();
/// let key = registry.create_pool(&mut host, prototype, 4, None);
/// let _in_use = registry.acquire(&mut host, prototype);
///
/// // Trim the idle supply but keep the instance that is in use.
/// registry.destroy_instances(&mut host, key, DestroyScope::Idle);
///
/// assert_eq!(registry.active_count(key), Some(1));
/// assert_eq!(registry.idle_count(key), Some(0));
/// # registry.shutdown(&mut host);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DestroyScope {
    /// Destroys the instances that are waiting in the pool to be handed out. This is the default.
    #[default]
    Idle,

    /// Destroys the instances that are currently handed out to callers.
    Active,

    /// Destroys every instance the pool is tracking, regardless of activity.
    All,
}

impl DestroyScope {
    pub(crate) const fn includes_idle(self) -> bool {
        matches!(self, Self::Idle | Self::All)
    }

    pub(crate) const fn includes_active(self) -> bool {
        matches!(self, Self::Active | Self::All)
    }
}
