use std::any::type_name;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::PoolRegistry;

/// Builder for creating an instance of [`PoolRegistry`].
///
/// You only need to use this builder if you want to customize the registry configuration.
/// The default configuration used by [`PoolRegistry::new()`][1] is sufficient for most use
/// cases.
///
/// # Examples
///
/// ```
/// use prefab_pool::PoolRegistry;
/// use prefab_pool::fake::FakeObject;
///
/// let registry = PoolRegistry::<FakeObject>::builder()
///     .cancel_pending_on_acquire(false)
///     .build();
/// ```
///
/// [1]: PoolRegistry::new
#[must_use]
pub struct PoolRegistryBuilder<O> {
    cancel_pending_on_acquire: bool,

    _object: PhantomData<O>,
}

impl<O> Debug for PoolRegistryBuilder<O> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistryBuilder")
            .field("object_type", &format_args!("{}", type_name::<O>()))
            .field("cancel_pending_on_acquire", &self.cancel_pending_on_acquire)
            .finish()
    }
}

impl<O> PoolRegistryBuilder<O>
where
    O: Copy + Eq + Hash + Debug,
{
    pub(crate) fn new() -> Self {
        Self {
            cancel_pending_on_acquire: true,
            _object: PhantomData,
        }
    }

    /// Whether handing out an instance cancels a delayed destroy still pending for it.
    ///
    /// When enabled (the default), an instance that was scheduled for delayed destruction,
    /// returned to its pool some other way and then handed out again is safe from the stale
    /// schedule. When disabled, the stale schedule still fires and returns the instance to its
    /// pool while the new holder may still be using it.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefab_pool::PoolRegistry;
    /// use prefab_pool::fake::FakeObject;
    ///
    /// let registry = PoolRegistry::<FakeObject>::builder()
    ///     .cancel_pending_on_acquire(true)
    ///     .build();
    /// ```
    pub fn cancel_pending_on_acquire(mut self, cancel: bool) -> Self {
        self.cancel_pending_on_acquire = cancel;
        self
    }

    /// Builds the registry with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefab_pool::PoolRegistry;
    /// use prefab_pool::fake::FakeObject;
    ///
    /// let registry = PoolRegistry::<FakeObject>::builder().build();
    /// assert_eq!(registry.pool_count(), 0);
    /// ```
    #[must_use]
    pub fn build(self) -> PoolRegistry<O> {
        PoolRegistry::new_inner(self.cancel_pending_on_acquire)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn cancels_pending_on_acquire_by_default() {
        let builder = PoolRegistryBuilder::<u32>::new();

        assert!(builder.cancel_pending_on_acquire);
    }

    #[test]
    fn debug_names_object_type() {
        let builder = PoolRegistryBuilder::<u32>::new().cancel_pending_on_acquire(false);

        let output = format!("{builder:?}");

        assert!(output.contains("u32"));
        assert!(output.contains("cancel_pending_on_acquire: false"));
    }
}
