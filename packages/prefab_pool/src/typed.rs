use std::any::type_name;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::{Host, PoolKey, PoolRegistry};

/// A typed handle to an engine object, such as a `Bullet` newtype around an entity handle.
///
/// Implementing this lets callers use [`PoolRegistry::typed()`] to work with their own handle
/// types instead of raw engine objects. The conversion must be lossless in both directions.
pub trait Component: Copy {
    /// The engine object type the component wraps.
    type Object;

    /// The engine object this component is attached to.
    fn object(self) -> Self::Object;

    /// Wraps an engine object known to carry this component.
    fn from_object(object: Self::Object) -> Self;
}

/// A view of a [`PoolRegistry`] that accepts and returns typed component handles.
///
/// Every method converts to the underlying engine object, forwards to the registry method of
/// the same name and converts the result back. There is no pooling logic here.
///
/// # Example
///
/// ```rust
/// use prefab_pool::fake::{FakeHost, FakeObject};
/// use prefab_pool::{Component, PoolRegistry};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Bullet(FakeObject);
///
/// impl Component for Bullet {
///     type Object = FakeObject;
///
///     fn object(self) -> FakeObject {
///         self.0
///     }
///
///     fn from_object(object: FakeObject) -> Self {
///         Self(object)
///     }
/// }
///
/// let mut host = FakeHost::new();
/// let prototype = Bullet(host.spawn(false));
///
/// let mut registry = PoolRegistry::new();
/// let key = registry.typed::<Bullet>().create_pool(&mut host, prototype, 8, None);
///
/// let bullet: Bullet = registry.typed().acquire(&mut host, prototype);
/// assert_eq!(registry.owner_of(bullet.0), Some(key));
///
/// registry.typed().release(&mut host, bullet);
/// assert_eq!(registry.idle_count(key), Some(8));
/// # registry.shutdown(&mut host);
/// ```
pub struct Typed<'r, O, C> {
    registry: &'r mut PoolRegistry<O>,

    _component: PhantomData<fn() -> C>,
}

impl<O, C> Debug for Typed<'_, O, C>
where
    O: Debug,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("component_type", &format_args!("{}", type_name::<C>()))
            .field("registry", &self.registry)
            .finish()
    }
}

impl<O> PoolRegistry<O>
where
    O: Copy + Eq + Hash + Debug,
{
    /// Borrows the registry as a view that works with component handles of type `C`.
    pub fn typed<C>(&mut self) -> Typed<'_, O, C>
    where
        C: Component<Object = O>,
    {
        Typed {
            registry: self,
            _component: PhantomData,
        }
    }
}

impl<O, C> Typed<'_, O, C>
where
    O: Copy + Eq + Hash + Debug,
    C: Component<Object = O>,
{
    /// See [`PoolRegistry::create_pool()`].
    pub fn create_pool<H>(
        &mut self,
        host: &mut H,
        prototype: C,
        capacity: usize,
        parent: Option<O>,
    ) -> PoolKey
    where
        H: Host<Object = O>,
    {
        self.registry
            .create_pool(host, prototype.object(), capacity, parent)
    }

    /// See [`PoolRegistry::acquire()`].
    pub fn acquire<H>(&mut self, host: &mut H, origin: C) -> C
    where
        H: Host<Object = O>,
    {
        C::from_object(self.registry.acquire(host, origin.object()))
    }

    /// See [`PoolRegistry::release()`].
    pub fn release<H>(&mut self, host: &mut H, component: C)
    where
        H: Host<Object = O>,
    {
        self.registry.release(host, component.object());
    }

    /// See [`PoolRegistry::destroy()`].
    pub fn destroy<H>(&mut self, host: &mut H, component: C)
    where
        H: Host<Object = O>,
    {
        self.registry.destroy(host, component.object());
    }

    /// See [`PoolRegistry::destroy_after()`].
    pub fn destroy_after(&mut self, component: C, delay: Duration) {
        self.registry.destroy_after(component.object(), delay);
    }

    /// See [`PoolRegistry::key_of()`].
    #[must_use]
    pub fn key_of(&self, prototype: C) -> Option<PoolKey> {
        self.registry.key_of(prototype.object())
    }
}
