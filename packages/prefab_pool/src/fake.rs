//! An in-memory [`Host`] for tests and examples.
//!
//! [`FakeHost`] keeps a table of objects with their activation state and their relations to
//! the prototype and parent they were created with. It records how many objects were
//! instantiated and destroyed so tests can verify that pooling actually avoids churn.

use std::fmt;

use foldhash::{HashMap, HashMapExt};

use crate::Host;

/// Handle to an object in a [`FakeHost`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FakeObject(u32);

impl FakeObject {
    /// The numeric identity of the object, unique within its host.
    #[must_use]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FakeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}", self.0)
    }
}

#[derive(Debug)]
struct FakeEntity {
    active: bool,
    prototype: Option<FakeObject>,
    parent: Option<FakeObject>,
}

/// Simulated engine world that hands out [`FakeObject`] handles.
///
/// Copies start in whatever activation state their prototype is in at the time of copying.
///
/// # Example
///
/// ```rust
/// use prefab_pool::Host;
/// use prefab_pool::fake::FakeHost;
///
/// let mut host = FakeHost::new();
/// let prototype = host.spawn(true);
///
/// let copy = host.instantiate(prototype, None);
/// assert!(host.is_active(copy));
/// assert_eq!(host.prototype_of(copy), Some(prototype));
///
/// host.destroy(copy);
/// assert!(!host.is_alive(copy));
/// assert_eq!(host.instantiated_count(), 1);
/// assert_eq!(host.destroyed_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FakeHost {
    entities: HashMap<FakeObject, FakeEntity>,
    next_id: u32,
    instantiated: usize,
    destroyed: usize,
}

impl FakeHost {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 0,
            instantiated: 0,
            destroyed: 0,
        }
    }

    /// Creates a standalone object, typically used as a prototype.
    ///
    /// Spawned objects do not count towards [`instantiated_count()`][Self::instantiated_count].
    pub fn spawn(&mut self, active: bool) -> FakeObject {
        self.insert(FakeEntity {
            active,
            prototype: None,
            parent: None,
        })
    }

    /// Whether the object exists and is active. Destroyed objects are never active.
    #[must_use]
    pub fn is_active(&self, object: FakeObject) -> bool {
        self.entities
            .get(&object)
            .is_some_and(|entity| entity.active)
    }

    /// The prototype the object was copied from, if it was created by copying.
    #[must_use]
    pub fn prototype_of(&self, object: FakeObject) -> Option<FakeObject> {
        self.entities.get(&object).and_then(|entity| entity.prototype)
    }

    /// The parent the object was attached under when it was created.
    #[must_use]
    pub fn parent_of(&self, object: FakeObject) -> Option<FakeObject> {
        self.entities.get(&object).and_then(|entity| entity.parent)
    }

    /// How many copies have been created via [`Host::instantiate()`].
    #[must_use]
    pub fn instantiated_count(&self) -> usize {
        self.instantiated
    }

    /// How many objects have been destroyed via [`Host::destroy()`].
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// How many objects currently exist.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    fn insert(&mut self, entity: FakeEntity) -> FakeObject {
        let object = FakeObject(self.next_id);

        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("fake host ran out of object identities");

        self.entities.insert(object, entity);
        object
    }
}

impl Host for FakeHost {
    type Object = FakeObject;

    fn instantiate(&mut self, prototype: FakeObject, parent: Option<FakeObject>) -> FakeObject {
        let active = self
            .entities
            .get(&prototype)
            .map(|entity| entity.active)
            .expect("cannot copy an object that does not exist");

        self.instantiated = self.instantiated.saturating_add(1);

        self.insert(FakeEntity {
            active,
            prototype: Some(prototype),
            parent,
        })
    }

    fn destroy(&mut self, object: FakeObject) {
        if self.entities.remove(&object).is_some() {
            self.destroyed = self.destroyed.saturating_add(1);
        }
    }

    fn set_active(&mut self, object: FakeObject, active: bool) {
        if let Some(entity) = self.entities.get_mut(&object) {
            entity.active = active;
        }
    }

    fn is_active_by_default(&self, prototype: FakeObject) -> bool {
        self.is_active(prototype)
    }

    fn is_alive(&self, object: FakeObject) -> bool {
        self.entities.contains_key(&object)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn spawned_objects_have_unique_identities() {
        let mut host = FakeHost::new();

        let a = host.spawn(false);
        let b = host.spawn(false);

        assert_ne!(a, b);
        assert_eq!(host.live_count(), 2);
        assert_eq!(host.instantiated_count(), 0);
    }

    #[test]
    fn copies_inherit_current_activation_state() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);

        let cold = host.instantiate(prototype, None);
        host.set_active(prototype, true);
        let hot = host.instantiate(prototype, None);

        assert!(!host.is_active(cold));
        assert!(host.is_active(hot));
    }

    #[test]
    fn copies_remember_parent() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        let parent = host.spawn(true);

        let copy = host.instantiate(prototype, Some(parent));

        assert_eq!(host.parent_of(copy), Some(parent));
        assert_eq!(host.parent_of(prototype), None);
    }

    #[test]
    fn destroying_twice_counts_once() {
        let mut host = FakeHost::new();
        let object = host.spawn(true);

        host.destroy(object);
        host.destroy(object);

        assert_eq!(host.destroyed_count(), 1);
        assert!(!host.is_active(object));
        assert!(!host.is_alive(object));
    }

    #[test]
    fn set_active_on_destroyed_object_is_ignored() {
        let mut host = FakeHost::new();
        let object = host.spawn(false);
        host.destroy(object);

        host.set_active(object, true);

        assert!(!host.is_active(object));
    }

    #[test]
    #[should_panic]
    fn copying_destroyed_object_panics() {
        let mut host = FakeHost::new();
        let prototype = host.spawn(false);
        host.destroy(prototype);

        host.instantiate(prototype, None);
    }

    #[test]
    fn display_shows_identity() {
        let mut host = FakeHost::new();
        let object = host.spawn(false);

        assert_eq!(object.to_string(), format!("object {}", object.id()));
    }
}
