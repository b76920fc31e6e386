#![cfg_attr(
    test,
    allow(
        clippy::struct_field_names,
        reason = "false positive from automock generated code"
    )
)]

use std::fmt::Debug;
use std::hash::Hash;

/// The game engine that owns the pooled objects.
///
/// Pools never create, destroy or toggle objects themselves. Every such action is delegated
/// to the host, which is the engine (or an adapter around the engine's world/scene) that the
/// pooling logic plugs into. All calls happen synchronously on the caller's thread, within
/// whatever frame update the caller is currently executing.
///
/// # Contract
///
/// * [`instantiate()`][Self::instantiate] returns a new object with its own identity. The new
///   object starts in the same activation state the prototype is in by default, i.e. the value
///   [`is_active_by_default()`][Self::is_active_by_default] reports for the prototype.
/// * [`is_alive()`][Self::is_alive] reports `false` for any object that has been destroyed,
///   whether by [`destroy()`][Self::destroy] or by some engine mechanism the pools know
///   nothing about.
/// * [`set_active()`][Self::set_active] and [`destroy()`][Self::destroy] are only called for
///   objects the caller handed to the pooling API or that a pool instantiated.
#[cfg_attr(test, mockall::automock(type Object = u32;))]
pub trait Host {
    /// Handle to an engine object. Handles are compared by identity, never by state.
    type Object: Copy + Eq + Hash + Debug;

    /// Creates a copy of `prototype`, attached under `parent` if one is given.
    fn instantiate(
        &mut self,
        prototype: Self::Object,
        parent: Option<Self::Object>,
    ) -> Self::Object;

    /// Destroys the object, releasing all engine-side resources associated with it.
    fn destroy(&mut self, object: Self::Object);

    /// Toggles whether the object participates in rendering and frame updates.
    fn set_active(&mut self, object: Self::Object, active: bool);

    /// Whether copies of the prototype start out active.
    fn is_active_by_default(&self, prototype: Self::Object) -> bool;

    /// Whether the object still exists in the engine.
    fn is_alive(&self, object: Self::Object) -> bool;
}
