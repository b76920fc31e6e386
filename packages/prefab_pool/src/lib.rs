#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Recycles game-engine objects instead of repeatedly creating and destroying them.
//!
//! Spawning and despawning objects such as bullets, particles or enemies every frame is costly
//! in most engines. This package keeps a [`Pool`] of pre-created instances per prototype and
//! hands them out on demand, deactivating returned instances instead of destroying them.
//!
//! The engine itself is represented by the [`Host`] trait. Pools never own engine objects or
//! the engine; every call that creates, destroys or toggles an object takes the host as a
//! parameter. All operations are synchronous and meant to be called from the engine's frame
//! update on a single thread.
//!
//! # Pools and the registry
//!
//! * [`Pool`] recycles instances of one prototype. It tracks which instances are handed out
//!   (active) and which are waiting to be reused (idle) and instantiates new copies when it
//!   runs out of idle ones.
//! * [`PoolRegistry`] holds one pool per prototype, identified by a [`PoolKey`]. Its
//!   operations take any object, work out which pool it belongs to and fall back to plain
//!   create/deactivate/destroy calls for objects that are not pooled.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use prefab_pool::PoolRegistry;
//! use prefab_pool::fake::FakeHost;
//!
//! let mut host = FakeHost::new();
//! let enemy = host.spawn(false);
//!
//! let mut registry = PoolRegistry::new();
//! let key = registry.create_pool(&mut host, enemy, 3, None);
//! assert_eq!(registry.idle_count(key), Some(3));
//!
//! // Three enemies come out of the pool, the fourth one is created on demand.
//! let wave: Vec<_> = (0..4).map(|_| registry.acquire(&mut host, enemy)).collect();
//! assert_eq!(registry.active_count(key), Some(4));
//! assert_eq!(registry.idle_count(key), Some(0));
//!
//! // Returning an enemy makes it available for the next wave.
//! registry.release(&mut host, wave[0]);
//! assert_eq!(registry.active_count(key), Some(3));
//! assert_eq!(registry.idle_count(key), Some(1));
//!
//! // Enemies can also be scheduled to go back after some frame time has passed.
//! registry.destroy_after(wave[1], Duration::from_secs(1));
//! registry.update(&mut host, Duration::from_secs(1));
//! assert_eq!(registry.idle_count(key), Some(2));
//!
//! registry.shutdown(&mut host);
//! ```
//!
//! # Objects without a pool
//!
//! The registry operations accept objects that have no pool. Such objects are instantiated,
//! deactivated or destroyed directly through the host, so call sites work the same whether or
//! not pooling was set up. The [`try_acquire()`][PoolRegistry::try_acquire] and
//! [`try_release()`][PoolRegistry::try_release] operations report such situations as an
//! [`Error`] instead.
//!
//! # Logging
//!
//! Pool lifecycle events are emitted via `tracing` at debug level and per-object operations at
//! trace level. No subscriber is installed by this package.

mod builder;
mod destroy_scope;
mod error;
pub mod fake;
mod host;
mod key;
mod pool;
mod registry;
mod schedule;
mod typed;

pub use builder::*;
pub use destroy_scope::*;
pub use error::*;
pub use host::Host;
#[cfg(test)]
pub(crate) use host::MockHost;
pub use key::PoolKey;
pub use pool::Pool;
pub use registry::PoolRegistry;
pub use typed::{Component, Typed};
