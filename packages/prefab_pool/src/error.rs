use thiserror::Error;

use crate::PoolKey;

/// Errors reported by the strict, key-based registry operations.
///
/// The lenient operations (e.g. [`PoolRegistry::acquire()`][crate::PoolRegistry::acquire])
/// never fail. They fall back to unpooled behavior instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The registry has no pool for the key. The pool was destroyed, or the key was issued
    /// by a different registry.
    #[error("no pool is registered for {key}")]
    UnknownPool {
        /// The key that could not be resolved.
        key: PoolKey,
    },

    /// The object was returned to a pool that did not have it in its active set. This happens
    /// on double release or when returning an object that belongs to a different pool.
    ///
    /// The object has still been deactivated.
    #[error("object returned to {key} was not handed out by that pool")]
    NotReleased {
        /// The pool the object was returned to.
        key: PoolKey,
    },
}

/// A specialized `Result` type for registry operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn messages_name_the_pool() {
        let key = PoolKey::new(5, 1);

        assert_eq!(
            Error::UnknownPool { key }.to_string(),
            "no pool is registered for pool 5.1"
        );
        assert_eq!(
            Error::NotReleased { key }.to_string(),
            "object returned to pool 5.1 was not handed out by that pool"
        );
    }
}
