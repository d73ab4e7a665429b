//! Memoizing pool registry.
//!
//! A [`PoolRegistry`] maps memoization identifiers to [`GroupPool`]s. It is
//! an ordinary value owned by the embedding application (one per render
//! context, component tree, etc.) rather than process-global state, and it
//! can be torn down with [`remove`](PoolRegistry::remove) or
//! [`clear`](PoolRegistry::clear).
//!
//! A memo id is bound to the grouping it was first used with. Asking for
//! the same id with a different grouping is a programmer error and fails
//! with [`GroupError::ConfigurationConflict`] instead of silently
//! regrouping.

use indexmap::IndexMap;
use regroup_core::{GroupError, KeyAccessor, MemoId};

use crate::config::RegistryConfig;
use crate::pool::GroupPool;

/// Registry of group pools keyed by [`MemoId`].
pub struct PoolRegistry<R> {
    pools: IndexMap<MemoId, GroupPool<R>>,
    /// Pool for the latest unmemoized call. Replaced on every such call,
    /// dropped by [`release_scratch`](PoolRegistry::release_scratch).
    scratch: Option<GroupPool<R>>,
    config: RegistryConfig,
}

impl<R> PoolRegistry<R> {
    /// Create an empty registry with the default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            pools: IndexMap::new(),
            scratch: None,
            config,
        }
    }

    /// The registry's config.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Find or create the pool for `memo`.
    ///
    /// - `None`: a fresh pool that is not registered; it is replaced by
    ///   the next unmemoized call, so no group identity carries over. The
    ///   pool and its records stay in the registry until then, or until
    ///   [`release_scratch`](Self::release_scratch).
    /// - An unknown id: a new pool grouping by `accessor` is registered.
    /// - A known id: the registered pool, provided `accessor` is the same
    ///   grouping (see [`KeyAccessor::same_grouping`]). A computed accessor
    ///   must be a clone of the registered one.
    ///
    /// # Errors
    ///
    /// - [`GroupError::ConfigurationConflict`] if `memo` is registered with
    ///   a different grouping.
    /// - [`GroupError::RegistryFull`] if a new pool would exceed
    ///   [`RegistryConfig::max_pools`].
    pub fn resolve(
        &mut self,
        memo: Option<&str>,
        accessor: impl Into<KeyAccessor<R>>,
    ) -> Result<&mut GroupPool<R>, GroupError> {
        let accessor = accessor.into();
        let Some(memo) = memo else {
            let pool = GroupPool::with_config(accessor, self.config.pool);
            return Ok(self.scratch.insert(pool));
        };

        if let Some(index) = self.pools.get_index_of(memo) {
            let pool = &mut self.pools[index];
            if !pool.accessor().same_grouping(&accessor) {
                let registered = pool.accessor().to_string();
                let requested = accessor.to_string();
                tracing::warn!(
                    memo_id = memo,
                    registered = %registered,
                    requested = %requested,
                    "memo id reused for a different grouping"
                );
                return Err(GroupError::ConfigurationConflict {
                    memo_id: memo.to_owned(),
                    registered,
                    requested,
                });
            }
            return Ok(pool);
        }

        if let Some(capacity) = self.config.max_pools {
            if self.pools.len() >= capacity {
                tracing::warn!(memo_id = memo, capacity, "pool registry full");
                return Err(GroupError::RegistryFull { capacity });
            }
        }

        tracing::debug!(
            memo_id = memo,
            key_name = accessor.name(),
            pools = self.pools.len() + 1,
            "registering group pool"
        );
        let pool = GroupPool::with_config(accessor, self.config.pool);
        Ok(self.pools.entry(MemoId::from(memo)).or_insert(pool))
    }

    /// Number of registered pools (the scratch pool is not counted).
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no pool is registered.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Whether a pool is registered under `memo`.
    pub fn contains(&self, memo: &str) -> bool {
        self.pools.contains_key(memo)
    }

    /// The pool registered under `memo`.
    pub fn get(&self, memo: &str) -> Option<&GroupPool<R>> {
        self.pools.get(memo)
    }

    /// Mutable access to the pool registered under `memo`.
    pub fn get_mut(&mut self, memo: &str) -> Option<&mut GroupPool<R>> {
        self.pools.get_mut(memo)
    }

    /// Registered memo ids in registration order.
    pub fn memo_ids(&self) -> impl Iterator<Item = &MemoId> {
        self.pools.keys()
    }

    /// Unregister and return the pool for `memo`. The next call with that
    /// id starts from scratch and may use a different grouping.
    pub fn remove(&mut self, memo: &str) -> Option<GroupPool<R>> {
        let pool = self.pools.shift_remove(memo)?;
        tracing::debug!(
            memo_id = memo,
            key_name = pool.key_name(),
            groups = pool.len(),
            "removed group pool"
        );
        Some(pool)
    }

    /// Drop the pool left behind by the latest unmemoized call, returning
    /// it if there was one.
    pub fn release_scratch(&mut self) -> Option<GroupPool<R>> {
        let pool = self.scratch.take()?;
        tracing::trace!(groups = pool.len(), "released scratch pool");
        Some(pool)
    }

    /// Whether an unmemoized call's pool is still held.
    pub fn has_scratch(&self) -> bool {
        self.scratch.is_some()
    }

    /// Drop every pool, including the scratch pool.
    pub fn clear(&mut self) {
        tracing::debug!(pools = self.pools.len(), "clearing pool registry");
        self.pools.clear();
        self.scratch = None;
    }
}

impl<R> Default for PoolRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for PoolRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
