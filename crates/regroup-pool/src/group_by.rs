//! The group-by entry point.

use regroup_core::{GroupError, KeyAccessor, Record};

use crate::pool::Grouping;
use crate::registry::PoolRegistry;

/// Group `records` by `key`, memoized under `memo`.
///
/// Resolves the pool for `memo` in `registry` (creating it on first use)
/// and runs it over the full current collection. Passing `memo = None`
/// groups through a throwaway pool, so no group identity carries over to
/// later calls. The returned [`Grouping`] borrows that pool, so it is held
/// by the registry until the next unmemoized call; drop it early with
/// [`PoolRegistry::release_scratch`].
///
/// A memoized computed key must be passed as the same accessor (or a clone
/// of it) on every call; a freshly built closure is a different grouping.
///
/// ```
/// use regroup_core::KeyValue;
/// use regroup_pool::{group_by, PoolRegistry};
/// use std::collections::HashMap;
///
/// fn person(name: &str, town: &str) -> HashMap<String, String> {
///     HashMap::from([
///         ("name".to_owned(), name.to_owned()),
///         ("homeTown".to_owned(), town.to_owned()),
///     ])
/// }
///
/// let mut registry = PoolRegistry::new();
/// let people = vec![person("Bob", "NYC"), person("Sam", "London"), person("Alice", "NYC")];
/// let towns = group_by(&mut registry, people, "homeTown", Some("peopleByTown")).unwrap();
///
/// assert_eq!(towns.len(), 2);
/// assert_eq!(towns[0].get("homeTown"), Some(&KeyValue::from("NYC")));
/// assert_eq!(towns[0].items().len(), 2);
/// ```
///
/// # Errors
///
/// See [`PoolRegistry::resolve`] and [`GroupPool::run`](crate::GroupPool::run).
pub fn group_by<'r, R, I, A>(
    registry: &'r mut PoolRegistry<R>,
    records: I,
    key: A,
    memo: Option<&str>,
) -> Result<Grouping<'r, R>, GroupError>
where
    R: Record,
    I: IntoIterator<Item = R>,
    A: Into<KeyAccessor<R>>,
{
    registry.resolve(memo, key)?.run(records)
}

impl<R: Record> PoolRegistry<R> {
    /// Method form of [`group_by`].
    pub fn group_by<I, A>(
        &mut self,
        records: I,
        key: A,
        memo: Option<&str>,
    ) -> Result<Grouping<'_, R>, GroupError>
    where
        I: IntoIterator<Item = R>,
        A: Into<KeyAccessor<R>>,
    {
        group_by(self, records, key, memo)
    }
}
