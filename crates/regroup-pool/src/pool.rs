//! Generation-tagged group pool.
//!
//! [`GroupPool`] owns the groups of one grouping context and implements the
//! reuse/eviction algorithm. Every [`run`](GroupPool::run) produces a new
//! generation:
//!
//! - a key seen for the first time gets a freshly allocated [`Group`];
//! - a key that survives from the previous run gets its old `Group` back,
//!   with its members replaced (same [`GroupId`]);
//! - a key already touched earlier in the same run just accumulates;
//! - groups not touched by the run are evicted.
//!
//! The pool's map is kept in output order. Groups touched by the current
//! run are swapped into a growing prefix as they are first sighted, so
//! once the input is exhausted the prefix is the result (in first-sighting
//! order) and the suffix is exactly the stale set to evict.

use indexmap::IndexMap;
use regroup_core::{Generation, GroupError, GroupId, KeyAccessor, KeyValue, Record};

use crate::config::{MissingKeyPolicy, PoolConfig};
use crate::group::Group;

/// The groups of one grouping context plus its generation counter.
///
/// Created by [`PoolRegistry::resolve`](crate::PoolRegistry::resolve), or
/// directly by callers that own their pool.
///
/// # Invariants
///
/// - The accessor (and hence [`key_name`](Self::key_name)) never changes.
/// - Every group's generation is `<=` the pool's generation.
/// - At most one group exists per key value.
pub struct GroupPool<R> {
    accessor: KeyAccessor<R>,
    generation: Generation,
    groups: IndexMap<KeyValue, Group<R>>,
    config: PoolConfig,
}

/// Per-run counters, reported through `tracing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RunStats {
    created: usize,
    reused: usize,
    evicted: usize,
}

impl<R> GroupPool<R> {
    /// Create an empty pool with the default config.
    pub fn new(accessor: impl Into<KeyAccessor<R>>) -> Self {
        Self::with_config(accessor, PoolConfig::default())
    }

    /// Create an empty pool.
    pub fn with_config(accessor: impl Into<KeyAccessor<R>>, config: PoolConfig) -> Self {
        Self {
            accessor: accessor.into(),
            generation: Generation::ZERO,
            groups: IndexMap::with_capacity(config.initial_capacity),
            config,
        }
    }

    /// The accessor this pool groups by.
    pub fn accessor(&self) -> &KeyAccessor<R> {
        &self.accessor
    }

    /// Name of the grouping.
    pub fn key_name(&self) -> &str {
        self.accessor.name()
    }

    /// The pool's config.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Generation produced by the most recent run (0 before the first).
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the pool holds no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The live group for `key`, if any.
    pub fn group(&self, key: &KeyValue) -> Option<&Group<R>> {
        self.groups.get(key)
    }

    /// The result of the most recent run.
    pub fn groups(&self) -> Grouping<'_, R> {
        Grouping { map: &self.groups }
    }

    /// Drop every group. The generation counter is kept, so ids handed out
    /// before the reset are never matched again.
    pub fn reset(&mut self) {
        tracing::debug!(
            key_name = self.accessor.name(),
            dropped = self.groups.len(),
            "group pool reset"
        );
        self.groups.clear();
    }
}

impl<R: Record> GroupPool<R> {
    /// Group `records`, reusing groups from the previous run where the key
    /// is still present.
    ///
    /// `records` is the full current collection, not a diff. Returns the
    /// groups in order of each key's first occurrence in `records`.
    ///
    /// # Errors
    ///
    /// [`GroupError::MissingKey`] if the pool rejects missing keys and a
    /// record has none. The pool is left exactly as it was.
    pub fn run<I>(&mut self, records: I) -> Result<Grouping<'_, R>, GroupError>
    where
        I: IntoIterator<Item = R>,
    {
        let keyed = self.extract_keys(records)?;
        let next = self.generation.next();
        let mut stats = RunStats::default();

        // Groups at indices < `touched` belong to this run, in
        // first-sighting order. Everything at or after it is stale.
        let mut touched = 0;
        for (key, record) in keyed {
            match self.groups.get_index_of(&key) {
                None => {
                    let group = Group::new(self.accessor.name_arc(), key.clone(), record, next);
                    let (index, _) = self.groups.insert_full(key, group);
                    self.groups.swap_indices(index, touched);
                    touched += 1;
                    stats.created += 1;
                }
                Some(index) => {
                    let group = &mut self.groups[index];
                    if group.generation() < next {
                        group.reset(record, next);
                        self.groups.swap_indices(index, touched);
                        touched += 1;
                        stats.reused += 1;
                    } else {
                        group.push(record);
                    }
                }
            }
        }

        stats.evicted = self.sweep(touched, next);
        self.generation = next;

        tracing::trace!(
            key_name = self.accessor.name(),
            generation = next.0,
            groups = touched,
            created = stats.created,
            reused = stats.reused,
            evicted = stats.evicted,
            "group pool run"
        );

        Ok(self.groups())
    }

    /// Extract every key before touching any group, so a rejected record
    /// leaves the pool unchanged.
    fn extract_keys<I>(&self, records: I) -> Result<Vec<(KeyValue, R)>, GroupError>
    where
        I: IntoIterator<Item = R>,
    {
        let records = records.into_iter();
        let mut keyed = Vec::with_capacity(records.size_hint().0);
        for (position, record) in records.enumerate() {
            let key = self.accessor.extract(&record);
            if key.is_absent() && self.config.missing_key == MissingKeyPolicy::Reject {
                tracing::warn!(
                    key_name = self.accessor.name(),
                    position,
                    "rejecting record without grouping key"
                );
                return Err(GroupError::MissingKey {
                    key_name: self.accessor.name().to_owned(),
                    position,
                });
            }
            keyed.push((key, record));
        }
        Ok(keyed)
    }

    /// Evict every group not touched by generation `next`. Returns the
    /// number of evicted groups.
    fn sweep(&mut self, touched: usize, next: Generation) -> usize {
        debug_assert!(self
            .groups
            .values()
            .skip(touched)
            .all(|g| g.generation() < next));
        let evicted = self.groups.len() - touched;
        self.groups.truncate(touched);
        evicted
    }
}

impl<R> std::fmt::Debug for GroupPool<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPool")
            .field("accessor", &self.accessor)
            .field("generation", &self.generation)
            .field("groups", &self.groups.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Ordered result of a run: a borrowed view of the pool's groups.
///
/// Valid until the pool is next mutated.
pub struct Grouping<'a, R> {
    map: &'a IndexMap<KeyValue, Group<R>>,
}

impl<'a, R> Grouping<'a, R> {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the input was empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The group at `index`, in first-sighting order.
    pub fn get(&self, index: usize) -> Option<&'a Group<R>> {
        self.map.get_index(index).map(|(_, g)| g)
    }

    /// The group for `key`.
    pub fn find(&self, key: &KeyValue) -> Option<&'a Group<R>> {
        self.map.get(key)
    }

    /// Iterate groups in first-sighting order.
    pub fn iter(&self) -> indexmap::map::Values<'a, KeyValue, Group<R>> {
        self.map.values()
    }

    /// Group keys in order.
    pub fn keys(&self) -> indexmap::map::Keys<'a, KeyValue, Group<R>> {
        self.map.keys()
    }

    /// Group ids in order.
    pub fn ids(&self) -> impl Iterator<Item = GroupId> + 'a {
        self.map.values().map(Group::id)
    }
}

impl<R> Clone for Grouping<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Grouping<'_, R> {}

impl<R> std::ops::Index<usize> for Grouping<'_, R> {
    type Output = Group<R>;

    fn index(&self, index: usize) -> &Group<R> {
        &self.map[index]
    }
}

impl<'a, R> IntoIterator for Grouping<'a, R> {
    type Item = &'a Group<R>;
    type IntoIter = indexmap::map::Values<'a, KeyValue, Group<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.values()
    }
}

impl<'a, R> IntoIterator for &Grouping<'a, R> {
    type Item = &'a Group<R>;
    type IntoIter = indexmap::map::Values<'a, KeyValue, Group<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.values()
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Grouping<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.map.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regroup_test_utils::{men, names, people, person, Person};

    fn towns<R>(grouping: Grouping<'_, R>) -> Vec<String> {
        grouping.keys().map(|k| k.to_string()).collect()
    }

    fn town_names(grouping: Grouping<'_, Person>, town: &str) -> Vec<&'static str> {
        grouping
            .find(&KeyValue::from(town))
            .map(|g| names(g.items()))
            .unwrap_or_default()
    }

    // ── Single run ──────────────────────────────────────────

    #[test]
    fn empty_input_yields_no_groups() {
        let mut pool = GroupPool::<Person>::new("homeTown");
        let result = pool.run(Vec::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(pool.generation(), Generation(1));
    }

    #[test]
    fn groups_by_home_town_in_first_seen_order() {
        let mut pool = GroupPool::new("homeTown");
        let result = pool.run(people()).unwrap();

        assert_eq!(
            towns(result),
            ["New York City", "London", "San Francisco"]
        );
        assert_eq!(town_names(result, "New York City"), ["Bob", "Alice"]);
        assert_eq!(town_names(result, "London"), ["Sam", "Alex"]);
        assert_eq!(town_names(result, "San Francisco"), ["Dave"]);
    }

    #[test]
    fn groups_expose_key_under_grouping_name() {
        let mut pool = GroupPool::new("homeTown");
        let result = pool.run(people()).unwrap();
        for group in result {
            assert_eq!(group.key_name(), "homeTown");
            assert_eq!(group.get("homeTown"), Some(group.key()));
            assert!(!group.is_empty());
        }
    }

    #[test]
    fn concrete_three_record_scenario() {
        let mut pool = GroupPool::new("homeTown");
        let input = vec![
            person("Bob", "NYC"),
            person("Sam", "London"),
            person("Alice", "NYC"),
        ];
        let result = pool.run(input).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].key(), &KeyValue::from("NYC"));
        assert_eq!(names(result[0].items()), ["Bob", "Alice"]);
        assert_eq!(result[1].key(), &KeyValue::from("London"));
        assert_eq!(names(result[1].items()), ["Sam"]);
    }

    #[test]
    fn misspelled_field_collapses_into_absent_group() {
        let mut pool = GroupPool::new("hoemTown");
        let result = pool.run(people()).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].key().is_absent());
        assert_eq!(result[0].get("hoemTown"), Some(&KeyValue::Absent));
        assert_eq!(
            names(result[0].items()),
            ["Bob", "Sam", "Alice", "Alex", "Dave"]
        );
    }

    #[test]
    fn derived_attribute_groups() {
        let mut pool = GroupPool::new("uptown");
        let result = pool.run(people()).unwrap();
        assert_eq!(town_names(result, "LONDON"), ["Sam", "Alex"]);
    }

    #[test]
    fn computed_accessor_groups() {
        let mut pool = GroupPool::new(KeyAccessor::<Person>::computed("nameLength", |p| {
            KeyValue::from(p.name.len() as i64)
        }));
        let result = pool.run(people()).unwrap();
        let lengths: Vec<_> = result.keys().filter_map(KeyValue::as_int).collect();
        assert_eq!(lengths, [3, 5, 4]);
        assert_eq!(names(result[0].items()), ["Bob", "Sam"]);
    }

    // ── Across runs ─────────────────────────────────────────

    #[test]
    fn surviving_key_keeps_group_id() {
        let mut pool = GroupPool::new("homeTown");
        let first = pool.run(men()).unwrap();
        let london = first.find(&KeyValue::from("London")).unwrap().id();

        let second = pool.run(men()).unwrap();
        assert_eq!(second.find(&KeyValue::from("London")).unwrap().id(), london);
    }

    #[test]
    fn reused_group_members_are_replaced() {
        let mut pool = GroupPool::new("homeTown");
        pool.run(men()).unwrap();

        let result = pool
            .run(vec![person("Dorothy", "London")])
            .unwrap();
        assert_eq!(town_names(result, "London"), ["Dorothy"]);
    }

    #[test]
    fn vanished_keys_are_evicted() {
        let mut pool = GroupPool::new("homeTown");
        let input = vec![
            person("Bob", "NYC"),
            person("Sam", "London"),
            person("Alice", "NYC"),
        ];
        let old_ids: Vec<_> = pool.run(input).unwrap().ids().collect();

        let result = pool.run(vec![person("Dave", "SF")]).unwrap();
        assert_eq!(towns(result), ["SF"]);
        assert_eq!(names(result[0].items()), ["Dave"]);
        assert!(!old_ids.contains(&result[0].id()));

        assert!(pool.group(&KeyValue::from("NYC")).is_none());
        assert!(pool.group(&KeyValue::from("London")).is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn order_follows_current_input_not_previous_run() {
        let mut pool = GroupPool::new("homeTown");
        pool.run(vec![person("Bob", "NYC"), person("Sam", "London")])
            .unwrap();

        let result = pool
            .run(vec![person("Sam", "London"), person("Bob", "NYC")])
            .unwrap();
        assert_eq!(towns(result), ["London", "NYC"]);
    }

    #[test]
    fn evicted_key_that_returns_gets_new_group() {
        let mut pool = GroupPool::new("homeTown");
        let nyc = pool.run(vec![person("Bob", "NYC")]).unwrap()[0].id();
        pool.run(vec![person("Sam", "London")]).unwrap();
        let again = pool.run(vec![person("Bob", "NYC")]).unwrap()[0].id();
        assert_ne!(nyc, again);
    }

    #[test]
    fn mixed_created_reused_and_evicted() {
        let mut pool = GroupPool::new("homeTown");
        let first = pool
            .run(vec![
                person("A", "t1"),
                person("B", "t2"),
                person("C", "t3"),
                person("D", "t4"),
            ])
            .unwrap();
        let t2 = first.find(&KeyValue::from("t2")).unwrap().id();
        let t4 = first.find(&KeyValue::from("t4")).unwrap().id();

        let second = pool
            .run(vec![
                person("E", "t5"),
                person("F", "t4"),
                person("G", "t2"),
                person("H", "t5"),
            ])
            .unwrap();
        assert_eq!(towns(second), ["t5", "t4", "t2"]);
        assert_eq!(second[1].id(), t4);
        assert_eq!(second[2].id(), t2);
        assert_eq!(names(second[0].items()), ["E", "H"]);
        assert!(second.iter().all(|g| g.generation() == Generation(2)));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn groups_reflects_last_run() {
        let mut pool = GroupPool::new("homeTown");
        assert!(pool.groups().is_empty());
        pool.run(men()).unwrap();
        assert_eq!(towns(pool.groups()), ["New York City", "London"]);
    }

    #[test]
    fn reset_forgets_groups() {
        let mut pool = GroupPool::new("homeTown");
        let id = pool.run(men()).unwrap()[0].id();
        pool.reset();
        assert!(pool.is_empty());
        assert_eq!(pool.generation(), Generation(1));
        assert_ne!(pool.run(men()).unwrap()[0].id(), id);
    }

    // ── Missing key policy ──────────────────────────────────

    #[test]
    fn reject_policy_fails_and_leaves_pool_untouched() {
        let mut pool = GroupPool::with_config("homeTown", PoolConfig::new().reject_missing());
        let id = pool.run(men()).unwrap()[0].id();

        let mut input = men();
        input.push(Person::anonymous("Nobody"));
        let err = pool.run(input).unwrap_err();
        assert_eq!(
            err,
            GroupError::MissingKey {
                key_name: "homeTown".into(),
                position: 3,
            }
        );

        assert_eq!(pool.generation(), Generation(1));
        assert_eq!(towns(pool.groups()), ["New York City", "London"]);
        assert_eq!(pool.groups()[0].id(), id);
        assert_eq!(names(pool.groups()[1].items()), ["Sam", "Alex"]);
    }

    #[test]
    fn group_policy_buckets_missing_keys() {
        let mut pool = GroupPool::new("homeTown");
        let result = pool
            .run(vec![
                person("Bob", "NYC"),
                Person::anonymous("Nobody"),
            ])
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[1].key().is_absent());
    }

    // ── Borrowed records ────────────────────────────────────

    #[test]
    fn borrowed_records_group() {
        let everyone = people();
        let mut pool = GroupPool::new("homeTown");
        let result = pool.run(&everyone).unwrap();
        let london = result.find(&KeyValue::from("London")).unwrap();
        assert!(std::ptr::eq(london.items()[0], &everyone[1]));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        type Row = (u32, u8);

        fn record(row: &Row) -> HashMap<String, i64> {
            let mut rec = HashMap::new();
            rec.insert("seq".to_owned(), i64::from(row.0));
            rec.insert("key".to_owned(), i64::from(row.1));
            rec
        }

        fn rows() -> impl Strategy<Value = Vec<Row>> {
            proptest::collection::vec(0u8..8, 0..40).prop_map(|keys| {
                keys.into_iter()
                    .enumerate()
                    .map(|(i, k)| (i as u32, k))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn no_group_is_empty(input in rows()) {
                let mut pool = GroupPool::new("key");
                let result = pool.run(input.iter().map(record)).unwrap();
                prop_assert!(result.iter().all(|g| !g.is_empty()));
                let total: usize = result.iter().map(Group::len).sum();
                prop_assert_eq!(total, input.len());
            }

            #[test]
            fn items_keep_input_order(input in rows()) {
                let mut pool = GroupPool::new("key");
                let result = pool.run(input.iter().map(record)).unwrap();
                for group in result {
                    let seqs: Vec<_> = group.iter().map(|r| r["seq"]).collect();
                    let mut sorted = seqs.clone();
                    sorted.sort_unstable();
                    prop_assert_eq!(seqs, sorted);
                }
            }

            #[test]
            fn groups_ordered_by_first_occurrence(input in rows()) {
                let mut pool = GroupPool::new("key");
                let result = pool.run(input.iter().map(record)).unwrap();
                let mut expected = Vec::new();
                for &(_, k) in &input {
                    let key = KeyValue::from(i64::from(k));
                    if !expected.contains(&key) {
                        expected.push(key);
                    }
                }
                let actual: Vec<_> = result.keys().cloned().collect();
                prop_assert_eq!(actual, expected);
            }

            #[test]
            fn ids_stable_for_surviving_keys(a in rows(), b in rows()) {
                let mut pool = GroupPool::new("key");
                let before: HashMap<KeyValue, GroupId> = pool
                    .run(a.iter().map(record))
                    .unwrap()
                    .iter()
                    .map(|g| (g.key().clone(), g.id()))
                    .collect();

                let after = pool.run(b.iter().map(record)).unwrap();
                for group in after {
                    if let Some(id) = before.get(group.key()) {
                        prop_assert_eq!(*id, group.id());
                    } else {
                        prop_assert!(!before.values().any(|id| *id == group.id()));
                    }
                }
                prop_assert_eq!(pool.len(), after_len(&b));
            }
        }

        fn after_len(rows: &[Row]) -> usize {
            let mut keys: Vec<_> = rows.iter().map(|r| r.1).collect();
            keys.sort_unstable();
            keys.dedup();
            keys.len()
        }
    }
}
