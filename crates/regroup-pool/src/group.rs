//! Reusable group buckets.
//!
//! A [`Group`] is owned by the pool that created it. Callers see it only
//! through shared references; its [`GroupId`] is the identity they compare
//! across runs.

use std::sync::Arc;

use regroup_core::{Generation, GroupId, KeyValue};

/// All records of one run that share a key value.
///
/// Items keep their input order. A group handed out by a run is never
/// empty.
#[derive(Clone, Debug)]
pub struct Group<R> {
    id: GroupId,
    key_name: Arc<str>,
    key: KeyValue,
    items: Vec<R>,
    /// Generation of the last run that touched this group.
    generation: Generation,
}

impl<R> Group<R> {
    pub(crate) fn new(key_name: Arc<str>, key: KeyValue, first: R, generation: Generation) -> Self {
        Self {
            id: GroupId::next(),
            key_name,
            key,
            items: vec![first],
            generation,
        }
    }

    /// Reuse this group for a new generation, dropping previous members.
    pub(crate) fn reset(&mut self, first: R, generation: Generation) {
        self.items.clear();
        self.items.push(first);
        self.generation = generation;
    }

    pub(crate) fn push(&mut self, item: R) {
        self.items.push(item);
    }

    /// Stable handle of this group.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The key value shared by every member.
    pub fn key(&self) -> &KeyValue {
        &self.key
    }

    /// Name of the grouping this group belongs to.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Attribute lookup in the caller's vocabulary: a group for `homeTown`
    /// answers `get("homeTown")` with its key.
    pub fn get(&self, name: &str) -> Option<&KeyValue> {
        (name == &*self.key_name).then_some(&self.key)
    }

    /// Members in input order.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Generation of the last run that touched this group.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Iterate over members in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }
}

impl<'a, R> IntoIterator for &'a Group<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(first: &'static str) -> Group<&'static str> {
        Group::new(Arc::from("homeTown"), KeyValue::from("London"), first, Generation(1))
    }

    #[test]
    fn new_group_holds_first_item() {
        let g = group("Sam");
        assert_eq!(g.items(), ["Sam"]);
        assert_eq!(g.generation(), Generation(1));
        assert_eq!(g.key(), &KeyValue::from("London"));
        assert!(!g.is_empty());
    }

    #[test]
    fn push_preserves_order() {
        let mut g = group("Sam");
        g.push("Alex");
        assert_eq!(g.iter().copied().collect::<Vec<_>>(), ["Sam", "Alex"]);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn reset_replaces_items_and_keeps_id() {
        let mut g = group("Sam");
        g.push("Alex");
        let id = g.id();

        g.reset("Dorothy", Generation(2));
        assert_eq!(g.items(), ["Dorothy"]);
        assert_eq!(g.generation(), Generation(2));
        assert_eq!(g.id(), id);
    }

    #[test]
    fn get_answers_only_own_key_name() {
        let g = group("Sam");
        assert_eq!(g.get("homeTown"), Some(&KeyValue::from("London")));
        assert_eq!(g.get("name"), None);
        assert_eq!(g.key_name(), "homeTown");
    }

    #[test]
    fn distinct_groups_have_distinct_ids() {
        assert_ne!(group("a").id(), group("a").id());
    }
}
