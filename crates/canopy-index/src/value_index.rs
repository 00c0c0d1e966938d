//! The generic forward/reverse index.

use std::collections::{BTreeMap, BTreeSet};

use canopy_types::EntryId;

use crate::error::IndexResult;

/// A bidirectional index over `(key, entry id)` tuples.
///
/// The forward map answers "which ids carry this key", the reverse map
/// answers "which keys does this id carry". Both are ordered, and every
/// mutation updates the two maps together, so they can never disagree.
///
/// A given id may map to many keys (multi-valued attribute) and a given
/// key to many ids. Inserting an existing tuple is a no-op.
#[derive(Clone, Debug)]
pub struct ValueIndex<K: Ord + Clone> {
    name: String,
    forward: BTreeMap<K, BTreeSet<EntryId>>,
    reverse: BTreeMap<EntryId, BTreeSet<K>>,
}

impl<K: Ord + Clone> ValueIndex<K> {
    /// Create an empty index. The name only serves diagnostics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Diagnostic name of this index.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a tuple. Returns `true` if it was not already present.
    pub fn add(&mut self, key: K, id: EntryId) -> bool {
        let inserted = self.forward.entry(key.clone()).or_default().insert(id);
        if inserted {
            self.reverse.entry(id).or_default().insert(key);
        }
        inserted
    }

    /// Remove a tuple. Returns `true` if it was present.
    pub fn drop(&mut self, key: &K, id: EntryId) -> bool {
        let Some(ids) = self.forward.get_mut(key) else {
            return false;
        };
        let removed = ids.remove(&id);
        if ids.is_empty() {
            self.forward.remove(key);
        }
        if removed {
            if let Some(keys) = self.reverse.get_mut(&id) {
                keys.remove(key);
                if keys.is_empty() {
                    self.reverse.remove(&id);
                }
            }
        }
        removed
    }

    /// Remove every tuple referencing an id. Returns the number removed.
    pub fn drop_all(&mut self, id: EntryId) -> usize {
        let Some(keys) = self.reverse.remove(&id) else {
            return 0;
        };
        let mut removed = 0;
        for key in &keys {
            if let Some(ids) = self.forward.get_mut(key) {
                if ids.remove(&id) {
                    removed += 1;
                }
                if ids.is_empty() {
                    self.forward.remove(key);
                }
            }
        }
        removed
    }

    /// The lowest id carrying a key. For single-valued roles (name
    /// indices) this is the lookup primitive.
    pub fn forward_first(&self, key: &K) -> Option<EntryId> {
        self.forward.get(key).and_then(|ids| ids.first().copied())
    }

    /// All ids carrying a key, in ascending order.
    pub fn forward_ids(&self, key: &K) -> Vec<EntryId> {
        self.forward
            .get(key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All keys an id carries, in key order.
    pub fn reverse_keys(&self, id: EntryId) -> Vec<K> {
        self.reverse
            .get(&id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The first key an id carries. For roles where an id has at most one
    /// key (hierarchy child side, direct alias) this is the reverse
    /// lookup primitive.
    pub fn reverse_first(&self, id: EntryId) -> Option<K> {
        self.reverse.get(&id).and_then(|keys| keys.first().cloned())
    }

    /// Returns `true` if the exact tuple is present.
    pub fn has_tuple(&self, key: &K, id: EntryId) -> bool {
        self.forward
            .get(key)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }

    /// Returns `true` if any tuple references the id.
    pub fn has_id(&self, id: EntryId) -> bool {
        self.reverse.contains_key(&id)
    }

    /// All ids referenced by at least one tuple, in ascending order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.reverse.keys().copied().collect()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.forward.len()
    }

    /// Total number of tuples.
    pub fn tuple_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if the index holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Ordered dump of every tuple. Used by tests that assert an
    /// operation had no side effects.
    pub fn snapshot(&self) -> Vec<(K, EntryId)> {
        self.forward
            .iter()
            .flat_map(|(key, ids)| ids.iter().map(move |id| (key.clone(), *id)))
            .collect()
    }

    /// Remove every tuple.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Make all prior writes durable. In-memory maps have nothing to do;
    /// the seam exists so `sync()` can reach a persistent backing.
    pub fn flush(&mut self) -> IndexResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntryId {
        EntryId::from_raw(raw)
    }

    fn make_index() -> ValueIndex<String> {
        ValueIndex::new("test")
    }

    #[test]
    fn new_index_is_empty() {
        let idx = make_index();
        assert!(idx.is_empty());
        assert_eq!(idx.key_count(), 0);
        assert_eq!(idx.tuple_count(), 0);
    }

    #[test]
    fn add_and_lookup_both_directions() {
        let mut idx = make_index();
        assert!(idx.add("x@y".into(), id(1)));

        assert_eq!(idx.forward_first(&"x@y".into()), Some(id(1)));
        assert_eq!(idx.reverse_keys(id(1)), vec!["x@y".to_string()]);
        assert!(idx.has_tuple(&"x@y".into(), id(1)));
        assert!(idx.has_id(id(1)));
    }

    #[test]
    fn add_existing_tuple_is_noop() {
        let mut idx = make_index();
        assert!(idx.add("k".into(), id(1)));
        assert!(!idx.add("k".into(), id(1)));
        assert_eq!(idx.tuple_count(), 1);
    }

    #[test]
    fn many_ids_per_key_and_many_keys_per_id() {
        let mut idx = make_index();
        idx.add("shared".into(), id(1));
        idx.add("shared".into(), id(2));
        idx.add("other".into(), id(1));

        assert_eq!(idx.forward_ids(&"shared".into()), vec![id(1), id(2)]);
        assert_eq!(
            idx.reverse_keys(id(1)),
            vec!["other".to_string(), "shared".to_string()]
        );
        assert_eq!(idx.tuple_count(), 3);
    }

    #[test]
    fn drop_removes_both_directions() {
        let mut idx = make_index();
        idx.add("k".into(), id(1));
        idx.add("k".into(), id(2));

        assert!(idx.drop(&"k".into(), id(1)));
        assert!(!idx.has_id(id(1)));
        assert_eq!(idx.forward_ids(&"k".into()), vec![id(2)]);
        // Second drop reports absence.
        assert!(!idx.drop(&"k".into(), id(1)));
    }

    #[test]
    fn drop_last_id_removes_key() {
        let mut idx = make_index();
        idx.add("k".into(), id(1));
        idx.drop(&"k".into(), id(1));
        assert_eq!(idx.key_count(), 0);
        assert!(idx.forward_first(&"k".into()).is_none());
    }

    #[test]
    fn drop_all_removes_every_tuple_for_id() {
        let mut idx = make_index();
        idx.add("a".into(), id(1));
        idx.add("b".into(), id(1));
        idx.add("a".into(), id(2));

        assert_eq!(idx.drop_all(id(1)), 2);
        assert!(!idx.has_id(id(1)));
        assert_eq!(idx.forward_ids(&"a".into()), vec![id(2)]);
        assert!(idx.forward_first(&"b".into()).is_none());
        assert_eq!(idx.drop_all(id(1)), 0);
    }

    #[test]
    fn forward_first_returns_lowest_id() {
        let mut idx = make_index();
        idx.add("k".into(), id(9));
        idx.add("k".into(), id(3));
        assert_eq!(idx.forward_first(&"k".into()), Some(id(3)));
    }

    #[test]
    fn reverse_first_for_single_key_roles() {
        let mut idx: ValueIndex<EntryId> = ValueIndex::new("hierarchy");
        idx.add(id(1), id(5));
        assert_eq!(idx.reverse_first(id(5)), Some(id(1)));
        assert_eq!(idx.reverse_first(id(6)), None);
    }

    #[test]
    fn snapshot_is_ordered_and_complete() {
        let mut idx = make_index();
        idx.add("b".into(), id(2));
        idx.add("a".into(), id(1));
        idx.add("a".into(), id(3));

        assert_eq!(
            idx.snapshot(),
            vec![
                ("a".to_string(), id(1)),
                ("a".to_string(), id(3)),
                ("b".to_string(), id(2)),
            ]
        );
    }

    #[test]
    fn snapshot_equality_detects_no_op() {
        let mut idx = make_index();
        idx.add("k".into(), id(1));
        let before = idx.snapshot();
        idx.add("k".into(), id(1)); // duplicate
        idx.drop(&"missing".into(), id(7));
        assert_eq!(idx.snapshot(), before);
    }

    #[test]
    fn ids_lists_referenced_ids_sorted() {
        let mut idx = make_index();
        idx.add("x".into(), id(4));
        idx.add("y".into(), id(2));
        assert_eq!(idx.ids(), vec![id(2), id(4)]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut idx = make_index();
        idx.add("k".into(), id(1));
        idx.clear();
        assert!(idx.is_empty());
        assert!(!idx.has_id(id(1)));
    }

    #[test]
    fn flush_is_accepted() {
        let mut idx = make_index();
        idx.add("k".into(), id(1));
        idx.flush().unwrap();
    }

    #[test]
    fn entry_id_keyed_index() {
        // The hierarchy role: parent id -> child ids.
        let mut idx: ValueIndex<EntryId> = ValueIndex::new("hierarchy");
        idx.add(id(1), id(2));
        idx.add(id(1), id(3));
        assert_eq!(idx.forward_ids(&id(1)), vec![id(2), id(3)]);
        assert_eq!(idx.reverse_first(id(2)), Some(id(1)));
    }
}
