use ahash::AHashMap;
use std::hash::Hash;

// IndexedSet
//
// Index -> object map plus its inverse, kept in lock-step. Editing
// transactions use it to remember where an object lived before the edit.
#[derive(Debug, Clone)]
pub struct IndexedSet<I, O>
where
    I: Hash + Eq + Clone,
    O: Hash + Eq + Clone,
{
    objects: AHashMap<I, O>,
    indexes: AHashMap<O, I>,
}

impl<I, O> IndexedSet<I, O>
where
    I: Hash + Eq + Clone,
    O: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            objects: AHashMap::new(),
            indexes: AHashMap::new(),
        }
    }

    // An object already stored under `index` is evicted, and `object` is
    // unlinked from any index it was recorded under before.
    pub fn insert(&mut self, object: O, index: I) {
        if let Some(previous) = self.indexes.remove(&object) {
            self.objects.remove(&previous);
        }
        if let Some(evicted) = self.objects.insert(index.clone(), object.clone()) {
            self.indexes.remove(&evicted);
        }
        self.indexes.insert(object, index);
    }

    #[inline]
    pub fn object_for(&self, index: &I) -> Option<&O> {
        self.objects.get(index)
    }

    #[inline]
    pub fn index_of(&self, object: &O) -> Option<&I> {
        self.indexes.get(object)
    }

    #[inline]
    pub fn contains_object(&self, object: &O) -> bool {
        self.indexes.contains_key(object)
    }

    pub fn remove_object(&mut self, object: &O) -> Option<I> {
        let index = self.indexes.remove(object)?;
        self.objects.remove(&index);
        Some(index)
    }

    pub fn remove_all(&mut self) {
        self.objects.clear();
        self.indexes.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&I, &O)> {
        self.objects.iter()
    }

    pub fn objects(&self) -> impl Iterator<Item = &O> {
        self.indexes.keys()
    }
}

impl<I, O> Default for IndexedSet<I, O>
where
    I: Hash + Eq + Clone,
    O: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn assert_lock_step(set: &IndexedSet<usize, &'static str>) {
        assert_eq!(set.objects.len(), set.indexes.len());
        for (index, object) in set.iter() {
            assert_eq!(set.index_of(object), Some(index));
        }
    }

    #[test]
    fn test_both_directions() {
        let mut set = IndexedSet::new();
        set.insert("a", 0);
        set.insert("b", 4);

        assert_eq!(set.object_for(&4), Some(&"b"));
        assert_eq!(set.index_of(&"a"), Some(&0));
        assert_eq!(set.object_for(&1), None);
        assert_eq!(set.index_of(&"z"), None);
        assert_lock_step(&set);
    }

    #[test]
    fn test_insert_overwrites_index() {
        let mut set = IndexedSet::new();
        set.insert("a", 0);
        set.insert("b", 0);

        assert_eq!(set.object_for(&0), Some(&"b"));
        assert!(!set.contains_object(&"a"));
        assert_eq!(set.len(), 1);
        assert_lock_step(&set);
    }

    #[test]
    fn test_insert_relinks_object() {
        let mut set = IndexedSet::new();
        set.insert("a", 0);
        set.insert("a", 7);

        assert_eq!(set.object_for(&0), None);
        assert_eq!(set.index_of(&"a"), Some(&7));
        assert_lock_step(&set);
    }

    #[test]
    fn test_remove() {
        let mut set = IndexedSet::new();
        set.insert("a", 0);
        set.insert("b", 1);

        assert_eq!(set.remove_object(&"a"), Some(0));
        assert_eq!(set.remove_object(&"a"), None);
        assert_lock_step(&set);

        set.remove_all();
        assert!(set.is_empty());
        assert_eq!(set.object_for(&1), None);
    }
}
