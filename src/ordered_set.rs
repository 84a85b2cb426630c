use super::{
    errors::ProtocolViolation,
    result::SectionResult,
    sort::SortDescriptors,
};
use ahash::AHashMap;
use std::{
    cmp::Ordering,
    fmt::Debug,
    hash::Hash,
    ops::Index,
};

// Anything diffed by this crate. `Hash` and `Eq` must describe the stable
// identity of the object only: refreshing its content must not change them.
pub trait Element: Hash + Eq + Clone + Send + Sync + 'static {}

impl<T> Element for T where T: Hash + Eq + Clone + Send + Sync + 'static {}

// OrderedSet
//
// Behaves like a Vec (ordered, positional) but keeps an element -> position
// hash index so membership and position queries are O(1).
#[derive(Clone)]
pub struct OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    items: Vec<T>,
    positions: AHashMap<T, usize>,
}

impl<T> OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    // Constructors

    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            positions: AHashMap::with_capacity(capacity),
        }
    }

    // Strict constructor: the first repeated element is rejected
    pub fn try_from_vec(items: Vec<T>) -> SectionResult<Self> {
        let mut positions = AHashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if positions.insert(item.clone(), position).is_some() {
                return Err(ProtocolViolation::DuplicateElement { position });
            }
        }
        Ok(Self { items, positions })
    }

    // Mutation

    // Returns false (and changes nothing) when the element is already present
    pub fn append(&mut self, element: T) -> bool {
        if self.positions.contains_key(&element) {
            return false;
        }
        self.positions.insert(element.clone(), self.items.len());
        self.items.push(element);
        true
    }

    pub fn insert(&mut self, element: T, at: usize) -> SectionResult<()> {
        if let Some(&position) = self.positions.get(&element) {
            return Err(ProtocolViolation::DuplicateElement { position });
        }
        if at > self.items.len() {
            return Err(ProtocolViolation::PositionOutOfBounds {
                position: at,
                len: self.items.len(),
            });
        }
        self.items.insert(at, element);
        self.reindex_from(at);
        Ok(())
    }

    pub fn remove(&mut self, element: &T) -> Option<usize> {
        let position = self.positions.remove(element)?;
        self.items.remove(position);
        self.reindex_from(position);
        Some(position)
    }

    pub fn remove_at(&mut self, position: usize) -> Option<T> {
        if position >= self.items.len() {
            return None;
        }
        let element = self.items.remove(position);
        self.positions.remove(&element);
        self.reindex_from(position);
        Some(element)
    }

    // Swap in a value equal by identity, keeping its position. Used to
    // refresh the content of an element. Returns the previous value.
    pub fn replace(&mut self, element: T) -> Option<T> {
        let position = *self.positions.get(&element)?;
        Some(std::mem::replace(&mut self.items[position], element))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    // Stable sort with a rule list
    pub fn sort(&mut self, descriptors: &SortDescriptors<T>) {
        if descriptors.is_empty() {
            return;
        }
        self.sort_by(|a, b| descriptors.compare(a, b));
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
        self.reindex_from(0);
    }

    // Queries

    #[inline]
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.positions.get(element).copied()
    }

    #[inline]
    pub fn contains(&self, element: &T) -> bool {
        self.positions.contains_key(element)
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    // Stored value equal by identity to `element`
    #[inline]
    pub fn get_equal(&self, element: &T) -> Option<&T> {
        self.index_of(element).map(|position| &self.items[position])
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn reindex_from(&mut self, start: usize) {
        for (position, item) in self.items.iter().enumerate().skip(start) {
            if let Some(slot) = self.positions.get_mut(item) {
                *slot = position;
            } else {
                self.positions.insert(item.clone(), position);
            }
        }
    }
}

impl<T> Default for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for OrderedSet<T>
where
    T: Hash + Eq + Clone + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> PartialEq for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T> Eq for OrderedSet<T> where T: Hash + Eq + Clone {}

impl<T> Index<usize> for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    type Output = T;

    fn index(&self, position: usize) -> &T {
        &self.items[position]
    }
}

// Append semantics: repeated elements are dropped
impl<T> FromIterator<T> for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity(iter.size_hint().0);
        for element in iter {
            set.append(element);
        }
        set
    }
}

impl<T> Extend<T> for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.append(element);
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for OrderedSet<T>
where
    T: Hash + Eq + Clone,
{
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
