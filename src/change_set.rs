use super::ordered_set::OrderedSet;
use ahash::{AHashMap, AHashSet};
use std::hash::Hash;

// Element at a single position (source position for deletes, destination
// position for inserts)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positioned<T> {
    pub index: usize,
    pub element: T,
}

// Element present on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation<T> {
    pub from: usize,
    pub to: usize,
    pub element: T,
}

impl<T> Relocation<T> {
    #[inline]
    pub fn is_in_place(&self) -> bool {
        self.from == self.to
    }
}

// ChangeSet
//
// Edit script turning a source collection into a target collection.
// Source elements are exactly one of deleted / moved / updated / unchanged,
// target elements exactly one of inserted / moved / updated / unchanged.
// A forced update that also changed position is reported in both `moved`
// and `updated`: consumers apply the move first, then refresh in place.
//
// Any position delta counts as a move, including shifts caused only by
// deletes or inserts before the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<T> {
    inserted: Vec<Positioned<T>>,
    deleted: Vec<Positioned<T>>,
    updated: Vec<Relocation<T>>,
    moved: Vec<Relocation<T>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSetStats {
    pub inserted: usize,
    pub deleted: usize,
    pub updated: usize,
    pub moved: usize,
}

impl<T> ChangeSet<T>
where
    T: Hash + Eq + Clone,
{
    pub fn empty() -> Self {
        Self {
            inserted: Vec::new(),
            deleted: Vec::new(),
            updated: Vec::new(),
            moved: Vec::new(),
        }
    }

    // Diff without forced updates
    pub fn compute(source: &OrderedSet<T>, target: &OrderedSet<T>) -> Self {
        Self::compute_with_updates(source, target, &AHashSet::new())
    }

    // O(n): both sides already carry an element -> position index, so no
    // pairwise comparison is needed. Output order: deletes ascending by
    // source position, moves and updates in source order, inserts ascending
    // by target position.
    pub fn compute_with_updates(
        source: &OrderedSet<T>,
        target: &OrderedSet<T>,
        force_updates: &AHashSet<T>,
    ) -> Self {
        let mut change_set = Self::empty();

        for (from, element) in source.iter().enumerate() {
            match target.index_of(element) {
                None => change_set.deleted.push(Positioned {
                    index: from,
                    element: element.clone(),
                }),
                // kept elements are reported with their target value
                Some(to) => {
                    if from != to {
                        change_set.moved.push(Relocation {
                            from,
                            to,
                            element: target[to].clone(),
                        });
                    }
                    if force_updates.contains(element) {
                        change_set.updated.push(Relocation {
                            from,
                            to,
                            element: target[to].clone(),
                        });
                    }
                }
            }
        }

        for (to, element) in target.iter().enumerate() {
            if !source.contains(element) {
                change_set.inserted.push(Positioned {
                    index: to,
                    element: element.clone(),
                });
            }
        }

        change_set
    }

    // Rebuild the target order from `source`. None when this change set
    // was not computed against `source`.
    pub fn apply(&self, source: &[T]) -> Option<Vec<T>> {
        let target_len = (source.len() + self.inserted.len()).checked_sub(self.deleted.len())?;
        let deleted: AHashSet<usize> = self.deleted.iter().map(|d| d.index).collect();
        let moved: AHashMap<usize, usize> = self.moved.iter().map(|m| (m.from, m.to)).collect();

        let mut slots: Vec<Option<T>> = vec![None; target_len];
        for (from, element) in source.iter().enumerate() {
            if deleted.contains(&from) {
                continue;
            }
            let to = moved.get(&from).copied().unwrap_or(from);
            let slot = slots.get_mut(to)?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(element.clone());
        }
        for insert in &self.inserted {
            let slot = slots.get_mut(insert.index)?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(insert.element.clone());
        }
        slots.into_iter().collect()
    }
}

impl<T> ChangeSet<T> {
    #[inline]
    pub fn inserted(&self) -> &[Positioned<T>] {
        &self.inserted
    }

    #[inline]
    pub fn deleted(&self) -> &[Positioned<T>] {
        &self.deleted
    }

    #[inline]
    pub fn updated(&self) -> &[Relocation<T>] {
        &self.updated
    }

    #[inline]
    pub fn moved(&self) -> &[Relocation<T>] {
        &self.moved
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
            && self.deleted.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
    }

    // Number of reported operations
    pub fn len(&self) -> usize {
        self.inserted.len() + self.deleted.len() + self.updated.len() + self.moved.len()
    }

    pub fn stats(&self) -> ChangeSetStats {
        ChangeSetStats {
            inserted: self.inserted.len(),
            deleted: self.deleted.len(),
            updated: self.updated.len(),
            moved: self.moved.len(),
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<Positioned<T>>,
        Vec<Positioned<T>>,
        Vec<Relocation<T>>,
        Vec<Relocation<T>>,
    ) {
        (self.inserted, self.deleted, self.updated, self.moved)
    }
}
