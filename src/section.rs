use super::{
    change_set::ChangeSet,
    errors::ProtocolViolation,
    indexed_set::IndexedSet,
    ordered_set::{Element, OrderedSet},
    result::SectionResult,
    sort::SortDescriptors,
};
use ahash::AHashSet;

// Editing state of one section. The snapshot is an owned copy of the
// objects taken at `begin_editing`; the live set is mutated freely.
#[derive(Debug, Clone)]
enum EditState<T>
where
    T: Element,
{
    Idle,
    Editing {
        snapshot: OrderedSet<T>,
        // pre-edit position of snapshot members removed during the edit
        removed: IndexedSet<usize, T>,
        // pre-edit position of snapshot members marked updated
        updated: IndexedSet<usize, T>,
    },
}

// SectionInfo
//
// One section of a sectioned result set: an optional represented object
// (the section identity) and its ordered members. Members are only
// mutated inside a begin/end editing transaction; `end_editing` returns
// one consolidated change set for everything that happened in between.
#[derive(Debug, Clone)]
pub struct SectionInfo<S, T>
where
    T: Element,
{
    represented_object: Option<S>,
    objects: OrderedSet<T>,
    state: EditState<T>,
    needs_sort: bool,
}

impl<S, T> SectionInfo<S, T>
where
    T: Element,
{
    pub fn new(represented_object: Option<S>) -> Self {
        Self {
            represented_object,
            objects: OrderedSet::new(),
            state: EditState::Idle,
            needs_sort: false,
        }
    }

    pub fn with_objects(represented_object: Option<S>, objects: OrderedSet<T>) -> Self {
        Self {
            represented_object,
            objects,
            state: EditState::Idle,
            needs_sort: false,
        }
    }

    // Accessors

    #[inline]
    pub fn represented_object(&self) -> Option<&S> {
        self.represented_object.as_ref()
    }

    #[inline]
    pub fn objects(&self) -> &OrderedSet<T> {
        &self.objects
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn object_at(&self, position: usize) -> Option<&T> {
        self.objects.get(position)
    }

    #[inline]
    pub fn index_of(&self, object: &T) -> Option<usize> {
        self.objects.index_of(object)
    }

    #[inline]
    pub fn contains(&self, object: &T) -> bool {
        self.objects.contains(object)
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    #[inline]
    pub fn needs_sort(&self) -> bool {
        self.needs_sort
    }

    // Transaction

    pub fn begin_editing(&mut self) -> SectionResult<()> {
        if self.is_editing() {
            return Err(ProtocolViolation::AlreadyEditing);
        }
        self.state = EditState::Editing {
            snapshot: self.objects.clone(),
            removed: IndexedSet::new(),
            updated: IndexedSet::new(),
        };
        Ok(())
    }

    // Adds at the end and flags a pending sort. An element that is already
    // present keeps its position but has its stored value refreshed, which
    // may invalidate the order as well. Returns whether membership changed.
    pub fn add(&mut self, object: T) -> SectionResult<bool> {
        let EditState::Editing { removed, .. } = &mut self.state else {
            return Err(ProtocolViolation::NotEditing);
        };
        self.needs_sort = true;
        if self.objects.contains(&object) {
            self.objects.replace(object);
            return Ok(false);
        }
        removed.remove_object(&object);
        self.objects.append(object);
        Ok(true)
    }

    // Positional insert for callers that already know the sorted position;
    // leaves `needs_sort` untouched.
    pub fn insert(&mut self, object: T, at: usize) -> SectionResult<()> {
        let EditState::Editing { removed, .. } = &mut self.state else {
            return Err(ProtocolViolation::NotEditing);
        };
        self.objects.insert(object.clone(), at)?;
        removed.remove_object(&object);
        Ok(())
    }

    pub fn remove(&mut self, object: &T) -> SectionResult<Option<usize>> {
        let EditState::Editing { snapshot, removed, updated } = &mut self.state else {
            return Err(ProtocolViolation::NotEditing);
        };
        let Some(position) = self.objects.remove(object) else {
            return Ok(None);
        };
        updated.remove_object(object);
        if let Some(before) = snapshot.index_of(object) {
            removed.insert(object.clone(), before);
        }
        Ok(Some(position))
    }

    // Refreshes the stored value and reports the object as updated when
    // editing ends. Returns false when the object is not a member.
    pub fn mark_updated(&mut self, object: T) -> SectionResult<bool> {
        let EditState::Editing { snapshot, updated, .. } = &mut self.state else {
            return Err(ProtocolViolation::NotEditing);
        };
        if !self.objects.contains(&object) {
            return Ok(false);
        }
        if let Some(before) = snapshot.index_of(&object) {
            updated.insert(object.clone(), before);
        }
        self.objects.replace(object);
        Ok(true)
    }

    #[inline]
    pub fn mark_needs_sort(&mut self) {
        self.needs_sort = true;
    }

    pub fn sort(&mut self, descriptors: &SortDescriptors<T>) {
        self.objects.sort(descriptors);
        self.needs_sort = false;
    }

    // Pre-edit position of an object removed in the open transaction
    pub fn removed_index_of(&self, object: &T) -> Option<usize> {
        match &self.state {
            EditState::Editing { removed, .. } => removed.index_of(object).copied(),
            EditState::Idle => None,
        }
    }

    // Closes the transaction and diffs the snapshot against the live
    // objects. Rejected (state untouched) when idle or when a sort is
    // still pending.
    pub fn end_editing(&mut self, force_updates: &[T]) -> SectionResult<ChangeSet<T>> {
        if !self.is_editing() {
            return Err(ProtocolViolation::NotEditing);
        }
        if self.needs_sort {
            return Err(ProtocolViolation::SortPending);
        }
        let EditState::Editing { snapshot, updated, .. } =
            std::mem::replace(&mut self.state, EditState::Idle)
        else {
            return Err(ProtocolViolation::NotEditing);
        };

        let mut forced: AHashSet<T> = force_updates.iter().cloned().collect();
        forced.extend(updated.objects().cloned());
        Ok(ChangeSet::compute_with_updates(&snapshot, &self.objects, &forced))
    }

    // Drops every change made since `begin_editing`
    pub fn abort_editing(&mut self) -> SectionResult<()> {
        let EditState::Editing { snapshot, .. } =
            std::mem::replace(&mut self.state, EditState::Idle)
        else {
            return Err(ProtocolViolation::NotEditing);
        };
        self.objects = snapshot;
        self.needs_sort = false;
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn section(items: &[u32]) -> SectionInfo<&'static str, u32> {
        SectionInfo::with_objects(Some("numbers"), items.iter().copied().collect())
    }

    fn ascending() -> SortDescriptors<u32> {
        SortDescriptors::new().with_key(|n: &u32| *n, true)
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut s = section(&[1, 2]);
        s.begin_editing().unwrap();
        assert_eq!(s.begin_editing(), Err(ProtocolViolation::AlreadyEditing));
        assert!(s.is_editing());
    }

    #[test]
    fn test_end_without_begin_is_rejected() {
        let mut s = section(&[1, 2]);
        assert_eq!(s.end_editing(&[]).unwrap_err(), ProtocolViolation::NotEditing);
        assert_eq!(s.add(3), Err(ProtocolViolation::NotEditing));
        assert_eq!(s.remove(&1), Err(ProtocolViolation::NotEditing));
        assert_eq!(s.abort_editing(), Err(ProtocolViolation::NotEditing));
    }

    #[test]
    fn test_end_with_pending_sort_is_rejected() {
        let mut s = section(&[1, 3]);
        s.begin_editing().unwrap();
        assert_eq!(s.add(2), Ok(true));
        assert!(s.needs_sort());
        assert_eq!(s.end_editing(&[]).unwrap_err(), ProtocolViolation::SortPending);
        // still editing, nothing lost
        assert!(s.is_editing());
        assert_eq!(s.len(), 3);

        s.sort(&ascending());
        let cs = s.end_editing(&[]).unwrap();
        assert_eq!(cs.inserted().len(), 1);
        assert_eq!(cs.inserted()[0].index, 1);
        assert!(!s.is_editing());
    }

    #[test]
    fn test_add_present_is_noop_but_flags_sort() {
        let mut s = section(&[1, 2]);
        s.begin_editing().unwrap();
        assert_eq!(s.add(2), Ok(false));
        assert_eq!(s.len(), 2);
        assert!(s.needs_sort());
        s.sort(&ascending());
        assert!(s.end_editing(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_transaction_consolidates_changes() {
        let mut s = section(&[10, 20, 30, 40]);
        s.begin_editing().unwrap();
        s.remove(&20).unwrap();
        s.add(25).unwrap();
        s.remove(&40).unwrap();
        s.add(40).unwrap();
        assert_eq!(s.removed_index_of(&20), Some(1));
        assert_eq!(s.removed_index_of(&40), None);
        assert!(s.mark_updated(30).unwrap());
        assert!(!s.mark_updated(99).unwrap());
        s.sort(&ascending());

        let cs = s.end_editing(&[10]).unwrap();
        assert_eq!(s.objects().as_slice(), &[10, 25, 30, 40]);
        assert_eq!(cs.deleted().len(), 1);
        assert_eq!(cs.deleted()[0].element, 20);
        assert_eq!(cs.inserted().len(), 1);
        assert_eq!(cs.inserted()[0].element, 25);
        assert!(cs.moved().is_empty());

        let mut updated: Vec<u32> = cs.updated().iter().map(|u| u.element).collect();
        updated.sort();
        assert_eq!(updated, vec![10, 30]);
        assert_eq!(s.removed_index_of(&20), None);
    }

    #[test]
    fn test_insert_keeps_sort_flag() {
        let mut s = section(&[1, 3]);
        s.begin_editing().unwrap();
        s.insert(2, 1).unwrap();
        assert!(!s.needs_sort());
        assert_eq!(
            s.insert(3, 0),
            Err(ProtocolViolation::DuplicateElement { position: 2 })
        );
        let cs = s.end_editing(&[]).unwrap();
        assert_eq!(cs.inserted()[0].index, 1);
    }

    #[test]
    fn test_abort_restores_snapshot() {
        let mut s = section(&[1, 2, 3]);
        s.begin_editing().unwrap();
        s.remove(&1).unwrap();
        s.add(7).unwrap();
        s.abort_editing().unwrap();

        assert!(!s.is_editing());
        assert!(!s.needs_sort());
        assert_eq!(s.objects().as_slice(), &[1, 2, 3]);
        assert_eq!(s.index_of(&3), Some(2));
        assert_eq!(s.represented_object(), Some(&"numbers"));
    }
}
