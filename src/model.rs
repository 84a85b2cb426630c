use std::fmt::Display;

// Position of an object inside a sectioned result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    #[inline]
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

// Counters for one committed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub events: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub updated: usize,
    pub moved: usize,
    pub sections_inserted: usize,
    pub sections_deleted: usize,
    pub sections_moved: usize,
}

impl BatchStats {
    // Nothing to deliver to the delegate
    pub fn is_empty(&self) -> bool {
        self.object_changes() == 0 && self.section_changes() == 0
    }

    pub fn object_changes(&self) -> usize {
        self.inserted + self.deleted + self.updated + self.moved
    }

    pub fn section_changes(&self) -> usize {
        self.sections_inserted + self.sections_deleted + self.sections_moved
    }
}

impl Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "events: {}, objects +{} -{} ~{} >{}, sections +{} -{} >{}",
            self.events,
            self.inserted,
            self.deleted,
            self.updated,
            self.moved,
            self.sections_inserted,
            self.sections_deleted,
            self.sections_moved,
        )
    }
}
