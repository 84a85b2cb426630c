use crate::model::IndexPath;
use arc_swap::ArcSwap;
use std::sync::Arc;

// Immutable view of the controller state after a fetch or commit
#[derive(Debug, Clone)]
pub struct ResultsSnapshot<K, T> {
    sections: Vec<(K, Arc<[T]>)>,
    generation: u64,
}

impl<K, T> ResultsSnapshot<K, T> {
    pub(crate) fn new(sections: Vec<(K, Arc<[T]>)>, generation: u64) -> Self {
        Self { sections, generation }
    }

    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
            generation: 0,
        }
    }

    // Bumped on every publish
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn section_key(&self, index: usize) -> Option<&K> {
        self.sections.get(index).map(|(key, _)| key)
    }

    pub fn objects(&self, section: usize) -> Option<&[T]> {
        self.sections.get(section).map(|(_, objects)| &**objects)
    }

    pub fn object_at(&self, path: IndexPath) -> Option<&T> {
        self.objects(path.section)?.get(path.item)
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|(_, objects)| objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[T])> {
        self.sections.iter().map(|(key, objects)| (key, &**objects))
    }
}

// Cloneable read handle; readers never block the consuming thread
pub struct SnapshotReader<K, T> {
    current: Arc<ArcSwap<ResultsSnapshot<K, T>>>,
}

impl<K, T> Clone for SnapshotReader<K, T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<K, T> SnapshotReader<K, T> {
    pub(crate) fn new(current: Arc<ArcSwap<ResultsSnapshot<K, T>>>) -> Self {
        Self { current }
    }

    pub fn load(&self) -> Arc<ResultsSnapshot<K, T>> {
        self.current.load_full()
    }
}
