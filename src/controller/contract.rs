use crate::{
    model::{BatchStats, IndexPath},
    ordered_set::Element,
    section::SectionInfo,
};

// Per-object change delivered to the presentation layer. Old positions
// refer to the state before the batch, new positions to the state after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectChange {
    Delete { at: IndexPath },
    Insert { at: IndexPath },
    // content refresh; `at` before the batch, `new` after it
    Update { at: IndexPath, new: IndexPath },
    Move { from: IndexPath, to: IndexPath },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChange {
    Delete { index: usize },
    Insert { index: usize },
    Move { from: usize, to: usize },
}

/// Read side of a results controller: sectioned, ordered objects.
pub trait ResultsController {
    type Section;
    type Object: Element;

    fn number_of_sections(&self) -> usize;

    /// `None` when `section` is out of range.
    fn number_of_objects(&self, section: usize) -> Option<usize>;

    fn section(&self, index: usize) -> Option<&SectionInfo<Self::Section, Self::Object>>;

    fn object_at(&self, path: IndexPath) -> Option<&Self::Object> {
        self.section(path.section)?.object_at(path.item)
    }

    fn index_path_of(&self, object: &Self::Object) -> Option<IndexPath>;

    fn sections(&self) -> impl Iterator<Item = &SectionInfo<Self::Section, Self::Object>> {
        (0..self.number_of_sections()).filter_map(move |index| self.section(index))
    }
}

/// Receiver of committed batches. `will_change_content` and
/// `did_change_content` bracket every non-empty batch exactly once, with
/// all section and object changes delivered in between.
pub trait ResultsControllerDelegate<S, T> {
    fn will_change_content(&mut self) {}

    fn did_change_section(&mut self, _section: &S, _change: SectionChange) {}

    fn did_change_object(&mut self, _object: &T, _change: ObjectChange) {}

    fn did_change_content(&mut self, _stats: &BatchStats) {}
}
