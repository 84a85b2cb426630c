use super::{
    contract::{
        ObjectChange,
        ResultsController,
        ResultsControllerDelegate,
        SectionChange,
    },
    queue::{EventQueue, EventSender, ObjectEvent},
    snapshot::{ResultsSnapshot, SnapshotReader},
};
use crate::{
    change_set::ChangeSet,
    config::{ControllerConfig, ViolationPolicy},
    errors::ControllerError,
    model::{BatchStats, IndexPath},
    ordered_set::{Element, OrderedSet},
    result::{ControllerResult, SectionResult},
    section::SectionInfo,
    sort::SortDescriptors,
};
use ahash::{AHashMap, AHashSet};
use arc_swap::ArcSwap;
use rayon::prelude::*;
use smallvec::SmallVec;
use std::{
    cmp::Ordering,
    sync::Arc,
};

pub type SectionKeyExtractor<K, T> = Arc<dyn Fn(&T) -> K + Send + Sync>;
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type BoxedDelegate<K, T> = Box<dyn ResultsControllerDelegate<K, T> + Send>;

// SectionedResultsController
//
// Groups objects into sections by an extracted key, orders each section
// with sort descriptors and turns batches of upstream object events into
// section and object changes for its delegate. Sections are ordered by key.
pub struct SectionedResultsController<K, T>
where
    K: Element + Ord,
    T: Element,
{
    section_key: SectionKeyExtractor<K, T>,
    sort: SortDescriptors<T>,
    predicate: Option<Predicate<T>>,
    config: ControllerConfig,

    // aligned: section_keys[i] is the key of sections[i]
    section_keys: OrderedSet<K>,
    sections: Vec<SectionInfo<K, T>>,
    // section each fetched object lives in
    locations: AHashMap<T, K>,

    delegate: Option<BoxedDelegate<K, T>>,
    queue: EventQueue<T>,
    published: Arc<ArcSwap<ResultsSnapshot<K, T>>>,
    generation: u64,
}

// Mutable state of one batch before commit
struct Batch<K, T> {
    events: usize,
    // previous location of every object touched, oldest first
    journal: Vec<(T, Option<K>)>,
    // objects reported with content_changed, wherever they ended up
    content_updates: AHashSet<T>,
}

impl<K, T> Batch<K, T> {
    fn new(events: usize) -> Self {
        Self {
            events,
            journal: Vec::new(),
            content_updates: AHashSet::new(),
        }
    }
}

// Changes ready for delivery, in delivery order
struct Delivery<K, T> {
    sections: Vec<(K, SectionChange)>,
    objects: Vec<(T, ObjectChange)>,
    stats: BatchStats,
}

impl<K, T> SectionedResultsController<K, T>
where
    K: Element + Ord,
    T: Element,
{
    pub fn builder<F>(section_key: F) -> ControllerBuilder<K, T>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        ControllerBuilder::new(section_key)
    }

    // Configuration

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[inline]
    pub fn sort_descriptors(&self) -> &SortDescriptors<T> {
        &self.sort
    }

    pub fn set_delegate(&mut self, delegate: BoxedDelegate<K, T>) {
        self.delegate = Some(delegate);
    }

    pub fn take_delegate(&mut self) -> Option<BoxedDelegate<K, T>> {
        self.delegate.take()
    }

    // Queries

    pub fn section_index(&self, key: &K) -> Option<usize> {
        self.section_keys.index_of(key)
    }

    pub fn section_key(&self, index: usize) -> Option<&K> {
        self.section_keys.get(index)
    }

    // Number of fetched objects across all sections
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn fetched_objects(&self) -> impl Iterator<Item = &T> {
        self.sections.iter().flat_map(|section| section.objects().iter())
    }

    // Queue and snapshots

    pub fn event_sender(&self) -> EventSender<T> {
        self.queue.sender()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn snapshot(&self) -> Arc<ResultsSnapshot<K, T>> {
        self.published.load_full()
    }

    pub fn snapshot_reader(&self) -> SnapshotReader<K, T> {
        SnapshotReader::new(Arc::clone(&self.published))
    }

    // Fetch

    // Initial load. Replaces current content without notifying the delegate.
    pub fn perform_fetch<I>(&mut self, objects: I) -> ControllerResult<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let objects: Vec<T> = match &self.predicate {
            Some(predicate) => objects.into_iter().filter(|o| predicate(o)).collect(),
            None => objects.into_iter().collect(),
        };
        let objects = match OrderedSet::try_from_vec(objects) {
            Ok(objects) => objects,
            Err(err) => return self.escalate(err.into()),
        };

        let mut grouped: AHashMap<K, OrderedSet<T>> = AHashMap::new();
        let mut locations = AHashMap::with_capacity(objects.len());
        for object in objects {
            let key = (self.section_key)(&object);
            locations.insert(object.clone(), key.clone());
            grouped.entry(key).or_default().append(object);
        }

        let mut sections: Vec<(K, SectionInfo<K, T>)> = grouped
            .into_iter()
            .map(|(key, mut objects)| {
                objects.sort(&self.sort);
                let section = SectionInfo::with_objects(Some(key.clone()), objects);
                (key, section)
            })
            .collect();
        let descending = self.config.sections_descending;
        sections.sort_by(|(a, _), (b, _)| compare_keys(a, b, descending));

        self.section_keys = sections.iter().map(|(key, _)| key.clone()).collect();
        self.sections = sections.into_iter().map(|(_, section)| section).collect();
        self.locations = locations;
        self.publish();

        log::debug!(
            "fetched {} objects into {} sections",
            self.locations.len(),
            self.sections.len()
        );
        Ok(self.locations.len())
    }

    // Batches

    // Process everything queued through event senders as one batch
    pub fn flush(&mut self) -> ControllerResult<BatchStats> {
        let events = self.queue.drain();
        if events.is_empty() {
            return Ok(BatchStats::default());
        }
        self.process(events)
    }

    // Applies the events, commits one transaction per touched section and
    // notifies the delegate. On error no change is kept.
    pub fn process<I>(&mut self, events: I) -> ControllerResult<BatchStats>
    where
        I: IntoIterator<Item = ObjectEvent<T>>,
    {
        let old_keys = self.section_keys.clone();
        let mut batch = Batch::new(0);

        for event in events {
            batch.events += 1;
            log::trace!("applying {} event", event.kind());
            if let Err(err) = self.apply_event(event, &mut batch) {
                self.rollback(&old_keys, batch);
                return self.escalate(err);
            }
        }

        let delivery = match self.commit(&old_keys, &batch) {
            Ok(delivery) => delivery,
            Err(err) => {
                self.rollback(&old_keys, batch);
                return self.escalate(err);
            }
        };
        if !delivery.stats.is_empty() {
            self.publish();
        }

        let stats = delivery.stats.clone();
        self.deliver(delivery);
        log::debug!("batch committed: {stats}");
        Ok(stats)
    }

    fn apply_event(&mut self, event: ObjectEvent<T>, batch: &mut Batch<K, T>) -> ControllerResult<()> {
        match event {
            ObjectEvent::Inserted(object) => {
                if self.locations.contains_key(&object) {
                    self.update_object(object, true, batch)
                } else if self.accepts(&object) {
                    self.insert_object(object, batch)
                } else {
                    Ok(())
                }
            }
            ObjectEvent::Updated { object, content_changed } => {
                self.update_object(object, content_changed, batch)
            }
            ObjectEvent::Removed(object) => {
                if self.locations.contains_key(&object) {
                    self.remove_object(&object, batch)?;
                }
                Ok(())
            }
        }
    }

    fn insert_object(&mut self, object: T, batch: &mut Batch<K, T>) -> ControllerResult<()> {
        let key = (self.section_key)(&object);
        let index = self.open_section(&key)?;
        self.sections[index]
            .add(object.clone())
            .map_err(|source| ControllerError::Section { section: index, source })?;
        let previous = self.locations.insert(object.clone(), key);
        batch.journal.push((object, previous));
        Ok(())
    }

    fn remove_object(&mut self, object: &T, batch: &mut Batch<K, T>) -> ControllerResult<()> {
        let Some(key) = self.locations.get(object).cloned() else {
            return Ok(());
        };
        let index = self.open_section(&key)?;
        self.sections[index]
            .remove(object)
            .map_err(|source| ControllerError::Section { section: index, source })?;
        self.locations.remove(object);
        batch.journal.push((object.clone(), Some(key)));
        Ok(())
    }

    fn update_object(
        &mut self,
        object: T,
        content_changed: bool,
        batch: &mut Batch<K, T>,
    ) -> ControllerResult<()> {
        let current = self.locations.get(&object).cloned();
        let accepted = self.accepts(&object);
        match (current, accepted) {
            (None, false) => Ok(()),
            (None, true) => self.insert_object(object, batch),
            (Some(_), false) => self.remove_object(&object, batch),
            (Some(old_key), true) => {
                if content_changed {
                    batch.content_updates.insert(object.clone());
                }
                let new_key = (self.section_key)(&object);
                if new_key != old_key {
                    self.remove_object(&object, batch)?;
                    self.insert_object(object.clone(), batch)?;
                    if !batch.content_updates.contains(&object) {
                        return Ok(());
                    }
                    // recorded as updated only if it started the batch in this section
                    let index = self.open_section(&new_key)?;
                    return self.sections[index]
                        .mark_updated(object)
                        .map(|_| ())
                        .map_err(|source| ControllerError::Section { section: index, source });
                }
                let index = self.open_section(&old_key)?;
                let section = &mut self.sections[index];
                section.mark_needs_sort();
                let result = if content_changed {
                    section.mark_updated(object).map(|_| ())
                } else {
                    section.add(object).map(|_| ())
                };
                result.map_err(|source| ControllerError::Section { section: index, source })
            }
        }
    }

    // Index of the section for `key`, created at the end when missing and
    // in an open transaction either way
    fn open_section(&mut self, key: &K) -> ControllerResult<usize> {
        let index = match self.section_keys.index_of(key) {
            Some(index) => index,
            None => {
                self.section_keys.append(key.clone());
                self.sections.push(SectionInfo::new(Some(key.clone())));
                self.sections.len() - 1
            }
        };
        let section = &mut self.sections[index];
        if !section.is_editing() {
            section
                .begin_editing()
                .map_err(|source| ControllerError::Section { section: index, source })?;
        }
        Ok(index)
    }

    fn accepts(&self, object: &T) -> bool {
        self.predicate.as_ref().is_none_or(|predicate| predicate(object))
    }

    // Ends every open transaction, drops empty sections, restores key order
    // and turns the resulting change sets into delegate calls.
    fn commit(&mut self, old_keys: &OrderedSet<K>, batch: &Batch<K, T>) -> ControllerResult<Delivery<K, T>> {
        let editing: SmallVec<[usize; 8]> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.is_editing())
            .map(|(index, _)| index)
            .collect();

        let sort = &self.sort;
        let finish = |section: &mut SectionInfo<K, T>| -> SectionResult<ChangeSet<T>> {
            if section.needs_sort() {
                section.sort(sort);
            }
            section.end_editing(&[])
        };
        // one result per entry of `editing`, same order
        let finished: Vec<SectionResult<ChangeSet<T>>> =
            if editing.len() >= self.config.parallel_diff_threshold {
                log::trace!("diffing {} sections in parallel", editing.len());
                self.sections
                    .par_iter_mut()
                    .filter(|section| section.is_editing())
                    .map(finish)
                    .collect()
            } else {
                editing.iter().map(|&index| finish(&mut self.sections[index])).collect()
            };

        let mut changes: Vec<(K, ChangeSet<T>)> = Vec::with_capacity(finished.len());
        for (&index, result) in editing.iter().zip(finished) {
            let change_set = result.map_err(|source| ControllerError::Section { section: index, source })?;
            changes.push((self.section_keys[index].clone(), change_set));
        }

        self.reorder_sections();
        let section_changes = ChangeSet::compute(old_keys, &self.section_keys);
        Ok(self.plan_delivery(old_keys, section_changes, changes, batch))
    }

    // Drop empty sections and sort the rest by key
    fn reorder_sections(&mut self) {
        let keys = std::mem::take(&mut self.section_keys);
        let sections = std::mem::take(&mut self.sections);
        let mut paired: Vec<(K, SectionInfo<K, T>)> = keys
            .into_iter()
            .zip(sections)
            .filter(|(_, section)| !section.is_empty())
            .collect();
        let descending = self.config.sections_descending;
        paired.sort_by(|(a, _), (b, _)| compare_keys(a, b, descending));

        self.section_keys = paired.iter().map(|(key, _)| key.clone()).collect();
        self.sections = paired.into_iter().map(|(_, section)| section).collect();
    }

    fn plan_delivery(
        &self,
        old_keys: &OrderedSet<K>,
        section_changes: ChangeSet<K>,
        changes: Vec<(K, ChangeSet<T>)>,
        batch: &Batch<K, T>,
    ) -> Delivery<K, T> {
        let mut stats = BatchStats {
            events: batch.events,
            ..BatchStats::default()
        };
        let mut sections = Vec::with_capacity(section_changes.len());
        for deleted in section_changes.deleted() {
            sections.push((deleted.element.clone(), SectionChange::Delete { index: deleted.index }));
        }
        for inserted in section_changes.inserted() {
            sections.push((inserted.element.clone(), SectionChange::Insert { index: inserted.index }));
        }
        for moved in section_changes.moved() {
            sections.push((moved.element.clone(), SectionChange::Move { from: moved.from, to: moved.to }));
        }
        stats.sections_deleted = section_changes.deleted().len();
        stats.sections_inserted = section_changes.inserted().len();
        stats.sections_moved = section_changes.moved().len();

        let mut deletes: Vec<(T, IndexPath)> = Vec::new();
        let mut inserts: AHashMap<T, IndexPath> = AHashMap::new();
        let mut moves: Vec<(T, IndexPath, IndexPath)> = Vec::new();
        let mut updates: Vec<(T, IndexPath, IndexPath)> = Vec::new();

        for (key, change_set) in changes {
            let old_section = old_keys.index_of(&key);
            let new_section = self.section_keys.index_of(&key);
            let (inserted, deleted, updated, moved) = change_set.into_parts();

            // items of a deleted section go with it
            if let (Some(old_section), Some(_)) = (old_section, new_section) {
                for d in deleted {
                    deletes.push((d.element, IndexPath::new(old_section, d.index)));
                }
            }
            // items of an inserted section come with it
            if let (Some(_), Some(new_section)) = (old_section, new_section) {
                for i in inserted {
                    inserts.insert(i.element, IndexPath::new(new_section, i.index));
                }
            }
            if let (Some(old_section), Some(new_section)) = (old_section, new_section) {
                for m in moved {
                    moves.push((
                        m.element,
                        IndexPath::new(old_section, m.from),
                        IndexPath::new(new_section, m.to),
                    ));
                }
                for u in updated {
                    updates.push((
                        u.element,
                        IndexPath::new(old_section, u.from),
                        IndexPath::new(new_section, u.to),
                    ));
                }
            }
        }

        // delete + insert of one object between surviving sections is a move
        let mut remaining_deletes = Vec::with_capacity(deletes.len());
        for (object, from) in deletes {
            match inserts.remove(&object) {
                Some(to) => {
                    if batch.content_updates.contains(&object) {
                        updates.push((object.clone(), from, to));
                    }
                    moves.push((object, from, to));
                }
                None => remaining_deletes.push((object, from)),
            }
        }
        let mut remaining_inserts: Vec<(T, IndexPath)> = inserts.into_iter().collect();

        remaining_deletes.sort_by_key(|(_, at)| *at);
        remaining_inserts.sort_by_key(|(_, at)| *at);
        moves.sort_by_key(|(_, from, _)| *from);
        updates.sort_by_key(|(_, at, _)| *at);

        stats.deleted = remaining_deletes.len();
        stats.inserted = remaining_inserts.len();
        stats.moved = moves.len();
        stats.updated = updates.len();

        let mut objects = Vec::with_capacity(stats.object_changes());
        objects.extend(remaining_deletes.into_iter().map(|(o, at)| (o, ObjectChange::Delete { at })));
        objects.extend(remaining_inserts.into_iter().map(|(o, at)| (o, ObjectChange::Insert { at })));
        objects.extend(moves.into_iter().map(|(o, from, to)| (o, ObjectChange::Move { from, to })));
        objects.extend(updates.into_iter().map(|(o, at, new)| (o, ObjectChange::Update { at, new })));

        Delivery { sections, objects, stats }
    }

    fn deliver(&mut self, delivery: Delivery<K, T>) {
        if delivery.stats.is_empty() {
            return;
        }
        let Some(delegate) = self.delegate.as_mut() else {
            return;
        };
        delegate.will_change_content();
        for (key, change) in &delivery.sections {
            delegate.did_change_section(key, *change);
        }
        for (object, change) in &delivery.objects {
            delegate.did_change_object(object, *change);
        }
        delegate.did_change_content(&delivery.stats);
    }

    // Undo a failed batch: abort open transactions, drop sections created
    // by it and restore object locations
    fn rollback(&mut self, old_keys: &OrderedSet<K>, batch: Batch<K, T>) {
        for section in self.sections.iter_mut().filter(|section| section.is_editing()) {
            let _ = section.abort_editing();
        }
        if self.section_keys != *old_keys {
            self.section_keys.clear();
            self.section_keys.extend(old_keys.iter().cloned());
            self.sections.truncate(old_keys.len());
        }
        for (object, previous) in batch.journal.into_iter().rev() {
            match previous {
                Some(key) => self.locations.insert(object, key),
                None => self.locations.remove(&object),
            };
        }
        log::debug!("batch rolled back");
    }

    fn publish(&mut self) {
        self.generation += 1;
        let sections = self
            .section_keys
            .iter()
            .zip(&self.sections)
            .map(|(key, section)| (key.clone(), Arc::from(section.objects().as_slice())))
            .collect();
        self.published
            .store(Arc::new(ResultsSnapshot::new(sections, self.generation)));
    }

    fn escalate<R>(&self, err: ControllerError) -> ControllerResult<R> {
        match self.config.violation_policy {
            ViolationPolicy::Panic => {
                log::error!("results controller protocol violation: {err}");
                panic!("results controller protocol violation: {err}");
            }
            ViolationPolicy::Reject => {
                log::warn!("rejected: {err}");
                Err(err)
            }
        }
    }
}

fn compare_keys<K: Ord>(a: &K, b: &K, descending: bool) -> Ordering {
    if descending { b.cmp(a) } else { a.cmp(b) }
}

impl<K, T> ResultsController for SectionedResultsController<K, T>
where
    K: Element + Ord,
    T: Element,
{
    type Section = K;
    type Object = T;

    fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    fn number_of_objects(&self, section: usize) -> Option<usize> {
        self.sections.get(section).map(SectionInfo::len)
    }

    fn section(&self, index: usize) -> Option<&SectionInfo<K, T>> {
        self.sections.get(index)
    }

    fn index_path_of(&self, object: &T) -> Option<IndexPath> {
        let key = self.locations.get(object)?;
        let section = self.section_keys.index_of(key)?;
        let item = self.sections[section].index_of(object)?;
        Some(IndexPath::new(section, item))
    }
}

// Builder

pub struct ControllerBuilder<K, T>
where
    K: Element + Ord,
    T: Element,
{
    section_key: SectionKeyExtractor<K, T>,
    sort: SortDescriptors<T>,
    predicate: Option<Predicate<T>>,
    config: ControllerConfig,
    delegate: Option<BoxedDelegate<K, T>>,
}

impl<K, T> ControllerBuilder<K, T>
where
    K: Element + Ord,
    T: Element,
{
    pub fn new<F>(section_key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            section_key: Arc::new(section_key),
            sort: SortDescriptors::new(),
            predicate: None,
            config: ControllerConfig::default(),
            delegate: None,
        }
    }

    pub fn with_sort(mut self, sort: SortDescriptors<T>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_delegate(mut self, delegate: BoxedDelegate<K, T>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn build(self) -> SectionedResultsController<K, T> {
        SectionedResultsController {
            section_key: self.section_key,
            sort: self.sort,
            predicate: self.predicate,
            config: self.config,
            section_keys: OrderedSet::new(),
            sections: Vec::new(),
            locations: AHashMap::new(),
            delegate: self.delegate,
            queue: EventQueue::new(),
            published: Arc::new(ArcSwap::from_pointee(ResultsSnapshot::empty())),
            generation: 0,
        }
    }
}
