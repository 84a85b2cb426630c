use std::{
    cmp::Ordering,
    sync::Arc,
};

pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

// One ordering rule. Rules are applied in sequence, the next one only
// breaks ties left by the previous.
pub struct SortDescriptor<T> {
    compare: Comparator<T>,
    ascending: bool,
}

impl<T> Clone for SortDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
            ascending: self.ascending,
        }
    }
}

impl<T> SortDescriptor<T> {
    pub fn new<F>(compare: F, ascending: bool) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
            ascending,
        }
    }

    // Order by an extracted key
    pub fn by_key<K, F>(extractor: F, ascending: bool) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::new(move |a, b| extractor(a).cmp(&extractor(b)), ascending)
    }

    #[inline]
    pub fn ascending(&self) -> bool {
        self.ascending
    }

    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = (self.compare)(a, b);
        if self.ascending { ord } else { ord.reverse() }
    }

    pub fn reversed(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
            ascending: !self.ascending,
        }
    }
}

// Ordered list of rules; an empty list treats every pair as equal, so a
// stable sort keeps the current order.
pub struct SortDescriptors<T> {
    rules: Vec<SortDescriptor<T>>,
}

impl<T> Clone for SortDescriptors<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T> Default for SortDescriptors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SortDescriptors<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, rule: SortDescriptor<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_key<K, F>(self, extractor: F, ascending: bool) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.with(SortDescriptor::by_key(extractor, ascending))
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for rule in &self.rules {
            match rule.compare(a, b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl<T> From<Vec<SortDescriptor<T>>> for SortDescriptors<T> {
    fn from(rules: Vec<SortDescriptor<T>>) -> Self {
        Self { rules }
    }
}
