use parking_lot::Mutex;
use std::sync::Arc;

// Object-level change reported by the data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectEvent<T> {
    Inserted(T),
    Updated {
        object: T,
        // displayed content changed, report the object as updated
        content_changed: bool,
    },
    Removed(T),
}

impl<T> ObjectEvent<T> {
    #[inline]
    pub fn object(&self) -> &T {
        match self {
            Self::Inserted(object) => object,
            Self::Updated { object, .. } => object,
            Self::Removed(object) => object,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inserted(_) => "inserted",
            Self::Updated { .. } => "updated",
            Self::Removed(_) => "removed",
        }
    }
}

// Handle producers on any thread use to hand events to the controller.
// Events only take effect on the next `flush` on the consuming side.
pub struct EventSender<T> {
    pending: Arc<Mutex<Vec<ObjectEvent<T>>>>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> EventSender<T> {
    pub fn send(&self, event: ObjectEvent<T>) {
        self.pending.lock().push(event);
    }

    pub fn send_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = ObjectEvent<T>>,
    {
        self.pending.lock().extend(events);
    }

    pub fn inserted(&self, object: T) {
        self.send(ObjectEvent::Inserted(object));
    }

    pub fn updated(&self, object: T, content_changed: bool) {
        self.send(ObjectEvent::Updated { object, content_changed });
    }

    pub fn removed(&self, object: T) {
        self.send(ObjectEvent::Removed(object));
    }
}

// Consuming side, owned by the controller
pub(crate) struct EventQueue<T> {
    pending: Arc<Mutex<Vec<ObjectEvent<T>>>>,
}

impl<T> EventQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sender(&self) -> EventSender<T> {
        EventSender {
            pending: Arc::clone(&self.pending),
        }
    }

    // Everything queued so far; later sends wait for the next drain
    pub(crate) fn drain(&self) -> Vec<ObjectEvent<T>> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_senders_from_threads() {
        let queue = EventQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for i in 0..25 {
                        sender.inserted(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 100);
        let events = queue.drain();
        assert_eq!(events.len(), 100);
        assert!(events.iter().all(|e| e.kind() == "inserted"));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_event_accessors() {
        let event = ObjectEvent::Updated { object: 7, content_changed: true };
        assert_eq!(*event.object(), 7);
        assert_eq!(event.kind(), "updated");
        assert_eq!(ObjectEvent::Removed(1).kind(), "removed");
    }
}
