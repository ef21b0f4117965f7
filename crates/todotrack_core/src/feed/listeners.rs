//! Generic listener registry with drop-to-unsubscribe handles.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    entries: BTreeMap<u64, Entry<E>>,
}

struct Entry<E> {
    filter: Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>,
    listener: Listener<E>,
}

/// Set of callbacks notified on every emitted event.
pub struct ListenerSet<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: BTreeMap::new(),
            })),
        }
    }
}

impl<E: 'static> ListenerSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every event.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        self.insert(None, Arc::new(listener))
    }

    /// Registers a listener for events accepted by `filter`.
    pub fn subscribe_filtered(
        &self,
        filter: impl Fn(&E) -> bool + Send + Sync + 'static,
        listener: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription {
        self.insert(Some(Arc::new(filter)), Arc::new(listener))
    }

    /// Delivers `event` to all matching listeners.
    ///
    /// Listeners run outside the registry lock, so they may subscribe or
    /// unsubscribe without deadlocking.
    pub fn emit(&self, event: &E) {
        let targets: Vec<Listener<E>> = {
            let registry = lock(&self.inner);
            registry
                .entries
                .values()
                .filter(|entry| entry.filter.as_ref().map_or(true, |accepts| accepts(event)))
                .map(|entry| Arc::clone(&entry.listener))
                .collect()
        };
        for listener in targets {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(
        &self,
        filter: Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>,
        listener: Listener<E>,
    ) -> Subscription {
        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.insert(id, Entry { filter, listener });
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).entries.remove(&id);
                }
            })),
        }
    }
}

/// Handle for one registered listener. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::ListenerSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn dropping_subscription_stops_delivery() {
        let set = ListenerSet::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let subscription = set.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        set.emit(&1);
        drop(subscription);
        set.emit(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn filtered_listener_only_sees_matching_events() {
        let set = ListenerSet::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _subscription = set.subscribe_filtered(
            |value| value % 2 == 0,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        for value in 0..5 {
            set.emit(&value);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_after_set_dropped_is_noop() {
        let set = ListenerSet::<u32>::new();
        let subscription = set.subscribe(|_| {});
        drop(set);
        subscription.unsubscribe();
    }
}
