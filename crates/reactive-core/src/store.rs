//! Snapshot store
//!
//! A minimal publish/subscribe primitive. The store holds the current
//! snapshot and an ordered list of subscriber callbacks. Subscribing delivers
//! the current snapshot immediately; every publish replaces the snapshot and
//! then calls each subscriber synchronously, in subscription order.
//!
//! Callbacks run after the internal lock is released, so a callback may
//! subscribe or unsubscribe. Such changes do not affect the fan-out that is
//! already in progress; callers should not rely on that ordering.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Anything that delivers snapshots of `T` to subscribers
pub trait Subscribable<T> {
    /// Register a callback.
    ///
    /// The callback is invoked immediately with the current snapshot and then
    /// after every publish until the returned [`Unsubscriber`] is used.
    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static;
}

struct StoreInner<T> {
    current: T,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
}

/// Holder of the current snapshot and its subscribers
pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

impl<T> Store<T>
where
    T: Clone + Send + 'static,
{
    /// Create a store publishing `initial` as its current snapshot
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                current: initial,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Get a copy of the current snapshot
    pub fn get(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Subscribe to snapshots, starting with the current one
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let (id, current) = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::clone(&callback)));
            (id, inner.current.clone())
        };
        debug!(subscriber = id, "Store subscriber added");

        callback(&current);

        let weak: Weak<Mutex<StoreInner<T>>> = Arc::downgrade(&self.inner);
        Unsubscriber::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().subscribers.retain(|(sid, _)| *sid != id);
                debug!(subscriber = id, "Store subscriber removed");
            }
        })
    }

    /// Replace the current snapshot without notifying anyone yet.
    ///
    /// Only reactive instances publish; consumers observe through
    /// [`Subscribable::subscribe`]. The returned [`Publication`] carries the snapshot and the subscribers
    /// present at replacement time. Callers that must order the replacement
    /// with their own lock do the replacement under that lock and notify
    /// after releasing it.
    pub(crate) fn replace(&self, value: T) -> Publication<T> {
        let mut inner = self.inner.lock();
        inner.current = value;
        let callbacks: Vec<Callback<T>> = inner
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        Publication {
            snapshot: inner.current.clone(),
            callbacks,
        }
    }
}

/// A replaced snapshot waiting to be delivered
pub(crate) struct Publication<T> {
    snapshot: T,
    callbacks: Vec<Callback<T>>,
}

impl<T> Publication<T> {
    /// Call every subscriber with the snapshot, in subscription order
    pub(crate) fn notify(self) {
        trace!(subscribers = self.callbacks.len(), "Publishing snapshot");
        for callback in &self.callbacks {
            callback(&self.snapshot);
        }
    }
}

impl<T> Subscribable<T> for Store<T>
where
    T: Clone + Send + 'static,
{
    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Store::subscribe(self, callback)
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Store")
            .field("current", &inner.current)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Handle returned by `subscribe`
///
/// Dropping the handle keeps the subscription alive; call
/// [`Unsubscriber::unsubscribe`] to stop receiving snapshots.
pub struct Unsubscriber {
    unsubscribe: Box<dyn FnOnce() + Send>,
}

impl Unsubscriber {
    fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Box::new(f),
        }
    }

    /// Remove the subscription. A no-op if the store is gone.
    pub fn unsubscribe(self) {
        (self.unsubscribe)()
    }
}

impl fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscriber").finish_non_exhaustive()
    }
}
