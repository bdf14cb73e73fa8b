use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// A listener that receives every value sent through a broadcast.
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Trait for types that can be converted into broadcast listeners.
pub trait IntoBroadcastListener<T> {
    fn into_broadcast_listener(self) -> Listener<T>;
}

/// Synchronous fan-out to any number of listeners.
///
/// Listeners are called in the order they were registered, on the thread that calls [`Broadcast::send`].
pub struct Broadcast<T>(Arc<Inner<T>>);

struct Inner<T> {
    listeners: RwLock<BTreeMap<usize, Listener<T>>>,
    next_id: AtomicUsize,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast").field("listeners", &self.listener_count()).finish()
    }
}

/// A listen-only reference to a broadcast
pub struct Ref<'a, T>(&'a Broadcast<T>);

/// Removes its listener from the broadcast when dropped.
pub struct ListenerGuard<T> {
    inner: Weak<Inner<T>>,
    id: usize,
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Broadcast<T> {
    pub fn new() -> Self { Self(Arc::new(Inner { listeners: RwLock::new(BTreeMap::new()), next_id: AtomicUsize::new(0) })) }

    pub fn listener_count(&self) -> usize { self.0.listeners.read().expect("listeners lock poisoned").len() }

    /// Get a read-only reference to this broadcast that can only register listeners.
    pub fn reference(&self) -> Ref<'_, T> { Ref(self) }
}

impl<T: Clone> Broadcast<T> {
    /// Sends a value to every listener registered at the time of the call
    pub fn send(&self, value: T) {
        // Snapshot so listeners may (un)subscribe from inside the callback without deadlocking
        let listeners = {
            let listeners = self.0.listeners.read().expect("listeners lock poisoned");
            listeners.values().cloned().collect::<Vec<_>>()
        };

        if let Some((last, rest)) = listeners.split_last() {
            for listener in rest {
                listener(value.clone());
            }
            last(value);
        }
    }
}

impl<'a, T> Ref<'a, T> {
    /// Register a listener. It stays registered until the returned guard is dropped.
    pub fn listen<L>(&self, listener: L) -> ListenerGuard<T>
    where L: IntoBroadcastListener<T> {
        let id = self.0.0.next_id.fetch_add(1, Ordering::Relaxed);
        self.0.0.listeners.write().expect("listeners lock poisoned").insert(id, listener.into_broadcast_listener());
        ListenerGuard { inner: Arc::downgrade(&self.0.0), id }
    }
}

impl<T> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            // Bind the removed listener so it is dropped after the lock is released
            let _removed = inner.listeners.write().expect("listeners lock poisoned").remove(&self.id);
        }
    }
}

impl<F, T> IntoBroadcastListener<T> for F
where F: Fn(T) + Send + Sync + 'static
{
    fn into_broadcast_listener(self) -> Listener<T> { Arc::new(self) }
}

impl<T> IntoBroadcastListener<T> for Listener<T> {
    fn into_broadcast_listener(self) -> Listener<T> { self }
}
