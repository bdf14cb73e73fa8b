//! The push-based stream primitive signals are built on.
//!
//! An [`Observable`] is a description of a stream: each call to [`Observable::subscribe`] runs its subscribe function
//! anew and returns a [`Subscription`] that stops delivery when released. There is no failure or completion channel;
//! a stream that stops producing simply goes quiet.

mod combine;
mod flatten;
mod share;
mod subject;

pub use subject::Subject;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::subscription::Subscription;

/// Receives the values of a stream
pub type Sink<T> = crate::broadcast::Listener<T>;

type SubscribeFn<T> = dyn Fn(Sink<T>) -> Subscription + Send + Sync + 'static;

pub struct Observable<T>(Arc<SubscribeFn<T>>);

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("Observable") }
}

impl<T: Send + 'static> Observable<T> {
    pub fn new<F>(subscribe: F) -> Self
    where F: Fn(Sink<T>) -> Subscription + Send + Sync + 'static {
        Self(Arc::new(subscribe))
    }

    pub fn subscribe<F>(&self, on_value: F) -> Subscription
    where F: Fn(T) + Send + Sync + 'static {
        self.subscribe_sink(Arc::new(on_value))
    }

    pub fn subscribe_sink(&self, sink: Sink<T>) -> Subscription { (self.0)(sink) }

    /// A stream that never emits
    pub fn never() -> Self { Self::new(|_| Subscription::empty()) }

    pub fn map<R, F>(&self, transform: F) -> Observable<R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let source = self.clone();
        let transform = Arc::new(transform);
        Observable::new(move |sink: Sink<R>| {
            let transform = transform.clone();
            source.subscribe(move |value| sink(transform(value)))
        })
    }

    /// Drop the first `count` values of every subscription
    pub fn skip(&self, count: usize) -> Self {
        let source = self.clone();
        Self::new(move |sink| {
            let remaining = AtomicUsize::new(count);
            source.subscribe(move |value| {
                let skipped = remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok();
                if !skipped {
                    sink(value);
                }
            })
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// A cold stream that emits `values` synchronously on every subscribe
    pub fn of<I>(values: I) -> Self
    where I: IntoIterator<Item = T> {
        let values: Vec<T> = values.into_iter().collect();
        Self::new(move |sink| {
            for value in values.iter().cloned() {
                sink(value);
            }
            Subscription::empty()
        })
    }

    /// Emit `first` on subscribe, then everything this stream emits
    pub fn start_with(&self, first: T) -> Self {
        let source = self.clone();
        Self::new(move |sink| {
            sink(first.clone());
            source.subscribe_sink(sink)
        })
    }
}
