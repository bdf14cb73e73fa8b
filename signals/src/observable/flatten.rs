use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::{observable::Observable, subscription::Subscription};

impl<T: Send + 'static> Observable<T> {
    /// Fan-in over a fixed set of streams, delivering in arrival order
    pub fn merge<I>(streams: I) -> Self
    where I: IntoIterator<Item = Observable<T>> {
        let streams: Vec<Observable<T>> = streams.into_iter().collect();
        Self::new(move |sink| Subscription::all(streams.iter().map(|stream| stream.subscribe_sink(sink.clone())).collect()))
    }

    /// Fan-in over every stream `outer` produces. Inner subscriptions are kept until the merged subscription is
    /// released.
    pub fn merge_all(outer: Observable<Observable<T>>) -> Self {
        Self::new(move |sink| {
            // None once the merged subscription has been released
            let inners: Arc<Mutex<Option<Vec<Subscription>>>> = Arc::new(Mutex::new(Some(Vec::new())));

            let outer_subscription = {
                let inners = inners.clone();
                outer.subscribe(move |inner: Observable<T>| {
                    let subscription = inner.subscribe_sink(sink.clone());
                    let mut guard = inners.lock().expect("merge lock poisoned");
                    let rejected = match guard.as_mut() {
                        Some(live) => {
                            live.push(subscription);
                            None
                        }
                        None => Some(subscription),
                    };
                    drop(guard);
                    drop(rejected);
                })
            };

            Subscription::new(move || {
                outer_subscription.unsubscribe();
                let live = inners.lock().expect("merge lock poisoned").take();
                drop(live);
            })
        })
    }

    /// Fan-in that only ever listens to the most recent stream `outer` produced. The previous inner subscription is
    /// released before the next one is made.
    pub fn switch_latest(outer: Observable<Observable<T>>) -> Self {
        Self::new(move |sink| {
            let switch = Arc::new(Switch { generation: AtomicU64::new(0), active: Mutex::new(None) });

            let outer_subscription = {
                let switch = switch.clone();
                outer.subscribe(move |inner: Observable<T>| {
                    let generation = switch.generation.fetch_add(1, Ordering::SeqCst) + 1;
                    let superseded = switch.active.lock().expect("switch lock poisoned").take();
                    if let Some(superseded) = superseded {
                        trace!(generation, "switch_latest releasing superseded inner stream");
                        superseded.unsubscribe();
                    }

                    let subscription = {
                        let switch = switch.clone();
                        let sink = sink.clone();
                        inner.subscribe(move |value| {
                            // a superseded inner may still emit re-entrantly; never let it through
                            if switch.generation.load(Ordering::SeqCst) == generation {
                                sink(value);
                            }
                        })
                    };

                    let mut active = switch.active.lock().expect("switch lock poisoned");
                    if switch.generation.load(Ordering::SeqCst) == generation {
                        *active = Some(subscription);
                    } else {
                        drop(active);
                        subscription.unsubscribe();
                    }
                })
            };

            Subscription::new(move || {
                outer_subscription.unsubscribe();
                switch.generation.fetch_add(1, Ordering::SeqCst);
                let active = switch.active.lock().expect("switch lock poisoned").take();
                drop(active);
            })
        })
    }
}

struct Switch {
    generation: AtomicU64,
    active: Mutex<Option<Subscription>>,
}
