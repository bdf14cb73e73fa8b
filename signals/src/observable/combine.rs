use std::sync::{Arc, Mutex};

use crate::{observable::Observable, subscription::Subscription};

impl<T: Send + 'static> Observable<T> {
    /// Emits `combine(a, b)` once both streams have produced a value, then again on every emission of either, paired
    /// with the latest value of the other. Near-simultaneous emissions are never coalesced.
    pub fn combine_latest<A, B, F>(a: &Observable<A>, b: &Observable<B>, combine: F) -> Self
    where
        A: Clone + Send + 'static,
        B: Clone + Send + 'static,
        F: Fn(&A, &B) -> T + Send + Sync + 'static,
    {
        let (a, b) = (a.clone(), b.clone());
        let combine = Arc::new(combine);
        Self::new(move |sink| {
            let latest: Arc<Mutex<(Option<A>, Option<B>)>> = Arc::new(Mutex::new((None, None)));

            let a_subscription = {
                let (latest, combine, sink) = (latest.clone(), combine.clone(), sink.clone());
                a.subscribe(move |value: A| {
                    let pair = {
                        let mut latest = latest.lock().expect("combine lock poisoned");
                        latest.0 = Some(value.clone());
                        latest.1.clone().map(|other| (value, other))
                    };
                    if let Some((a, b)) = pair {
                        sink(combine(&a, &b));
                    }
                })
            };
            let b_subscription = {
                let (latest, combine, sink) = (latest.clone(), combine.clone(), sink.clone());
                b.subscribe(move |value: B| {
                    let pair = {
                        let mut latest = latest.lock().expect("combine lock poisoned");
                        latest.1 = Some(value.clone());
                        latest.0.clone().map(|other| (other, value))
                    };
                    if let Some((a, b)) = pair {
                        sink(combine(&a, &b));
                    }
                })
            };

            Subscription::all(vec![a_subscription, b_subscription])
        })
    }

    /// N-ary [`Observable::combine_latest`] over streams of one type. `combine` receives the latest values in input
    /// order. With no inputs nothing is ever emitted.
    pub fn combine_latest_all<I, F>(streams: Vec<Observable<I>>, combine: F) -> Self
    where
        I: Clone + Send + 'static,
        F: Fn(&[I]) -> T + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        Self::new(move |sink| {
            let latest: Arc<Mutex<Vec<Option<I>>>> = Arc::new(Mutex::new(vec![None; streams.len()]));

            let subscriptions = streams
                .iter()
                .enumerate()
                .map(|(index, stream)| {
                    let (latest, combine, sink) = (latest.clone(), combine.clone(), sink.clone());
                    stream.subscribe(move |value: I| {
                        let values = {
                            let mut latest = latest.lock().expect("combine lock poisoned");
                            latest[index] = Some(value);
                            latest.iter().cloned().collect::<Option<Vec<I>>>()
                        };
                        if let Some(values) = values {
                            sink(combine(&values));
                        }
                    })
                })
                .collect();

            Subscription::all(subscriptions)
        })
    }
}
