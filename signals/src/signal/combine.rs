use std::sync::Arc;

use super::{Lineage, Read, Signal, Transform, Value};
use crate::{observable::Observable, scope::Scope};

impl<E: Value> Signal<E> {
    /// A signal whose value is always `combine(a.value(), b.value())`.
    ///
    /// It updates once for every update of either input, paired with the latest value of the other. The result is
    /// owned by both inputs' scopes: disposing either one disposes it.
    pub fn combine_latest<A, B, F>(a: &Signal<A>, b: &Signal<B>, combine: F) -> Self
    where
        A: Value,
        B: Value,
        F: Fn(&A, &B) -> E + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        let read: Read<E> = {
            let (a, b, combine) = (a.clone(), b.clone(), combine.clone());
            Arc::new(move || combine(&a.value(), &b.value()))
        };
        let changes = Observable::combine_latest(&a.as_observable(), &b.as_observable(), move |a, b| combine(a, b)).skip(1);
        build(read, changes, vec![a.scope().clone(), b.scope().clone()])
    }

    /// [`Signal::combine_latest`] over any number of signals of one type. `combine` receives their values in input
    /// order.
    pub fn combine_latest_all<I, F>(signals: &[Signal<I>], combine: F) -> Self
    where
        I: Value,
        F: Fn(&[I]) -> E + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        let read: Read<E> = {
            let (signals, combine) = (signals.to_vec(), combine.clone());
            Arc::new(move || combine(&signals.iter().map(Signal::value).collect::<Vec<I>>()))
        };
        let streams = signals.iter().map(Signal::as_observable).collect();
        let changes = Observable::combine_latest_all(streams, move |values| combine(values)).skip(1);
        build(read, changes, signals.iter().map(|signal| signal.scope().clone()).collect())
    }
}

fn build<E: Value>(read: Read<E>, changes: Observable<E>, owners: Vec<Scope>) -> Signal<E> {
    Signal::build(read(), changes.clone(), Lineage::Combine { read, changes, owners })
}

/// Mapping a combined signal folds the transform into the combiner
pub(super) fn remap<E: Value, R: Value>(
    read: &Read<E>,
    changes: &Observable<E>,
    owners: &[Scope],
    transform: Transform<E, R>,
) -> Signal<R> {
    let read: Read<R> = {
        let read = read.clone();
        let transform = transform.clone();
        Arc::new(move || transform(&read()))
    };
    let changes = changes.map(move |value| transform(&value));
    build(read, changes, owners.to_vec())
}
