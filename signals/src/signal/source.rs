use super::{Lineage, Signal, Transform, Value};
use crate::{observable::Observable, scope::Scope};

impl<E: Value> Signal<E> {
    /// A signal seeded with `initial` that takes every value `raw` emits as its next value, in emission order.
    ///
    /// The signal's own scope is a child of `scope`.
    pub fn from_stream(initial: E, raw: Observable<E>, scope: &Scope) -> Self { build(initial, raw, vec![scope.clone()]) }

    /// A signal that never changes. It owns a fresh root scope.
    pub fn constant(value: E) -> Self { build(value, Observable::never(), Vec::new()) }
}

fn build<E: Value>(initial: E, raw: Observable<E>, owners: Vec<Scope>) -> Signal<E> {
    Signal::build(initial, raw.clone(), Lineage::Source { raw, owners })
}

/// Mapping a source yields another source over the mapped raw stream, seeded from the current value.
pub(super) fn remap<E: Value, R: Value>(
    signal: &Signal<E>,
    raw: &Observable<E>,
    owners: &[Scope],
    transform: Transform<E, R>,
) -> Signal<R> {
    let initial = signal.with(|value| transform(value));
    let raw = raw.map(move |value| transform(&value));
    build(initial, raw, owners.to_vec())
}
