use std::sync::Arc;

use super::{Lineage, Read, Signal, Transform, Value};
use crate::{observable::Observable, scope::Scope};

/// A map node directly over `upstream`
pub(super) fn over<E: Value, R: Value>(upstream: &Signal<E>, transform: Transform<E, R>) -> Signal<R> {
    let read: Read<R> = {
        let upstream = upstream.clone();
        let transform = transform.clone();
        Arc::new(move || upstream.with(|value| transform(value)))
    };
    let changes = upstream.changes().map(move |value| transform(&value));
    build(read, changes, vec![upstream.scope().clone()])
}

/// Mapping a map node composes the transforms over the same upstream
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

fn build<R: Value>(read: Read<R>, changes: Observable<R>, owners: Vec<Scope>) -> Signal<R> {
    Signal::build(read(), changes.clone(), Lineage::Map { read, changes, owners })
}
