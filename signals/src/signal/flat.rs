use std::sync::Arc;

use super::{Lineage, Read, Signal, Transform, Value};
use crate::{observable::Observable, scope::Scope};

impl<E: Value> Signal<E> {
    /// Flatten with union semantics.
    ///
    /// The initial value is that of `selector(self.value())`. Every later value of `self` selects a new inner signal
    /// whose whole value sequence, current value included, is merged into the result. Earlier inner signals stay
    /// subscribed until this signal is disposed.
    pub fn flat_map<R, F>(&self, selector: F) -> Signal<R>
    where
        R: Value,
        F: Fn(&E) -> Signal<R> + Send + Sync + 'static,
    {
        let (current, selected) = select(self, selector);
        union(current, selected, vec![self.scope().clone()])
    }

    /// Flatten with switch semantics.
    ///
    /// Like [`Signal::flat_map`], but at most one inner signal is listened to: each later value of `self` releases the
    /// previous inner subscription before the newly selected inner signal is subscribed.
    pub fn flat_map_latest<R, F>(&self, selector: F) -> Signal<R>
    where
        R: Value,
        F: Fn(&E) -> Signal<R> + Send + Sync + 'static,
    {
        let (current, selected) = select(self, selector);
        switch(current, selected, vec![self.scope().clone()])
    }
}

/// The inner signal for the current source value, and one inner signal per later source value
fn select<E, R, F>(source: &Signal<E>, selector: F) -> (Read<Signal<R>>, Observable<Signal<R>>)
where
    E: Value,
    R: Value,
    F: Fn(&E) -> Signal<R> + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    let current: Read<Signal<R>> = {
        let source = source.clone();
        let selector = selector.clone();
        Arc::new(move || source.with(|value| selector(value)))
    };
    let selected = source.changes().map(move |value| selector(&value));
    (current, selected)
}

/// Streams of every inner signal: the first contributes only its later values
fn inner_streams<R: Value>(first: &Signal<R>, selected: &Observable<Signal<R>>) -> Observable<Observable<R>> {
    selected.map(|inner: Signal<R>| inner.as_observable()).start_with(first.changes())
}

fn union<R: Value>(current: Read<Signal<R>>, selected: Observable<Signal<R>>, owners: Vec<Scope>) -> Signal<R> {
    let first = current();
    let changes = Observable::merge_all(inner_streams(&first, &selected));
    Signal::build(first.value(), changes, Lineage::UnionFlat { current, selected, owners })
}

fn switch<R: Value>(current: Read<Signal<R>>, selected: Observable<Signal<R>>, owners: Vec<Scope>) -> Signal<R> {
    let first = current();
    let changes = Observable::switch_latest(inner_streams(&first, &selected));
    Signal::build(first.value(), changes, Lineage::SwitchFlat { current, selected, owners })
}

/// Push `transform` into the selector: every inner signal gets mapped instead of the flattened result
fn map_inner<E: Value, R: Value>(
    current: &Read<Signal<E>>,
    selected: &Observable<Signal<E>>,
    transform: Transform<E, R>,
) -> (Read<Signal<R>>, Observable<Signal<R>>) {
    let mapped_current: Read<Signal<R>> = {
        let current = current.clone();
        let transform = transform.clone();
        Arc::new(move || {
            let transform = transform.clone();
            current().map(move |value| transform(value))
        })
    };
    let mapped_selected = selected.map(move |inner: Signal<E>| {
        let transform = transform.clone();
        inner.map(move |value| transform(value))
    });
    (mapped_current, mapped_selected)
}

pub(super) fn remap_union<E: Value, R: Value>(
    current: &Read<Signal<E>>,
    selected: &Observable<Signal<E>>,
    owners: &[Scope],
    transform: Transform<E, R>,
) -> Signal<R> {
    let (current, selected) = map_inner(current, selected, transform);
    union(current, selected, owners.to_vec())
}

pub(super) fn remap_switch<E: Value, R: Value>(
    current: &Read<Signal<E>>,
    selected: &Observable<Signal<E>>,
    owners: &[Scope],
    transform: Transform<E, R>,
) -> Signal<R> {
    let (current, selected) = map_inner(current, selected, transform);
    switch(current, selected, owners.to_vec())
}
