use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use steady_signals::*;
mod common;
use common::change_watcher;

#[test]
fn test_map_over_source() {
    let scope = Scope::new();
    let raw = Subject::new();
    let doubled = Signal::from_stream(0, raw.observable(), &scope).map(|x| x * 2);
    assert_eq!(doubled.value(), 0);

    let (watcher, check) = change_watcher();
    let _subscription = doubled.subscribe(watcher);
    for n in [1, 2, 3] {
        raw.send(n);
    }
    assert_eq!(check(), [2, 4, 6]);
}

#[test]
fn test_combine_latest() {
    let scope = Scope::new();
    let (numbers, letters) = (Subject::new(), Subject::new());
    let a = Signal::from_stream(1, numbers.observable(), &scope);
    let b = Signal::from_stream("x".to_string(), letters.observable(), &scope);
    let combined = Signal::combine_latest(&a, &b, |n, s| format!("{s}{n}"));
    assert_eq!(combined.value(), "x1");

    numbers.send(2);
    assert_eq!(combined.value(), "x2");
    letters.send("y".to_string());
    assert_eq!(combined.value(), "y2");
}

/// Inner signals selected by flattening tests: `n` selects a source seeded with `n * 10`
#[derive(Clone, Default)]
struct Inners {
    scope: Scope,
    raw: Arc<Mutex<HashMap<i32, Subject<i32>>>>,
}

impl Inners {
    fn select(&self, n: i32) -> Signal<i32> {
        let raw = self.raw.lock().unwrap().entry(n).or_default().clone();
        Signal::from_stream(n * 10, raw.observable(), &self.scope)
    }

    fn emit(&self, n: i32, value: i32) { self.raw.lock().unwrap()[&n].send(value) }
}

#[test]
fn test_flat_map_drops_nothing() {
    let scope = Scope::new();
    let source = Subject::new();
    let inners = Inners::default();
    let flat = {
        let inners = inners.clone();
        Signal::from_stream(1, source.observable(), &scope).flat_map(move |n| inners.select(*n))
    };
    assert_eq!(flat.value(), 10);

    let (watcher, check) = change_watcher();
    let _subscription = flat.subscribe(watcher);
    source.send(2);
    inners.emit(1, 11);
    inners.emit(2, 21);

    assert_eq!(check(), [20, 11, 21]);
}

#[test]
fn test_flat_map_latest_ignores_superseded_inner() {
    let scope = Scope::new();
    let source = Subject::new();
    let inners = Inners::default();
    let flat = {
        let inners = inners.clone();
        Signal::from_stream(1, source.observable(), &scope).flat_map_latest(move |n| inners.select(*n))
    };
    assert_eq!(flat.value(), 10);

    let (watcher, check) = change_watcher();
    let _subscription = flat.subscribe(watcher);
    source.send(2);
    inners.emit(1, 11);
    inners.emit(2, 21);

    assert_eq!(check(), [20, 21]);
    assert_eq!(flat.value(), 21);
}

#[test]
fn test_chained_combine_latest() {
    let scope = Scope::new();
    let raw: Vec<Subject<i32>> = (0..3).map(|_| Subject::new()).collect();
    let [a, b, c] = [1, 2, 3].map(|n| Signal::from_stream(n, raw[n as usize - 1].observable(), &scope));

    let ab = Signal::combine_latest(&a, &b, |a, b| a + b);
    let abc = Signal::combine_latest(&ab, &c, |ab, c| ab * c);
    assert_eq!(abc.value(), 9);

    raw[0].send(4);
    assert_eq!(abc.value(), 18);
    raw[2].send(1);
    assert_eq!(abc.value(), 6);
}
