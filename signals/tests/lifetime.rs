use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use steady_signals::*;
mod common;
use common::change_watcher;

#[test]
fn test_late_subscriber_gets_only_current_then_later() {
    let scope = Scope::new();
    let raw = Subject::new();
    let signal = Signal::from_stream(0, raw.observable(), &scope);

    let (early_watcher, early) = change_watcher();
    let _early = signal.subscribe_now(early_watcher);
    raw.send(1);
    raw.send(2);

    let (late_watcher, late) = change_watcher();
    let _late = signal.as_observable().subscribe(late_watcher);
    raw.send(3);

    assert_eq!(early(), [0, 1, 2, 3]);
    assert_eq!(late(), [2, 3]);
}

#[test]
fn test_as_observable_connects_once_and_restarts() {
    let scope = Scope::new();
    let raw = Subject::new();
    let connections = Arc::new(AtomicUsize::new(0));
    let counted = {
        let connections = connections.clone();
        let raw = raw.observable();
        Observable::new(move |sink| {
            connections.fetch_add(1, Ordering::SeqCst);
            raw.subscribe_sink(sink)
        })
    };
    let combined = Signal::combine_latest(&Signal::from_stream(1, counted, &scope), &Signal::constant(10), |a, b| a + b);
    let view = combined.as_observable();

    let first = view.subscribe(|_| {});
    let second = view.subscribe(|_| {});
    raw.send(2);
    assert_eq!(combined.value(), 12);
    drop((first, second));

    let (watcher, check) = change_watcher();
    let _third = view.subscribe(watcher);
    raw.send(3);
    assert_eq!(check(), [12, 13]);
    // the raw stream is bound once, by the source signal itself
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[test]
fn test_disposal_keeps_last_value() {
    let scope = Scope::new();
    let raw = Subject::new();
    let signal = Signal::from_stream("first", raw.observable(), &scope);
    let (watcher, check) = change_watcher();
    let _subscription = signal.subscribe(watcher);

    raw.send("second");
    scope.dispose();
    raw.send("third");

    assert!(signal.is_disposed());
    assert_eq!(signal.value(), "second");
    assert_eq!(check(), ["second"]);
    assert_eq!(raw.subscriber_count(), 0);
}

#[test]
fn test_disposal_is_transitive_through_the_graph() {
    let scope = Scope::new();
    let (left, right) = (Subject::new(), Subject::new());
    let inner_raw = Subject::new();
    let a = Signal::from_stream(1, left.observable(), &scope);
    let b = Signal::from_stream(2, right.observable(), &scope);

    let inner_scope = Scope::new();
    let flat = {
        let inner_raw = inner_raw.clone();
        let inner_scope = inner_scope.clone();
        a.flat_map(move |n| Signal::from_stream(*n, inner_raw.observable(), &inner_scope))
    };
    let combined = Signal::combine_latest(&flat, &b, |x, y| x * 100 + y);
    let labelled = combined.map(|n| format!("<{n}>"));
    assert_eq!(labelled.value(), "<102>");

    scope.dispose();
    for signal in [&a, &b, &flat, &combined] {
        assert!(signal.is_disposed());
    }
    assert!(labelled.is_disposed());
    assert_eq!(left.subscriber_count() + right.subscriber_count(), 0);

    // inner signals outlive the flat signal's scope only as long as something else holds them
    inner_raw.send(9);
    assert_eq!(labelled.value(), "<102>");
}

#[test]
fn test_disposing_a_derived_signal_leaves_upstream_running() {
    let scope = Scope::new();
    let raw = Subject::new();
    let source = Signal::from_stream(1, raw.observable(), &scope);
    let plus = Signal::combine_latest(&source, &Signal::constant(1), |a, b| a + b);

    plus.dispose();
    raw.send(5);
    assert_eq!(source.value(), 5);
    assert_eq!(plus.value(), 2);
}

#[test]
fn test_flat_map_latest_holds_one_inner_subscription() {
    let scope = Scope::new();
    let source = Subject::new();
    let inner_raw = Subject::new();
    let inner_scope = Scope::new();
    let flat = {
        let inner_raw = inner_raw.clone();
        let inner_scope = inner_scope.clone();
        Signal::from_stream(0, source.observable(), &scope)
            .flat_map_latest(move |n| Signal::from_stream(*n, inner_raw.observable().map(|m: i32| m * 1000), &inner_scope))
    };
    let (watcher, check) = change_watcher();
    let _subscription = flat.subscribe(watcher);

    for n in 1..=5 {
        source.send(n);
        assert_eq!(inner_raw.subscriber_count(), 1);
    }
    inner_raw.send(7);
    assert_eq!(check(), [1, 2, 3, 4, 5, 7000]);
}

#[test]
fn test_flat_map_retains_every_inner_subscription() {
    let scope = Scope::new();
    let source = Subject::new();
    let inner_raw = Subject::new();
    let inner_scope = Scope::new();
    let flat = {
        let inner_raw = inner_raw.clone();
        let inner_scope = inner_scope.clone();
        Signal::from_stream(0, source.observable(), &scope)
            .flat_map(move |n| {
                let n = *n;
                Signal::from_stream(n, inner_raw.observable().map(move |m: i32| m + n), &inner_scope)
            })
    };
    source.send(10);
    source.send(20);
    assert_eq!(inner_raw.subscriber_count(), 3);

    let (watcher, check) = change_watcher();
    let _subscription = flat.subscribe(watcher);
    inner_raw.send(1);
    assert_eq!(check(), [1, 11, 21]);

    scope.dispose();
    assert_eq!(inner_raw.subscriber_count(), 0);
}

#[test]
fn test_disposal_during_delivery_stops_later_bindings() {
    let scope = Scope::new();
    let raw = Subject::new();
    let a = Signal::from_stream(0, raw.observable(), &scope);
    let b = Signal::from_stream(0, raw.observable(), &scope);
    let _disposer = {
        let scope = scope.clone();
        a.subscribe(move |_: i32| scope.dispose())
    };
    let (watcher, check) = change_watcher();
    let _subscription = b.subscribe(watcher);

    // b's binding was already in the raw stream's delivery list when a's listener disposed the scope
    raw.send(1);
    assert_eq!(a.value(), 1);
    assert!(b.is_disposed());
    assert_eq!(b.value(), 0);
    assert!(check().is_empty());
}

#[test]
fn test_disposing_a_node_disposes_signals_mapped_from_it() {
    let scope = Scope::new();
    let (left, right) = (Subject::new(), Subject::new());
    let a = Signal::from_stream(1, left.observable(), &scope);
    let b = Signal::from_stream(2, right.observable(), &scope);
    let c = Signal::combine_latest(&a, &b, |a, b| a + b);
    let m = c.map(|n| n * 10);
    let through_dropped = c.map(|n| n + 1).map(|n| n * 2);

    c.dispose();
    left.send(5);

    assert_eq!(a.value(), 5);
    assert!(m.is_disposed());
    assert!(through_dropped.is_disposed());
    assert_eq!(c.value(), 3);
    assert_eq!(m.value(), c.value() * 10);
    assert_eq!(through_dropped.value(), (c.value() + 1) * 2);
}

#[test]
fn test_dropping_an_intermediate_map_keeps_the_remapped_signal_running() {
    let scope = Scope::new();
    let raw = Subject::new();
    let source = Signal::from_stream(1, raw.observable(), &scope);
    let flat = source.flat_map_latest(|n| Signal::constant(n + 1));
    let from_source = source.map(|n| n + 1).map(|n| n * 2);
    let from_flat = flat.map(|n| n * 3).map(|n| n - 1);

    raw.send(4);
    assert!(!from_source.is_disposed());
    assert!(!from_flat.is_disposed());
    assert_eq!(from_source.value(), 10);
    assert_eq!(from_flat.value(), 14);

    scope.dispose();
    assert!(from_source.is_disposed());
    assert!(from_flat.is_disposed());
}
