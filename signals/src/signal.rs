mod combine;
mod flat;
mod map;
mod source;

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{broadcast::Broadcast, observable::Observable, scope::Scope, subscription::Subscription};

/// Bound for anything a signal can hold
pub trait Value: Clone + Send + Sync + 'static {}
impl<T> Value for T where T: Clone + Send + Sync + 'static {}

/// A deferred read of a value, evaluated when a node is (re)built
pub(crate) type Read<T> = Arc<dyn Fn() -> T + Send + Sync + 'static>;

/// A transform erased to one type, so that re-mapping through inner signals does not nest closure types
pub(crate) type Transform<E, R> = Arc<dyn Fn(&E) -> R + Send + Sync + 'static>;

/// An always-valued reactive cell.
///
/// A signal is created with its current value already computed and keeps it current from a live update stream until
/// its [`Scope`] is disposed. After disposal the last value stays readable.
///
/// Cloning a `Signal` shares the same underlying node.
pub struct Signal<E>(Arc<Node<E>>);

struct Node<E> {
    /// Shared with the update binding, which is the only writer
    current: Arc<RwLock<E>>,
    broadcast: Broadcast<E>,
    /// Replays the current value to each new subscriber while connected
    shared: Observable<E>,
    lineage: Lineage<E>,
    scope: Scope,
}

/// How a node was derived, kept so that re-mapping can rebuild from the node's upstream instead of stacking another
/// layer on top of it.
pub(crate) enum Lineage<E> {
    Source { raw: Observable<E>, owners: Vec<Scope> },
    Map { read: Read<E>, changes: Observable<E>, owners: Vec<Scope> },
    UnionFlat { current: Read<Signal<E>>, selected: Observable<Signal<E>>, owners: Vec<Scope> },
    SwitchFlat { current: Read<Signal<E>>, selected: Observable<Signal<E>>, owners: Vec<Scope> },
    Combine { read: Read<E>, changes: Observable<E>, owners: Vec<Scope> },
}

impl<E> Lineage<E> {
    fn owners(&self) -> &[Scope] {
        match self {
            Lineage::Source { owners, .. }
            | Lineage::Map { owners, .. }
            | Lineage::UnionFlat { owners, .. }
            | Lineage::SwitchFlat { owners, .. }
            | Lineage::Combine { owners, .. } => owners,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Lineage::Source { .. } => "source",
            Lineage::Map { .. } => "map",
            Lineage::UnionFlat { .. } => "flat_map",
            Lineage::SwitchFlat { .. } => "flat_map_latest",
            Lineage::Combine { .. } => "combine_latest",
        }
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<E: Value> Signal<E> {
    /// Build a node holding `initial` that takes every value of `changes` as an update.
    pub(crate) fn build(initial: E, changes: Observable<E>, lineage: Lineage<E>) -> Self {
        let scope = Scope::child_of(lineage.owners());
        let current = Arc::new(RwLock::new(initial));
        let broadcast = Broadcast::new();

        // a broadcast already in flight may still reach the binding after the scope is disposed
        let live = Arc::new(AtomicBool::new(true));
        let binding = {
            let live = live.clone();
            let current = current.clone();
            let broadcast = broadcast.clone();
            changes.subscribe(move |value: E| {
                if !live.load(Ordering::SeqCst) {
                    return;
                }
                *current.write().expect("value lock poisoned") = value.clone();
                broadcast.send(value);
            })
        };
        scope.on_dispose(move || live.store(false, Ordering::SeqCst));
        scope.insert(binding);

        let shared = current_then_updates(current.clone(), broadcast.clone()).share_replay_latest();
        tracing::trace!(kind = lineage.kind(), disposed = scope.is_disposed(), "built signal");
        Self(Arc::new(Node { current, broadcast, shared, lineage, scope }))
    }

    /// The current value. Never blocks, never fails.
    pub fn value(&self) -> E { self.0.current.read().expect("value lock poisoned").clone() }

    /// Borrow the current value. The value cannot change while `f` runs.
    pub fn with<R>(&self, f: impl FnOnce(&E) -> R) -> R { f(&self.0.current.read().expect("value lock poisoned")) }

    /// A shared live view: the current value on subscribe, then every later update.
    ///
    /// All subscribers share one connection to this signal, made by the first and released by the last. A subscription
    /// keeps the signal alive.
    pub fn as_observable(&self) -> Observable<E> {
        let node = self.0.clone();
        Observable::new(move |sink| {
            let subscription = node.shared.subscribe_sink(sink);
            let node = node.clone();
            Subscription::new(move || {
                subscription.unsubscribe();
                drop(node);
            })
        })
    }

    /// Updates only, without the current value
    pub(crate) fn changes(&self) -> Observable<E> { self.as_observable().skip(1) }

    /// A signal whose value is always `transform(self.value())`, updated once per update of `self`.
    ///
    /// Re-mapping never stacks: mapping a mapped signal composes the two transforms over the original upstream, and
    /// mapping a flattened or combined signal pushes the transform into its selector. The result is still disposed
    /// along with `self`.
    ///
    /// Mapping a [`Signal::flat_map`] result selects again from the source's current value, so its value is that of
    /// the mapped latest inner signal even when `self` last took a value from an earlier inner signal.
    pub fn map<R, F>(&self, transform: F) -> Signal<R>
    where
        R: Value,
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        let transform: Transform<E, R> = Arc::new(transform);
        if self.is_disposed() {
            // nothing upstream may reach the result any more, so map this frozen node as-is
            return map::over(self, transform);
        }
        let mapped = match &self.0.lineage {
            Lineage::Source { raw, owners } => source::remap(self, raw, owners, transform),
            Lineage::Map { read, changes, owners } => map::remap(read, changes, owners, transform),
            Lineage::UnionFlat { current, selected, owners } => flat::remap_union(current, selected, owners, transform),
            Lineage::SwitchFlat { current, selected, owners } => flat::remap_switch(current, selected, owners, transform),
            Lineage::Combine { read, changes, owners } => combine::remap(read, changes, owners, transform),
        };
        mapped.scope().follow(self.scope());
        mapped
    }

    /// The scope owning this signal's subscriptions
    pub fn scope(&self) -> &Scope { &self.0.scope }

    /// Stop taking updates. The current value stays readable.
    pub fn dispose(&self) { self.0.scope.dispose() }

    pub fn is_disposed(&self) -> bool { self.0.scope.is_disposed() }

    pub fn ptr_eq(&self, other: &Signal<E>) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

/// Emits the current value on subscribe, then whatever the broadcast sends
fn current_then_updates<E: Value>(current: Arc<RwLock<E>>, broadcast: Broadcast<E>) -> Observable<E> {
    Observable::new(move |sink| {
        let value = current.read().expect("value lock poisoned").clone();
        sink(value);
        Subscription::guard(broadcast.reference().listen(sink))
    })
}

impl<E: Value + std::fmt::Debug> std::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| f.debug_struct("Signal").field("kind", &self.0.lineage.kind()).field("value", value).finish())
    }
}

impl<E: Value + std::fmt::Display> std::fmt::Display for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.with(|value| write!(f, "{}", value)) }
}
