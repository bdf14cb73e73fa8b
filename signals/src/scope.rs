use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, Weak},
};

use tracing::debug;

use crate::subscription::Subscription;

/// Owner of subscriptions and child scopes, released together exactly once.
///
/// Every signal node owns a scope that is a child of its upstream signals' scopes. Disposing a scope releases its
/// subscriptions, disposes its live children and followers, then runs its disposal callbacks. A scope whose last
/// handle is dropped releases what it owns and disposes its children, but not its followers.
///
/// ```rust
/// use steady_signals::*;
///
/// let scope = Scope::new();
/// let child = scope.child();
/// scope.dispose();
/// assert!(child.is_disposed());
/// ```
#[derive(Clone)]
pub struct Scope(Arc<Inner>);

struct Inner {
    state: Mutex<State>,
}

enum State {
    Open(Resources),
    Disposed,
}

#[derive(Default)]
struct Resources {
    subscriptions: Vec<Subscription>,
    children: Vec<Weak<Inner>>,
    /// Disposed with this scope, but left running when it is only dropped
    followers: Vec<Weak<Inner>>,
    /// Scopes this one follows
    leaders: Vec<Weak<Inner>>,
    on_dispose: BTreeMap<u64, Box<dyn FnOnce() + Send>>,
    next_callback: u64,
}

impl Default for Scope {
    fn default() -> Self { Self::new() }
}

impl Scope {
    pub fn new() -> Self { Self(Arc::new(Inner { state: Mutex::new(State::Open(Resources::default())) })) }

    /// Create a scope that is disposed along with this one
    pub fn child(&self) -> Scope { Self::child_of([self]) }

    /// Create a scope that is disposed when any of `parents` is disposed
    pub fn child_of<'a>(parents: impl IntoIterator<Item = &'a Scope>) -> Scope {
        let child = Scope::new();
        for parent in parents {
            parent.adopt(&child);
        }
        child
    }

    fn adopt(&self, child: &Scope) {
        let mut state = self.0.state.lock().expect("scope lock poisoned");
        if let State::Open(resources) = &mut *state {
            resources.children.retain(|child| child.strong_count() > 0);
            resources.children.push(Arc::downgrade(&child.0));
            return;
        }
        drop(state);
        child.dispose();
    }

    /// Dispose this scope whenever `leader`, or any scope `leader` follows, is disposed.
    ///
    /// Unlike a child, a follower keeps running when `leader` is dropped without being disposed.
    pub(crate) fn follow(&self, leader: &Scope) {
        let mut leaders = leader.leaders();
        leaders.push(leader.clone());
        for leader in leaders {
            leader.add_follower(self);
        }
    }

    fn leaders(&self) -> Vec<Scope> {
        match &*self.0.state.lock().expect("scope lock poisoned") {
            State::Open(resources) => resources.leaders.iter().filter_map(Weak::upgrade).map(Scope).collect(),
            State::Disposed => Vec::new(),
        }
    }

    fn add_follower(&self, follower: &Scope) {
        let added = match &mut *self.0.state.lock().expect("scope lock poisoned") {
            State::Open(resources) => {
                resources.followers.retain(|follower| follower.strong_count() > 0);
                resources.followers.push(Arc::downgrade(&follower.0));
                true
            }
            State::Disposed => false,
        };
        if !added {
            follower.dispose();
            return;
        }
        if let State::Open(resources) = &mut *follower.0.state.lock().expect("scope lock poisoned") {
            resources.leaders.retain(|leader| leader.strong_count() > 0);
            resources.leaders.push(Arc::downgrade(&self.0));
        }
    }

    /// Transfer ownership of a subscription to this scope.
    /// A subscription inserted into a disposed scope is released immediately.
    pub fn insert(&self, subscription: Subscription) {
        let mut state = self.0.state.lock().expect("scope lock poisoned");
        if let State::Open(resources) = &mut *state {
            resources.subscriptions.push(subscription);
            return;
        }
        drop(state);
        debug!("releasing subscription inserted into a disposed scope");
        subscription.unsubscribe();
    }

    /// Run `callback` once when this scope is disposed, or now if it already is
    pub fn on_dispose<F>(&self, callback: F)
    where F: FnOnce() + Send + 'static {
        if let Err(callback) = self.register(Box::new(callback)) {
            callback();
        }
    }

    /// Like [`Scope::on_dispose`], but releasing the returned subscription unregisters `callback` without running it.
    pub fn on_dispose_guarded<F>(&self, callback: F) -> Subscription
    where F: FnOnce() + Send + 'static {
        match self.register(Box::new(callback)) {
            Ok(id) => {
                let inner = Arc::downgrade(&self.0);
                Subscription::new(move || {
                    if let Some(inner) = inner.upgrade() {
                        Scope(inner).unregister(id);
                    }
                })
            }
            Err(callback) => {
                callback();
                Subscription::empty()
            }
        }
    }

    fn register(&self, callback: Box<dyn FnOnce() + Send>) -> Result<u64, Box<dyn FnOnce() + Send>> {
        let mut state = self.0.state.lock().expect("scope lock poisoned");
        let State::Open(resources) = &mut *state else {
            return Err(callback);
        };
        let id = resources.next_callback;
        resources.next_callback += 1;
        resources.on_dispose.insert(id, callback);
        Ok(id)
    }

    fn unregister(&self, id: u64) {
        let removed = match &mut *self.0.state.lock().expect("scope lock poisoned") {
            State::Open(resources) => resources.on_dispose.remove(&id),
            State::Disposed => None,
        };
        // the callback may own the last handle to something that locks this scope on drop
        drop(removed);
    }

    /// Release everything this scope owns. Only the first call has any effect.
    pub fn dispose(&self) {
        let resources = {
            let mut state = self.0.state.lock().expect("scope lock poisoned");
            match std::mem::replace(&mut *state, State::Disposed) {
                State::Open(resources) => resources,
                State::Disposed => return,
            }
        };
        resources.release();
    }

    pub fn is_disposed(&self) -> bool { matches!(*self.0.state.lock().expect("scope lock poisoned"), State::Disposed) }

    pub fn ptr_eq(&self, other: &Scope) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    #[cfg(test)]
    pub(crate) fn callback_count(&self) -> usize {
        match &*self.0.state.lock().expect("scope lock poisoned") {
            State::Open(resources) => resources.on_dispose.len(),
            State::Disposed => 0,
        }
    }
}

impl Resources {
    fn release(self) {
        debug!(
            subscriptions = self.subscriptions.len(),
            children = self.children.len(),
            followers = self.followers.len(),
            callbacks = self.on_dispose.len(),
            "disposing scope"
        );
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
        for scope in self.children.into_iter().chain(self.followers) {
            if let Some(scope) = scope.upgrade() {
                Scope(scope).dispose();
            }
        }
        for callback in self.on_dispose.into_values() {
            callback();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let State::Open(mut resources) = std::mem::replace(state, State::Disposed) {
            // followers only go with an explicit disposal
            resources.followers.clear();
            resources.release();
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("disposed", &self.is_disposed()).finish()
    }
}
