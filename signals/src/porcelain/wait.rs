use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::{
    error::SignalError,
    signal::{Signal, Value},
    subscription::Subscription,
};

/// Helper trait for `wait_for` to allow flexible predicate return types.
///
/// ## Semantics
/// - `result()` returns `Some(output)` to stop waiting and return `output`
/// - `result()` returns `None` to continue waiting for the next signal update
pub trait WaitResult {
    type Output;
    /// Returns Some(output) if we should stop waiting, None if we should continue
    fn result(self) -> Option<Self::Output>;
}

// true = stop with (), false = continue waiting
impl WaitResult for bool {
    type Output = ();
    fn result(self) -> Option<Self::Output> { if self { Some(()) } else { None } }
}

// Some(value) = stop with value, None = continue waiting
impl<T> WaitResult for Option<T> {
    type Output = T;
    fn result(self) -> Option<Self::Output> { self }
}

/// Later values of a signal as an async sequence. Ends once the signal is disposed and every buffered value has been
/// taken.
pub struct Updates<E> {
    receiver: mpsc::UnboundedReceiver<E>,
    _subscription: Subscription,
    _on_dispose: Subscription,
}

impl<E> Updates<E> {
    pub async fn next(&mut self) -> Option<E> { self.receiver.recv().await }
}

impl<E: Value> Signal<E> {
    pub fn updates(&self) -> Updates<E> {
        let (tx, receiver) = mpsc::unbounded_channel();
        // dropping the sender on disposal is what ends the sequence
        let sender = Arc::new(Mutex::new(Some(tx)));

        let subscription = {
            let sender = sender.clone();
            self.changes().subscribe(move |value| {
                if let Some(tx) = sender.lock().expect("updates lock poisoned").as_ref() {
                    let _ = tx.send(value);
                }
            })
        };
        let on_dispose = self.scope().on_dispose_guarded(move || {
            sender.lock().expect("updates lock poisoned").take();
        });

        Updates { receiver, _subscription: subscription, _on_dispose: on_dispose }
    }
}

/// Await a signal reaching some value
pub trait Wait<T: 'static> {
    /// Wait for the signal to hold `target_value`
    fn wait_value(&self, target_value: T) -> impl Future<Output = Result<(), SignalError>> + Send
    where T: PartialEq;

    /// Wait for the signal to reach a value matching the given predicate. The current value is checked first.
    fn wait_for<F, R>(&self, predicate: F) -> impl Future<Output = Result<R::Output, SignalError>> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult;
}

impl<E: Value> Wait<E> for Signal<E> {
    fn wait_value(&self, target_value: E) -> impl Future<Output = Result<(), SignalError>> + Send
    where E: PartialEq {
        self.wait_for(move |value| *value == target_value)
    }

    fn wait_for<F, R>(&self, predicate: F) -> impl Future<Output = Result<R::Output, SignalError>> + Send
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
        R: WaitResult,
    {
        let signal = self.clone();
        async move {
            // listen before checking so nothing slips in between
            let mut updates = signal.updates();
            if let Some(result) = signal.with(|value| predicate(value).result()) {
                return Ok(result);
            }

            while let Some(value) = updates.next().await {
                if let Some(result) = predicate(&value).result() {
                    return Ok(result);
                }
            }
            Err(SignalError::Disposed)
        }
    }
}
