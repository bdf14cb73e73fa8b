use crate::{
    signal::{Signal, Value},
    subscription::Subscription,
};

/// A boxed listener accepted by [`Subscribe`]
pub type SubscribeListener<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

/// Anything that can receive signal values: closures, and the sending half of a channel
pub trait IntoSubscribeListener<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T>;
}

/// Listen to a signal without going through [`Signal::as_observable`]
pub trait Subscribe<T: 'static> {
    /// Receive every later value, not the current one
    fn subscribe<F>(&self, listener: F) -> Subscription
    where F: IntoSubscribeListener<T>;

    /// Receive the current value immediately, then every later value
    fn subscribe_now<F>(&self, listener: F) -> Subscription
    where F: IntoSubscribeListener<T>;
}

impl<E: Value> Subscribe<E> for Signal<E> {
    fn subscribe<F>(&self, listener: F) -> Subscription
    where F: IntoSubscribeListener<E> {
        let listener = listener.into_subscribe_listener();
        self.changes().subscribe(move |value| listener(value))
    }

    fn subscribe_now<F>(&self, listener: F) -> Subscription
    where F: IntoSubscribeListener<E> {
        let listener = listener.into_subscribe_listener();
        self.as_observable().subscribe(move |value| listener(value))
    }
}

impl<T: Send + 'static> IntoSubscribeListener<T> for std::sync::mpsc::Sender<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T> {
        Box::new(move |value| {
            let _ = self.send(value);
        })
    }
}

#[cfg(feature = "tokio")]
impl<T: Send + 'static> IntoSubscribeListener<T> for tokio::sync::mpsc::UnboundedSender<T> {
    fn into_subscribe_listener(self) -> SubscribeListener<T> {
        Box::new(move |value| {
            let _ = self.send(value);
        })
    }
}

impl<F, T> IntoSubscribeListener<T> for F
where F: Fn(T) + Send + Sync + 'static
{
    fn into_subscribe_listener(self) -> SubscribeListener<T> { Box::new(self) }
}
