use crate::{broadcast::Broadcast, observable::Observable, subscription::Subscription};

/// A hot raw stream: values passed to [`Subject::send`] go to every current subscriber, in subscription order.
///
/// Subscribers only see values sent after they subscribed.
pub struct Subject<T>(Broadcast<T>);

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Default for Subject<T> {
    fn default() -> Self { Self(Broadcast::new()) }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject").field("subscribers", &self.subscriber_count()).finish()
    }
}

impl<T> Subject<T> {
    pub fn new() -> Self { Self::default() }

    pub fn subscriber_count(&self) -> usize { self.0.listener_count() }
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn send(&self, value: T) { self.0.send(value) }

    pub fn observable(&self) -> Observable<T> {
        let broadcast = self.0.clone();
        Observable::new(move |sink| Subscription::guard(broadcast.reference().listen(sink)))
    }
}
