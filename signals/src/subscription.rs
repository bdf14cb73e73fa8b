/// Handle to a live subscription.
///
/// The subscription is released exactly once: on [`Subscription::unsubscribe`], or when the handle is dropped.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// A subscription that runs `release` when it is released
    pub fn new<F>(release: F) -> Self
    where F: FnOnce() + Send + 'static {
        Self { release: Some(Box::new(release)) }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self { Self { release: None } }

    /// Holds `guard` until release, e.g. a broadcast `ListenerGuard`
    pub fn guard<G: Send + 'static>(guard: G) -> Self { Self::new(move || drop(guard)) }

    /// Aggregate several subscriptions into one, released in order
    pub fn all(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
        })
    }

    pub fn unsubscribe(mut self) { self.release(); }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) { self.release(); }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("live", &self.release.is_some()).finish()
    }
}
