use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::{
    broadcast::Broadcast,
    observable::{Observable, Sink},
    subscription::Subscription,
};

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Multiplex one upstream connection over every subscriber.
    ///
    /// The first subscriber connects upstream. Each later subscriber is replayed the latest value, then joins the
    /// live feed. When the last subscriber leaves the connection is released and the latest value forgotten, so the
    /// next subscriber starts a fresh connection.
    pub fn share_replay_latest(&self) -> Self {
        let shared = Arc::new(Shared {
            source: self.clone(),
            broadcast: Broadcast::new(),
            state: Mutex::new(ShareState { subscribers: 0, connection: None, latest: None }),
        });
        Self::new(move |sink| shared.join(sink))
    }
}

struct Shared<T> {
    source: Observable<T>,
    broadcast: Broadcast<T>,
    state: Mutex<ShareState<T>>,
}

struct ShareState<T> {
    subscribers: usize,
    connection: Option<Subscription>,
    latest: Option<T>,
}

impl<T: Clone + Send + Sync + 'static> Shared<T> {
    fn join(self: &Arc<Self>, sink: Sink<T>) -> Subscription {
        let (connect, replay) = {
            let mut state = self.state.lock().expect("share lock poisoned");
            state.subscribers += 1;
            (state.subscribers == 1, state.latest.clone())
        };

        if let Some(latest) = replay {
            sink(latest);
        }
        let guard = self.broadcast.reference().listen(sink);

        if connect {
            trace!("share_replay_latest connecting upstream");
            let weak = Arc::downgrade(self);
            let connection = self.source.subscribe(move |value: T| {
                if let Some(shared) = weak.upgrade() {
                    shared.publish(value);
                }
            });
            let mut state = self.state.lock().expect("share lock poisoned");
            if state.subscribers > 0 && state.connection.is_none() {
                state.connection = Some(connection);
            } else {
                drop(state);
                connection.unsubscribe();
            }
        }

        let shared = self.clone();
        Subscription::new(move || {
            drop(guard);
            shared.leave();
        })
    }

    fn publish(&self, value: T) {
        self.state.lock().expect("share lock poisoned").latest = Some(value.clone());
        self.broadcast.send(value);
    }

    fn leave(&self) {
        let connection = {
            let mut state = self.state.lock().expect("share lock poisoned");
            state.subscribers -= 1;
            if state.subscribers == 0 {
                state.latest = None;
                state.connection.take()
            } else {
                None
            }
        };
        if let Some(connection) = connection {
            trace!("share_replay_latest disconnecting upstream");
            connection.unsubscribe();
        }
    }
}
