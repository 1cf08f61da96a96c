//! Reducer-backed reactive store
//!
//! The store publishes every registry change on a `watch` channel. Each
//! subscriber holds a receiver for as long as it cares about updates and
//! unsubscribes by dropping it.

use super::{
    action::ModalAction,
    reducer::{reduce, MountRecord},
    types::ModalStore,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Receiver half handed to subscribers
pub type StoreReceiver = watch::Receiver<Arc<ModalStore>>;

/// Live modal registry owned by a mounted provider
#[derive(Debug)]
pub struct ReactiveStore {
    state: watch::Sender<Arc<ModalStore>>,
    mounted: Arc<MountRecord>,
}

impl ReactiveStore {
    /// Create an empty store reducing against `mounted`
    pub fn new(mounted: Arc<MountRecord>) -> Self {
        let (state, _) = watch::channel(Arc::new(ModalStore::new()));
        Self { state, mounted }
    }

    /// Run `action` through the reducer; returns true if the registry changed
    pub fn dispatch(&self, action: &ModalAction) -> bool {
        let mounted = &self.mounted;
        let changed = self.state.send_if_modified(|current| {
            let next = reduce(current, action, mounted);
            if Arc::ptr_eq(current, &next) {
                false
            } else {
                *current = next;
                true
            }
        });

        trace!("Action {} changed registry: {}", action.kind(), changed);
        changed
    }

    /// Current registry
    pub fn snapshot(&self) -> Arc<ModalStore> {
        Arc::clone(&self.state.borrow())
    }

    /// Subscribe to registry changes
    pub fn subscribe(&self) -> StoreReceiver {
        self.state.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }
}
