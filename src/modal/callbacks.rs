//! Pending show/hide outcomes
//!
//! Each modal id has at most one pending callback per verb. A promise is a
//! shared future over a oneshot channel: every caller that asked for the same
//! pending callback awaits the same settlement. Discarding a callback drops
//! its sender, and the promise then stays pending forever.

use super::types::{ModalId, ModalOutcome};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tracing::debug;

/// Which outcome a callback belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Show,
    Hide,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Show => write!(f, "show"),
            Self::Hide => write!(f, "hide"),
        }
    }
}

/// Receiver that never completes once its sender is gone
struct Outcome(oneshot::Receiver<ModalOutcome>);

impl Future for Outcome {
    type Output = ModalOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.0.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Abandoned: nobody will ever settle this promise
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Pending,
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Awaitable result of a `show` or `hide` request
#[derive(Clone)]
pub struct ModalPromise {
    inner: Shared<Outcome>,
}

impl ModalPromise {
    /// True if both promises wait on the same pending callback
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Settled outcome, if any, without waiting
    pub fn peek(&self) -> Option<&ModalOutcome> {
        self.inner.peek()
    }
}

impl Future for ModalPromise {
    type Output = ModalOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for ModalPromise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalPromise").field("settled", &self.peek()).finish()
    }
}

struct Deferred {
    sender: oneshot::Sender<ModalOutcome>,
    promise: ModalPromise,
}

impl Deferred {
    fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender,
            promise: ModalPromise {
                inner: Outcome(receiver).shared(),
            },
        }
    }
}

/// Pending callbacks keyed by verb and modal id
#[derive(Default)]
pub struct CallbackTable {
    pending: Mutex<HashMap<(Verb, ModalId), Deferred>>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promise for the pending callback, creating one if none exists
    pub fn ensure(&self, verb: Verb, id: &ModalId) -> ModalPromise {
        let mut pending = self.lock();
        pending
            .entry((verb, id.clone()))
            .or_insert_with(|| {
                debug!("Creating pending {} callback for {}", verb, id);
                Deferred::new()
            })
            .promise
            .clone()
    }

    /// Remove the pending callback and deliver `outcome`; false if none was pending
    pub fn settle(&self, verb: Verb, id: &ModalId, outcome: ModalOutcome) -> bool {
        let deferred = self.lock().remove(&(verb, id.clone()));
        match deferred {
            Some(deferred) => {
                debug!("Settling {} callback for {} (ok: {})", verb, id, outcome.is_ok());
                // The caller may have dropped every promise clone already
                let _ = deferred.sender.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop the pending callback without settling it
    pub fn discard(&self, verb: Verb, id: &ModalId) -> bool {
        let discarded = self.lock().remove(&(verb, id.clone())).is_some();
        if discarded {
            debug!("Abandoning {} callback for {}", verb, id);
        }
        discarded
    }

    pub fn is_pending(&self, verb: Verb, id: &ModalId) -> bool {
        self.lock().contains_key(&(verb, id.clone()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(Verb, ModalId), Deferred>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_shared_promise_settles_all_waiters() {
        let table = CallbackTable::new();
        let id = ModalId::from("B");

        let first = table.ensure(Verb::Show, &id);
        let second = table.ensure(Verb::Show, &id);
        assert!(first.ptr_eq(&second));

        assert!(table.settle(Verb::Show, &id, Ok(json!("done"))));
        assert_eq!(first.await, Ok(json!("done")));
        assert_eq!(second.await, Ok(json!("done")));

        let third = table.ensure(Verb::Show, &id);
        assert!(third.peek().is_none());
    }

    #[test]
    fn test_settle_is_at_most_once() {
        let table = CallbackTable::new();
        let id = ModalId::from("B");
        let promise = table.ensure(Verb::Show, &id);

        assert!(table.settle(Verb::Show, &id, Err(json!("no"))));
        assert!(!table.settle(Verb::Show, &id, Ok(json!("yes"))));
        assert_eq!(promise.now_or_never(), Some(Err(json!("no"))));
    }

    #[test]
    fn test_discarded_promise_stays_pending() {
        let table = CallbackTable::new();
        let id = ModalId::from("C");
        let promise = table.ensure(Verb::Hide, &id);

        assert!(table.discard(Verb::Hide, &id));
        assert!(!table.is_pending(Verb::Hide, &id));
        assert!(promise.clone().now_or_never().is_none());
        assert!(promise.peek().is_none());
    }

    #[test]
    fn test_verbs_are_independent() {
        let table = CallbackTable::new();
        let id = ModalId::from("A");
        let show = table.ensure(Verb::Show, &id);
        let hide = table.ensure(Verb::Hide, &id);
        assert!(!show.ptr_eq(&hide));

        table.settle(Verb::Hide, &id, Ok(json!(null)));
        assert!(table.is_pending(Verb::Show, &id));
        assert!(show.now_or_never().is_none());
    }
}
