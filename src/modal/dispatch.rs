//! Dispatch bridge between imperative callers and the mounted provider
//!
//! The bridge holds one swappable dispatcher. Until a provider binds itself
//! every dispatch fails with [`ModalError::NoProvider`]. Binding again
//! replaces the previous provider silently.

use super::{
    action::ModalAction,
    store::ReactiveStore,
    types::{ModalError, ModalResult},
};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Function that applies an action to the live registry
pub type DispatchFn = Arc<dyn Fn(&ModalAction) -> ModalResult<()> + Send + Sync>;

struct Binding {
    generation: u64,
    dispatch: DispatchFn,
    store: Option<Arc<ReactiveStore>>,
}

impl Binding {
    fn unbound(generation: u64) -> Self {
        Self {
            generation,
            dispatch: Arc::new(|_| Err(ModalError::NoProvider)),
            store: None,
        }
    }
}

/// Swappable slot for the active dispatcher
pub struct DispatchBridge {
    binding: RwLock<Binding>,
}

impl DispatchBridge {
    pub fn new() -> Self {
        Self {
            binding: RwLock::new(Binding::unbound(0)),
        }
    }

    /// Bind the bridge to `store`; returns the binding generation
    pub fn bind(&self, store: Arc<ReactiveStore>) -> u64 {
        let target = Arc::clone(&store);
        let dispatch: DispatchFn = Arc::new(move |action| {
            target.dispatch(action);
            Ok(())
        });
        self.install(dispatch, Some(store))
    }

    /// Bind a custom dispatcher with no backing store
    #[cfg(test)]
    pub(crate) fn bind_fn(&self, dispatch: DispatchFn) -> u64 {
        self.install(dispatch, None)
    }

    /// Restore the failing dispatcher if `generation` is still the bound one
    pub fn unbind(&self, generation: u64) -> bool {
        let mut binding = self.write();
        if binding.generation != generation {
            return false;
        }
        debug!("Unbinding modal dispatcher (generation {})", generation);
        *binding = Binding::unbound(generation + 1);
        true
    }

    /// Forward `action` to the bound dispatcher
    pub fn dispatch(&self, action: &ModalAction) -> ModalResult<()> {
        // Clone out of the lock so the dispatcher may re-enter the bridge
        let dispatch = Arc::clone(&self.read().dispatch);
        debug!(
            "Dispatching {} for {}",
            action.kind(),
            action.modal_id().map(|id| id.as_str()).unwrap_or("-")
        );
        dispatch(action)
    }

    /// Store of the bound provider
    pub fn store(&self) -> ModalResult<Arc<ReactiveStore>> {
        self.read().store.clone().ok_or(ModalError::NoProvider)
    }

    pub fn is_bound(&self) -> bool {
        self.read().store.is_some()
    }

    fn install(&self, dispatch: DispatchFn, store: Option<Arc<ReactiveStore>>) -> u64 {
        let mut binding = self.write();
        let generation = binding.generation + 1;
        debug!("Binding modal dispatcher (generation {})", generation);
        *binding = Binding {
            generation,
            dispatch,
            store,
        };
        generation
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Binding> {
        self.binding.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Binding> {
        self.binding.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DispatchBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{action, reducer::MountRecord};
    use std::sync::Mutex;

    #[test]
    fn test_unbound_bridge_fails() {
        let bridge = DispatchBridge::new();
        assert_eq!(bridge.dispatch(&action::show("A", None)), Err(ModalError::NoProvider));
        assert!(matches!(bridge.store(), Err(ModalError::NoProvider)));
    }

    #[test]
    fn test_latest_binding_wins() {
        let bridge = DispatchBridge::new();
        let mounted = Arc::new(MountRecord::new());
        let first = Arc::new(ReactiveStore::new(Arc::clone(&mounted)));
        let second = Arc::new(ReactiveStore::new(mounted));

        let first_gen = bridge.bind(Arc::clone(&first));
        bridge.bind(Arc::clone(&second));
        bridge.dispatch(&action::show("A", None)).unwrap();

        assert!(first.snapshot().is_empty());
        assert_eq!(second.snapshot().len(), 1);

        // A stale provider cannot unbind its successor
        assert!(!bridge.unbind(first_gen));
        assert!(bridge.is_bound());
    }

    #[test]
    fn test_unbind_restores_failing_dispatcher() {
        let bridge = DispatchBridge::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let generation = bridge.bind_fn(Arc::new(move |action: &ModalAction| {
            sink.lock().unwrap().push(action.clone());
            Ok(())
        }));

        bridge.dispatch(&action::hide("A")).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        assert!(bridge.unbind(generation));
        assert_eq!(bridge.dispatch(&action::hide("A")), Err(ModalError::NoProvider));
    }
}
