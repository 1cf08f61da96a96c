//! Modal context, provider and the imperative API
//!
//! [`ModalContext`] owns everything the modal layer shares between callers:
//! the dispatch bridge, component bindings, generated component ids, the
//! mount record and the pending callbacks. Imperative `show`/`hide`/`remove`
//! can be called from anywhere holding the context, including code outside
//! any component.

use super::{
    action,
    callbacks::{CallbackTable, ModalPromise, Verb},
    dispatch::DispatchBridge,
    reducer::MountRecord,
    registry::{ComponentBinding, ComponentIds, ComponentRef, ModalRegistry},
    store::{ReactiveStore, StoreReceiver},
    types::{ModalArgs, ModalFlags, ModalId, ModalResult, ModalStore},
};
use crate::config::ModalConfig;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// What a modal call addresses: a bare id or a component reference
#[derive(Clone)]
pub enum ModalTarget {
    Id(ModalId),
    Component(ComponentRef),
}

impl From<ModalId> for ModalTarget {
    fn from(id: ModalId) -> Self {
        Self::Id(id)
    }
}

impl From<&ModalId> for ModalTarget {
    fn from(id: &ModalId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for ModalTarget {
    fn from(id: &str) -> Self {
        Self::Id(ModalId::from(id))
    }
}

impl From<String> for ModalTarget {
    fn from(id: String) -> Self {
        Self::Id(ModalId::from(id))
    }
}

impl From<ComponentRef> for ModalTarget {
    fn from(component: ComponentRef) -> Self {
        Self::Component(component)
    }
}

impl From<&ComponentRef> for ModalTarget {
    fn from(component: &ComponentRef) -> Self {
        Self::Component(Arc::clone(component))
    }
}

/// Shared state of the modal layer
pub struct ModalContext {
    config: ModalConfig,
    bridge: DispatchBridge,
    registry: ModalRegistry,
    component_ids: ComponentIds,
    mounted: Arc<MountRecord>,
    callbacks: CallbackTable,
}

static GLOBAL: OnceLock<Arc<ModalContext>> = OnceLock::new();

impl ModalContext {
    /// Create an isolated context
    pub fn new(config: ModalConfig) -> Arc<Self> {
        Arc::new(Self {
            component_ids: ComponentIds::new(config.id_prefix.clone()),
            config,
            bridge: DispatchBridge::new(),
            registry: ModalRegistry::new(),
            mounted: Arc::new(MountRecord::new()),
            callbacks: CallbackTable::new(),
        })
    }

    /// Process-wide context for callers that cannot receive one explicitly
    pub fn global() -> &'static Arc<ModalContext> {
        GLOBAL.get_or_init(|| Self::new(ModalConfig::default()))
    }

    /// Install `context` as the process-wide context; fails if one exists
    pub fn install_global(context: Arc<ModalContext>) -> Result<(), Arc<ModalContext>> {
        GLOBAL.set(context)
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Register `component` under `id`; a known id only takes the new props
    pub fn register(&self, id: impl Into<ModalId>, component: ComponentRef, props: Option<ModalArgs>) {
        self.registry.register(id, component, props);
    }

    pub fn unregister(&self, id: &ModalId) {
        self.registry.unregister(id);
    }

    pub fn binding(&self, id: &ModalId) -> Option<ComponentBinding> {
        self.registry.get(id)
    }

    pub fn is_registered(&self, id: &ModalId) -> bool {
        self.registry.contains(id)
    }

    pub(crate) fn registry_version(&self) -> u64 {
        self.registry.version()
    }

    /// Resolve `target` to its id, generating one for new components
    pub fn modal_id(&self, target: &ModalTarget) -> ModalId {
        match target {
            ModalTarget::Id(id) => id.clone(),
            ModalTarget::Component(component) => self.component_ids.id_for(component),
        }
    }

    /// Show a modal; the promise settles when the modal resolves or rejects.
    ///
    /// A component target is registered before dispatching so the registry
    /// change never names an unbound id. The registration is undone when the
    /// dispatch fails.
    pub fn show(&self, target: impl Into<ModalTarget>, args: Option<ModalArgs>) -> ModalResult<ModalPromise> {
        let target = target.into();
        let id = self.modal_id(&target);

        let mut registered = false;
        if let ModalTarget::Component(component) = &target {
            if !self.registry.contains(&id) {
                self.registry.register(id.clone(), Arc::clone(component), None);
                registered = true;
            }
        }

        if let Err(e) = self.bridge.dispatch(&action::show(id.clone(), args)) {
            if registered {
                self.registry.unregister(&id);
            }
            return Err(e);
        }
        Ok(self.callbacks.ensure(Verb::Show, &id))
    }

    /// Hide a modal.
    ///
    /// A pending show promise is abandoned, not rejected. The returned promise
    /// settles when the modal calls `resolve_hide`.
    pub fn hide(&self, target: impl Into<ModalTarget>) -> ModalResult<ModalPromise> {
        let id = self.modal_id(&target.into());

        self.bridge.dispatch(&action::hide(id.clone()))?;
        self.callbacks.discard(Verb::Show, &id);
        Ok(self.callbacks.ensure(Verb::Hide, &id))
    }

    /// Remove a modal from the registry, abandoning both pending promises
    pub fn remove(&self, target: impl Into<ModalTarget>) -> ModalResult<()> {
        let id = self.modal_id(&target.into());

        self.bridge.dispatch(&action::remove(id.clone()))?;
        self.callbacks.discard(Verb::Show, &id);
        self.callbacks.discard(Verb::Hide, &id);
        Ok(())
    }

    pub(crate) fn set_flags(&self, id: &ModalId, flags: ModalFlags) -> ModalResult<()> {
        self.bridge.dispatch(&action::set_flags(id.clone(), flags))
    }

    /// Settle the pending show promise of `id` with a value
    pub fn resolve(&self, id: &ModalId, value: Option<Value>) -> bool {
        self.callbacks.settle(Verb::Show, id, Ok(value.unwrap_or(Value::Null)))
    }

    /// Settle the pending show promise of `id` with an error
    pub fn reject(&self, id: &ModalId, error: Option<Value>) -> bool {
        self.callbacks.settle(Verb::Show, id, Err(error.unwrap_or(Value::Null)))
    }

    /// Settle the pending hide promise of `id`
    pub fn resolve_hide(&self, id: &ModalId, value: Option<Value>) -> bool {
        self.callbacks.settle(Verb::Hide, id, Ok(value.unwrap_or(Value::Null)))
    }

    pub fn is_pending(&self, verb: Verb, id: &ModalId) -> bool {
        self.callbacks.is_pending(verb, id)
    }

    /// Record that `id` has been mounted
    pub fn mark_mounted(&self, id: &ModalId) {
        if self.mounted.mark(id) {
            debug!("Modal {} mounted for the first time", id);
        }
    }

    pub fn is_mounted(&self, id: &ModalId) -> bool {
        self.mounted.contains(id)
    }

    /// Current registry of the bound provider
    pub fn snapshot(&self) -> ModalResult<Arc<ModalStore>> {
        Ok(self.bridge.store()?.snapshot())
    }

    /// Subscribe to registry changes of the bound provider
    pub fn subscribe(&self) -> ModalResult<StoreReceiver> {
        Ok(self.bridge.store()?.subscribe())
    }

    pub fn has_provider(&self) -> bool {
        self.bridge.is_bound()
    }
}

/// Root of the modal layer.
///
/// Mounting a provider creates the live registry and binds the context's
/// dispatcher to it. Dropping the provider unbinds it again unless a newer
/// provider has taken over in the meantime.
pub struct ModalProvider {
    context: Arc<ModalContext>,
    store: Arc<ReactiveStore>,
    generation: u64,
}

impl ModalProvider {
    pub fn mount(context: &Arc<ModalContext>) -> Self {
        let store = Arc::new(ReactiveStore::new(Arc::clone(&context.mounted)));
        let generation = context.bridge.bind(Arc::clone(&store));
        info!("Modal provider mounted (generation {})", generation);

        Self {
            context: Arc::clone(context),
            store,
            generation,
        }
    }

    pub fn context(&self) -> &Arc<ModalContext> {
        &self.context
    }

    /// Registry owned by this provider
    pub fn snapshot(&self) -> Arc<ModalStore> {
        self.store.snapshot()
    }
}

impl Drop for ModalProvider {
    fn drop(&mut self) {
        if self.context.bridge.unbind(self.generation) {
            info!("Modal provider unmounted (generation {})", self.generation);
        }
    }
}

impl std::fmt::Debug for ModalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalProvider")
            .field("generation", &self.generation)
            .finish()
    }
}
