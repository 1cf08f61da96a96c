//! Per-component modal handle
//!
//! A [`ModalHandle`] is what a hosted dialog holds: a live view of its own
//! registry entry plus show/hide/resolve/reject bound to its id. The handle
//! subscribes to the provider's registry on creation and unsubscribes when
//! dropped.

use super::{
    callbacks::ModalPromise,
    context::{ModalContext, ModalTarget},
    registry::ComponentRef,
    store::StoreReceiver,
    types::{ModalArgs, ModalEntry, ModalError, ModalId, ModalResult},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Props a mounted modal component receives from its host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderProps {
    /// Identifier attribute declared by the host
    pub id: Option<ModalId>,
    /// Static props merged with live args
    pub props: ModalArgs,
}

/// Live view and bound actions for one modal id
#[derive(Clone)]
pub struct ModalHandle {
    context: Arc<ModalContext>,
    id: ModalId,
    component: Option<ComponentRef>,
    state: StoreReceiver,
}

impl ModalHandle {
    /// Handle addressing `target`.
    ///
    /// When `target` is a component that is not registered yet it is
    /// registered with `props` as its static props.
    pub fn new(
        context: &Arc<ModalContext>,
        target: impl Into<ModalTarget>,
        props: Option<ModalArgs>,
    ) -> ModalResult<Self> {
        let target = target.into();
        let state = context.subscribe()?;
        let mut handle = Self {
            context: Arc::clone(context),
            id: context.modal_id(&target),
            component: None,
            state,
        };
        handle.bind_target(target, props);
        Ok(handle)
    }

    /// Handle for the modal a host mounted with `render_props`
    pub fn from_render_props(context: &Arc<ModalContext>, render_props: &RenderProps) -> ModalResult<Self> {
        let id = render_props.id.clone().ok_or(ModalError::MissingId)?;
        Self::new(context, id, None)
    }

    /// Point the handle at a different target, re-running auto-registration
    pub fn retarget(&mut self, target: impl Into<ModalTarget>, props: Option<ModalArgs>) {
        let target = target.into();
        self.id = self.context.modal_id(&target);
        self.bind_target(target, props);
    }

    fn bind_target(&mut self, target: ModalTarget, props: Option<ModalArgs>) {
        self.component = match target {
            ModalTarget::Component(component) => {
                if !self.context.is_registered(&self.id) {
                    debug!("Auto-registering {} for modal handle {}", component.name(), self.id);
                    self.context.register(self.id.clone(), Arc::clone(&component), props);
                }
                Some(component)
            }
            ModalTarget::Id(_) => None,
        };
    }

    pub fn id(&self) -> &ModalId {
        &self.id
    }

    pub fn context(&self) -> &Arc<ModalContext> {
        &self.context
    }

    /// Component this handle was created from, if any
    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }

    /// Current registry entry, `None` when the id is unknown
    pub fn entry(&self) -> Option<ModalEntry> {
        self.state.borrow().get(&self.id).cloned()
    }

    pub fn visible(&self) -> bool {
        self.state.borrow().get(&self.id).map(|entry| entry.visible).unwrap_or(false)
    }

    pub fn args(&self) -> Option<ModalArgs> {
        self.state.borrow().get(&self.id).and_then(|entry| entry.args.clone())
    }

    pub fn keep_mounted(&self) -> bool {
        self.state
            .borrow()
            .get(&self.id)
            .map(|entry| entry.keep_mounted)
            .unwrap_or(false)
    }

    /// Wait until the registry changes
    pub async fn changed(&mut self) -> ModalResult<()> {
        self.state.changed().await.map_err(|_| ModalError::ProviderGone)
    }

    /// True if the registry changed since the last `changed`/`mark_seen`
    pub fn has_changed(&self) -> bool {
        self.state.has_changed().unwrap_or(false)
    }

    /// Acknowledge the current registry without waiting
    pub fn mark_seen(&mut self) {
        self.state.borrow_and_update();
    }

    pub fn show(&self, args: Option<ModalArgs>) -> ModalResult<ModalPromise> {
        self.context.show(&self.id, args)
    }

    pub fn hide(&self) -> ModalResult<ModalPromise> {
        self.context.hide(&self.id)
    }

    pub fn remove(&self) -> ModalResult<()> {
        self.context.remove(&self.id)
    }

    /// Resolve the pending show promise; a no-op when none is pending
    pub fn resolve(&self, value: Option<Value>) -> bool {
        self.context.resolve(&self.id, value)
    }

    /// Reject the pending show promise; a no-op when none is pending
    pub fn reject(&self, error: Option<Value>) -> bool {
        self.context.reject(&self.id, error)
    }

    /// Resolve the pending hide promise
    pub fn resolve_hide(&self, value: Option<Value>) -> bool {
        self.context.resolve_hide(&self.id, value)
    }
}

impl std::fmt::Debug for ModalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalHandle")
            .field("id", &self.id)
            .field("entry", &self.entry())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModalConfig;
    use crate::modal::{context::ModalProvider, registry::tests::blank};
    use futures::FutureExt;
    use serde_json::json;

    fn setup() -> (Arc<ModalContext>, ModalProvider) {
        let ctx = ModalContext::new(ModalConfig::default());
        let provider = ModalProvider::mount(&ctx);
        (ctx, provider)
    }

    #[test]
    fn test_handle_requires_provider() {
        let ctx = ModalContext::new(ModalConfig::default());
        assert!(matches!(ModalHandle::new(&ctx, "A", None), Err(ModalError::NoProvider)));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let (ctx, _provider) = setup();
        let result = ModalHandle::from_render_props(&ctx, &RenderProps::default());
        assert!(matches!(result, Err(ModalError::MissingId)));
    }

    #[test]
    fn test_absent_entry_defaults() {
        let (ctx, _provider) = setup();
        let handle = ModalHandle::new(&ctx, "A", None).unwrap();
        assert!(!handle.visible());
        assert!(handle.args().is_none());
        assert!(!handle.keep_mounted());
        assert!(handle.entry().is_none());
    }

    #[test]
    fn test_projection_follows_registry() {
        let (ctx, _provider) = setup();
        let id = ModalId::from("A");
        let handle = ModalHandle::new(&ctx, "A", None).unwrap();

        ctx.mark_mounted(&id);
        let mut args = ModalArgs::new();
        args.insert("title".to_string(), json!("Delete?"));
        handle.show(Some(args.clone())).unwrap();

        assert!(handle.visible());
        assert_eq!(handle.args(), Some(args));

        handle.hide().unwrap();
        assert!(!handle.visible());

        handle.remove().unwrap();
        assert!(handle.entry().is_none());
    }

    #[test]
    fn test_resolve_and_reject_settle_show_promise() {
        let (ctx, _provider) = setup();
        let handle = ModalHandle::new(&ctx, "A", None).unwrap();

        let accepted = handle.show(None).unwrap();
        assert!(handle.resolve(Some(json!(true))));
        assert!(!handle.resolve(Some(json!(false))));
        assert_eq!(accepted.now_or_never(), Some(Ok(json!(true))));

        let declined = handle.show(None).unwrap();
        assert!(handle.reject(Some(json!("cancelled"))));
        assert_eq!(declined.now_or_never(), Some(Err(json!("cancelled"))));
    }

    #[test]
    fn test_resolve_hide_settles_hide_promise() {
        let (ctx, _provider) = setup();
        let handle = ModalHandle::new(&ctx, "A", None).unwrap();
        handle.show(None).unwrap();

        let hidden = handle.hide().unwrap();
        assert!(handle.resolve_hide(None));
        assert_eq!(hidden.now_or_never(), Some(Ok(Value::Null)));
    }

    #[test]
    fn test_component_handle_auto_registers_with_props() {
        let (ctx, _provider) = setup();
        let component = blank("confirm");
        let mut props = ModalArgs::new();
        props.insert("width".to_string(), json!(40));

        let handle = ModalHandle::new(&ctx, &component, Some(props.clone())).unwrap();
        let binding = ctx.binding(handle.id()).unwrap();
        assert_eq!(binding.props, Some(props));
        assert!(handle.component().is_some());

        // Same component resolves to the same id through the imperative API
        ctx.show(&component, None).unwrap();
        assert!(handle.entry().is_some());
    }

    #[test]
    fn test_retarget_registers_new_component() {
        let (ctx, _provider) = setup();
        let mut handle = ModalHandle::new(&ctx, "plain", None).unwrap();
        assert!(!ctx.is_registered(handle.id()));

        let component = blank("other");
        handle.retarget(&component, None);
        assert!(ctx.is_registered(handle.id()));
        assert_ne!(handle.id().as_str(), "plain");
    }

    #[tokio::test]
    async fn test_changed_wakes_on_registry_update() {
        let (ctx, _provider) = setup();
        let mut handle = ModalHandle::new(&ctx, "A", None).unwrap();

        let shower = Arc::clone(&ctx);
        tokio::spawn(async move {
            shower.show("A", None).unwrap();
        });

        handle.changed().await.unwrap();
        assert!(handle.entry().unwrap().delay_visible);
    }

    #[tokio::test]
    async fn test_changed_reports_gone_provider() {
        let (ctx, provider) = setup();
        let mut handle = ModalHandle::new(&ctx, "A", None).unwrap();
        drop(provider);
        assert_eq!(handle.changed().await, Err(ModalError::ProviderGone));
    }
}
