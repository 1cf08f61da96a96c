//! Render enumerator for registered modals
//!
//! The placeholder walks the live registry and yields one render slot per
//! known id that has a registered component. It only re-enumerates when the
//! registry or the component bindings changed.

use super::{
    context::ModalContext,
    hook::{ModalHandle, RenderProps},
    registry::ComponentRef,
    store::StoreReceiver,
    types::{ModalError, ModalId, ModalResult},
};
use std::sync::Arc;
use tracing::warn;

/// One modal the host should render
#[derive(Clone)]
pub struct PlaceholderSlot {
    /// Stable key for the rendered instance
    pub id: ModalId,
    pub component: ComponentRef,
    pub render_props: RenderProps,
    pub handle: ModalHandle,
}

impl std::fmt::Debug for PlaceholderSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderSlot")
            .field("id", &self.id)
            .field("component", &self.component.name())
            .field("render_props", &self.render_props)
            .finish()
    }
}

/// Enumerates the registry into render slots
pub struct ModalPlaceholder {
    context: Arc<ModalContext>,
    state: StoreReceiver,
    registry_version: Option<u64>,
    slots: Vec<PlaceholderSlot>,
}

impl ModalPlaceholder {
    pub fn new(context: &Arc<ModalContext>) -> ModalResult<Self> {
        Ok(Self {
            state: context.subscribe()?,
            context: Arc::clone(context),
            registry_version: None,
            slots: Vec::new(),
        })
    }

    /// Current slots, re-enumerated if anything changed since the last call
    pub fn slots(&mut self) -> ModalResult<&[PlaceholderSlot]> {
        let store_changed = self.state.has_changed().unwrap_or(false);
        let version = self.context.registry_version();
        if store_changed || self.registry_version != Some(version) {
            self.enumerate()?;
            self.registry_version = Some(version);
        }
        Ok(&self.slots)
    }

    /// Wait for the next registry change
    pub async fn changed(&mut self) -> ModalResult<()> {
        self.state
            .changed()
            .await
            .map_err(|_| ModalError::ProviderGone)
    }

    fn enumerate(&mut self) -> ModalResult<()> {
        let state = Arc::clone(&self.state.borrow_and_update());
        let mut slots = Vec::with_capacity(state.len());

        for id in state.keys() {
            let Some(binding) = self.context.binding(id) else {
                if !self.context.is_mounted(id) && self.context.config().warn_unknown {
                    warn!(
                        "No modal found for id: {}. Check the id or whether it is registered or declared with a ModalCreator.",
                        id
                    );
                }
                continue;
            };

            slots.push(PlaceholderSlot {
                id: id.clone(),
                render_props: RenderProps {
                    id: Some(id.clone()),
                    props: binding.props.clone().unwrap_or_default(),
                },
                handle: ModalHandle::new(&self.context, id.clone(), None)?,
                component: binding.component,
            });
        }

        self.slots = slots;
        Ok(())
    }
}
