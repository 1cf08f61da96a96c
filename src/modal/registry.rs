//! Component bindings for modals
//!
//! The registry maps a modal id to the component that renders it plus the
//! static props it was registered with. It is independent from the reactive
//! visibility registry: a component may be registered and never shown, and a
//! shown id may wait for its component to be registered later.

use super::{
    hook::ModalHandle,
    types::{ModalArgs, ModalId},
};
use crate::tui::Frame;
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use tracing::debug;

/// A renderable dialog hosted by the modal layer.
///
/// Components are shared and stateless; everything that varies per show
/// lives in the registry entry and is read through the [`ModalHandle`].
#[async_trait]
pub trait ModalComponent: Send + Sync {
    /// Human readable name used in logs
    fn name(&self) -> &str;

    /// Render into `area`. `props` holds the static registration props
    /// merged with the live args.
    fn render(&self, frame: &mut Frame<'_>, area: Rect, modal: &ModalHandle, props: &ModalArgs);

    /// Handle a key while this modal is topmost; return true if consumed
    async fn handle_key_event(&self, key: KeyEvent, modal: &ModalHandle) -> Result<bool> {
        let _ = (key, modal);
        Ok(false)
    }
}

/// Shared reference to a component; its pointer identity names the component
pub type ComponentRef = Arc<dyn ModalComponent>;

/// Component plus static props registered under one id
#[derive(Clone)]
pub struct ComponentBinding {
    pub component: ComponentRef,
    pub props: Option<ModalArgs>,
}

impl std::fmt::Debug for ComponentBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBinding")
            .field("component", &self.component.name())
            .field("props", &self.props)
            .finish()
    }
}

/// Map from modal id to its component binding
#[derive(Default)]
pub struct ModalRegistry {
    bindings: RwLock<HashMap<ModalId, ComponentBinding>>,
    version: AtomicU64,
}

impl ModalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` under `id`.
    ///
    /// A known id keeps its original component and only takes the new props.
    pub fn register(&self, id: impl Into<ModalId>, component: ComponentRef, props: Option<ModalArgs>) {
        let id = id.into();
        let mut bindings = self.bindings.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        match bindings.get_mut(&id) {
            Some(binding) => binding.props = props,
            None => {
                debug!("Registering modal component {} as {}", component.name(), id);
                bindings.insert(id, ComponentBinding { component, props });
            }
        }
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unregister(&self, id: &ModalId) {
        let mut bindings = self.bindings.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if bindings.remove(id).is_some() {
            debug!("Unregistered modal component {}", id);
        }
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, id: &ModalId) -> Option<ComponentBinding> {
        self.bindings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &ModalId) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(id)
    }

    /// Counter bumped on every register/unregister
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }
}

/// Side table giving each component reference a stable generated id.
///
/// Entries hold weak references, so a dropped component whose allocation is
/// reused never inherits a stale id.
pub struct ComponentIds {
    prefix: String,
    seed: AtomicU64,
    ids: RwLock<HashMap<usize, (Weak<dyn ModalComponent>, ModalId)>>,
}

impl ComponentIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seed: AtomicU64::new(0),
            ids: RwLock::new(HashMap::new()),
        }
    }

    /// Id for `component`, generated on first use
    pub fn id_for(&self, component: &ComponentRef) -> ModalId {
        let key = address(component);

        if let Some(id) = self.lookup(key, component) {
            return id;
        }

        let mut ids = self.ids.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have raced us between the read and write locks
        if let Some((weak, id)) = ids.get(&key) {
            if is_same(weak, component) {
                return id.clone();
            }
        }
        ids.retain(|_, (weak, _)| weak.strong_count() > 0);

        let id = ModalId(format!("{}{}", self.prefix, self.seed.fetch_add(1, Ordering::Relaxed)));
        ids.insert(key, (Arc::downgrade(component), id.clone()));
        id
    }

    fn lookup(&self, key: usize, component: &ComponentRef) -> Option<ModalId> {
        let ids = self.ids.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.get(&key)
            .filter(|(weak, _)| is_same(weak, component))
            .map(|(_, id)| id.clone())
    }
}

fn address(component: &ComponentRef) -> usize {
    Arc::as_ptr(component) as *const () as usize
}

fn is_same(weak: &Weak<dyn ModalComponent>, component: &ComponentRef) -> bool {
    weak.upgrade()
        .map(|live| address(&live) == address(component))
        .unwrap_or(false)
}
