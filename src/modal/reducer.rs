//! Pure reducer over the modal registry
//!
//! The reducer never mutates its input. It returns either a fresh `Arc` with
//! the next registry or the very same `Arc` when nothing changed, so callers
//! detect no-ops with `Arc::ptr_eq`.

use super::{
    action::ModalAction,
    types::{ModalEntry, ModalId, ModalStore},
};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Set of modal ids that have been mounted at least once.
///
/// The set only grows. Hiding or removing a modal never clears its record,
/// which is what lets a re-shown modal skip the mount-then-show step.
#[derive(Debug, Default)]
pub struct MountRecord {
    mounted: RwLock<HashSet<ModalId>>,
}

impl MountRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` has been mounted; returns true on the first mount
    pub fn mark(&self, id: &ModalId) -> bool {
        match self.mounted.write() {
            Ok(mut mounted) => mounted.insert(id.clone()),
            Err(poisoned) => poisoned.into_inner().insert(id.clone()),
        }
    }

    pub fn contains(&self, id: &ModalId) -> bool {
        match self.mounted.read() {
            Ok(mounted) => mounted.contains(id),
            Err(poisoned) => poisoned.into_inner().contains(id),
        }
    }
}

/// Compute the next registry for `action`
pub fn reduce(state: &Arc<ModalStore>, action: &ModalAction, mounted: &MountRecord) -> Arc<ModalStore> {
    match action {
        ModalAction::Show { modal_id, args } => {
            let already_mounted = mounted.contains(modal_id);
            let mut entry = state
                .get(modal_id)
                .cloned()
                .unwrap_or_else(|| ModalEntry::new(modal_id.clone()));

            entry.id = modal_id.clone();
            entry.args = args.clone();
            // Unmounted modals mount first and become visible afterwards,
            // giving the component a frame to run its enter transition.
            entry.visible = already_mounted;
            entry.delay_visible = !already_mounted;

            with_entry(state, entry)
        }

        ModalAction::Hide { modal_id } => match state.get(modal_id) {
            Some(entry) if entry.visible => {
                let mut entry = entry.clone();
                entry.visible = false;
                with_entry(state, entry)
            }
            _ => Arc::clone(state),
        },

        ModalAction::Remove { modal_id } => {
            if !state.contains_key(modal_id) {
                return Arc::clone(state);
            }
            let mut next = ModalStore::clone(state);
            next.remove(modal_id);
            Arc::new(next)
        }

        ModalAction::SetFlags { modal_id, flags } => match state.get(modal_id) {
            Some(entry) => {
                let merged = entry.merged(flags);
                if &merged == entry {
                    Arc::clone(state)
                } else {
                    with_entry(state, merged)
                }
            }
            None => Arc::clone(state),
        },

        ModalAction::Unknown => Arc::clone(state),
    }
}

fn with_entry(state: &Arc<ModalStore>, entry: ModalEntry) -> Arc<ModalStore> {
    let mut next = ModalStore::clone(state);
    next.insert(entry.id.clone(), entry);
    Arc::new(next)
}
