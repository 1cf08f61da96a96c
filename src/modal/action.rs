//! Action records consumed by the modal reducer

use super::types::{ModalArgs, ModalFlags, ModalId};
use serde::{Deserialize, Serialize};

/// A single state transition request for the modal registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ModalAction {
    #[serde(rename = "nice-modal/show")]
    Show {
        modal_id: ModalId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<ModalArgs>,
    },

    #[serde(rename = "nice-modal/hide")]
    Hide { modal_id: ModalId },

    #[serde(rename = "nice-modal/remove")]
    Remove { modal_id: ModalId },

    #[serde(rename = "nice-modal/set-flags")]
    SetFlags { modal_id: ModalId, flags: ModalFlags },

    /// Any action type this reducer does not understand
    #[serde(other)]
    Unknown,
}

impl ModalAction {
    /// The id this action targets, if any
    pub fn modal_id(&self) -> Option<&ModalId> {
        match self {
            Self::Show { modal_id, .. }
            | Self::Hide { modal_id }
            | Self::Remove { modal_id }
            | Self::SetFlags { modal_id, .. } => Some(modal_id),
            Self::Unknown => None,
        }
    }

    /// Wire name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Show { .. } => "nice-modal/show",
            Self::Hide { .. } => "nice-modal/hide",
            Self::Remove { .. } => "nice-modal/remove",
            Self::SetFlags { .. } => "nice-modal/set-flags",
            Self::Unknown => "unknown",
        }
    }
}

/// Build an action that shows a modal with the given args
pub fn show(modal_id: impl Into<ModalId>, args: Option<ModalArgs>) -> ModalAction {
    ModalAction::Show {
        modal_id: modal_id.into(),
        args,
    }
}

/// Build an action that hides a modal
pub fn hide(modal_id: impl Into<ModalId>) -> ModalAction {
    ModalAction::Hide {
        modal_id: modal_id.into(),
    }
}

/// Build an action that removes a modal from the registry
pub fn remove(modal_id: impl Into<ModalId>) -> ModalAction {
    ModalAction::Remove {
        modal_id: modal_id.into(),
    }
}

/// Build an action that merges flags onto an existing entry
pub fn set_flags(modal_id: impl Into<ModalId>, flags: ModalFlags) -> ModalAction {
    ModalAction::SetFlags {
        modal_id: modal_id.into(),
        flags,
    }
}
