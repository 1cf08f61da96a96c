//! Core modal types
//!
//! This module defines the records shared by every part of the modal layer:
//! identifiers, the per-modal registry entry, the set-flags payload and the
//! error type returned by the library.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque argument mapping passed to a modal at show time
pub type ModalArgs = serde_json::Map<String, serde_json::Value>;

/// Reactive registry of every known modal, keyed by id
pub type ModalStore = BTreeMap<ModalId, ModalEntry>;

/// Outcome delivered through a show or hide promise.
///
/// `Ok` carries the value passed to `resolve`, `Err` the value passed to `reject`.
pub type ModalOutcome = Result<serde_json::Value, serde_json::Value>;

/// Stable identifier naming one modal slot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalId(pub String);

impl ModalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ModalId> for ModalId {
    fn from(id: &ModalId) -> Self {
        id.clone()
    }
}

impl std::fmt::Display for ModalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility record for one modal id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalEntry {
    pub id: ModalId,
    /// Arguments from the latest show; replaced wholesale on every show
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ModalArgs>,
    /// True only once the modal has been mounted at least once
    #[serde(default)]
    pub visible: bool,
    /// Set when a show arrived before the first mount
    #[serde(default)]
    pub delay_visible: bool,
    /// Keeps the modal in the render tree after it is hidden
    #[serde(default)]
    pub keep_mounted: bool,
}

impl ModalEntry {
    pub fn new(id: impl Into<ModalId>) -> Self {
        Self {
            id: id.into(),
            args: None,
            visible: false,
            delay_visible: false,
            keep_mounted: false,
        }
    }

    /// Shallow-merge flags onto a copy of this entry
    pub fn merged(&self, flags: &ModalFlags) -> Self {
        let mut entry = self.clone();
        if let Some(visible) = flags.visible {
            entry.visible = visible;
        }
        if let Some(delay_visible) = flags.delay_visible {
            entry.delay_visible = delay_visible;
        }
        if let Some(keep_mounted) = flags.keep_mounted {
            entry.keep_mounted = keep_mounted;
        }
        entry
    }
}

/// Payload of a set-flags action; only `Some` fields are applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_mounted: Option<bool>,
}

impl ModalFlags {
    pub fn keep_mounted(keep_mounted: bool) -> Self {
        Self {
            keep_mounted: Some(keep_mounted),
            ..Self::default()
        }
    }
}

/// Result type for modal operations
pub type ModalResult<T> = std::result::Result<T, ModalError>;

/// Wiring errors raised by the modal layer.
///
/// All of these indicate a programming error in how the application mounts
/// the provider or addresses modals, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    #[error("No modal dispatcher bound, did you mount a ModalProvider?")]
    NoProvider,

    #[error("No modal id found for the modal handle")]
    MissingId,

    #[error("ModalCreator requires an id")]
    CreatorMissingId,

    #[error("The modal provider was unmounted")]
    ProviderGone,
}
