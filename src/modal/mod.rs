//! Modal orchestration layer
//!
//! Applications show, hide and await modals by id instead of threading
//! visibility state through their component tree:
//!
//! - [`ModalContext`] holds the shared state and the imperative API
//! - [`ModalProvider`] owns the live registry and binds the dispatcher
//! - [`ModalHandle`] is the per-component view with bound actions
//! - [`ModalCreator`] and [`ModalPlaceholder`] decide what gets mounted
//!
//! A show issued before a modal's first mount only marks it for delayed
//! visibility; the modal becomes visible after it has rendered once, which
//! gives it a frame for its enter transition.

pub mod action;
pub mod adapters;
pub mod callbacks;
pub mod context;
pub mod creator;
pub mod dispatch;
pub mod hook;
pub mod placeholder;
pub mod reducer;
pub mod registry;
pub mod store;
pub mod types;

pub use action::ModalAction;
pub use adapters::{dialog_props, drawer_props, DialogActions, DialogProps, DrawerProps};
pub use callbacks::{ModalPromise, Verb};
pub use context::{ModalContext, ModalProvider, ModalTarget};
pub use creator::{CreatorProps, ModalCreator};
pub use hook::{ModalHandle, RenderProps};
pub use placeholder::{ModalPlaceholder, PlaceholderSlot};
pub use reducer::{reduce, MountRecord};
pub use registry::{ComponentBinding, ComponentRef, ModalComponent};
pub use types::*;
