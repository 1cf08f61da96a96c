//! Prop adapters for dialog-shaped components
//!
//! Adapters translate a [`ModalHandle`] into the prop shape a particular kind
//! of dialog expects: an open flag, the live args, and close callbacks. They
//! never touch modal state beyond delegating to hide/resolve/remove.

use super::{
    hook::ModalHandle,
    types::{ModalArgs, ModalResult},
};
use tracing::debug;

/// Props for a confirm-style dialog
#[derive(Debug, Clone)]
pub struct DialogProps {
    pub open: bool,
    /// Live args with overrides applied last
    pub args: ModalArgs,
    pub actions: DialogActions,
}

/// Props for a drawer that reports open-state changes
#[derive(Debug, Clone)]
pub struct DrawerProps {
    pub open: bool,
    pub args: ModalArgs,
    pub actions: DialogActions,
}

/// Close callbacks bound to one modal
#[derive(Debug, Clone)]
pub struct DialogActions {
    handle: ModalHandle,
}

impl DialogActions {
    pub fn on_ok(&self) -> ModalResult<()> {
        self.handle.hide().map(|_| ())
    }

    pub fn on_cancel(&self) -> ModalResult<()> {
        self.handle.hide().map(|_| ())
    }

    pub fn on_close(&self) -> ModalResult<()> {
        self.handle.hide().map(|_| ())
    }

    /// Run once the close transition has finished.
    ///
    /// Resolves the hide promise, then on the next scheduler tick removes the
    /// modal unless it is flagged keep-mounted at that point.
    pub async fn after_close(&self) -> ModalResult<()> {
        self.handle.resolve_hide(None);
        tokio::task::yield_now().await;

        if self.handle.keep_mounted() {
            debug!("Modal {} closed and stays mounted", self.handle.id());
            Ok(())
        } else {
            debug!("Modal {} closed, removing", self.handle.id());
            self.handle.remove()
        }
    }

    /// Drawer callback fired when the open transition settles
    pub async fn after_open_change(&self, open: bool) -> ModalResult<()> {
        if open {
            return Ok(());
        }
        self.after_close().await
    }

    pub fn handle(&self) -> &ModalHandle {
        &self.handle
    }
}

fn merged_args(handle: &ModalHandle, overrides: Option<ModalArgs>) -> ModalArgs {
    let mut args = handle.args().unwrap_or_default();
    if let Some(overrides) = overrides {
        args.extend(overrides);
    }
    args
}

/// Map a handle onto dialog props
pub fn dialog_props(handle: &ModalHandle, overrides: Option<ModalArgs>) -> DialogProps {
    DialogProps {
        open: handle.visible(),
        args: merged_args(handle, overrides),
        actions: DialogActions {
            handle: handle.clone(),
        },
    }
}

/// Map a handle onto drawer props
pub fn drawer_props(handle: &ModalHandle, overrides: Option<ModalArgs>) -> DrawerProps {
    DrawerProps {
        open: handle.visible(),
        args: merged_args(handle, overrides),
        actions: DialogActions {
            handle: handle.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModalConfig;
    use crate::modal::{
        context::{ModalContext, ModalProvider},
        types::{ModalFlags, ModalId},
    };
    use futures::FutureExt;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn setup() -> (Arc<ModalContext>, ModalProvider, ModalHandle) {
        let ctx = ModalContext::new(ModalConfig::default());
        let provider = ModalProvider::mount(&ctx);
        ctx.mark_mounted(&ModalId::from("A"));
        let handle = ModalHandle::new(&ctx, "A", None).unwrap();
        (ctx, provider, handle)
    }

    #[test]
    fn test_overrides_take_precedence() {
        let (_ctx, _provider, handle) = setup();
        let mut args = ModalArgs::new();
        args.insert("title".to_string(), json!("live"));
        args.insert("body".to_string(), json!("text"));
        handle.show(Some(args)).unwrap();

        let mut overrides = ModalArgs::new();
        overrides.insert("title".to_string(), json!("override"));
        let props = dialog_props(&handle, Some(overrides));

        assert!(props.open);
        assert_eq!(props.args["title"], json!("override"));
        assert_eq!(props.args["body"], json!("text"));
    }

    #[test]
    fn test_on_ok_hides() {
        let (_ctx, _provider, handle) = setup();
        handle.show(None).unwrap();
        let props = dialog_props(&handle, None);
        assert!(props.open);

        props.actions.on_ok().unwrap();
        assert!(!handle.visible());
        // Props are a snapshot, fresh ones reflect the hide
        assert!(!dialog_props(&handle, None).open);
    }

    #[tokio::test]
    async fn test_after_close_resolves_hide_and_removes() {
        let (_ctx, _provider, handle) = setup();
        handle.show(None).unwrap();
        let hidden = handle.hide().unwrap();

        dialog_props(&handle, None).actions.after_close().await.unwrap();

        assert_eq!(hidden.now_or_never(), Some(Ok(Value::Null)));
        assert!(handle.entry().is_none());
    }

    #[tokio::test]
    async fn test_after_close_checks_keep_mounted_late() {
        let (ctx, _provider, handle) = setup();
        handle.show(None).unwrap();
        handle.hide().unwrap();

        let actions = drawer_props(&handle, None).actions;
        let task = tokio::spawn(async move { actions.after_open_change(false).await });

        // Flag set after the close was requested still keeps the modal
        ctx.set_flags(handle.id(), ModalFlags::keep_mounted(true)).unwrap();
        task.await.unwrap().unwrap();

        assert!(handle.entry().is_some());
    }

    #[tokio::test]
    async fn test_open_change_to_true_is_ignored() {
        let (_ctx, _provider, handle) = setup();
        handle.show(None).unwrap();
        drawer_props(&handle, None).actions.after_open_change(true).await.unwrap();
        assert!(handle.visible());
    }
}
