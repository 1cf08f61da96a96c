//! Mount orchestration for a declared modal
//!
//! A [`ModalCreator`] is the host-side wrapper around one declared modal id.
//! It records the first mount, forwards the keep-mounted flag, and turns a
//! show that arrived before mounting into a real visibility transition once
//! the modal has had its first render.

use super::{
    context::ModalContext,
    hook::{ModalHandle, RenderProps},
    types::{ModalArgs, ModalError, ModalFlags, ModalId, ModalResult},
};
use std::sync::Arc;
use tracing::debug;

/// Props accepted by [`ModalCreator::setup`]
#[derive(Debug, Clone, Default)]
pub struct CreatorProps {
    pub id: Option<ModalId>,
    /// Show the modal as soon as it is set up
    pub default_visible: bool,
    /// Keep the modal in the tree after it is hidden
    pub keep_mounted: bool,
    /// Remaining props forwarded to the rendered children
    pub props: ModalArgs,
}

impl CreatorProps {
    pub fn new(id: impl Into<ModalId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn default_visible(mut self, default_visible: bool) -> Self {
        self.default_visible = default_visible;
        self
    }

    pub fn keep_mounted(mut self, keep_mounted: bool) -> Self {
        self.keep_mounted = keep_mounted;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }
}

/// Mounted wrapper for one declared modal
pub struct ModalCreator {
    handle: ModalHandle,
    props: CreatorProps,
    should_mount: bool,
}

impl ModalCreator {
    /// Set up the creator; fails when `props.id` is missing
    pub fn setup(context: &Arc<ModalContext>, props: CreatorProps) -> ModalResult<Self> {
        let id = props.id.clone().ok_or(ModalError::CreatorMissingId)?;
        let handle = ModalHandle::new(context, id.clone(), None)?;

        if props.default_visible {
            // The creator never awaits its own show, the promise stays in the table
            let _ = handle.show(None)?;
        }
        context.mark_mounted(&id);

        let mut creator = Self {
            should_mount: false,
            handle,
            props,
        };
        creator.sync()?;
        debug!("ModalCreator {} set up (mounted: {})", id, creator.should_mount);
        Ok(creator)
    }

    /// Re-evaluate against the current registry.
    ///
    /// Call after every registry change; [`ModalCreator::next_change`] does
    /// this automatically.
    pub fn sync(&mut self) -> ModalResult<()> {
        let Some(entry) = self.handle.entry() else {
            return Ok(());
        };
        self.should_mount = true;

        // A remove followed by a new show starts from a fresh entry
        if self.props.keep_mounted && !entry.keep_mounted {
            self.handle
                .context()
                .set_flags(self.handle.id(), ModalFlags::keep_mounted(true))?;
        }

        if entry.delay_visible {
            debug!("Modal {} mounted with a pending show, making it visible", entry.id);
            // Fresh promise is shared with whoever issued the original show
            let _ = self.handle.show(entry.args)?;
        }
        self.handle.mark_seen();
        Ok(())
    }

    /// Wait for the next registry change and re-evaluate
    pub async fn next_change(&mut self) -> ModalResult<()> {
        self.handle.changed().await?;
        self.sync()
    }

    pub fn id(&self) -> &ModalId {
        self.handle.id()
    }

    pub fn handle(&self) -> &ModalHandle {
        &self.handle
    }

    /// True once the id has been requested at least once
    pub fn is_mounted(&self) -> bool {
        self.should_mount
    }

    /// Props for the children, `None` while the modal is not mounted.
    ///
    /// Live args override the creator's own props on key collisions.
    pub fn render_props(&self) -> Option<RenderProps> {
        if !self.should_mount {
            return None;
        }

        let mut props = self.props.props.clone();
        if let Some(args) = self.handle.args() {
            props.extend(args);
        }

        Some(RenderProps {
            id: Some(self.handle.id().clone()),
            props,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModalConfig;
    use crate::modal::context::ModalProvider;
    use futures::FutureExt;
    use serde_json::json;

    fn setup() -> (Arc<ModalContext>, ModalProvider) {
        let ctx = ModalContext::new(ModalConfig::default());
        let provider = ModalProvider::mount(&ctx);
        (ctx, provider)
    }

    fn count(n: i64) -> ModalArgs {
        let mut args = ModalArgs::new();
        args.insert("count".to_string(), json!(n));
        args
    }

    #[test]
    fn test_requires_id() {
        let (ctx, _provider) = setup();
        let result = ModalCreator::setup(&ctx, CreatorProps::default());
        assert!(matches!(result, Err(ModalError::CreatorMissingId)));
    }

    #[test]
    fn test_never_shown_id_never_renders() {
        let (ctx, _provider) = setup();
        let creator = ModalCreator::setup(&ctx, CreatorProps::new("A")).unwrap();

        assert!(!creator.is_mounted());
        assert!(creator.render_props().is_none());
        assert!(ctx.is_mounted(&ModalId::from("A")));
    }

    #[test]
    fn test_show_before_mount_becomes_visible_after_setup() {
        let (ctx, _provider) = setup();
        let promise = ctx.show("A", Some(count(1))).unwrap();

        let entry = ctx.snapshot().unwrap()[&ModalId::from("A")].clone();
        assert!(!entry.visible);
        assert!(entry.delay_visible);

        let creator = ModalCreator::setup(&ctx, CreatorProps::new("A")).unwrap();
        let entry = ctx.snapshot().unwrap()[&ModalId::from("A")].clone();
        assert!(entry.visible);
        assert!(!entry.delay_visible);
        assert_eq!(entry.args, Some(count(1)));

        // The follow-up show reuses the pending promise
        assert!(creator.handle().resolve(Some(json!("ok"))));
        assert_eq!(promise.now_or_never(), Some(Ok(json!("ok"))));
    }

    #[test]
    fn test_default_visible_mounts_and_shows() {
        let (ctx, _provider) = setup();
        let creator = ModalCreator::setup(&ctx, CreatorProps::new("A").default_visible(true)).unwrap();

        assert!(creator.is_mounted());
        assert!(creator.handle().visible());
    }

    #[test]
    fn test_keep_mounted_is_forwarded() {
        let (ctx, _provider) = setup();
        ctx.show("A", None).unwrap();
        let creator = ModalCreator::setup(&ctx, CreatorProps::new("A").keep_mounted(true)).unwrap();
        assert!(creator.handle().keep_mounted());
    }

    #[test]
    fn test_render_props_merge_args_over_props() {
        let (ctx, _provider) = setup();
        let props = CreatorProps::new("A")
            .with_prop("title", json!("Static"))
            .with_prop("count", json!(0));
        ctx.show("A", Some(count(5))).unwrap();

        let creator = ModalCreator::setup(&ctx, props).unwrap();
        let render = creator.render_props().unwrap();
        assert_eq!(render.id, Some(ModalId::from("A")));
        assert_eq!(render.props["title"], json!("Static"));
        assert_eq!(render.props["count"], json!(5));
    }

    #[tokio::test]
    async fn test_mounts_when_first_shown_later() {
        let (ctx, _provider) = setup();
        let mut creator = ModalCreator::setup(&ctx, CreatorProps::new("A")).unwrap();
        assert!(!creator.is_mounted());

        // Already mounted, so the show is immediately visible
        ctx.show("A", None).unwrap();
        creator.next_change().await.unwrap();

        assert!(creator.is_mounted());
        assert!(creator.handle().visible());
    }

    #[tokio::test]
    async fn test_hide_keeps_entry_for_keep_mounted() {
        let (ctx, _provider) = setup();
        ctx.show("A", None).unwrap();
        let mut creator = ModalCreator::setup(&ctx, CreatorProps::new("A").keep_mounted(true)).unwrap();

        creator.handle().hide().unwrap();
        creator.next_change().await.unwrap();

        assert!(creator.render_props().is_some());
        assert!(!creator.handle().visible());
        assert!(creator.handle().keep_mounted());
    }

    #[tokio::test]
    async fn test_keep_mounted_survives_remove_and_reshow() {
        let (ctx, _provider) = setup();
        ctx.show("A", None).unwrap();
        let mut creator = ModalCreator::setup(&ctx, CreatorProps::new("A").keep_mounted(true)).unwrap();
        assert!(creator.handle().keep_mounted());

        ctx.remove("A").unwrap();
        creator.next_change().await.unwrap();
        assert!(creator.handle().entry().is_none());

        ctx.show("A", None).unwrap();
        creator.next_change().await.unwrap();

        let entry = ctx.snapshot().unwrap()[&ModalId::from("A")].clone();
        assert!(entry.visible);
        assert!(entry.keep_mounted);
    }
}
