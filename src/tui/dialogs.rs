//! Demo dialog components hosted by the modal layer

use super::layout::centered;
use super::Frame;
use crate::modal::{dialog_props, ModalArgs, ModalComponent, ModalHandle, ModalResult};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use serde_json::{json, Value};
use tracing::warn;

fn prop<'a>(props: &'a ModalArgs, key: &str, default: &'a str) -> &'a str {
    props.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Hide the modal and run the close transition in the background
fn close(modal: &ModalHandle) -> ModalResult<()> {
    let actions = dialog_props(modal, None).actions;
    actions.on_close()?;

    tokio::spawn(async move {
        if let Err(e) = actions.after_close().await {
            warn!("Modal {} failed to finish closing: {}", actions.handle().id(), e);
        }
    });
    Ok(())
}

fn render_box(frame: &mut Frame<'_>, area: Rect, title: &str, border: Color, lines: Vec<Line<'_>>) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

/// Yes/no question; resolves `true` on yes and rejects on no
#[derive(Debug, Default)]
pub struct ConfirmDialog;

#[async_trait]
impl ModalComponent for ConfirmDialog {
    fn name(&self) -> &str {
        "ConfirmDialog"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, _modal: &ModalHandle, props: &ModalArgs) {
        let area = centered(area, 50, 7);
        let lines = vec![
            Line::from(""),
            Line::from(prop(props, "message", "Are you sure?")),
            Line::from(""),
            hint("y: yes   n: no"),
        ];
        render_box(frame, area, prop(props, "title", "Confirm"), Color::Yellow, lines);
    }

    async fn handle_key_event(&self, key: KeyEvent, modal: &ModalHandle) -> Result<bool> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                modal.resolve(Some(json!(true)));
                close(modal)?;
                Ok(true)
            }
            KeyCode::Char('n') => {
                modal.reject(Some(json!("declined")));
                close(modal)?;
                Ok(true)
            }
            KeyCode::Esc => {
                modal.reject(Some(json!("dismissed")));
                close(modal)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Message box shown by id; resolves with nothing on close
#[derive(Debug, Default)]
pub struct InfoDialog;

#[async_trait]
impl ModalComponent for InfoDialog {
    fn name(&self) -> &str {
        "InfoDialog"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, _modal: &ModalHandle, props: &ModalArgs) {
        let area = centered(area, 56, 8);
        let lines = vec![
            Line::from(""),
            Line::from(prop(props, "message", "")),
            Line::from(""),
            hint("enter: close"),
        ];
        render_box(frame, area, prop(props, "title", "Info"), Color::Cyan, lines);
    }

    async fn handle_key_event(&self, key: KeyEvent, modal: &ModalHandle) -> Result<bool> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                modal.resolve(None);
                close(modal)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Panel declared through a creator; stays registered after closing
#[derive(Debug, Default)]
pub struct AboutPanel;

#[async_trait]
impl ModalComponent for AboutPanel {
    fn name(&self) -> &str {
        "AboutPanel"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, modal: &ModalHandle, props: &ModalArgs) {
        let area = centered(area, 60, 10);
        let opened = props.get("opened").and_then(Value::as_u64).unwrap_or(0);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                prop(props, "title", "nice-modal"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("modal id: {}", modal.id())),
            Line::from(format!("kept mounted: {}", modal.keep_mounted())),
            Line::from(format!("opened {} time(s)", opened)),
            Line::from(""),
            hint("esc: close"),
        ];
        render_box(frame, area, "About", Color::Green, lines);
    }

    async fn handle_key_event(&self, key: KeyEvent, modal: &ModalHandle) -> Result<bool> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                close(modal)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModalConfig;
    use crate::modal::{ComponentRef, ModalContext, ModalId, ModalProvider};
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn settle_background_tasks() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_confirm_yes_resolves_and_removes() {
        let ctx = ModalContext::new(ModalConfig::default());
        let _provider = ModalProvider::mount(&ctx);
        let confirm: ComponentRef = Arc::new(ConfirmDialog);

        let promise = ctx.show(&confirm, None).unwrap();
        let handle = ModalHandle::new(&ctx, &confirm, None).unwrap();

        assert!(confirm.handle_key_event(key(KeyCode::Char('y')), &handle).await.unwrap());
        assert_eq!(promise.await, Ok(json!(true)));

        settle_background_tasks().await;
        assert!(ctx.snapshot().unwrap().get(handle.id()).is_none());
    }

    #[tokio::test]
    async fn test_confirm_no_rejects() {
        let ctx = ModalContext::new(ModalConfig::default());
        let _provider = ModalProvider::mount(&ctx);
        let confirm: ComponentRef = Arc::new(ConfirmDialog);

        let promise = ctx.show(&confirm, None).unwrap();
        let handle = ModalHandle::new(&ctx, &confirm, None).unwrap();

        assert!(confirm.handle_key_event(key(KeyCode::Char('n')), &handle).await.unwrap());
        assert_eq!(promise.await, Err(json!("declined")));
    }

    #[tokio::test]
    async fn test_unhandled_key_is_not_consumed() {
        let ctx = ModalContext::new(ModalConfig::default());
        let _provider = ModalProvider::mount(&ctx);
        let handle = ModalHandle::new(&ctx, "info", None).unwrap();

        assert!(!InfoDialog.handle_key_event(key(KeyCode::Char('x')), &handle).await.unwrap());
    }

    #[tokio::test]
    async fn test_keep_mounted_panel_survives_close() {
        let ctx = ModalContext::new(ModalConfig::default());
        let _provider = ModalProvider::mount(&ctx);
        let id = ModalId::from("about");
        ctx.register("about", Arc::new(AboutPanel), None);
        ctx.mark_mounted(&id);

        let handle = ModalHandle::new(&ctx, "about", None).unwrap();
        handle.show(None).unwrap();
        ctx.set_flags(&id, crate::modal::ModalFlags::keep_mounted(true)).unwrap();

        assert!(AboutPanel.handle_key_event(key(KeyCode::Esc), &handle).await.unwrap());
        settle_background_tasks().await;

        let state = ctx.snapshot().unwrap();
        assert!(!state[&id].visible);
        assert!(state[&id].keep_mounted);
    }
}
