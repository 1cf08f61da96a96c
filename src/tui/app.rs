use crate::config::Config;
use crate::modal::{
    ComponentRef, CreatorProps, ModalArgs, ModalContext, ModalCreator, ModalId, ModalPlaceholder, ModalPromise,
    ModalProvider,
};
use crate::tui::{
    dialogs::{AboutPanel, ConfirmDialog, InfoDialog},
    events::Event,
    keys::KeyMap,
    Frame,
};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

fn args(pairs: &[(&str, serde_json::Value)]) -> ModalArgs {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Main application state and controller
pub struct App {
    /// Modal layer shared with every dialog
    context: Arc<ModalContext>,

    /// Renders whatever the registry holds a component for
    placeholder: ModalPlaceholder,

    /// Mount wrappers for the placeholder's slots
    mounted: BTreeMap<ModalId, ModalCreator>,

    /// Declared about panel
    about: ModalCreator,
    about_panel: ComponentRef,
    about_opened: u64,

    /// Shown by component reference, its id is generated
    confirm: ComponentRef,

    /// Key mappings for the application
    key_map: KeyMap,

    /// Status message to display
    status_message: Option<String>,

    /// Event sender for internal communication
    event_sender: mpsc::UnboundedSender<Event>,

    // Dropped last so the dispatcher stays bound while the rest tears down
    _provider: ModalProvider,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config, event_sender: mpsc::UnboundedSender<Event>) -> Result<Self> {
        let context = ModalContext::new(config.modal.clone());
        let provider = ModalProvider::mount(&context);

        context.register(
            "info",
            Arc::new(InfoDialog),
            Some(args(&[("title", json!("Info"))])),
        );

        let placeholder = ModalPlaceholder::new(&context)?;
        let about = ModalCreator::setup(
            &context,
            CreatorProps::new("about")
                .keep_mounted(true)
                .with_prop("title", json!("nice-modal demo")),
        )?;

        let mut app = Self {
            placeholder,
            mounted: BTreeMap::new(),
            about,
            about_panel: Arc::new(AboutPanel),
            about_opened: 0,
            confirm: Arc::new(ConfirmDialog),
            key_map: KeyMap::default(),
            status_message: None,
            event_sender,
            context,
            _provider: provider,
        };
        app.sync_modals()?;
        Ok(app)
    }

    pub fn context(&self) -> &Arc<ModalContext> {
        &self.context
    }

    /// Handle incoming events
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        // Anything shown since the last frame has rendered once by now
        self.sync_modals()?;

        match event {
            Event::Key(key_event) => {
                if self.key_map.should_quit(&key_event) {
                    return Ok(true);
                }

                if !self.route_key(key_event).await? {
                    self.handle_app_key(key_event)?;
                }
            }

            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
            }

            Event::Tick => {}

            Event::StatusMessage(message) => {
                self.status_message = Some(message);
            }
        }

        Ok(false)
    }

    /// Give the key to the topmost visible modal
    async fn route_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.about.handle().visible() {
            return self.about_panel.handle_key_event(key, self.about.handle()).await;
        }

        let top = self
            .placeholder
            .slots()?
            .iter()
            .rev()
            .find(|slot| slot.handle.visible())
            .cloned();

        match top {
            Some(slot) => slot.component.handle_key_event(key, &slot.handle).await,
            None => Ok(false),
        }
    }

    fn handle_app_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.key_map.confirm.matches(&key) {
            let promise = self.context.show(
                &self.confirm,
                Some(args(&[
                    ("title", json!("Discard changes")),
                    ("message", json!("Throw away the scratch buffer?")),
                ])),
            )?;
            self.report("confirm", promise);
        } else if self.key_map.info.matches(&key) {
            let promise = self.context.show(
                "info",
                Some(args(&[("message", json!("Modals are shown by id from anywhere."))])),
            )?;
            self.report("info", promise);
        } else if self.key_map.about.matches(&key) {
            self.about_opened += 1;
            // Nobody waits on the about panel
            let _ = self
                .about
                .handle()
                .show(Some(args(&[("opened", json!(self.about_opened))])))?;
        }
        Ok(())
    }

    /// Post the outcome of `promise` to the status bar once it settles
    fn report(&self, label: &'static str, promise: ModalPromise) {
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let message = match promise.await {
                Ok(value) => format!("{} resolved with {}", label, value),
                Err(reason) => format!("{} rejected with {}", label, reason),
            };
            let _ = sender.send(Event::StatusMessage(message));
        });
    }

    /// Mount new slots, unmount vanished ones, and let every creator react
    /// to registry changes
    fn sync_modals(&mut self) -> Result<()> {
        if self.about.handle().has_changed() {
            self.about.sync()?;
        }

        let ids: Vec<ModalId> = self.placeholder.slots()?.iter().map(|slot| slot.id.clone()).collect();
        self.mounted.retain(|id, _| ids.contains(id));

        for id in ids {
            if !self.mounted.contains_key(&id) {
                let creator = ModalCreator::setup(&self.context, CreatorProps::new(id.clone()))?;
                self.mounted.insert(id, creator);
            }
        }

        for creator in self.mounted.values_mut() {
            if creator.handle().has_changed() {
                creator.sync()?;
            }
        }
        Ok(())
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Registry view
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Key help
            ])
            .split(frame.size());

        self.render_registry(frame, chunks[0]);
        self.render_status_bar(frame, chunks[1]);
        self.render_help(frame, chunks[2]);

        match self.placeholder.slots() {
            Ok(slots) => {
                for slot in slots.iter().filter(|slot| slot.handle.visible()) {
                    // Args from the latest show win over registration props
                    let mut props = slot.render_props.props.clone();
                    if let Some(args) = slot.handle.args() {
                        props.extend(args);
                    }
                    slot.component.render(frame, chunks[0], &slot.handle, &props);
                }
            }
            Err(e) => warn!("Cannot enumerate modals: {}", e),
        }

        if let Some(render_props) = self.about.render_props() {
            if self.about.handle().visible() {
                self.about_panel
                    .render(frame, chunks[0], self.about.handle(), &render_props.props);
            }
        }
    }

    /// Render the live modal registry
    fn render_registry(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            format!("{:<20} {:<8} {:<8} {:<8}", "id", "visible", "delayed", "kept"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        match self.context.snapshot() {
            Ok(state) => {
                for entry in state.values() {
                    lines.push(Line::from(format!(
                        "{:<20} {:<8} {:<8} {:<8}",
                        entry.id.as_str(),
                        entry.visible,
                        entry.delay_visible,
                        entry.keep_mounted
                    )));
                }
            }
            Err(e) => lines.push(Line::from(e.to_string())),
        }

        let block = Block::default().borders(Borders::ALL).title(" Modal registry ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame<'_>, area: Rect) {
        let status_text = self.status_message.as_deref().unwrap_or("Ready");
        let status = Paragraph::new(status_text).style(Style::default().fg(Color::Black).bg(Color::Gray));
        frame.render_widget(status, area);
    }

    fn render_help(&self, frame: &mut Frame<'_>, area: Rect) {
        let help = self
            .key_map
            .help_bindings()
            .iter()
            .map(|binding| format!("{}: {}", binding.label(), binding.description))
            .collect::<Vec<_>>()
            .join("  ");
        frame.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), area);
    }
}
