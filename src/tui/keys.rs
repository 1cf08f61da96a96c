use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub description: String,
}

impl KeyBinding {
    pub fn new(key: KeyCode, modifiers: KeyModifiers, description: &str) -> Self {
        Self {
            key,
            modifiers,
            description: description.to_string(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }

    /// Short label for the help line, e.g. `c` or `^c`
    pub fn label(&self) -> String {
        let key = match self.key {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Enter => "enter".to_string(),
            other => format!("{:?}", other),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("^{}", key)
        } else {
            key
        }
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit application
    pub quit: KeyBinding,

    /// Show the confirm dialog, addressed by component reference
    pub confirm: KeyBinding,

    /// Show the info dialog, addressed by id
    pub info: KeyBinding,

    /// Show the creator-declared about panel
    pub about: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL, "Quit application"),
            confirm: KeyBinding::new(KeyCode::Char('c'), KeyModifiers::NONE, "Ask for confirmation"),
            info: KeyBinding::new(KeyCode::Char('i'), KeyModifiers::NONE, "Show info"),
            about: KeyBinding::new(KeyCode::Char('a'), KeyModifiers::NONE, "Show about panel"),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Bindings shown in the help line
    pub fn help_bindings(&self) -> Vec<&KeyBinding> {
        vec![&self.confirm, &self.info, &self.about, &self.quit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_requires_control() {
        let keys = KeyMap::default();
        assert!(keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(keys.confirm.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_labels() {
        let keys = KeyMap::default();
        assert_eq!(keys.quit.label(), "^c");
        assert_eq!(keys.info.label(), "i");
    }
}
