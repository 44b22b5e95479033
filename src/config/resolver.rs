use crate::config::actions::{AlertAction, GlobalAction};
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::ToggleReducedMotion => kb.toggle_reduced_motion.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::ToggleReducedMotion => kb.toggle_reduced_motion.display(),
        }
    }

    // Alert actions
    pub fn matches_alert(&self, event: &KeyEvent, action: AlertAction) -> bool {
        let kb = &self.keybindings.alert;
        match action {
            AlertAction::Next => kb.next.matches(event),
            AlertAction::Previous => kb.previous.matches(event),
            AlertAction::Left => kb.left.matches(event),
            AlertAction::Right => kb.right.matches(event),
            AlertAction::Activate => kb.activate.matches(event),
            AlertAction::Cancel => kb.cancel.matches(event),
        }
    }

    pub fn display_alert(&self, action: AlertAction) -> String {
        let kb = &self.keybindings.alert;
        match action {
            AlertAction::Next => kb.next.display(),
            AlertAction::Previous => kb.previous.display(),
            AlertAction::Left => kb.left.display(),
            AlertAction::Right => kb.right.display(),
            AlertAction::Activate => kb.activate.display(),
            AlertAction::Cancel => kb.cancel.display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_default_alert_bindings() {
        let resolver = KeyResolver::default();
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert!(resolver.matches_alert(&tab, AlertAction::Next));
        assert!(!resolver.matches_alert(&tab, AlertAction::Previous));
        assert!(resolver.matches_alert(&esc, AlertAction::Cancel));
        assert_eq!(resolver.display_alert(AlertAction::Next), "Tab/Down");
    }

    #[test]
    fn test_ctrl_c_quits() {
        let resolver = KeyResolver::default();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(resolver.matches_global(&event, GlobalAction::Quit));
    }
}
