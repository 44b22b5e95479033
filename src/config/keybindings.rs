use crossterm::event::KeyCode;
use serde::Deserialize;

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub toggle_reduced_motion: KeyBinding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertKeybindings {
    pub next: KeyBinding,
    pub previous: KeyBinding,
    pub left: KeyBinding,
    pub right: KeyBinding,
    pub activate: KeyBinding,
    pub cancel: KeyBinding,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub alert: AlertKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('q')),
                Key::with_ctrl(KeyCode::Char('c')),
            ]),
            toggle_reduced_motion: Key::new(KeyCode::Char('m')).into(),
        }
    }
}

impl Default for AlertKeybindings {
    fn default() -> Self {
        Self {
            next: KeyBinding::multiple(vec![Key::new(KeyCode::Tab), Key::new(KeyCode::Down)]),
            previous: KeyBinding::multiple(vec![
                Key::new(KeyCode::BackTab),
                Key::new(KeyCode::Up),
            ]),
            left: KeyBinding::multiple(vec![
                Key::new(KeyCode::Left),
                Key::new(KeyCode::Char('h')),
            ]),
            right: KeyBinding::multiple(vec![
                Key::new(KeyCode::Right),
                Key::new(KeyCode::Char('l')),
            ]),
            activate: Key::new(KeyCode::Enter).into(),
            cancel: Key::new(KeyCode::Esc).into(),
        }
    }
}
