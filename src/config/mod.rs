pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::collections::HashMap;

use serde::Deserialize;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{config_path, load};
pub use resolver::KeyResolver;

use crate::animation::AnimationKind;
use crate::appearance::{AppearanceStore, AppearanceValue, attr};

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Process-wide alert behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub default_animation: Option<AnimationKind>,
    pub reduced_motion: bool,
    pub darken_background: bool,
    pub blur_background: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    /// Appearance defaults, keyed by attribute name.
    #[serde(default)]
    pub appearance: HashMap<String, AppearanceValue>,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    /// Copy the `[appearance]` table and the default animation into `store`.
    pub fn seed_appearance(&self, store: &AppearanceStore) {
        store.extend(self.appearance.clone());
        if let Some(kind) = self.alert.default_animation {
            store.set_default(attr::DEFAULT_ANIMATION, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;

    #[test]
    fn test_seed_appearance() {
        let config: AppConfig = toml::from_str(
            r##"
            [alert]
            default_animation = "tumble"

            [appearance]
            titleColor = "#f5c2e7"
            "##,
        )
        .unwrap();

        let store = AppearanceStore::new();
        config.seed_appearance(&store);
        assert_eq!(
            store.get_default(attr::TITLE_COLOR),
            Some(AppearanceValue::Color(Color::Rgb(0xf5, 0xc2, 0xe7)))
        );
        assert_eq!(
            store.get_default(attr::DEFAULT_ANIMATION),
            Some(AnimationKind::Tumble.into())
        );
    }
}
