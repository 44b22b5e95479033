//! Appearance cascade for alerts.
//!
//! Every visual attribute an alert reads is resolved in three layers:
//!
//! 1. the alert's own overrides ([`Appearance::set_override`]),
//! 2. the defaults of the [`AppearanceStore`] the alert was built from,
//!    copied when the alert is constructed,
//! 3. a built-in default derived from the active [`Theme`].
//!
//! Attribute names are plain strings so applications can store their own
//! attributes next to the ones in [`attr`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use ratatui::style::{Color, Modifier};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::Theme;
use crate::animation::AnimationKind;

/// Attribute names understood by the alert renderer.
pub mod attr {
    pub const BACKGROUND_COLOR: &str = "backgroundColor";
    pub const BACKGROUND_GRADATION: &str = "backgroundGradation";
    pub const STROKE_COLOR: &str = "strokeColor";
    pub const STROKE_WIDTH: &str = "strokeWidth";
    pub const CORNER_RADIUS: &str = "cornerRadius";

    pub const TITLE_FONT: &str = "titleFont";
    pub const TITLE_COLOR: &str = "titleColor";
    pub const TITLE_SHADOW_COLOR: &str = "titleShadowColor";
    pub const TITLE_SHADOW_OFFSET: &str = "titleShadowOffset";

    pub const MESSAGE_FONT: &str = "messageFont";
    pub const MESSAGE_COLOR: &str = "messageColor";
    pub const MESSAGE_SHADOW_COLOR: &str = "messageShadowColor";
    pub const MESSAGE_SHADOW_OFFSET: &str = "messageShadowOffset";

    pub const BUTTON_BACKGROUND_COLOR: &str = "buttonBackgroundColor";
    pub const BUTTON_STROKE_COLOR: &str = "buttonStrokeColor";
    pub const BUTTON_STROKE_WIDTH: &str = "buttonStrokeWidth";
    pub const BUTTON_FONT: &str = "buttonFont";
    pub const BUTTON_TEXT_COLOR: &str = "buttonTextColor";
    pub const BUTTON_HIGHLIGHTED_TEXT_COLOR: &str = "buttonHighlightedTextColor";
    pub const CANCEL_BUTTON_BACKGROUND_COLOR: &str = "cancelButtonBackgroundColor";
    pub const CANCEL_BUTTON_FONT: &str = "cancelButtonFont";
    pub const CANCEL_BUTTON_TEXT_COLOR: &str = "cancelButtonTextColor";
    pub const CANCEL_BUTTON_HIGHLIGHTED_TEXT_COLOR: &str = "cancelButtonHighlightedTextColor";

    pub const TEXT_FIELD_FONT: &str = "textFieldFont";
    pub const TEXT_FIELD_TEXT_COLOR: &str = "textFieldTextColor";

    pub const BACKDROP_COLOR: &str = "backdropColor";
    pub const DEFAULT_ANIMATION: &str = "defaultAnimation";
}

/// A single appearance value.
#[derive(Debug, Clone, PartialEq)]
pub enum AppearanceValue {
    Color(Color),
    Number(f64),
    Flag(bool),
    Modifier(Modifier),
    /// Horizontal and vertical offset in cells.
    Offset(i16, i16),
    Text(String),
}

impl AppearanceValue {
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            Self::Text(text) => Color::from_str(text).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_modifier(&self) -> Option<Modifier> {
        match self {
            Self::Modifier(modifier) => Some(*modifier),
            Self::Text(text) => parse_modifier(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_offset(&self) -> Option<(i16, i16)> {
        match self {
            Self::Offset(dx, dy) => Some((*dx, *dy)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Parse `"bold"`, `"bold+italic"`, `"italic underlined"` and the like.
fn parse_modifier(text: &str) -> Option<Modifier> {
    let mut modifier = Modifier::empty();
    for part in text
        .split(['+', ',', '|', ' '])
        .filter(|part| !part.is_empty())
    {
        modifier |= match part.to_lowercase().as_str() {
            "none" | "regular" | "normal" => Modifier::empty(),
            "bold" => Modifier::BOLD,
            "dim" => Modifier::DIM,
            "italic" => Modifier::ITALIC,
            "underline" | "underlined" => Modifier::UNDERLINED,
            "reversed" | "reverse" => Modifier::REVERSED,
            "strikethrough" | "crossed_out" => Modifier::CROSSED_OUT,
            _ => return None,
        };
    }
    Some(modifier)
}

impl From<Color> for AppearanceValue {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<f64> for AppearanceValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for AppearanceValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Modifier> for AppearanceValue {
    fn from(modifier: Modifier) -> Self {
        Self::Modifier(modifier)
    }
}

impl From<(i16, i16)> for AppearanceValue {
    fn from((dx, dy): (i16, i16)) -> Self {
        Self::Offset(dx, dy)
    }
}

impl From<&str> for AppearanceValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AppearanceValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<AnimationKind> for AppearanceValue {
    fn from(kind: AnimationKind) -> Self {
        Self::Text(kind.name().to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Offset(i16, i16),
    Text(String),
}

impl<'de> Deserialize<'de> for AppearanceValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Flag(flag) => Self::Flag(flag),
            #[allow(clippy::cast_precision_loss)]
            RawValue::Integer(n) => Self::Number(n as f64),
            RawValue::Number(n) => Self::Number(n),
            RawValue::Offset(dx, dy) => Self::Offset(dx, dy),
            RawValue::Text(text) => Color::from_str(&text).map_or(Self::Text(text), Self::Color),
        })
    }
}

thread_local! {
    static GLOBAL_STORE: AppearanceStore = AppearanceStore::new();
}

/// Registry of default appearance values shared by all alerts built from it.
///
/// The store is a cheap handle; clones share the same defaults. It is not
/// `Send`: appearance is configured and read on the UI thread only, normally
/// during application setup. Changing a default only affects alerts built
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct AppearanceStore {
    defaults: Rc<RefCell<HashMap<String, AppearanceValue>>>,
}

impl AppearanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The store used by alerts that are not given one explicitly.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_STORE.with(Clone::clone)
    }

    #[must_use]
    pub fn get_default(&self, name: &str) -> Option<AppearanceValue> {
        self.defaults.borrow().get(name).cloned()
    }

    pub fn set_default(&self, name: impl Into<String>, value: impl Into<AppearanceValue>) {
        let name = name.into();
        let value = value.into();
        debug!(attribute = %name, ?value, "Setting appearance default");
        self.defaults.borrow_mut().insert(name, value);
    }

    pub fn remove_default(&self, name: &str) -> Option<AppearanceValue> {
        self.defaults.borrow_mut().remove(name)
    }

    /// Set many defaults at once, e.g. from the `[appearance]` config table.
    pub fn extend(&self, values: impl IntoIterator<Item = (String, AppearanceValue)>) {
        self.defaults.borrow_mut().extend(values);
    }

    /// Independent copy of the current defaults.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, AppearanceValue> {
        self.defaults.borrow().clone()
    }
}

/// Control state for per-state text attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Normal,
    /// The button has keyboard focus.
    Highlighted,
}

/// Text styling applied to one part of an alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAttributes {
    pub color: Option<Color>,
    pub font: Option<Modifier>,
    pub shadow_color: Option<Color>,
    pub shadow_offset: Option<(i16, i16)>,
}

impl TextAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub const fn font(mut self, font: Modifier) -> Self {
        self.font = Some(font);
        self
    }

    #[must_use]
    pub const fn shadow(mut self, color: Color, offset: (i16, i16)) -> Self {
        self.shadow_color = Some(color);
        self.shadow_offset = Some(offset);
        self
    }
}

/// Attribute names a [`TextAttributes`] value is written to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextAttributeNames {
    pub color: &'static str,
    pub font: &'static str,
    pub shadow_color: Option<&'static str>,
    pub shadow_offset: Option<&'static str>,
}

impl TextAttributeNames {
    pub(crate) fn entries(self, attributes: &TextAttributes) -> Vec<(&'static str, AppearanceValue)> {
        let mut entries = Vec::new();
        if let Some(color) = attributes.color {
            entries.push((self.color, color.into()));
        }
        if let Some(font) = attributes.font {
            entries.push((self.font, font.into()));
        }
        if let (Some(name), Some(color)) = (self.shadow_color, attributes.shadow_color) {
            entries.push((name, color.into()));
        }
        if let (Some(name), Some(offset)) = (self.shadow_offset, attributes.shadow_offset) {
            entries.push((name, offset.into()));
        }
        entries
    }
}

/// Resolved appearance of a single alert.
#[derive(Debug, Clone, Default)]
pub struct Appearance {
    overrides: HashMap<String, AppearanceValue>,
    defaults: HashMap<String, AppearanceValue>,
}

impl Appearance {
    /// Capture the store's current defaults.
    #[must_use]
    pub fn from_store(store: &AppearanceStore) -> Self {
        Self {
            overrides: HashMap::new(),
            defaults: store.snapshot(),
        }
    }

    pub fn set_override(&mut self, name: impl Into<String>, value: impl Into<AppearanceValue>) {
        self.overrides.insert(name.into(), value.into());
    }

    pub fn clear_override(&mut self, name: &str) -> Option<AppearanceValue> {
        self.overrides.remove(name)
    }

    #[must_use]
    pub fn override_value(&self, name: &str) -> Option<&AppearanceValue> {
        self.overrides.get(name)
    }

    /// Override or store default, without the built-in layer.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&AppearanceValue> {
        self.overrides.get(name).or_else(|| self.defaults.get(name))
    }

    /// Fully resolved value, including the theme-derived default.
    #[must_use]
    pub fn resolve(&self, name: &str, theme: &Theme) -> Option<AppearanceValue> {
        self.lookup(name).cloned().or_else(|| builtin(name, theme))
    }

    /// First layer whose value converts with `convert`. Values of the wrong
    /// type are skipped so a bad override cannot hide a usable default.
    fn layered<T>(&self, name: &str, convert: impl Fn(&AppearanceValue) -> Option<T>) -> Option<T> {
        [self.overrides.get(name), self.defaults.get(name)]
            .into_iter()
            .flatten()
            .find_map(|value| {
                let converted = convert(value);
                if converted.is_none() {
                    debug!(attribute = name, ?value, "Ignoring appearance value of unexpected type");
                }
                converted
            })
    }

    #[must_use]
    pub fn color(&self, name: &str, theme: &Theme) -> Color {
        self.layered(name, AppearanceValue::as_color)
            .or_else(|| builtin(name, theme).and_then(|v| v.as_color()))
            .unwrap_or(Color::Reset)
    }

    #[must_use]
    pub fn number(&self, name: &str, theme: &Theme) -> f64 {
        self.layered(name, AppearanceValue::as_number)
            .or_else(|| builtin(name, theme).and_then(|v| v.as_number()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn modifier(&self, name: &str, theme: &Theme) -> Modifier {
        self.layered(name, AppearanceValue::as_modifier)
            .or_else(|| builtin(name, theme).and_then(|v| v.as_modifier()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn offset(&self, name: &str, theme: &Theme) -> (i16, i16) {
        self.layered(name, AppearanceValue::as_offset)
            .or_else(|| builtin(name, theme).and_then(|v| v.as_offset()))
            .unwrap_or_default()
    }

    /// Configured default animation, if any layer names a valid one.
    #[must_use]
    pub fn default_animation(&self) -> Option<AnimationKind> {
        self.layered(attr::DEFAULT_ANIMATION, |value| {
            value.as_text().and_then(|text| text.parse().ok())
        })
    }
}

/// Built-in defaults, derived from the theme.
fn builtin(name: &str, theme: &Theme) -> Option<AppearanceValue> {
    use attr::*;

    let value = match name {
        BACKGROUND_COLOR => theme.base().into(),
        BACKGROUND_GRADATION => 0.0_f64.into(),
        STROKE_COLOR => theme.lavender().into(),
        STROKE_WIDTH | BUTTON_STROKE_WIDTH => 1.0_f64.into(),
        CORNER_RADIUS => 4.0_f64.into(),

        TITLE_FONT | BUTTON_FONT => Modifier::BOLD.into(),
        TITLE_COLOR => theme.mauve().into(),
        TITLE_SHADOW_COLOR | MESSAGE_SHADOW_COLOR => theme.crust().into(),
        TITLE_SHADOW_OFFSET | MESSAGE_SHADOW_OFFSET => (0_i16, 0_i16).into(),

        MESSAGE_FONT | TEXT_FIELD_FONT | CANCEL_BUTTON_FONT => Modifier::empty().into(),
        MESSAGE_COLOR | BUTTON_TEXT_COLOR | TEXT_FIELD_TEXT_COLOR => theme.text().into(),

        BUTTON_BACKGROUND_COLOR => theme.surface0().into(),
        BUTTON_STROKE_COLOR => theme.overlay0().into(),
        BUTTON_HIGHLIGHTED_TEXT_COLOR => theme.green().into(),
        CANCEL_BUTTON_BACKGROUND_COLOR => theme.mantle().into(),
        CANCEL_BUTTON_TEXT_COLOR => theme.overlay2().into(),
        CANCEL_BUTTON_HIGHLIGHTED_TEXT_COLOR => theme.red().into(),

        BACKDROP_COLOR => theme.crust().into(),
        DEFAULT_ANIMATION => AnimationKind::Default.into(),
        _ => return None,
    };
    Some(value)
}
