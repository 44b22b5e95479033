//! Animated, themeable modal alerts for ratatui applications.
//!
//! An [`AlertView`] shows a title, a message, optional text fields, an
//! optional custom [`ContentView`] and a row of buttons on top of whatever the
//! host draws. Pressing a button reports its index to a result handler and
//! dismisses the alert with an exit animation.

pub mod alert;
pub mod animation;
pub mod appearance;
pub mod config;
pub mod error;
pub mod overlay;
pub mod presentation;
pub mod theme;
pub mod ui;

pub use alert::{AlertEvent, AlertView, ContentView, Focus};
pub use animation::AnimationKind;
pub use appearance::{AppearanceStore, AppearanceValue, ControlState, TextAttributes, attr};
pub use error::{AlertError, Result};
pub use overlay::{Backdrop, Overlay};
pub use presentation::PresentationState;
pub use theme::Theme;
