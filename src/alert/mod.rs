//! The alert widget.
//!
//! An [`AlertView`] is configured (title, message, buttons, fields, content,
//! appearance), shown on an [`Overlay`], driven by the host's ticks and key
//! events, and reports the button that dismissed it through its result
//! handler.
//!
//! ```no_run
//! use alertkit::AlertView;
//!
//! let mut alert = AlertView::with_buttons("Delete?", "This cannot be undone.", Some("Cancel"), ["Delete"])?;
//! alert.set_handler(|index, _alert| {
//!     if index == 1 {
//!         // delete
//!     }
//! });
//! alert.show()?;
//! # Ok::<(), alertkit::AlertError>(())
//! ```

pub mod buttons;
pub mod fields;
mod render;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::debug;

use crate::Theme;
use crate::animation::AnimationKind;
use crate::appearance::{
    Appearance, AppearanceStore, AppearanceValue, ControlState, TextAttributeNames, TextAttributes,
    attr,
};
use crate::config::{AlertAction, KeyResolver};
use crate::error::{AlertError, Result};
use crate::overlay::{Backdrop, Overlay};
use crate::presentation::{Completion, PresentationController, PresentationState, Transition};
use crate::ui::{self, Component, EventResult};

pub use buttons::{ButtonEntry, ButtonRegistry};
pub use fields::{
    FieldDescriptor, FieldEntry, FieldHandle, FieldRegistry, TerminalInputs, TextInputHost,
};

/// Receives the index of the button that dismissed the alert.
pub type ResultHandler = Box<dyn FnMut(usize, &AlertView)>;

/// Custom content shown between the message and the fields.
pub trait ContentView {
    /// Rows needed at `width` columns.
    fn height(&self, width: u16) -> u16;

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme);
}

/// Output of [`AlertView::handle_key`](Component::handle_key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// A button was activated; the alert is now dismissing.
    ButtonActivated(usize),
    /// An alert without buttons was dismissed from the keyboard.
    Dismissed,
}

/// Keyboard focus inside a visible alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    Field(usize),
    Button(usize),
}

const TITLE_TEXT: TextAttributeNames = TextAttributeNames {
    color: attr::TITLE_COLOR,
    font: attr::TITLE_FONT,
    shadow_color: Some(attr::TITLE_SHADOW_COLOR),
    shadow_offset: Some(attr::TITLE_SHADOW_OFFSET),
};

const MESSAGE_TEXT: TextAttributeNames = TextAttributeNames {
    color: attr::MESSAGE_COLOR,
    font: attr::MESSAGE_FONT,
    shadow_color: Some(attr::MESSAGE_SHADOW_COLOR),
    shadow_offset: Some(attr::MESSAGE_SHADOW_OFFSET),
};

const TEXT_FIELD_TEXT: TextAttributeNames = TextAttributeNames {
    color: attr::TEXT_FIELD_TEXT_COLOR,
    font: attr::TEXT_FIELD_FONT,
    shadow_color: None,
    shadow_offset: None,
};

const fn button_text(cancel: bool, state: ControlState) -> TextAttributeNames {
    let (color, font) = match (cancel, state) {
        (false, ControlState::Normal) => (attr::BUTTON_TEXT_COLOR, attr::BUTTON_FONT),
        (false, ControlState::Highlighted) => {
            (attr::BUTTON_HIGHLIGHTED_TEXT_COLOR, attr::BUTTON_FONT)
        }
        (true, ControlState::Normal) => (attr::CANCEL_BUTTON_TEXT_COLOR, attr::CANCEL_BUTTON_FONT),
        (true, ControlState::Highlighted) => (
            attr::CANCEL_BUTTON_HIGHLIGHTED_TEXT_COLOR,
            attr::CANCEL_BUTTON_FONT,
        ),
    };
    TextAttributeNames {
        color,
        font,
        shadow_color: None,
        shadow_offset: None,
    }
}

pub struct AlertView {
    title: String,
    message: String,
    content: Option<Box<dyn ContentView>>,
    appearance: Appearance,
    darken_background: bool,
    blur_background: bool,
    buttons: ButtonRegistry,
    fields: FieldRegistry,
    inputs: Box<dyn TextInputHost>,
    handler: Option<ResultHandler>,
    presentation: PresentationController,
    focus: Focus,
    resolver: Arc<KeyResolver>,
    last_tick: Option<Instant>,
}

impl AlertView {
    /// Alert on the global overlay, styled from the global appearance store.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::in_host(title, message, &Overlay::global(), &AppearanceStore::global())
    }

    /// Same as [`AlertView::new`].
    pub fn dialog(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message)
    }

    /// Alert with an optional cancel button at index 0 followed by `others`.
    pub fn with_buttons<I, S>(
        title: impl Into<String>,
        message: impl Into<String>,
        cancel: Option<&str>,
        others: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alert = Self::new(title, message);
        if let Some(cancel) = cancel {
            alert.add_cancel_button(cancel)?;
        }
        for label in others {
            alert.add_button(label)?;
        }
        Ok(alert)
    }

    /// Alert presented on `overlay`, with defaults copied from `store` now.
    pub fn in_host(
        title: impl Into<String>,
        message: impl Into<String>,
        overlay: &Overlay,
        store: &AppearanceStore,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            content: None,
            appearance: Appearance::from_store(store),
            darken_background: false,
            blur_background: false,
            buttons: ButtonRegistry::new(),
            fields: FieldRegistry::new(),
            inputs: Box::new(TerminalInputs::new()),
            handler: None,
            presentation: PresentationController::new(overlay.clone()),
            focus: Focus::None,
            resolver: Arc::new(KeyResolver::default()),
            last_tick: None,
        }
    }

    #[must_use]
    pub fn with_key_resolver(mut self, resolver: Arc<KeyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use `host` instead of the built-in terminal inputs for text fields.
    #[must_use]
    pub fn with_text_input_host(mut self, host: Box<dyn TextInputHost>) -> Self {
        self.inputs = host;
        self
    }

    // Content

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_content_view(&mut self, content: Box<dyn ContentView>) {
        self.content = Some(content);
    }

    pub fn take_content_view(&mut self) -> Option<Box<dyn ContentView>> {
        self.content.take()
    }

    #[must_use]
    pub fn has_content_view(&self) -> bool {
        self.content.is_some()
    }

    #[must_use]
    pub const fn darken_background(&self) -> bool {
        self.darken_background
    }

    /// Takes effect the next time the alert is shown.
    pub const fn set_darken_background(&mut self, darken: bool) {
        self.darken_background = darken;
    }

    #[must_use]
    pub const fn blur_background(&self) -> bool {
        self.blur_background
    }

    /// Takes effect the next time the alert is shown.
    pub const fn set_blur_background(&mut self, blur: bool) {
        self.blur_background = blur;
    }

    // Buttons and fields

    /// Register a button and return its index.
    pub fn add_button(&mut self, label: impl Into<String>) -> Result<usize> {
        self.ensure_unpresented("add a button to")?;
        self.buttons.add(label)
    }

    /// Register the cancel button. It must come before every other button,
    /// so it always has index 0.
    pub fn add_cancel_button(&mut self, label: impl Into<String>) -> Result<usize> {
        self.ensure_unpresented("add a cancel button to")?;
        self.buttons.add_cancel(label)
    }

    pub fn add_field(&mut self, placeholder: impl Into<String>, secure: bool) -> Result<()> {
        self.ensure_unpresented("add a text field to")?;
        self.fields.add(placeholder, secure);
        Ok(())
    }

    #[must_use]
    pub const fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Current text of field `index`. Empty until the alert has been shown.
    pub fn text_at(&self, index: usize) -> Result<String> {
        self.fields.text_at(index, self.inputs.as_ref())
    }

    fn ensure_unpresented(&self, operation: &'static str) -> Result<()> {
        match self.state() {
            PresentationState::Unpresented => Ok(()),
            state => Err(AlertError::InvalidState { operation, state }),
        }
    }

    // Appearance

    #[must_use]
    pub const fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Override one appearance attribute for this alert only.
    pub fn set_appearance_override(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AppearanceValue>,
    ) {
        self.appearance.set_override(name, value);
    }

    pub fn set_title_text_attributes(&mut self, attributes: &TextAttributes) {
        self.apply_text_attributes(TITLE_TEXT, attributes);
    }

    pub fn set_message_text_attributes(&mut self, attributes: &TextAttributes) {
        self.apply_text_attributes(MESSAGE_TEXT, attributes);
    }

    pub fn set_button_text_attributes(&mut self, attributes: &TextAttributes, state: ControlState) {
        self.apply_text_attributes(button_text(false, state), attributes);
    }

    pub fn set_cancel_button_text_attributes(
        &mut self,
        attributes: &TextAttributes,
        state: ControlState,
    ) {
        self.apply_text_attributes(button_text(true, state), attributes);
    }

    pub fn set_text_field_text_attributes(&mut self, attributes: &TextAttributes) {
        self.apply_text_attributes(TEXT_FIELD_TEXT, attributes);
    }

    fn apply_text_attributes(&mut self, names: TextAttributeNames, attributes: &TextAttributes) {
        for (name, value) in names.entries(attributes) {
            self.appearance.set_override(name, value);
        }
    }

    // Result handling

    /// Replace the result handler. It runs once per button-triggered
    /// dismissal, before the hide completion.
    pub fn set_handler(&mut self, handler: impl FnMut(usize, &Self) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    // Lifecycle

    #[must_use]
    pub const fn state(&self) -> PresentationState {
        self.presentation.state()
    }

    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        self.presentation.overlay()
    }

    pub fn show(&mut self) -> Result<()> {
        self.present(AnimationKind::Default, None)
    }

    pub fn show_with_completion(&mut self, completion: impl FnOnce() + 'static) -> Result<()> {
        self.present(AnimationKind::Default, Some(Box::new(completion)))
    }

    pub fn show_with_animation(&mut self, animation: AnimationKind) -> Result<()> {
        self.present(animation, None)
    }

    pub fn show_with_animation_and_completion(
        &mut self,
        animation: AnimationKind,
        completion: impl FnOnce() + 'static,
    ) -> Result<()> {
        self.present(animation, Some(Box::new(completion)))
    }

    /// Dismiss with the animation the alert was shown with.
    pub fn hide(&mut self) -> Result<()> {
        self.dismiss(None, None, None)
    }

    pub fn hide_with_completion(&mut self, completion: impl FnOnce() + 'static) -> Result<()> {
        self.dismiss(None, None, Some(Box::new(completion)))
    }

    pub fn hide_with_animation(&mut self, animation: AnimationKind) -> Result<()> {
        self.dismiss(Some(animation), None, None)
    }

    pub fn hide_with_animation_and_completion(
        &mut self,
        animation: AnimationKind,
        completion: impl FnOnce() + 'static,
    ) -> Result<()> {
        self.dismiss(Some(animation), None, Some(Box::new(completion)))
    }

    /// Act as if button `index` was pressed. Only valid while visible.
    pub fn activate_button(&mut self, index: usize) -> Result<()> {
        self.activate(index, None)
    }

    /// Like [`AlertView::activate_button`]; `completion` runs after the
    /// result handler once the alert is gone.
    pub fn activate_button_with_completion(
        &mut self,
        index: usize,
        completion: impl FnOnce() + 'static,
    ) -> Result<()> {
        self.activate(index, Some(Box::new(completion)))
    }

    fn activate(&mut self, index: usize, completion: Option<Completion>) -> Result<()> {
        self.buttons.check(index)?;
        let state = self.state();
        if state != PresentationState::Visible {
            return Err(AlertError::InvalidState {
                operation: "activate a button on",
                state,
            });
        }
        debug!(index, "Button activated");
        self.dismiss(None, Some(index), completion)
    }

    /// Move the running animation forward by `delta`, firing any callbacks
    /// that become due.
    pub fn advance(&mut self, delta: Duration) {
        if let Some(transition) = self.presentation.advance(delta) {
            self.complete(transition);
        }
    }

    /// Finish a running animation that cannot be drawn, firing its
    /// callbacks as if it had run to the end.
    fn force_animation_complete(&mut self) {
        if let Some(transition) = self.presentation.force_complete() {
            self.complete(transition);
        }
    }

    fn present(&mut self, animation: AnimationKind, completion: Option<Completion>) -> Result<()> {
        let animation = self.resolve_animation(animation);
        let backdrop = Backdrop {
            darken: self.darken_background,
            blur: self.blur_background,
        };
        if self.presentation.show(animation, backdrop, completion)? {
            self.fields.attach(self.inputs.as_mut());
            self.focus = self.initial_focus();
            self.last_tick = Some(Instant::now());
        }
        Ok(())
    }

    fn dismiss(
        &mut self,
        animation: Option<AnimationKind>,
        button: Option<usize>,
        completion: Option<Completion>,
    ) -> Result<()> {
        let animation = animation.map_or_else(
            || self.presentation.animation(),
            |kind| self.resolve_animation(kind),
        );
        self.presentation.hide(animation, button, completion)
    }

    fn resolve_animation(&self, animation: AnimationKind) -> AnimationKind {
        animation.or_configured(self.appearance.default_animation())
    }

    fn complete(&mut self, transition: Transition) {
        match transition {
            Transition::Visible { completion } => {
                if let Some(completion) = completion {
                    completion();
                }
            }
            Transition::Dismissed { button, completion } => {
                if let Some(index) = button
                    && let Some(mut handler) = self.handler.take()
                {
                    handler(index, self);
                    self.handler = Some(handler);
                }
                if let Some(completion) = completion {
                    completion();
                }
                self.presentation.release_surface();
                self.focus = Focus::None;
                self.last_tick = None;
            }
        }
    }

    // Focus

    fn initial_focus(&self) -> Focus {
        if !self.fields.is_empty() {
            Focus::Field(0)
        } else if !self.buttons.is_empty() {
            Focus::Button(self.buttons.cancel_index().unwrap_or(0))
        } else {
            Focus::None
        }
    }

    /// Position of the focus in the field-then-button order.
    fn focus_position(&self) -> Option<usize> {
        match self.focus {
            Focus::None => None,
            Focus::Field(index) => Some(index),
            Focus::Button(index) => Some(self.fields.len() + index),
        }
    }

    fn focus_at(&self, position: usize) -> Focus {
        if position < self.fields.len() {
            Focus::Field(position)
        } else {
            Focus::Button(position - self.fields.len())
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let count = self.fields.len() + self.buttons.len();
        if count == 0 {
            return;
        }
        let position = match (self.focus_position(), forward) {
            (None, _) => 0,
            (Some(p), true) => (p + 1) % count,
            (Some(p), false) => (p + count - 1) % count,
        };
        self.focus = self.focus_at(position);
    }

    fn move_along_buttons(&mut self, forward: bool) {
        let Focus::Button(index) = self.focus else {
            return;
        };
        let count = self.buttons.len();
        self.focus = Focus::Button(if forward {
            (index + 1).min(count.saturating_sub(1))
        } else {
            index.saturating_sub(1)
        });
    }

    fn cancel(&mut self) -> Result<EventResult<AlertEvent>> {
        if let Some(index) = self.buttons.cancel_index() {
            self.activate_button(index)?;
            return Ok(AlertEvent::ButtonActivated(index).into());
        }
        if self.buttons.is_empty() {
            self.hide()?;
            return Ok(AlertEvent::Dismissed.into());
        }
        Ok(EventResult::Consumed)
    }

    fn activate_focused(&mut self) -> Result<EventResult<AlertEvent>> {
        match self.focus {
            Focus::Field(_) => {
                self.cycle_focus(true);
                Ok(EventResult::Consumed)
            }
            Focus::Button(index) => {
                self.activate_button(index)?;
                Ok(AlertEvent::ButtonActivated(index).into())
            }
            Focus::None if self.buttons.is_empty() => {
                self.hide()?;
                Ok(AlertEvent::Dismissed.into())
            }
            Focus::None => Ok(EventResult::Consumed),
        }
    }
}

impl Component for AlertView {
    type Output = AlertEvent;

    fn handle_key(&mut self, key: KeyEvent) -> ui::Result<EventResult<Self::Output>> {
        match self.state() {
            PresentationState::Visible => {}
            // Input is swallowed while animating.
            PresentationState::Presenting | PresentationState::Dismissing => {
                return Ok(EventResult::Consumed);
            }
            PresentationState::Unpresented | PresentationState::Dismissed => {
                return Ok(EventResult::Ignored);
            }
        }

        let resolver = Arc::clone(&self.resolver);
        if resolver.matches_alert(&key, AlertAction::Cancel) {
            return Ok(self.cancel()?);
        }
        if let Focus::Field(index) = self.focus {
            if resolver.matches_alert(&key, AlertAction::Activate) {
                return Ok(self.activate_focused()?);
            }
            if let Some(handle) = self.fields.get(index).and_then(FieldEntry::handle)
                && self.inputs.handle_key(handle, key)
            {
                return Ok(EventResult::Consumed);
            }
        }

        if resolver.matches_alert(&key, AlertAction::Next) {
            self.cycle_focus(true);
        } else if resolver.matches_alert(&key, AlertAction::Previous) {
            self.cycle_focus(false);
        } else if resolver.matches_alert(&key, AlertAction::Right) {
            self.move_along_buttons(true);
        } else if resolver.matches_alert(&key, AlertAction::Left) {
            self.move_along_buttons(false);
        } else if resolver.matches_alert(&key, AlertAction::Activate) {
            return Ok(self.activate_focused()?);
        }
        Ok(EventResult::Consumed)
    }

    fn handle_tick(&mut self) {
        let now = Instant::now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.advance(delta);
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        render::render(self, area, frame.buffer_mut(), theme);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crossterm::event::{KeyCode, KeyModifiers};
    use proptest::prelude::*;
    use ratatui::style::{Color, Modifier};

    use super::*;

    const LONG: Duration = Duration::from_secs(5);

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn host() -> (Overlay, AppearanceStore) {
        (Overlay::new(), AppearanceStore::new())
    }

    fn delete_alert(overlay: &Overlay, store: &AppearanceStore) -> AlertView {
        let mut alert = AlertView::in_host("Delete?", "This cannot be undone.", overlay, store);
        alert.add_cancel_button("Cancel").unwrap();
        alert.add_button("Delete").unwrap();
        alert
    }

    fn shown(alert: &mut AlertView) {
        alert.show().unwrap();
        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Visible);
    }

    #[test]
    fn test_delete_scenario() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        let log = Rc::new(RefCell::new(Vec::new()));

        let handler_log = Rc::clone(&log);
        alert.set_handler(move |index, alert| {
            handler_log
                .borrow_mut()
                .push(format!("result {index} from {}", alert.title()));
        });

        shown(&mut alert);
        assert!(overlay.is_occupied());

        alert.activate_button(1).unwrap();
        assert_eq!(alert.state(), PresentationState::Dismissing);
        assert!(log.borrow().is_empty());

        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Dismissed);
        assert_eq!(*log.borrow(), vec!["result 1 from Delete?".to_string()]);
        assert!(!overlay.is_occupied());
    }

    #[test]
    fn test_delete_with_typed_confirmation() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        alert.add_field("confirm", false).unwrap();

        let calls = Rc::new(RefCell::new(Vec::new()));
        let handler_calls = Rc::clone(&calls);
        alert.set_handler(move |index, alert| {
            handler_calls.borrow_mut().push((
                index,
                alert.title().to_string(),
                alert.text_at(0).unwrap(),
            ));
        });

        alert.show_with_animation(AnimationKind::Fade).unwrap();
        assert_eq!(alert.state(), PresentationState::Presenting);
        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Visible);
        assert_eq!(alert.focus(), Focus::Field(0));

        for c in "delete".chars() {
            alert.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        alert.activate_button(1).unwrap();
        assert_eq!(alert.state(), PresentationState::Dismissing);
        assert!(calls.borrow().is_empty());

        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Dismissed);
        assert_eq!(
            *calls.borrow(),
            vec![(1, "Delete?".to_string(), "delete".to_string())]
        );
        assert_eq!(alert.text_at(0), Ok("delete".to_string()));
        assert!(!overlay.is_occupied());
    }

    #[test]
    fn test_result_fires_before_hide_completion() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        let order = Rc::new(RefCell::new(Vec::new()));

        let handler_order = Rc::clone(&order);
        alert.set_handler(move |index, _| handler_order.borrow_mut().push(format!("result {index}")));
        shown(&mut alert);

        let completion_order = Rc::clone(&order);
        alert
            .activate_button_with_completion(0, move || {
                completion_order.borrow_mut().push("hidden".to_string());
            })
            .unwrap();
        // A running dismissal cannot be replaced.
        assert!(alert.hide().is_err());

        alert.advance(LONG);
        assert_eq!(
            *order.borrow(),
            vec!["result 0".to_string(), "hidden".to_string()]
        );
    }

    #[test]
    fn test_programmatic_hide_skips_result_handler() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        let results = Rc::new(Cell::new(0));
        let hidden = Rc::new(Cell::new(0));

        let handler_results = Rc::clone(&results);
        alert.set_handler(move |_, _| handler_results.set(handler_results.get() + 1));
        shown(&mut alert);

        let hide_count = Rc::clone(&hidden);
        alert
            .hide_with_completion(move || hide_count.set(hide_count.get() + 1))
            .unwrap();
        alert.advance(LONG);

        assert_eq!(results.get(), 0);
        assert_eq!(hidden.get(), 1);
    }

    #[test]
    fn test_show_completion_fires_once() {
        let (overlay, store) = host();
        let mut alert = AlertView::in_host("Saved", "", &overlay, &store);
        let shown_count = Rc::new(Cell::new(0));

        let count = Rc::clone(&shown_count);
        alert
            .show_with_animation_and_completion(AnimationKind::Fade, move || count.set(count.get() + 1))
            .unwrap();
        alert.show().unwrap();
        alert.advance(Duration::from_millis(100));
        assert_eq!(shown_count.get(), 0);
        alert.advance(LONG);
        alert.advance(LONG);
        assert_eq!(shown_count.get(), 1);
    }

    #[test]
    fn test_hide_during_presenting_runs_after_entry() {
        let (overlay, store) = host();
        let mut alert = AlertView::in_host("Busy", "", &overlay, &store);
        let events = Rc::new(RefCell::new(Vec::new()));

        let on_shown = Rc::clone(&events);
        alert
            .show_with_completion(move || on_shown.borrow_mut().push("shown"))
            .unwrap();
        let on_hidden = Rc::clone(&events);
        alert
            .hide_with_completion(move || on_hidden.borrow_mut().push("hidden"))
            .unwrap();
        assert_eq!(alert.state(), PresentationState::Presenting);

        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Dismissing);
        alert.advance(LONG);
        assert_eq!(alert.state(), PresentationState::Dismissed);
        assert_eq!(*events.borrow(), vec!["shown", "hidden"]);
    }

    #[test]
    fn test_lifecycle_errors() {
        let (overlay, store) = host();
        let mut alert = AlertView::in_host("A", "", &overlay, &store);
        assert!(matches!(
            alert.hide(),
            Err(AlertError::InvalidState {
                state: PresentationState::Unpresented,
                ..
            })
        ));

        shown(&mut alert);
        assert!(matches!(
            alert.add_button("Late"),
            Err(AlertError::InvalidState { .. })
        ));
        assert!(matches!(
            alert.add_field("Late", false),
            Err(AlertError::InvalidState { .. })
        ));

        alert.hide().unwrap();
        alert.advance(LONG);
        assert!(matches!(
            alert.show(),
            Err(AlertError::InvalidState {
                state: PresentationState::Dismissed,
                ..
            })
        ));
    }

    #[test]
    fn test_second_alert_is_rejected_while_first_on_screen() {
        let (overlay, store) = host();
        let mut first = AlertView::in_host("First", "", &overlay, &store);
        let mut second = AlertView::in_host("Second", "", &overlay, &store);
        first.show().unwrap();
        assert_eq!(second.show(), Err(AlertError::OverlayBusy));

        first.advance(LONG);
        first.hide().unwrap();
        first.advance(LONG);
        assert!(second.show().is_ok());
    }

    #[test]
    fn test_activate_button_validation() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        assert!(matches!(
            alert.activate_button(1),
            Err(AlertError::InvalidState { .. })
        ));
        shown(&mut alert);
        assert_eq!(
            alert.activate_button(5),
            Err(AlertError::ButtonOutOfRange { index: 5, count: 2 })
        );
    }

    #[test]
    fn test_with_buttons_puts_cancel_first() {
        let alert = AlertView::with_buttons("Q", "", Some("No"), ["Yes", "Maybe"]).unwrap();
        assert_eq!(alert.buttons().cancel_index(), Some(0));
        let labels: Vec<_> = alert.buttons().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["No", "Yes", "Maybe"]);

        let no_cancel = AlertView::with_buttons("Q", "", None, ["OK"]).unwrap();
        assert_eq!(no_cancel.buttons().cancel_index(), None);

        assert!(matches!(
            AlertView::with_buttons("Q", "", Some(" "), ["OK"]),
            Err(AlertError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_animation_comes_from_store() {
        let (overlay, store) = host();
        store.set_default(attr::DEFAULT_ANIMATION, AnimationKind::SlideRight);
        let mut alert = AlertView::in_host("A", "", &overlay, &store);
        alert.show().unwrap();
        assert_eq!(alert.presentation.animation(), AnimationKind::SlideRight);
    }

    #[test]
    fn test_explicit_animation_wins() {
        let (overlay, store) = host();
        store.set_default(attr::DEFAULT_ANIMATION, AnimationKind::SlideRight);
        let mut alert = AlertView::in_host("A", "", &overlay, &store);
        alert.show_with_animation(AnimationKind::FlipVertical).unwrap();
        alert.advance(LONG);
        alert.hide_with_animation(AnimationKind::Fade).unwrap();
        assert_eq!(
            alert.presentation.timeline().map(crate::animation::Timeline::kind),
            Some(AnimationKind::Fade)
        );
    }

    #[test]
    fn test_text_attributes_become_overrides() {
        let (overlay, store) = host();
        store.set_default(attr::TITLE_COLOR, Color::Blue);
        let mut alert = AlertView::in_host("A", "", &overlay, &store);
        let other = AlertView::in_host("B", "", &overlay, &store);

        alert.set_title_text_attributes(&TextAttributes::new().color(Color::Red).font(Modifier::ITALIC));
        alert.set_cancel_button_text_attributes(
            &TextAttributes::new().color(Color::Magenta),
            ControlState::Highlighted,
        );

        let theme = Theme::default();
        assert_eq!(alert.appearance().color(attr::TITLE_COLOR, &theme), Color::Red);
        assert_eq!(alert.appearance().modifier(attr::TITLE_FONT, &theme), Modifier::ITALIC);
        assert_eq!(
            alert
                .appearance()
                .color(attr::CANCEL_BUTTON_HIGHLIGHTED_TEXT_COLOR, &theme),
            Color::Magenta
        );
        assert_eq!(other.appearance().color(attr::TITLE_COLOR, &theme), Color::Blue);
    }

    #[test]
    fn test_keyboard_flow_with_fields() {
        let (overlay, store) = host();
        let mut alert = AlertView::in_host("Sign in", "", &overlay, &store);
        alert.add_field("User", false).unwrap();
        alert.add_field("Password", true).unwrap();
        alert.add_cancel_button("Cancel").unwrap();
        alert.add_button("Sign in").unwrap();

        let captured = Rc::new(RefCell::new(None));
        let handler_capture = Rc::clone(&captured);
        alert.set_handler(move |index, alert| {
            *handler_capture.borrow_mut() = Some((
                index,
                alert.text_at(0).unwrap(),
                alert.text_at(1).unwrap(),
            ));
        });

        assert_eq!(alert.text_at(0), Ok(String::new()));
        shown(&mut alert);
        assert_eq!(alert.focus(), Focus::Field(0));

        for c in "ada".chars() {
            alert.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        alert.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(alert.focus(), Focus::Field(1));
        for c in "pw".chars() {
            alert.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        // Enter in a field moves on, then Right walks the button row.
        alert.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(alert.focus(), Focus::Button(0));
        alert.handle_key(key(KeyCode::Right)).unwrap();
        assert_eq!(alert.focus(), Focus::Button(1));

        let result = alert.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(AlertEvent::ButtonActivated(1)));
        alert.advance(LONG);

        assert_eq!(
            *captured.borrow(),
            Some((1, "ada".to_string(), "pw".to_string()))
        );
        assert_eq!(alert.text_at(2), Err(AlertError::FieldOutOfRange { index: 2, count: 2 }));
    }

    #[test]
    fn test_escape_activates_cancel() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        shown(&mut alert);
        assert_eq!(alert.focus(), Focus::Button(0));
        let result = alert.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(result, EventResult::Event(AlertEvent::ButtonActivated(0)));
    }

    #[test]
    fn test_keys_while_animating_or_hidden() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        assert_eq!(alert.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
        alert.show().unwrap();
        assert_eq!(alert.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Consumed);
        assert_eq!(alert.state(), PresentationState::Presenting);
    }

    #[test]
    fn test_buttonless_alert_dismisses_on_enter() {
        let (overlay, store) = host();
        let mut alert = AlertView::in_host("Done", "", &overlay, &store);
        shown(&mut alert);
        let result = alert.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(AlertEvent::Dismissed));
        assert_eq!(alert.state(), PresentationState::Dismissing);
    }

    #[test]
    fn test_reduced_motion_completes_on_next_advance() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let store = AppearanceStore::new();
        let mut alert = delete_alert(&overlay, &store);
        alert.show_with_animation(AnimationKind::Tumble).unwrap();
        alert.advance(Duration::ZERO);
        assert_eq!(alert.state(), PresentationState::Visible);
    }

    #[test]
    fn test_handler_can_be_replaced() {
        let (overlay, store) = host();
        let mut alert = delete_alert(&overlay, &store);
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));

        let first_hit = Rc::clone(&first);
        alert.set_handler(move |_, _| first_hit.set(true));
        let second_hit = Rc::clone(&second);
        alert.set_handler(move |_, _| second_hit.set(true));

        shown(&mut alert);
        alert.activate_button(1).unwrap();
        alert.advance(LONG);
        assert!(!first.get());
        assert!(second.get());
    }

    proptest! {
        #[test]
        fn field_reads_follow_registration(count in 0usize..6, index in 0usize..12) {
            let (overlay, store) = host();
            let mut alert = AlertView::in_host("P", "", &overlay, &store);
            for i in 0..count {
                alert.add_field(format!("f{i}"), false).unwrap();
            }
            if index < count {
                prop_assert_eq!(alert.text_at(index), Ok(String::new()));
            } else {
                prop_assert_eq!(
                    alert.text_at(index),
                    Err(AlertError::FieldOutOfRange { index, count })
                );
            }
        }
    }
}
