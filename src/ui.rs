pub mod text_input;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use text_input::{TextInput, TextInputEvent};

/// Result of handling an input event.
///
/// - `Ignored` - The handler didn't recognize or handle this input
/// - `Consumed` - The input was handled but produced no event, the input will not be propagated further
/// - `Event(E)` - The input was handled and produced an event, the input will not be propagated further
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> EventResult<E> {
    /// Returns true if the input was consumed (either with or without an event).
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Returns the event if present.
    pub fn event(self) -> Option<E> {
        match self {
            Self::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Extension trait for processing `Result<EventResult<T>>` from component handlers.
pub trait EventResultExt<T> {
    /// Process the result into a tuple of (was_consumed, optional_event).
    fn process(self) -> (bool, Option<T>);
}

impl<T> EventResultExt<T> for Result<EventResult<T>> {
    fn process(self) -> (bool, Option<T>) {
        match self {
            Ok(EventResult::Event(event)) => (true, Some(event)),
            Ok(EventResult::Consumed) => (true, None),
            Ok(EventResult::Ignored) | Err(_) => (false, None),
        }
    }
}

/// Interactive UI building block.
///
/// Components handle input events, advance on ticks and draw themselves.
/// [`AlertView`](crate::AlertView) and [`TextInput`] are components; so is
/// anything a host application composes them with.
pub trait Component {
    /// The output type produced by this component.
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Ok(EventResult::...)` where:
    /// - `Ignored` - key was not handled, parent should process it
    /// - `Consumed` - key was handled but produced no output
    /// - `Event(output)` - key was handled and produced an output
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations and time-based updates.
    fn handle_tick(&mut self) {}

    /// Render the component to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
