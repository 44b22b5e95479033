//! The host surface alerts are presented on.
//!
//! An [`Overlay`] models the single slot above the application's own UI. At
//! most one alert occupies it at a time; a second alert asking to be shown
//! while the slot is taken is rejected with [`AlertError::OverlayBusy`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, warn};

use crate::error::{AlertError, Result};

/// Identity of an alert instance, used to track the overlay occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertId(u64);

impl AlertId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Treatment of the screen behind an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Backdrop {
    pub darken: bool,
    pub blur: bool,
}

impl Backdrop {
    #[must_use]
    pub const fn is_none(self) -> bool {
        !self.darken && !self.blur
    }

    /// Paint the backdrop over `area`. `intensity` follows the alert's
    /// opacity so the backdrop fades with it.
    pub fn render(self, buf: &mut Buffer, area: Rect, color: Color, intensity: f64) {
        if self.is_none() || intensity <= 0.0 {
            return;
        }
        let mut style = Style::default().add_modifier(Modifier::DIM);
        if self.blur {
            // Muted glyphs read as out of focus on a terminal.
            style = style.fg(color);
        }
        if self.darken && intensity >= 0.5 {
            style = style.bg(color);
        }
        buf.set_style(area, style);
    }
}

thread_local! {
    static GLOBAL_OVERLAY: Overlay = Overlay::new();
}

#[derive(Debug, Default)]
struct OverlayState {
    occupant: Option<AlertId>,
    backdrop: Backdrop,
    reduced_motion: bool,
}

/// Shared handle to the overlay slot. Clones refer to the same slot.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    state: Rc<RefCell<OverlayState>>,
}

impl Overlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The overlay used by alerts that are not given one explicitly.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_OVERLAY.with(Clone::clone)
    }

    #[must_use]
    pub fn with_reduced_motion(self, reduced_motion: bool) -> Self {
        self.set_reduced_motion(reduced_motion);
        self
    }

    /// When set, every timeline completes immediately without moving.
    pub fn set_reduced_motion(&self, reduced_motion: bool) {
        self.state.borrow_mut().reduced_motion = reduced_motion;
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.state.borrow().reduced_motion
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.state.borrow().occupant.is_some()
    }

    #[must_use]
    pub fn occupant(&self) -> Option<AlertId> {
        self.state.borrow().occupant
    }

    /// Backdrop of the current occupant, if any.
    #[must_use]
    pub fn backdrop(&self) -> Option<Backdrop> {
        let state = self.state.borrow();
        state.occupant.map(|_| state.backdrop)
    }

    pub(crate) fn acquire(&self, id: AlertId, backdrop: Backdrop) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.occupant {
            Some(current) if current != id => {
                warn!(?id, ?current, "Rejecting alert, overlay is occupied");
                Err(AlertError::OverlayBusy)
            }
            _ => {
                debug!(?id, ?backdrop, "Alert acquired overlay");
                state.occupant = Some(id);
                state.backdrop = backdrop;
                Ok(())
            }
        }
    }

    pub(crate) fn release(&self, id: AlertId) -> bool {
        let mut state = self.state.borrow_mut();
        if state.occupant != Some(id) {
            return false;
        }
        debug!(?id, "Alert released overlay");
        state.occupant = None;
        state.backdrop = Backdrop::default();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_occupant() {
        let overlay = Overlay::new();
        let first = AlertId::next();
        let second = AlertId::next();

        assert!(overlay.acquire(first, Backdrop::default()).is_ok());
        assert_eq!(overlay.acquire(second, Backdrop::default()), Err(AlertError::OverlayBusy));
        assert_eq!(overlay.occupant(), Some(first));

        assert!(!overlay.release(second));
        assert!(overlay.release(first));
        assert!(!overlay.is_occupied());
        assert!(overlay.acquire(second, Backdrop::default()).is_ok());
    }

    #[test]
    fn test_reacquire_by_occupant_is_allowed() {
        let overlay = Overlay::new();
        let id = AlertId::next();
        assert!(overlay.acquire(id, Backdrop::default()).is_ok());
        assert!(overlay.acquire(id, Backdrop::default()).is_ok());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let other = overlay.clone();
        let id = AlertId::next();
        let backdrop = Backdrop {
            darken: true,
            blur: false,
        };
        overlay.acquire(id, backdrop).unwrap();
        assert!(other.is_occupied());
        assert!(other.reduced_motion());
        assert_eq!(other.backdrop(), Some(backdrop));
    }

    #[test]
    fn test_darken_backdrop_paints_background() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let backdrop = Backdrop {
            darken: true,
            blur: false,
        };
        backdrop.render(&mut buf, area, Color::Black, 1.0);
        let cell = &buf[(1, 1)];
        assert_eq!(cell.bg, Color::Black);
        assert!(cell.modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_backdrop_skipped_when_invisible() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        Backdrop {
            darken: true,
            blur: true,
        }
        .render(&mut buf, area, Color::Black, 0.0);
        assert_eq!(buf, Buffer::empty(area));
    }
}
