//! Presentation lifecycle of a single alert.
//!
//! ```text
//! Unpresented -> Presenting -> Visible -> Dismissing -> Dismissed
//! ```
//!
//! The controller owns the running [`Timeline`] and the completions handed to
//! `show`/`hide`. It never calls user code itself: finished phases are
//! reported from [`PresentationController::advance`] as a [`Transition`] that
//! carries the completion to run, so the owner can invoke callbacks with a
//! reference to itself.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::animation::{AnimationKind, Phase, Timeline};
use crate::error::{AlertError, Result};
use crate::overlay::{AlertId, Backdrop, Overlay};

/// Single-shot continuation run when a phase finishes.
pub type Completion = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentationState {
    #[default]
    Unpresented,
    Presenting,
    Visible,
    Dismissing,
    Dismissed,
}

impl PresentationState {
    /// Whether the alert currently occupies the overlay.
    #[must_use]
    pub const fn is_on_screen(self) -> bool {
        matches!(self, Self::Presenting | Self::Visible | Self::Dismissing)
    }
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unpresented => "unpresented",
            Self::Presenting => "presenting",
            Self::Visible => "visible",
            Self::Dismissing => "dismissing",
            Self::Dismissed => "dismissed",
        })
    }
}

/// A finished phase, returned by [`PresentationController::advance`].
pub enum Transition {
    /// Entry finished. Run `completion`, if any.
    ///
    /// If a dismissal was queued while presenting, its exit has already
    /// started by the time this is returned, so the controller reports
    /// [`PresentationState::Dismissing`] while `completion` runs.
    Visible { completion: Option<Completion> },
    /// Exit finished. Report `button` (if the dismissal came from one), then
    /// run `completion`, then release the overlay.
    Dismissed {
        button: Option<usize>,
        completion: Option<Completion>,
    },
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible { completion } => f
                .debug_struct("Visible")
                .field("completion", &completion.is_some())
                .finish(),
            Self::Dismissed { button, completion } => f
                .debug_struct("Dismissed")
                .field("button", button)
                .field("completion", &completion.is_some())
                .finish(),
        }
    }
}

struct Dismissal {
    animation: AnimationKind,
    button: Option<usize>,
    completion: Option<Completion>,
}

pub struct PresentationController {
    id: AlertId,
    overlay: Overlay,
    state: PresentationState,
    animation: AnimationKind,
    timeline: Option<Timeline>,
    show_completion: Option<Completion>,
    /// Dismissal requested while still presenting.
    queued: Option<Dismissal>,
    /// Dismissal whose exit timeline is running.
    dismissal: Option<Dismissal>,
}

impl PresentationController {
    #[must_use]
    pub fn new(overlay: Overlay) -> Self {
        Self {
            id: AlertId::next(),
            overlay,
            state: PresentationState::Unpresented,
            animation: AnimationKind::Default,
            timeline: None,
            show_completion: None,
            queued: None,
            dismissal: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> AlertId {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> PresentationState {
        self.state
    }

    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Animation the alert was shown with.
    #[must_use]
    pub const fn animation(&self) -> AnimationKind {
        self.animation
    }

    #[must_use]
    pub const fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    #[must_use]
    pub const fn has_queued_dismissal(&self) -> bool {
        self.queued.is_some()
    }

    /// Start presenting.
    ///
    /// Returns `Ok(false)` without side effects if the alert is already on
    /// screen; the completion of such a call is dropped unrun.
    pub fn show(
        &mut self,
        animation: AnimationKind,
        backdrop: Backdrop,
        completion: Option<Completion>,
    ) -> Result<bool> {
        match self.state {
            PresentationState::Unpresented => {
                self.overlay.acquire(self.id, backdrop)?;
                info!(id = ?self.id, %animation, "Presenting alert");
                self.animation = animation;
                self.show_completion = completion;
                self.start(Phase::Entry, animation);
                self.state = PresentationState::Presenting;
                Ok(true)
            }
            PresentationState::Presenting
            | PresentationState::Visible
            | PresentationState::Dismissing => {
                debug!(id = ?self.id, state = %self.state, "Ignoring show, alert already on screen");
                Ok(false)
            }
            PresentationState::Dismissed => Err(AlertError::InvalidState {
                operation: "show",
                state: self.state,
            }),
        }
    }

    /// Start dismissing, or queue the dismissal if the entry is still running.
    ///
    /// A dismissal that is already queued or running is never replaced; asking
    /// again is an [`AlertError::InvalidState`].
    pub fn hide(
        &mut self,
        animation: AnimationKind,
        button: Option<usize>,
        completion: Option<Completion>,
    ) -> Result<()> {
        let dismissal = Dismissal {
            animation,
            button,
            completion,
        };
        match self.state {
            PresentationState::Presenting if self.queued.is_none() => {
                debug!(id = ?self.id, ?button, "Queueing dismissal until entry finishes");
                self.queued = Some(dismissal);
                Ok(())
            }
            PresentationState::Visible => {
                self.begin_dismissal(dismissal);
                Ok(())
            }
            PresentationState::Unpresented
            | PresentationState::Presenting
            | PresentationState::Dismissing
            | PresentationState::Dismissed => Err(AlertError::InvalidState {
                operation: "hide",
                state: self.state,
            }),
        }
    }

    /// Move the running timeline forward and report a finished phase.
    pub fn advance(&mut self, delta: Duration) -> Option<Transition> {
        let timeline = self.timeline.as_mut()?;
        if !timeline.advance(delta) {
            return None;
        }
        self.finish()
    }

    /// Finish the running phase now, for timelines that cannot produce a
    /// pose. Reports the transition exactly like [`Self::advance`]; returns
    /// `None` if nothing was running.
    pub fn force_complete(&mut self) -> Option<Transition> {
        let timeline = self.timeline.as_mut()?;
        if !timeline.force_complete() {
            return None;
        }
        warn!(
            id = ?self.id,
            kind = %timeline.kind(),
            phase = ?timeline.phase(),
            "Animation cannot be rendered, forcing completion"
        );
        self.finish()
    }

    fn finish(&mut self) -> Option<Transition> {
        self.timeline = None;

        match self.state {
            PresentationState::Presenting => {
                self.state = PresentationState::Visible;
                info!(id = ?self.id, "Alert visible");
                let completion = self.show_completion.take();
                if let Some(dismissal) = self.queued.take() {
                    self.begin_dismissal(dismissal);
                }
                Some(Transition::Visible { completion })
            }
            PresentationState::Dismissing => {
                self.state = PresentationState::Dismissed;
                let dismissal = self.dismissal.take();
                let button = dismissal.as_ref().and_then(|d| d.button);
                info!(id = ?self.id, ?button, "Alert dismissed");
                Some(Transition::Dismissed {
                    button,
                    completion: dismissal.and_then(|d| d.completion),
                })
            }
            PresentationState::Unpresented
            | PresentationState::Visible
            | PresentationState::Dismissed => None,
        }
    }

    /// Give the overlay back once the dismissal has been reported.
    pub fn release_surface(&self) -> bool {
        self.overlay.release(self.id)
    }

    fn begin_dismissal(&mut self, dismissal: Dismissal) {
        info!(id = ?self.id, button = ?dismissal.button, animation = %dismissal.animation, "Dismissing alert");
        self.start(Phase::Exit, dismissal.animation);
        self.dismissal = Some(dismissal);
        self.state = PresentationState::Dismissing;
    }

    fn start(&mut self, phase: Phase, animation: AnimationKind) {
        self.timeline = Some(Timeline::new(
            animation,
            phase,
            self.overlay.reduced_motion(),
        ));
    }
}

impl Drop for PresentationController {
    fn drop(&mut self) {
        if self.overlay.release(self.id) {
            debug!(id = ?self.id, state = %self.state, "Alert dropped while on screen");
        }
    }
}
