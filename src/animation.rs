//! Entry and exit timelines for alert presentation.
//!
//! Each [`AnimationKind`] is a pure strategy: given a [`Phase`], the raw
//! progress through that phase and the size of the surface being animated, it
//! produces a [`Pose`]. A [`Timeline`] owns the clock for one phase and reports
//! its completion exactly once.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ratatui::layout::{Rect, Size};
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Named presentation animation.
///
/// `Default` means "whatever the appearance configuration names as the
/// default animation", falling back to a short scale-up pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationKind {
    #[default]
    Default,
    Fade,
    FlipHorizontal,
    FlipVertical,
    Tumble,
    SlideLeft,
    SlideRight,
}

impl AnimationKind {
    pub const ALL: [Self; 7] = [
        Self::Default,
        Self::Fade,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Tumble,
        Self::SlideLeft,
        Self::SlideRight,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fade => "fade",
            Self::FlipHorizontal => "flip-horizontal",
            Self::FlipVertical => "flip-vertical",
            Self::Tumble => "tumble",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
        }
    }

    /// Replace `Default` with the configured default, if there is one.
    #[must_use]
    pub const fn or_configured(self, configured: Option<Self>) -> Self {
        match (self, configured) {
            (Self::Default, Some(kind)) => kind,
            (kind, _) => kind,
        }
    }

    #[must_use]
    pub const fn duration(self, phase: Phase) -> Duration {
        let millis = match (self, phase) {
            (Self::Default, Phase::Entry) => 400,
            (Self::Default | Self::Fade, Phase::Exit) | (Self::Fade, Phase::Entry) => 250,
            (Self::FlipHorizontal | Self::FlipVertical, _) => 400,
            (Self::Tumble, Phase::Entry) => 500,
            (Self::Tumble, Phase::Exit) => 450,
            (Self::SlideLeft | Self::SlideRight, _) => 350,
        };
        Duration::from_millis(millis)
    }

    #[must_use]
    pub const fn easing(self, phase: Phase) -> Easing {
        match (self, phase) {
            (Self::Default, Phase::Entry) => Easing::Back,
            (Self::Fade, _) => Easing::Linear,
            (Self::Tumble, Phase::Exit) => Easing::EaseIn,
            (_, Phase::Entry) => Easing::EaseOut,
            (_, Phase::Exit) => Easing::EaseInOut,
        }
    }

    /// Pose of the alert surface at raw `progress` through `phase`.
    ///
    /// Entry runs from the off-screen pose at 0.0 to [`Pose::IDENTITY`] at 1.0;
    /// exit runs from identity at 0.0 to the off-screen pose at 1.0.
    #[must_use]
    pub fn pose(self, phase: Phase, progress: f64, surface: Size) -> Pose {
        if !progress.is_finite() {
            return Pose::IDENTITY;
        }
        let t = self.easing(phase).apply(progress);
        let width = f64::from(surface.width);
        let height = f64::from(surface.height);
        // Distance still to travel on entry, distance travelled on exit.
        let away = match phase {
            Phase::Entry => 1.0 - t,
            Phase::Exit => t,
        };

        match (self, phase) {
            (Self::Default, Phase::Entry) => {
                let scale = 0.6 + 0.4 * t;
                Pose {
                    opacity: (progress * 2.0).min(1.0),
                    scale: (scale, scale),
                    ..Pose::IDENTITY
                }
            }
            (Self::Default | Self::Fade, _) => Pose {
                opacity: 1.0 - away,
                ..Pose::IDENTITY
            },
            (Self::FlipHorizontal, _) => Pose {
                scale: (flip(away), 1.0),
                ..Pose::IDENTITY
            },
            (Self::FlipVertical, _) => Pose {
                scale: (1.0, flip(away)),
                ..Pose::IDENTITY
            },
            (Self::Tumble, _) => {
                let direction = match phase {
                    Phase::Entry => -1.0,
                    Phase::Exit => 1.0,
                };
                Pose {
                    offset: (0, cells(direction * height * away)),
                    scale: (1.0 - 0.25 * (PI * away).sin(), 1.0),
                    ..Pose::IDENTITY
                }
            }
            (Self::SlideLeft, Phase::Entry) | (Self::SlideRight, Phase::Exit) => Pose {
                offset: (cells(width * away), 0),
                ..Pose::IDENTITY
            },
            (Self::SlideLeft, Phase::Exit) | (Self::SlideRight, Phase::Entry) => Pose {
                offset: (cells(-width * away), 0),
                ..Pose::IDENTITY
            },
        }
    }
}

/// Visible width fraction of a card rotated `away` of the way to edge-on.
fn flip(away: f64) -> f64 {
    (away.clamp(0.0, 1.0) * FRAC_PI_2).cos()
}

#[allow(clippy::cast_possible_truncation)]
fn cells(value: f64) -> i16 {
    value
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "default" => Ok(Self::Default),
            "fade" => Ok(Self::Fade),
            "fliphorizontal" => Ok(Self::FlipHorizontal),
            "flipvertical" => Ok(Self::FlipVertical),
            "tumble" => Ok(Self::Tumble),
            "slideleft" => Ok(Self::SlideLeft),
            "slideright" => Ok(Self::SlideRight),
            _ => Err(format!("Unknown animation: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for AnimationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entry,
    Exit,
}

/// Easing curve applied to raw timeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseOut,
    EaseIn,
    EaseInOut,
    /// Overshoots past 1.0 before settling.
    Back,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::Back => {
                let c1 = 1.701_58;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
        }
    }
}

/// Opacity and geometric transform of the alert surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f64,
    /// Offset in cells from the resting position.
    pub offset: (i16, i16),
    /// Horizontal and vertical scale around the surface centre.
    pub scale: (f64, f64),
}

impl Pose {
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        offset: (0, 0),
        scale: (1.0, 1.0),
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.opacity - 1.0).abs() < f64::EPSILON
            && self.offset == (0, 0)
            && (self.scale.0 - 1.0).abs() < f64::EPSILON
            && (self.scale.1 - 1.0).abs() < f64::EPSILON
    }

    /// Size and unclipped top-left corner of `rest` under this pose.
    ///
    /// Returns `None` when the surface is fully transparent or collapsed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn placement(&self, rest: Rect) -> Option<(Size, (i32, i32))> {
        if self.opacity <= 0.0 {
            return None;
        }
        let scaled = |len: u16, factor: f64| -> i32 {
            (f64::from(len) * factor.clamp(0.0, 1.0)).round() as i32
        };
        let width = scaled(rest.width, self.scale.0);
        let height = scaled(rest.height, self.scale.1);
        if width <= 0 || height <= 0 {
            return None;
        }

        let x = i32::from(rest.x) + (i32::from(rest.width) - width) / 2 + i32::from(self.offset.0);
        let y = i32::from(rest.y) + (i32::from(rest.height) - height) / 2 + i32::from(self.offset.1);
        Some((Size::new(width as u16, height as u16), (x, y)))
    }

    /// Place `rest` according to this pose, clipped to `bounds`.
    ///
    /// Returns `None` when nothing of the surface would be on screen.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&self, rest: Rect, bounds: Rect) -> Option<Rect> {
        let (size, (x, y)) = self.placement(rest)?;

        let left = x.max(i32::from(bounds.left()));
        let top = y.max(i32::from(bounds.top()));
        let right = (x + i32::from(size.width)).min(i32::from(bounds.right()));
        let bottom = (y + i32::from(size.height)).min(i32::from(bounds.bottom()));
        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

/// Clock for one phase of one animation.
///
/// [`Timeline::advance`] returns `true` exactly once, on the call that
/// completes the phase. Zero-length timelines (reduced motion) complete on
/// their first advance.
#[derive(Debug, Clone)]
pub struct Timeline {
    kind: AnimationKind,
    phase: Phase,
    duration: Duration,
    elapsed: Duration,
    reduced_motion: bool,
    completed: bool,
}

impl Timeline {
    #[must_use]
    pub const fn new(kind: AnimationKind, phase: Phase, reduced_motion: bool) -> Self {
        let duration = if reduced_motion {
            Duration::ZERO
        } else {
            kind.duration(phase)
        };
        Self {
            kind,
            phase,
            duration,
            elapsed: Duration::ZERO,
            reduced_motion,
            completed: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AnimationKind {
        self.kind
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Move the clock forward. Returns `true` if this call completed the phase.
    pub fn advance(&mut self, delta: Duration) -> bool {
        if self.completed {
            return false;
        }
        match self.elapsed.checked_add(delta) {
            Some(elapsed) => self.elapsed = elapsed,
            None => {
                warn!(kind = %self.kind, phase = ?self.phase, "timeline clock overflowed, forcing completion");
                self.elapsed = self.duration;
            }
        }
        if self.elapsed >= self.duration {
            self.completed = true;
            return true;
        }
        false
    }

    /// Complete the phase immediately. Returns `true` if it was still running.
    pub fn force_complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.elapsed = self.duration;
        self.completed = true;
        true
    }

    /// Pose at the current progress, or `None` when it cannot be computed:
    /// an empty surface or a non-finite progress. The caller is expected to
    /// force completion in that case.
    #[must_use]
    pub fn pose(&self, surface: Size) -> Option<Pose> {
        if self.reduced_motion {
            return Some(Pose::IDENTITY);
        }
        let progress = self.progress();
        if surface.width == 0 || surface.height == 0 || !progress.is_finite() {
            return None;
        }
        Some(self.kind.pose(self.phase, progress, surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Size = Size {
        width: 40,
        height: 10,
    };

    #[test]
    fn test_entry_ends_at_identity() {
        for kind in AnimationKind::ALL {
            let pose = kind.pose(Phase::Entry, 1.0, SURFACE);
            assert!(pose.is_identity(), "{kind} entry ended at {pose:?}");
        }
    }

    #[test]
    fn test_exit_starts_at_identity() {
        for kind in AnimationKind::ALL {
            let pose = kind.pose(Phase::Exit, 0.0, SURFACE);
            assert!(pose.is_identity(), "{kind} exit started at {pose:?}");
        }
    }

    #[test]
    fn test_entry_starts_off_screen_or_invisible() {
        let rest = Rect::new(20, 5, 40, 10);
        let bounds = Rect::new(0, 0, 80, 20);
        for kind in AnimationKind::ALL {
            let pose = kind.pose(Phase::Entry, 0.0, SURFACE);
            let placed = pose.apply(rest, bounds);
            let hidden = placed.is_none()
                || pose.opacity < 0.5
                || placed.is_some_and(|r| r.width < rest.width || r.x != rest.x || r.y != rest.y);
            assert!(hidden, "{kind} entry starts fully in place");
        }
    }

    #[test]
    fn test_slides_move_in_opposite_directions() {
        let left = AnimationKind::SlideLeft.pose(Phase::Exit, 1.0, SURFACE);
        let right = AnimationKind::SlideRight.pose(Phase::Exit, 1.0, SURFACE);
        assert_eq!(left.offset, (-40, 0));
        assert_eq!(right.offset, (40, 0));

        let from_right = AnimationKind::SlideLeft.pose(Phase::Entry, 0.0, SURFACE);
        assert_eq!(from_right.offset, (40, 0));
    }

    #[test]
    fn test_tumble_enters_from_above_and_exits_below() {
        let entry = AnimationKind::Tumble.pose(Phase::Entry, 0.0, SURFACE);
        let exit = AnimationKind::Tumble.pose(Phase::Exit, 1.0, SURFACE);
        assert_eq!(entry.offset, (0, -10));
        assert_eq!(exit.offset, (0, 10));
    }

    #[test]
    fn test_fade_is_monotonic() {
        let mut last = -1.0;
        for step in 0..=10 {
            let pose = AnimationKind::Fade.pose(Phase::Entry, f64::from(step) / 10.0, SURFACE);
            assert!(pose.opacity >= last);
            last = pose.opacity;
        }
    }

    #[test]
    fn test_non_finite_progress_is_identity() {
        let pose = AnimationKind::Tumble.pose(Phase::Entry, f64::NAN, SURFACE);
        assert!(pose.is_identity());
    }

    #[test]
    fn test_timeline_completes_exactly_once() {
        let mut timeline = Timeline::new(AnimationKind::Fade, Phase::Entry, false);
        assert!(!timeline.advance(Duration::from_millis(100)));
        assert!(timeline.advance(Duration::from_millis(200)));
        assert!(!timeline.advance(Duration::from_millis(200)));
        assert!(timeline.is_complete());
        assert!((timeline.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reduced_motion_completes_on_first_advance() {
        let mut timeline = Timeline::new(AnimationKind::Tumble, Phase::Entry, true);
        assert_eq!(timeline.duration(), Duration::ZERO);
        assert_eq!(timeline.pose(SURFACE), Some(Pose::IDENTITY));
        assert!(timeline.advance(Duration::ZERO));
        assert!(!timeline.advance(Duration::ZERO));
    }

    #[test]
    fn test_overflowing_clock_still_completes() {
        let mut timeline = Timeline::new(AnimationKind::Default, Phase::Exit, false);
        assert!(!timeline.advance(Duration::from_millis(1)));
        assert!(timeline.advance(Duration::MAX));
    }

    #[test]
    fn test_empty_surface_has_no_pose() {
        let timeline = Timeline::new(AnimationKind::SlideLeft, Phase::Entry, false);
        assert_eq!(timeline.pose(Size::new(0, 10)), None);
        assert_eq!(timeline.pose(Size::new(40, 0)), None);
        assert!(timeline.pose(SURFACE).is_some());
    }

    #[test]
    fn test_force_complete() {
        let mut timeline = Timeline::new(AnimationKind::FlipVertical, Phase::Exit, false);
        assert!(timeline.force_complete());
        assert!(!timeline.force_complete());
        assert!(!timeline.advance(Duration::from_secs(1)));
    }

    #[test]
    fn test_pose_apply_clips_to_bounds() {
        let pose = Pose {
            offset: (30, 0),
            ..Pose::IDENTITY
        };
        let placed = pose
            .apply(Rect::new(20, 5, 40, 10), Rect::new(0, 0, 80, 20))
            .unwrap();
        assert_eq!(placed, Rect::new(50, 5, 30, 10));
    }

    #[test]
    fn test_pose_apply_scales_around_centre() {
        let pose = Pose {
            scale: (0.5, 1.0),
            ..Pose::IDENTITY
        };
        let placed = pose
            .apply(Rect::new(20, 5, 40, 10), Rect::new(0, 0, 80, 20))
            .unwrap();
        assert_eq!(placed, Rect::new(30, 5, 20, 10));
    }

    #[test]
    fn test_parse_animation_names() {
        assert_eq!("fade".parse::<AnimationKind>(), Ok(AnimationKind::Fade));
        assert_eq!("flip-horizontal".parse::<AnimationKind>(), Ok(AnimationKind::FlipHorizontal));
        assert_eq!("FlipVertical".parse::<AnimationKind>(), Ok(AnimationKind::FlipVertical));
        assert_eq!("slide_right".parse::<AnimationKind>(), Ok(AnimationKind::SlideRight));
        assert!("spin".parse::<AnimationKind>().is_err());
        for kind in AnimationKind::ALL {
            assert_eq!(kind.name().parse::<AnimationKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_or_configured() {
        assert_eq!(
            AnimationKind::Default.or_configured(Some(AnimationKind::Tumble)),
            AnimationKind::Tumble
        );
        assert_eq!(
            AnimationKind::Fade.or_configured(Some(AnimationKind::Tumble)),
            AnimationKind::Fade
        );
        assert_eq!(
            AnimationKind::Default.or_configured(None),
            AnimationKind::Default
        );
    }
}
