use std::time::Duration;

use crate::config::GalleryConfig;

/// Lifecycle phase of one animation instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    /// Attached but not triggered.
    Created,
    /// Triggered, waiting out its delay.
    Delayed,
    /// Fading in or steady.
    Visible,
    /// Steady with a repeating scale pulse.
    Pulsing,
    /// Fading out at the end of its timeline.
    Exiting,
    /// Timeline finished; detached from the page.
    Removed,
    /// Explicit hide in progress.
    Hiding,
    /// Hidden by request; never comes back.
    HiddenPermanent,
}

impl AnimationPhase {
    /// Phases after which nothing else happens to the instance.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Removed | Self::HiddenPermanent)
    }

    pub fn is_hidden(self) -> bool {
        matches!(self, Self::Hiding | Self::HiddenPermanent)
    }
}

/// Engine-wide durations, derived from [`GalleryConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub entrance: Duration,
    pub exit: Duration,
    pub hide_fade: Duration,
    pub pulse_period: Duration,
}

impl TimingConfig {
    pub fn from_config(cfg: &GalleryConfig) -> Self {
        Self {
            entrance: Duration::from_millis(cfg.entrance_ms),
            exit: Duration::from_millis(cfg.exit_ms),
            hide_fade: Duration::from_millis(cfg.hide_fade_ms),
            pulse_period: Duration::from_millis(cfg.pulse_period_ms),
        }
    }
}

/// Phase boundaries of a triggered animation, relative to the trigger instant.
///
/// ```text
/// 0 ── delay ── show ── entrance ── pulse ── exit_at ── exit ── remove_at
/// ```
///
/// The pulse window only exists when the duration leaves room for both the entrance and the
/// exit. A duration shorter than the exit window starts exiting right at `show_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelinePlan {
    pub show_at: Duration,
    pub entrance: Duration,
    pub pulse: Option<(Duration, Duration)>,
    pub exit_at: Duration,
    pub remove_at: Duration,
}

impl TimelinePlan {
    pub fn new(delay: Duration, duration: Duration, entrance: Duration, exit: Duration) -> Self {
        let exit_at = delay + duration.saturating_sub(exit);
        let pulse = (duration > entrance + exit).then(|| (delay + entrance, exit_at));
        Self {
            show_at: delay,
            entrance,
            pulse,
            exit_at,
            remove_at: exit_at + exit,
        }
    }

    /// Phase at `elapsed` since the trigger.
    pub fn phase_at(&self, elapsed: Duration) -> AnimationPhase {
        if elapsed < self.show_at {
            AnimationPhase::Delayed
        } else if elapsed >= self.remove_at {
            AnimationPhase::Removed
        } else if elapsed >= self.exit_at {
            AnimationPhase::Exiting
        } else if self
            .pulse
            .is_some_and(|(start, end)| elapsed >= start && elapsed < end)
        {
            AnimationPhase::Pulsing
        } else {
            AnimationPhase::Visible
        }
    }

    /// Offset at which an instance currently in `phase` next changes phase.
    pub fn deadline_after(&self, phase: AnimationPhase) -> Option<Duration> {
        match phase {
            AnimationPhase::Delayed => Some(self.show_at),
            AnimationPhase::Visible => Some(self.pulse.map_or(self.exit_at, |(start, _)| start)),
            AnimationPhase::Pulsing => Some(self.exit_at),
            AnimationPhase::Exiting => Some(self.remove_at),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
