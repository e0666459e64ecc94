use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::animation::ease::{Ease, pulse_wave};
use crate::animation::timeline::{AnimationPhase, TimelinePlan, TimingConfig};
use crate::config::GalleryConfig;
use crate::config::animations::{AnimationConfig, TriggerKind};
use crate::events::{Events, GalleryEvent};
use crate::foundation::core::{ImageMetrics, PageNumber, PercentBox};
use crate::geometry::animation_box;

/// Peak extra scale reached at the top of a pulse.
const PULSE_AMPLITUDE: f64 = 0.08;

/// What a renderer needs to draw one instance right now.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    pub index: usize,
    pub phase: AnimationPhase,
    pub bounds: Option<PercentBox>,
    pub opacity: f64,
    pub scale: f64,
}

/// A phase change reported by [`AnimationTimingEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub page: PageNumber,
    pub index: usize,
    pub from: AnimationPhase,
    pub to: AnimationPhase,
}

/// Result of [`AnimationTimingEngine::hide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HideOutcome {
    Started,
    /// Already hiding or hidden, finished, or no such instance.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HideFade {
    started: Instant,
    from_opacity: f64,
}

/// One configured animation on one page.
#[derive(Clone, Debug)]
pub struct AnimationInstance {
    pub config: Arc<AnimationConfig>,
    plan: TimelinePlan,
    phase: AnimationPhase,
    triggered_at: Option<Instant>,
    hide: Option<HideFade>,
    bounds: Option<PercentBox>,
    history: Vec<AnimationPhase>,
}

impl AnimationInstance {
    fn new(config: Arc<AnimationConfig>, timing: &TimingConfig) -> Self {
        let plan = TimelinePlan::new(
            Duration::from_millis(config.delay_ms),
            Duration::from_millis(config.duration_ms),
            timing.entrance,
            timing.exit,
        );
        Self {
            config,
            plan,
            phase: AnimationPhase::Created,
            triggered_at: None,
            hide: None,
            bounds: None,
            history: vec![AnimationPhase::Created],
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn plan(&self) -> &TimelinePlan {
        &self.plan
    }

    pub fn triggered_at(&self) -> Option<Instant> {
        self.triggered_at
    }

    /// Every phase the instance has entered, oldest first.
    pub fn history(&self) -> &[AnimationPhase] {
        &self.history
    }

    /// Placement in percent of the rendered image, once the image was measured.
    pub fn bounds(&self) -> Option<PercentBox> {
        self.bounds
    }

    /// Whether the overlay is still part of the page.
    pub fn is_attached(&self) -> bool {
        !self.phase.is_final()
    }

    fn place(&mut self, metrics: ImageMetrics) {
        if metrics.is_measurable() {
            let c = &self.config;
            self.bounds = Some(animation_box(c.center_x, c.center_y, c.size, metrics.rendered));
        }
    }

    fn target_phase(&self, now: Instant, timing: &TimingConfig) -> AnimationPhase {
        match (self.hide, self.triggered_at) {
            (Some(h), _) => {
                if now >= h.started + timing.hide_fade {
                    AnimationPhase::HiddenPermanent
                } else {
                    AnimationPhase::Hiding
                }
            }
            (None, Some(at)) => self.plan.phase_at(now.saturating_duration_since(at)),
            (None, None) => AnimationPhase::Created,
        }
    }

    fn enter(&mut self, phase: AnimationPhase) -> Option<AnimationPhase> {
        if phase == self.phase {
            return None;
        }
        let from = self.phase;
        self.phase = phase;
        self.history.push(phase);
        Some(from)
    }

    fn timeline_opacity(&self, elapsed: Duration, timing: &TimingConfig) -> f64 {
        let fade_in = |at: Duration| {
            let since = at.saturating_sub(self.plan.show_at);
            ratio(since, timing.entrance, Ease::OutCubic)
        };
        match self.plan.phase_at(elapsed) {
            AnimationPhase::Delayed | AnimationPhase::Removed => 0.0,
            AnimationPhase::Visible | AnimationPhase::Pulsing => fade_in(elapsed),
            AnimationPhase::Exiting => {
                let start = fade_in(self.plan.exit_at);
                let t = ratio(elapsed - self.plan.exit_at, timing.exit, Ease::InQuad);
                start * (1.0 - t)
            }
            _ => 0.0,
        }
    }

    fn sample(&self, now: Instant, timing: &TimingConfig) -> (f64, f64) {
        if let Some(h) = self.hide {
            let t = ratio(
                now.saturating_duration_since(h.started),
                timing.hide_fade,
                Ease::Linear,
            );
            return (h.from_opacity * (1.0 - t), 1.0);
        }
        let Some(at) = self.triggered_at else {
            return (0.0, 1.0);
        };
        let elapsed = now.saturating_duration_since(at);
        let opacity = self.timeline_opacity(elapsed, timing);
        let scale = match (self.plan.phase_at(elapsed), self.plan.pulse) {
            (AnimationPhase::Pulsing, Some((start, _))) => {
                let wave = pulse_wave(
                    (elapsed - start).as_secs_f64(),
                    timing.pulse_period.as_secs_f64(),
                );
                1.0 + PULSE_AMPLITUDE * wave
            }
            _ => 1.0,
        };
        (opacity, scale)
    }

    fn next_deadline(&self, timing: &TimingConfig) -> Option<Instant> {
        if self.phase.is_final() {
            return None;
        }
        if let Some(h) = self.hide {
            return Some(h.started + timing.hide_fade);
        }
        let at = self.triggered_at?;
        self.plan.deadline_after(self.phase).map(|b| at + b)
    }
}

fn ratio(part: Duration, whole: Duration, ease: Ease) -> f64 {
    if whole.is_zero() {
        return 1.0;
    }
    ease.apply(part.as_secs_f64() / whole.as_secs_f64())
}

#[derive(Debug, Default)]
struct PageAnimations {
    instances: Vec<AnimationInstance>,
    in_view: bool,
    fired: BTreeSet<TriggerKind>,
}

/// Drives every animation overlay in the gallery.
///
/// Time never advances on its own: callers pass `now` to every operation and call
/// [`tick`](Self::tick) at or after [`next_deadline`](Self::next_deadline) to move phases along.
#[derive(Debug)]
pub struct AnimationTimingEngine {
    timing: TimingConfig,
    pages: BTreeMap<PageNumber, PageAnimations>,
    events: Events,
}

impl AnimationTimingEngine {
    pub fn new(cfg: &GalleryConfig) -> Self {
        Self {
            timing: TimingConfig::from_config(cfg),
            pages: BTreeMap::new(),
            events: Events::none(),
        }
    }

    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Create hidden instances for a rendered page. Returns how many were created.
    ///
    /// A page that already has instances is left untouched.
    pub fn attach(
        &mut self,
        page: PageNumber,
        configs: &[Arc<AnimationConfig>],
        metrics: Option<ImageMetrics>,
    ) -> usize {
        if configs.is_empty() || self.pages.contains_key(&page) {
            return 0;
        }
        let instances: Vec<_> = configs
            .iter()
            .map(|c| {
                let mut inst = AnimationInstance::new(Arc::clone(c), &self.timing);
                if let Some(m) = metrics {
                    inst.place(m);
                }
                inst
            })
            .collect();
        let n = instances.len();
        tracing::debug!(%page, count = n, "animations attached");
        self.pages.insert(
            page,
            PageAnimations {
                instances,
                ..PageAnimations::default()
            },
        );
        n
    }

    /// Recompute placement after the page image was laid out or resized.
    pub fn reposition(&mut self, page: PageNumber, metrics: ImageMetrics) {
        if let Some(p) = self.pages.get_mut(&page) {
            for inst in &mut p.instances {
                inst.place(metrics);
            }
        }
    }

    /// Page visibility changed. Returns how many instances were triggered.
    ///
    /// `Visible` animations fire the first time the page enters view and never again.
    pub fn on_visibility(&mut self, page: PageNumber, visible: bool, now: Instant) -> usize {
        let Some(p) = self.pages.get_mut(&page) else {
            return 0;
        };
        p.in_view = visible;
        if !visible {
            return 0;
        }
        self.fire(page, TriggerKind::Visible, now)
    }

    /// Pointer entered the page. `Hover` animations fire once, and only while the page is in view.
    pub fn on_pointer_enter(&mut self, page: PageNumber, now: Instant) -> usize {
        match self.pages.get(&page) {
            Some(p) if p.in_view => self.fire(page, TriggerKind::Hover, now),
            _ => 0,
        }
    }

    fn fire(&mut self, page: PageNumber, kind: TriggerKind, now: Instant) -> usize {
        let Some(p) = self.pages.get_mut(&page) else {
            return 0;
        };
        if !p.fired.insert(kind) {
            return 0;
        }
        let mut fired = 0;
        for (index, inst) in p.instances.iter_mut().enumerate() {
            if inst.config.trigger != kind || inst.triggered_at.is_some() || inst.hide.is_some() {
                continue;
            }
            inst.triggered_at = Some(now);
            inst.enter(AnimationPhase::Delayed);
            fired += 1;
            self.events.emit(GalleryEvent::AnimationTriggered { page, index });
        }
        if fired > 0 {
            tracing::debug!(%page, ?kind, count = fired, "animations triggered");
        }
        fired
    }

    /// Hide one instance for good, fading from whatever opacity it has now.
    pub fn hide(&mut self, page: PageNumber, index: usize, now: Instant) -> HideOutcome {
        let timing = self.timing;
        let Some(inst) = self
            .pages
            .get_mut(&page)
            .and_then(|p| p.instances.get_mut(index))
        else {
            return HideOutcome::Ignored;
        };
        if inst.phase.is_hidden() || inst.phase.is_final() {
            return HideOutcome::Ignored;
        }
        let (from_opacity, _) = inst.sample(now, &timing);
        inst.hide = Some(HideFade {
            started: now,
            from_opacity,
        });
        inst.enter(AnimationPhase::Hiding);
        if timing.hide_fade.is_zero() {
            inst.enter(AnimationPhase::HiddenPermanent);
        }
        tracing::debug!(%page, index, from_opacity, "animation hide requested");
        self.events.emit(GalleryEvent::AnimationHidden { page, index });
        HideOutcome::Started
    }

    /// Hide every instance on a page. Returns how many started hiding.
    pub fn hide_page(&mut self, page: PageNumber, now: Instant) -> usize {
        let n = self.pages.get(&page).map_or(0, |p| p.instances.len());
        (0..n)
            .filter(|&i| self.hide(page, i, now) == HideOutcome::Started)
            .count()
    }

    /// Advance every instance to its phase at `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        let timing = self.timing;
        for (&page, p) in &mut self.pages {
            for (index, inst) in p.instances.iter_mut().enumerate() {
                let to = inst.target_phase(now, &timing);
                if let Some(from) = inst.enter(to) {
                    tracing::trace!(%page, index, ?from, ?to, "animation phase");
                    changes.push(PhaseChange {
                        page,
                        index,
                        from,
                        to,
                    });
                }
            }
        }
        changes
    }

    /// Earliest instant at which some instance changes phase.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pages
            .values()
            .flat_map(|p| p.instances.iter())
            .filter_map(|inst| inst.next_deadline(&self.timing))
            .min()
    }

    /// Sleep until each deadline and tick, until nothing is scheduled.
    ///
    /// The engine is only borrowed between sleeps, so other callers may trigger or hide
    /// instances while this runs.
    pub async fn drive(engine: &RefCell<Self>) -> usize {
        let mut changes = 0;
        loop {
            let Some(deadline) = engine.borrow().next_deadline() else {
                return changes;
            };
            tokio::time::sleep_until(deadline).await;
            changes += engine.borrow_mut().tick(Instant::now()).len();
        }
    }

    pub fn instances(&self, page: PageNumber) -> &[AnimationInstance] {
        self.pages
            .get(&page)
            .map(|p| p.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Render state of every attached instance on `page`.
    pub fn frames(&self, page: PageNumber, now: Instant) -> Vec<AnimationFrame> {
        self.instances(page)
            .iter()
            .enumerate()
            .filter(|(_, inst)| inst.is_attached())
            .map(|(index, inst)| {
                let (opacity, scale) = inst.sample(now, &self.timing);
                AnimationFrame {
                    index,
                    phase: inst.phase,
                    bounds: inst.bounds,
                    opacity,
                    scale,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
