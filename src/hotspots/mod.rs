//! Hotspot overlays for rendered pages.
//!
//! Each page's overlays are computed from its configs and the page image's current metrics.
//! Positioning waits for the image to be decoded and laid out, then runs once; every later
//! resize recomputes the boxes, re-deriving the device class from the viewport each time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::GalleryConfig;
use crate::config::hotspots::{HotspotConfig, TargetRef};
use crate::events::{Events, GalleryEvent};
use crate::foundation::core::{ImageMetrics, PageNumber, Viewport};
use crate::geometry::{DeviceClass, OutlineDash, Placement, TouchTarget, outline_dash, place_hotspot};

/// A positioned hotspot. Holds a back-reference to its config.
#[derive(Clone, Debug, PartialEq)]
pub struct HotspotOverlay {
    pub config: Arc<HotspotConfig>,
    pub placement: Placement,
    pub outline: OutlineDash,
}

/// Result of [`HotspotGeometryEngine::attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Overlays were positioned immediately.
    Positioned(usize),
    /// The image is not measurable yet; positioning waits for `on_image_decoded`.
    Deferred,
    /// No configs for this page.
    Empty,
    /// The page already has overlays.
    AlreadyAttached,
}

#[derive(Debug)]
struct PageHotspots {
    configs: Vec<Arc<HotspotConfig>>,
    overlays: Vec<HotspotOverlay>,
    awaiting_decode: bool,
}

/// Owns hotspot overlays for every rendered page.
#[derive(Debug)]
pub struct HotspotGeometryEngine {
    breakpoint_px: f64,
    touch: TouchTarget,
    pages: BTreeMap<PageNumber, PageHotspots>,
    events: Events,
}

impl HotspotGeometryEngine {
    pub fn new(cfg: &GalleryConfig) -> Self {
        Self {
            breakpoint_px: cfg.mobile_breakpoint_px,
            touch: TouchTarget {
                min_px: cfg.min_touch_px,
                min_scale: cfg.min_touch_scale,
            },
            pages: BTreeMap::new(),
            events: Events::none(),
        }
    }

    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    /// Attach `configs` to a freshly rendered page.
    pub fn attach(
        &mut self,
        page: PageNumber,
        configs: &[Arc<HotspotConfig>],
        metrics: Option<ImageMetrics>,
        viewport: Viewport,
    ) -> AttachOutcome {
        if configs.is_empty() {
            return AttachOutcome::Empty;
        }
        if self.pages.contains_key(&page) {
            tracing::warn!(%page, "hotspots already attached, ignoring");
            return AttachOutcome::AlreadyAttached;
        }
        self.pages.insert(
            page,
            PageHotspots {
                configs: configs.to_vec(),
                overlays: Vec::new(),
                awaiting_decode: true,
            },
        );
        match metrics.filter(ImageMetrics::is_measurable) {
            Some(m) => AttachOutcome::Positioned(self.position(page, m, viewport)),
            None => {
                tracing::debug!(%page, "image not measurable yet, deferring hotspots");
                AttachOutcome::Deferred
            }
        }
    }

    /// The page image finished decoding; position deferred overlays once.
    ///
    /// Returns `false` when the page was not waiting.
    pub fn on_image_decoded(
        &mut self,
        page: PageNumber,
        metrics: ImageMetrics,
        viewport: Viewport,
    ) -> bool {
        let waiting = self.pages.get(&page).is_some_and(|p| p.awaiting_decode);
        if !waiting || !metrics.is_measurable() {
            return false;
        }
        self.position(page, metrics, viewport);
        true
    }

    /// Recompute the page's boxes for the current viewport.
    pub fn reposition(
        &mut self,
        page: PageNumber,
        metrics: ImageMetrics,
        viewport: Viewport,
    ) -> Option<&[HotspotOverlay]> {
        if !self.pages.contains_key(&page) {
            return None;
        }
        if !metrics.is_measurable() {
            tracing::warn!(%page, "cannot reposition hotspots without image metrics");
            return None;
        }
        self.position(page, metrics, viewport);
        self.pages.get(&page).map(|p| p.overlays.as_slice())
    }

    /// Reposition every attached page whose metrics are available.
    pub fn reposition_all(
        &mut self,
        viewport: Viewport,
        metrics_of: impl Fn(PageNumber) -> Option<ImageMetrics>,
    ) -> usize {
        let pages: Vec<_> = self.pages.keys().copied().collect();
        pages
            .into_iter()
            .filter(|&page| {
                metrics_of(page)
                    .filter(ImageMetrics::is_measurable)
                    .map(|m| self.position(page, m, viewport))
                    .is_some()
            })
            .count()
    }

    pub fn overlays(&self, page: PageNumber) -> &[HotspotOverlay] {
        self.pages
            .get(&page)
            .map(|p| p.overlays.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_deferred(&self, page: PageNumber) -> bool {
        self.pages.get(&page).is_some_and(|p| p.awaiting_decode)
    }

    /// Target of the topmost hotspot under the percent point `(x, y)`.
    pub fn hit_test(&self, page: PageNumber, x: f64, y: f64) -> Option<&TargetRef> {
        self.overlays(page)
            .iter()
            .rev()
            .find(|o| o.placement.bounds.contains(x, y))
            .map(|o| &o.config.target)
    }

    fn position(&mut self, page: PageNumber, metrics: ImageMetrics, viewport: Viewport) -> usize {
        let device = DeviceClass::classify(viewport.width, self.breakpoint_px);
        let touch = self.touch;
        let Some(entry) = self.pages.get_mut(&page) else {
            return 0;
        };
        entry.awaiting_decode = false;
        entry.overlays = entry
            .configs
            .iter()
            .map(|cfg| {
                let placement = place_hotspot(cfg.authored_box(), metrics, device, touch);
                HotspotOverlay {
                    config: Arc::clone(cfg),
                    outline: outline_dash(placement.bounds, metrics.rendered),
                    placement,
                }
            })
            .collect();
        let count = entry.overlays.len();
        self.events.emit(GalleryEvent::HotspotsPositioned {
            page,
            count,
            mobile: device == DeviceClass::Mobile,
        });
        count
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hotspots/engine.rs"]
mod tests;
