//! Per-page render lifecycle.
//!
//! The pipeline pulls candidates from the discovery loader one at a time and turns each into a
//! slot in the view: `Pending → Loading → Ready | Failed`. A failed page gets a fallback tile and
//! the loop moves on; only discovery's own end condition stops it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::AnimationTimingEngine;
use crate::config::animations::AnimationConfig;
use crate::config::hotspots::HotspotConfig;
use crate::config::index::PageIndex;
use crate::discovery::decode::PageDecoder;
use crate::discovery::fetch::PageFetcher;
use crate::discovery::loader::{Discovery, DiscoveryLoader, EndReason, ImageCandidate};
use crate::events::{Events, GalleryEvent};
use crate::foundation::core::{ImageMetrics, PageNumber};
use crate::foundation::error::GalleryResult;
use crate::hotspots::HotspotGeometryEngine;
use crate::state::{GalleryState, RenderState, SlotId};
use crate::view::{LoadingSource, PageView};

/// Shown instead of the gallery when the first page cannot be displayed.
pub const FIRST_PAGE_FAILED_MESSAGE: &str = "The gallery could not be loaded.";
/// Shown instead of the gallery when no page exists at all.
pub const NO_CONTENT_MESSAGE: &str = "This gallery has no pages.";

/// Result of one [`PageRenderPipeline::render_candidate`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Ready,
    Failed,
    /// The page was already in flight or rendered.
    Skipped,
}

/// Totals of a finished [`PageRenderPipeline::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineSummary {
    pub ready: u32,
    pub failed: u32,
    pub end: Option<EndReason>,
}

impl PipelineSummary {
    fn count(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Ready => self.ready += 1,
            RenderOutcome::Failed => self.failed += 1,
            RenderOutcome::Skipped => {}
        }
    }
}

/// Overlay configuration and engines attached to every rendered page.
#[derive(Debug)]
pub struct Overlays {
    pub hotspot_index: PageIndex<HotspotConfig>,
    pub animation_index: PageIndex<AnimationConfig>,
    pub hotspots: Rc<RefCell<HotspotGeometryEngine>>,
    pub animations: Rc<RefCell<AnimationTimingEngine>>,
}

/// Renders discovered pages into a [`PageView`].
#[derive(Debug)]
pub struct PageRenderPipeline<V> {
    state: Rc<GalleryState>,
    view: V,
    overlays: Overlays,
    events: Events,
}

impl<V: PageView> PageRenderPipeline<V> {
    pub fn new(state: Rc<GalleryState>, view: V, overlays: Overlays) -> Self {
        Self {
            state,
            view,
            overlays,
            events: Events::none(),
        }
    }

    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &Rc<GalleryState> {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// Drain `loader` until discovery ends.
    ///
    /// The loading indicator stays up until the first page has been processed. Waiters still
    /// registered at the end resolve with `None`.
    pub async fn run<F: PageFetcher, D: PageDecoder>(
        &self,
        loader: &mut DiscoveryLoader<F, D>,
    ) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        let mut first_pending = true;
        self.view.set_loading_indicator(LoadingSource::Initial, true);

        let end = loop {
            match loader.next().await {
                Discovery::Found(candidate) => {
                    let outcome = self.render_candidate(candidate).await;
                    summary.count(outcome);
                    if first_pending {
                        first_pending = false;
                        self.view.set_loading_indicator(LoadingSource::Initial, false);
                        if outcome == RenderOutcome::Failed {
                            tracing::warn!("first page failed to render");
                            self.view.show_gallery_fallback(FIRST_PAGE_FAILED_MESSAGE);
                        }
                    }
                }
                Discovery::End(reason) => break reason,
            }
        };

        if first_pending {
            self.view.set_loading_indicator(LoadingSource::Initial, false);
        }
        if end == EndReason::NoContent {
            tracing::warn!("no pages found");
            self.view.show_gallery_fallback(NO_CONTENT_MESSAGE);
        }

        self.state.mark_all_loaded(end);
        let flushed = self.state.flush_waiters();
        if flushed > 0 {
            self.events.emit(GalleryEvent::WaitersResolved {
                page: None,
                count: flushed,
            });
        }
        summary.end = Some(end);
        tracing::info!(
            ready = summary.ready,
            failed = summary.failed,
            ?end,
            "all pages loaded"
        );
        summary
    }

    /// Render one candidate into a new slot.
    ///
    /// A page that is in flight or already has a slot is skipped. Either terminal state wakes
    /// the page's waiters.
    #[tracing::instrument(level = "debug", skip_all, fields(page = %candidate.page))]
    pub async fn render_candidate(&self, candidate: ImageCandidate) -> RenderOutcome {
        let page = candidate.page;
        let Some(_claim) = self.state.begin_render(page) else {
            tracing::debug!("page already in flight or rendered, skipping");
            self.events
                .emit(GalleryEvent::DuplicateRenderSkipped { page });
            return RenderOutcome::Skipped;
        };
        self.events.emit(GalleryEvent::RenderStarted { page });

        let slot = match self.open_slot(page) {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(error = %e, "could not create page slot");
                self.events.emit(GalleryEvent::PageFailed {
                    page,
                    reason: e.to_string(),
                });
                return RenderOutcome::Failed;
            }
        };

        let outcome = match self.view.mount_image(slot, &candidate).await {
            Ok(metrics) => {
                self.settle(page, RenderState::Ready);
                self.attach_overlays(page, metrics);
                self.events.emit(GalleryEvent::PageReady { page });
                RenderOutcome::Ready
            }
            Err(e) => {
                tracing::warn!(error = %e, "page render failed, showing fallback");
                self.settle(page, RenderState::Failed);
                self.view.show_page_fallback(slot, page);
                self.events.emit(GalleryEvent::PageFailed {
                    page,
                    reason: e.to_string(),
                });
                RenderOutcome::Failed
            }
        };

        if let Some(rec) = self.state.record(page) {
            let count = self.state.notify_page(page, rec.into());
            if count > 0 {
                self.events.emit(GalleryEvent::WaitersResolved {
                    page: Some(page),
                    count,
                });
            }
        }
        outcome
    }

    fn open_slot(&self, page: PageNumber) -> GalleryResult<SlotId> {
        let slot = self.view.create_slot(page)?;
        self.state.insert_record(page, slot)?;
        self.state.transition(page, RenderState::Loading)?;
        Ok(slot)
    }

    fn settle(&self, page: PageNumber, next: RenderState) {
        if let Err(e) = self.state.transition(page, next) {
            tracing::error!(%page, error = %e, "render state out of sync");
        }
    }

    fn attach_overlays(&self, page: PageNumber, metrics: Option<ImageMetrics>) {
        let hotspots = self.overlays.hotspot_index.for_page(page);
        if !hotspots.is_empty() {
            let viewport = self.view.viewport();
            self.overlays
                .hotspots
                .borrow_mut()
                .attach(page, hotspots, metrics, viewport);
        }
        let animations = self.overlays.animation_index.for_page(page);
        if !animations.is_empty() {
            self.overlays
                .animations
                .borrow_mut()
                .attach(page, animations, metrics);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/render.rs"]
mod tests;
