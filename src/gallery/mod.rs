//! Top-level wiring.
//!
//! [`Gallery`] owns the shared state, both overlay engines, the view handle and the discovery
//! loader, and exposes the operations a front end calls. Everything runs on one thread; call
//! [`Gallery::run`] concurrently with navigation (for example with `tokio::join!` or a
//! `LocalSet`) to serve requests while pages are still arriving.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tokio::time::Instant;

use crate::animation::{AnimationTimingEngine, HideOutcome};
use crate::config::GalleryConfig;
use crate::config::animations::AnimationConfig;
use crate::config::hotspots::{HotspotConfig, TargetRef};
use crate::config::index::PageIndex;
use crate::discovery::decode::{ImageCrateDecoder, PageDecoder};
use crate::discovery::fetch::PageFetcher;
use crate::discovery::loader::{DiscoveryLoader, DiscoveryStats};
use crate::events::Events;
use crate::foundation::core::{ImageMetrics, PageNumber, Viewport};
use crate::foundation::error::{GalleryError, GalleryResult};
use crate::hotspots::HotspotGeometryEngine;
use crate::navigation::{NavigationOutcome, NavigationSynchronizer, parse_deep_link};
use crate::pipeline::{Overlays, PageRenderPipeline, PipelineSummary};
use crate::resize::ResizeDebouncer;
use crate::state::{GalleryState, PageHandle};
use crate::view::PageView;
use crate::visibility::VisibilityFeed;

/// Parsed overlay records to attach as pages render.
#[derive(Clone, Debug, Default)]
pub struct OverlayConfigs {
    pub hotspots: Vec<HotspotConfig>,
    pub animations: Vec<AnimationConfig>,
}

/// A progressive gallery bound to one view.
pub struct Gallery<F, V, D = ImageCrateDecoder> {
    state: Rc<GalleryState>,
    view: V,
    loader: RefCell<DiscoveryLoader<F, D>>,
    started: Cell<bool>,
    pipeline: PageRenderPipeline<V>,
    navigation: NavigationSynchronizer<V>,
    hotspots: Rc<RefCell<HotspotGeometryEngine>>,
    animations: Rc<RefCell<AnimationTimingEngine>>,
}

impl<F: PageFetcher, V: PageView + Clone> Gallery<F, V, ImageCrateDecoder> {
    pub fn new(
        cfg: &GalleryConfig,
        fetcher: F,
        view: V,
        overlays: OverlayConfigs,
        events: Events,
    ) -> GalleryResult<Self> {
        let loader = DiscoveryLoader::new(cfg, fetcher);
        Self::with_loader(cfg, loader, view, overlays, events)
    }
}

impl<F: PageFetcher, V: PageView + Clone, D: PageDecoder> Gallery<F, V, D> {
    /// Build around an already configured loader (custom decoder, for instance).
    pub fn with_loader(
        cfg: &GalleryConfig,
        loader: DiscoveryLoader<F, D>,
        view: V,
        overlays: OverlayConfigs,
        events: Events,
    ) -> GalleryResult<Self> {
        cfg.validate()?;
        let hotspot_index = PageIndex::from_records(overlays.hotspots);
        let animation_index = PageIndex::from_records(overlays.animations);
        tracing::debug!(
            hotspots = hotspot_index.len(),
            animations = animation_index.len(),
            "overlay definitions indexed"
        );
        let state = Rc::new(GalleryState::new());
        let hotspots = Rc::new(RefCell::new(
            HotspotGeometryEngine::new(cfg).with_events(events.clone()),
        ));
        let animations = Rc::new(RefCell::new(
            AnimationTimingEngine::new(cfg).with_events(events.clone()),
        ));
        let pipeline = PageRenderPipeline::new(
            Rc::clone(&state),
            view.clone(),
            Overlays {
                hotspot_index,
                animation_index,
                hotspots: Rc::clone(&hotspots),
                animations: Rc::clone(&animations),
            },
        )
        .with_events(events.clone());
        let navigation =
            NavigationSynchronizer::new(Rc::clone(&state), view.clone()).with_events(events.clone());

        Ok(Self {
            state,
            view,
            loader: RefCell::new(loader.with_events(events)),
            started: Cell::new(false),
            pipeline,
            navigation,
            hotspots,
            animations,
        })
    }

    /// Discover and render every page. May only be called once.
    pub async fn run(&self) -> GalleryResult<PipelineSummary> {
        if self.started.replace(true) {
            return Err(GalleryError::validation("gallery is already running"));
        }
        // Only `run` borrows the loader mutably and `started` limits it to one call.
        let mut loader = self.loader.borrow_mut();
        Ok(self.pipeline.run(&mut *loader).await)
    }

    /// Scroll to page `n` once it is available.
    pub async fn navigate_to(&self, n: u32) -> GalleryResult<NavigationOutcome> {
        self.navigation.navigate_to(n).await
    }

    /// Navigate to the page named by a `#page-N` / `?page=N` link.
    pub async fn navigate_link(&self, link: &str) -> GalleryResult<NavigationOutcome> {
        match parse_deep_link(link) {
            Some(page) => self.navigation.navigate_to(page.get()).await,
            None => {
                tracing::warn!(link, "deep link does not name a page");
                Ok(NavigationOutcome::Invalid)
            }
        }
    }

    pub async fn wait_for_page(&self, page: PageNumber) -> Option<PageHandle> {
        self.navigation.wait_for_page(page).await
    }

    /// Reposition every overlay for a new viewport. Returns how many pages were repositioned.
    pub fn apply_viewport(&self, viewport: Viewport) -> usize {
        let metrics_of = |page: PageNumber| self.metrics(page);
        let n = self.hotspots.borrow_mut().reposition_all(viewport, metrics_of);
        let mut animations = self.animations.borrow_mut();
        for page in self.state.ready_pages() {
            if let Some(m) = self.metrics(page) {
                animations.reposition(page, m);
            }
        }
        tracing::debug!(width = viewport.width, pages = n, "viewport applied");
        n
    }

    /// Apply each settled viewport until the debouncer's senders are gone.
    pub async fn watch_resizes(&self, debouncer: &mut ResizeDebouncer) -> usize {
        let mut applied = 0;
        while let Some(viewport) = debouncer.next_settled().await {
            self.apply_viewport(viewport);
            applied += 1;
        }
        applied
    }

    /// The page image finished layout after it was mounted.
    pub fn on_image_loaded(&self, page: PageNumber) -> bool {
        let Some(m) = self.metrics(page) else {
            return false;
        };
        self.animations.borrow_mut().reposition(page, m);
        self.hotspots
            .borrow_mut()
            .on_image_decoded(page, m, self.view.viewport())
    }

    /// Feed visibility changes into the animation engine until the feed's senders are gone.
    ///
    /// Returns how many animation instances were triggered.
    pub async fn watch_visibility(&self, feed: &mut VisibilityFeed) -> usize {
        let mut triggered = 0;
        while let Some(change) = feed.next_change().await {
            triggered += self.on_visibility(change.page, change.visible);
        }
        triggered
    }

    pub fn on_visibility(&self, page: PageNumber, visible: bool) -> usize {
        self.animations
            .borrow_mut()
            .on_visibility(page, visible, Instant::now())
    }

    pub fn on_pointer_enter(&self, page: PageNumber) -> usize {
        self.animations
            .borrow_mut()
            .on_pointer_enter(page, Instant::now())
    }

    /// Target of the hotspot under `(x, y)` percent on `page`.
    pub fn hotspot_at(&self, page: PageNumber, x: f64, y: f64) -> Option<TargetRef> {
        self.hotspots.borrow().hit_test(page, x, y).cloned()
    }

    pub fn hide_animation(&self, page: PageNumber, index: usize) -> HideOutcome {
        self.animations
            .borrow_mut()
            .hide(page, index, Instant::now())
    }

    /// Advance animation phases on tokio timers until no timeline is pending.
    pub async fn drive_animations(&self) -> usize {
        AnimationTimingEngine::drive(&self.animations).await
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn hotspots(&self) -> Ref<'_, HotspotGeometryEngine> {
        self.hotspots.borrow()
    }

    pub fn animations(&self) -> Ref<'_, AnimationTimingEngine> {
        self.animations.borrow()
    }

    /// Discovery counters. `None` while discovery is running.
    pub fn discovery_stats(&self) -> Option<DiscoveryStats> {
        self.loader.try_borrow().ok().map(|l| l.stats().clone())
    }

    fn metrics(&self, page: PageNumber) -> Option<ImageMetrics> {
        let rec = self.state.record(page)?;
        self.view.image_metrics(rec.slot)
    }
}
