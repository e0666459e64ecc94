//! Rendering surface capability.
//!
//! The pipeline never touches a concrete document; it drives a [`PageView`]. A browser front end
//! would back this with DOM nodes. [`InMemoryView`] keeps everything in memory for tests and
//! headless runs.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::discovery::format::PageFormat;
use crate::discovery::loader::ImageCandidate;
use crate::foundation::core::{ImageMetrics, PageNumber, Size, Viewport};
use crate::foundation::error::{GalleryError, GalleryResult};
use crate::state::SlotId;

/// Who asked for the loading indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadingSource {
    /// The pipeline, until the first page has been processed.
    Initial,
    /// A navigation request waiting for its page.
    Navigation,
}

/// Document operations the gallery needs.
///
/// Methods take `&self`; implementations use interior mutability the way DOM handles do.
#[allow(async_fn_in_trait)]
pub trait PageView {
    /// Create an empty slot for `page`, positioned after every existing slot.
    fn create_slot(&self, page: PageNumber) -> GalleryResult<SlotId>;

    /// Put the decoded image into `slot`.
    ///
    /// Resolves with the image metrics once layout is known, or `None` if the image is attached
    /// but not laid out yet (see [`PageView::image_metrics`]).
    async fn mount_image(
        &self,
        slot: SlotId,
        candidate: &ImageCandidate,
    ) -> GalleryResult<Option<ImageMetrics>>;

    /// Replace the slot's content with a per-page fallback tile.
    fn show_page_fallback(&self, slot: SlotId, page: PageNumber);

    /// Replace the whole gallery with a fallback message.
    fn show_gallery_fallback(&self, message: &str);

    /// Show or hide the loading indicator on behalf of `source`.
    ///
    /// Calls are balanced per source, and several navigation requests may hold the indicator at
    /// once. It stays visible while any holder remains.
    fn set_loading_indicator(&self, source: LoadingSource, visible: bool);

    /// Current size of the scrolling viewport.
    fn viewport(&self) -> Viewport;

    /// Current metrics of the image in `slot`, if it is laid out.
    fn image_metrics(&self, slot: SlotId) -> Option<ImageMetrics>;

    fn scroll_to(&self, slot: SlotId) -> GalleryResult<()>;

    /// Tell the user that `page` does not exist.
    fn report_not_found(&self, page: PageNumber);
}

/// Content of an [`InMemoryView`] slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotContent {
    Empty,
    Image {
        format: PageFormat,
        natural: Size,
    },
    Fallback,
}

/// One slot of an [`InMemoryView`].
#[derive(Clone, Debug, PartialEq)]
pub struct SlotEntry {
    pub page: PageNumber,
    pub content: SlotContent,
}

/// Single-column in-memory document.
///
/// Images are laid out at `min(natural width, viewport width)` keeping their aspect ratio.
#[derive(Debug)]
pub struct InMemoryView {
    viewport: Cell<Viewport>,
    slots: RefCell<Vec<SlotEntry>>,
    loading_holders: RefCell<BTreeMap<LoadingSource, usize>>,
    loading_history: RefCell<Vec<bool>>,
    gallery_fallback: RefCell<Option<String>>,
    scrolls: RefCell<Vec<PageNumber>>,
    not_found: RefCell<Vec<PageNumber>>,
    failing_pages: RefCell<BTreeSet<PageNumber>>,
    unlaid_pages: RefCell<BTreeSet<PageNumber>>,
    mount_latency: Cell<Duration>,
}

impl InMemoryView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Cell::new(viewport),
            slots: RefCell::default(),
            loading_holders: RefCell::default(),
            loading_history: RefCell::default(),
            gallery_fallback: RefCell::default(),
            scrolls: RefCell::default(),
            not_found: RefCell::default(),
            failing_pages: RefCell::default(),
            unlaid_pages: RefCell::default(),
            mount_latency: Cell::new(Duration::ZERO),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    /// Make `mount_image` fail for `page`.
    pub fn fail_mount(&self, page: PageNumber) {
        self.failing_pages.borrow_mut().insert(page);
    }

    /// Mount `page` without layout; metrics stay unknown until [`InMemoryView::finish_layout`].
    pub fn defer_layout(&self, page: PageNumber) {
        self.unlaid_pages.borrow_mut().insert(page);
    }

    pub fn finish_layout(&self, page: PageNumber) {
        self.unlaid_pages.borrow_mut().remove(&page);
    }

    /// Simulated decode/layout time of every mount.
    pub fn set_mount_latency(&self, latency: Duration) {
        self.mount_latency.set(latency);
    }

    pub fn slots(&self) -> Vec<SlotEntry> {
        self.slots.borrow().clone()
    }

    pub fn slots_for(&self, page: PageNumber) -> usize {
        self.slots.borrow().iter().filter(|s| s.page == page).count()
    }

    /// Every change of the indicator's visibility, in order.
    pub fn loading_history(&self) -> Vec<bool> {
        self.loading_history.borrow().clone()
    }

    pub fn loading_visible(&self) -> bool {
        !self.loading_holders.borrow().is_empty()
    }

    /// Outstanding holds of `source`.
    pub fn loading_holds(&self, source: LoadingSource) -> usize {
        self.loading_holders.borrow().get(&source).copied().unwrap_or(0)
    }

    pub fn gallery_fallback(&self) -> Option<String> {
        self.gallery_fallback.borrow().clone()
    }

    pub fn scrolls(&self) -> Vec<PageNumber> {
        self.scrolls.borrow().clone()
    }

    pub fn not_found(&self) -> Vec<PageNumber> {
        self.not_found.borrow().clone()
    }

    fn layout(&self, natural: Size) -> ImageMetrics {
        let vw = self.viewport.get().width;
        let width = natural.width.min(vw);
        let height = if natural.width > 0.0 {
            natural.height * width / natural.width
        } else {
            0.0
        };
        ImageMetrics {
            natural,
            rendered: Size::new(width, height),
        }
    }

    fn entry(&self, slot: SlotId) -> GalleryResult<SlotEntry> {
        self.slots
            .borrow()
            .get(slot.0 as usize)
            .cloned()
            .ok_or_else(|| GalleryError::render(format!("unknown slot {}", slot.0)))
    }
}

impl PageView for InMemoryView {
    fn create_slot(&self, page: PageNumber) -> GalleryResult<SlotId> {
        let mut slots = self.slots.borrow_mut();
        let id = u32::try_from(slots.len())
            .map_err(|_| GalleryError::render("slot table is full"))?;
        slots.push(SlotEntry {
            page,
            content: SlotContent::Empty,
        });
        Ok(SlotId(id))
    }

    async fn mount_image(
        &self,
        slot: SlotId,
        candidate: &ImageCandidate,
    ) -> GalleryResult<Option<ImageMetrics>> {
        let latency = self.mount_latency.get();
        if latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(latency).await;
        }

        let entry = self.entry(slot)?;
        if self.failing_pages.borrow().contains(&entry.page) {
            return Err(GalleryError::render(format!(
                "page {} could not be materialized",
                entry.page
            )));
        }
        let natural = candidate.image.natural_size();
        if let Some(e) = self.slots.borrow_mut().get_mut(slot.0 as usize) {
            e.content = SlotContent::Image {
                format: candidate.format,
                natural,
            };
        }
        if self.unlaid_pages.borrow().contains(&entry.page) {
            return Ok(None);
        }
        Ok(Some(self.layout(natural)))
    }

    fn show_page_fallback(&self, slot: SlotId, _page: PageNumber) {
        if let Some(e) = self.slots.borrow_mut().get_mut(slot.0 as usize) {
            e.content = SlotContent::Fallback;
        }
    }

    fn show_gallery_fallback(&self, message: &str) {
        *self.gallery_fallback.borrow_mut() = Some(message.to_owned());
    }

    fn set_loading_indicator(&self, source: LoadingSource, visible: bool) {
        let was_visible = self.loading_visible();
        {
            let mut holders = self.loading_holders.borrow_mut();
            if visible {
                *holders.entry(source).or_default() += 1;
            } else if let Some(n) = holders.get_mut(&source) {
                *n -= 1;
                if *n == 0 {
                    holders.remove(&source);
                }
            }
        }
        let now_visible = self.loading_visible();
        if now_visible != was_visible {
            self.loading_history.borrow_mut().push(now_visible);
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn image_metrics(&self, slot: SlotId) -> Option<ImageMetrics> {
        let entry = self.entry(slot).ok()?;
        if self.unlaid_pages.borrow().contains(&entry.page) {
            return None;
        }
        match entry.content {
            SlotContent::Image { natural, .. } => Some(self.layout(natural)),
            _ => None,
        }
    }

    fn scroll_to(&self, slot: SlotId) -> GalleryResult<()> {
        let entry = self.entry(slot)?;
        self.scrolls.borrow_mut().push(entry.page);
        Ok(())
    }

    fn report_not_found(&self, page: PageNumber) {
        self.not_found.borrow_mut().push(page);
    }
}

impl<V: PageView> PageView for std::rc::Rc<V> {
    fn create_slot(&self, page: PageNumber) -> GalleryResult<SlotId> {
        (**self).create_slot(page)
    }

    async fn mount_image(
        &self,
        slot: SlotId,
        candidate: &ImageCandidate,
    ) -> GalleryResult<Option<ImageMetrics>> {
        (**self).mount_image(slot, candidate).await
    }

    fn show_page_fallback(&self, slot: SlotId, page: PageNumber) {
        (**self).show_page_fallback(slot, page)
    }

    fn show_gallery_fallback(&self, message: &str) {
        (**self).show_gallery_fallback(message)
    }

    fn set_loading_indicator(&self, source: LoadingSource, visible: bool) {
        (**self).set_loading_indicator(source, visible)
    }

    fn viewport(&self) -> Viewport {
        PageView::viewport(&**self)
    }

    fn image_metrics(&self, slot: SlotId) -> Option<ImageMetrics> {
        (**self).image_metrics(slot)
    }

    fn scroll_to(&self, slot: SlotId) -> GalleryResult<()> {
        (**self).scroll_to(slot)
    }

    fn report_not_found(&self, page: PageNumber) {
        (**self).report_not_found(page)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/in_memory.rs"]
mod tests;
