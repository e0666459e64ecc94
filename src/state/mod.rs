//! Explicit application state shared by the pipeline and its observers.
//!
//! One [`GalleryState`] is owned by the orchestrator and handed to components by reference
//! (`Rc`). The render pipeline is the only writer; navigation and UI code read snapshots.
//! Borrows are never held across an `.await`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::discovery::loader::EndReason;
use crate::foundation::core::PageNumber;
use crate::foundation::error::{GalleryError, GalleryResult};
use crate::navigation::registry::{CompletionRegistry, Waiter};

/// Opaque handle to a page's slot in the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

/// Per-page render lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    Pending,
    Loading,
    Ready,
    Failed,
}

impl RenderState {
    /// `Pending → Loading → Ready | Failed`; nothing leaves a terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Loading)
                | (Self::Loading, Self::Ready)
                | (Self::Loading, Self::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// One discovered page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRecord {
    pub page: PageNumber,
    pub state: RenderState,
    pub slot: SlotId,
}

/// What a navigation waiter receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageHandle {
    pub page: PageNumber,
    pub slot: SlotId,
    pub state: RenderState,
}

impl From<PageRecord> for PageHandle {
    fn from(r: PageRecord) -> Self {
        Self {
            page: r.page,
            slot: r.slot,
            state: r.state,
        }
    }
}

/// Read-only view of the pipeline's progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    pub pages: Vec<PageRecord>,
    pub in_flight: Vec<PageNumber>,
    pub highest_rendered: Option<PageNumber>,
    pub all_loaded: bool,
    pub end: Option<EndReason>,
}

#[derive(Debug, Default)]
struct Progress {
    pages: BTreeMap<PageNumber, PageRecord>,
    in_flight: BTreeSet<PageNumber>,
    highest_rendered: Option<PageNumber>,
    end: Option<EndReason>,
}

/// Shared gallery state.
#[derive(Debug, Default)]
pub struct GalleryState {
    progress: RefCell<Progress>,
    all_loaded: Cell<bool>,
    waiters: RefCell<CompletionRegistry<PageNumber, Option<PageHandle>>>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, page: PageNumber) -> Option<PageRecord> {
        self.progress.borrow().pages.get(&page).copied()
    }

    pub fn is_in_flight(&self, page: PageNumber) -> bool {
        self.progress.borrow().in_flight.contains(&page)
    }

    pub fn highest_rendered(&self) -> Option<PageNumber> {
        self.progress.borrow().highest_rendered
    }

    /// `true` once discovery reached its end and every discovered page was processed.
    pub fn all_loaded(&self) -> bool {
        self.all_loaded.get()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.progress.borrow().end
    }

    /// Pages in `Ready` state, ascending.
    pub fn ready_pages(&self) -> Vec<PageNumber> {
        self.progress
            .borrow()
            .pages
            .values()
            .filter(|r| r.state == RenderState::Ready)
            .map(|r| r.page)
            .collect()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let p = self.progress.borrow();
        StateSnapshot {
            pages: p.pages.values().copied().collect(),
            in_flight: p.in_flight.iter().copied().collect(),
            highest_rendered: p.highest_rendered,
            all_loaded: self.all_loaded.get(),
            end: p.end,
        }
    }

    /// Waiters currently registered for `page`.
    pub fn pending_waiters(&self, page: PageNumber) -> usize {
        self.waiters.borrow().pending(&page)
    }

    /// Total registered waiters.
    pub fn waiter_count(&self) -> usize {
        self.waiters.borrow().len()
    }

    // --- writer side (render pipeline) ---

    /// Claim `page` for rendering.
    ///
    /// Returns `None` when the page is already in flight or already has a record. The returned
    /// guard releases the claim when dropped, on every exit path.
    pub(crate) fn begin_render(&self, page: PageNumber) -> Option<InFlight<'_>> {
        let mut p = self.progress.borrow_mut();
        if p.in_flight.contains(&page) || p.pages.contains_key(&page) {
            return None;
        }
        p.in_flight.insert(page);
        Some(InFlight { state: self, page })
    }

    pub(crate) fn insert_record(&self, page: PageNumber, slot: SlotId) -> GalleryResult<()> {
        let mut p = self.progress.borrow_mut();
        if p.pages.contains_key(&page) {
            return Err(GalleryError::validation(format!(
                "page {page} already has a record"
            )));
        }
        p.pages.insert(
            page,
            PageRecord {
                page,
                state: RenderState::Pending,
                slot,
            },
        );
        Ok(())
    }

    pub(crate) fn transition(&self, page: PageNumber, next: RenderState) -> GalleryResult<()> {
        let mut p = self.progress.borrow_mut();
        let rec = p
            .pages
            .get_mut(&page)
            .ok_or_else(|| GalleryError::validation(format!("page {page} has no record")))?;
        if !rec.state.can_transition_to(next) {
            return Err(GalleryError::validation(format!(
                "page {page}: illegal transition {:?} -> {next:?}",
                rec.state
            )));
        }
        rec.state = next;
        if next.is_terminal() && p.highest_rendered.is_none_or(|h| h < page) {
            p.highest_rendered = Some(page);
        }
        Ok(())
    }

    pub(crate) fn mark_all_loaded(&self, end: EndReason) {
        self.progress.borrow_mut().end = Some(end);
        self.all_loaded.set(true);
    }

    pub(crate) fn register_waiter(&self, page: PageNumber) -> Waiter<Option<PageHandle>> {
        self.waiters.borrow_mut().register(page)
    }

    pub(crate) fn notify_page(&self, page: PageNumber, handle: PageHandle) -> usize {
        self.waiters.borrow_mut().notify(&page, Some(handle))
    }

    pub(crate) fn flush_waiters(&self) -> usize {
        self.waiters.borrow_mut().notify_all(None)
    }
}

/// RAII claim on a page render; unregisters the page from the in-flight set on drop.
#[derive(Debug)]
pub(crate) struct InFlight<'a> {
    state: &'a GalleryState,
    page: PageNumber,
}

impl InFlight<'_> {
    pub(crate) fn page(&self) -> PageNumber {
        self.page
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.progress.borrow_mut().in_flight.remove(&self.page);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/gallery_state.rs"]
mod tests;
