//! Navigation to pages that may not be rendered yet.
//!
//! A request for a page that is still loading parks on a one-shot waiter in the shared
//! [`GalleryState`]. The render pipeline resolves it when the page reaches a terminal state, or
//! with `None` once discovery is over and the page never appeared.

use std::rc::Rc;

use crate::events::{Events, GalleryEvent};
use crate::foundation::core::PageNumber;
use crate::foundation::error::GalleryResult;
use crate::state::{GalleryState, PageHandle};
use crate::view::{LoadingSource, PageView};

pub mod registry;

/// Result of [`NavigationSynchronizer::navigate_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The request did not name a valid page.
    Invalid,
    /// The view scrolled to the page. `waited` is set when the page had to be waited for.
    Arrived { page: PageNumber, waited: bool },
    /// Discovery ended without the page.
    NotFound(PageNumber),
}

/// Resolves navigation requests against the pipeline's progress.
#[derive(Debug)]
pub struct NavigationSynchronizer<V> {
    state: Rc<GalleryState>,
    view: V,
    events: Events,
}

impl<V: PageView> NavigationSynchronizer<V> {
    pub fn new(state: Rc<GalleryState>, view: V) -> Self {
        Self {
            state,
            view,
            events: Events::none(),
        }
    }

    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    /// Wait until `page` is rendered (or failed).
    ///
    /// Resolves immediately when the page already reached a terminal state, and immediately
    /// with `None` when every page is loaded and `page` has no slot.
    pub async fn wait_for_page(&self, page: PageNumber) -> Option<PageHandle> {
        if let Some(rec) = self.state.record(page)
            && rec.state.is_terminal()
        {
            return Some(rec.into());
        }
        if self.state.all_loaded() {
            return None;
        }
        let waiter = self.state.register_waiter(page);
        self.events.emit(GalleryEvent::WaiterRegistered { page });
        tracing::debug!(%page, "waiting for page");
        waiter.wait().await.flatten()
    }

    /// Scroll to page `n`, waiting for it to render if necessary.
    ///
    /// The loading indicator is shown for as long as the request waits.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn navigate_to(&self, n: u32) -> GalleryResult<NavigationOutcome> {
        let Ok(page) = PageNumber::new(n) else {
            tracing::warn!(n, "ignoring navigation to an invalid page number");
            return Ok(NavigationOutcome::Invalid);
        };

        if let Some(rec) = self.state.record(page)
            && rec.state.is_terminal()
        {
            self.view.scroll_to(rec.slot)?;
            return Ok(NavigationOutcome::Arrived {
                page,
                waited: false,
            });
        }

        self.view.set_loading_indicator(LoadingSource::Navigation, true);
        let handle = self.wait_for_page(page).await;
        self.view.set_loading_indicator(LoadingSource::Navigation, false);

        match handle {
            Some(h) => {
                self.view.scroll_to(h.slot)?;
                Ok(NavigationOutcome::Arrived { page, waited: true })
            }
            None => {
                tracing::info!(%page, "page does not exist");
                self.view.report_not_found(page);
                Ok(NavigationOutcome::NotFound(page))
            }
        }
    }
}

/// Extract a page number from a deep link.
///
/// Accepts `#page-12`, `#12`, `?page=12` (with other query parameters around it), and a bare
/// `12`. Returns `None` for anything else, including page zero.
pub fn parse_deep_link(link: &str) -> Option<PageNumber> {
    let link = link.trim();
    let raw = if let Some(frag) = link.strip_prefix('#') {
        frag.strip_prefix("page-").unwrap_or(frag)
    } else if let Some(query) = link.strip_prefix('?') {
        query
            .split('&')
            .find_map(|kv| kv.strip_prefix("page="))?
    } else {
        link
    };
    raw.parse::<u32>().ok().and_then(|n| PageNumber::new(n).ok())
}

#[cfg(test)]
#[path = "../../tests/unit/navigation/synchronizer.rs"]
mod tests;
