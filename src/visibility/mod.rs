//! Page visibility feed.
//!
//! Whatever observes the viewport (an intersection observer in a browser, a scroll model in a
//! headless run) pushes [`VisibilityChange`]s into a [`VisibilitySender`]. The gallery consumes
//! the matching [`VisibilityFeed`] and turns changes into animation triggers.

use std::collections::BTreeMap;

use tokio::sync::mpsc;

use crate::foundation::core::PageNumber;

/// A page entered or left the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityChange {
    pub page: PageNumber,
    pub visible: bool,
}

impl VisibilityChange {
    pub fn entered(page: PageNumber) -> Self {
        Self {
            page,
            visible: true,
        }
    }

    pub fn left(page: PageNumber) -> Self {
        Self {
            page,
            visible: false,
        }
    }
}

pub type VisibilitySender = mpsc::UnboundedSender<VisibilityChange>;

/// Receiving side of a visibility subscription.
///
/// Repeated reports of a page's current state are dropped, so every yielded change flips it.
#[derive(Debug)]
pub struct VisibilityFeed {
    rx: mpsc::UnboundedReceiver<VisibilityChange>,
    known: BTreeMap<PageNumber, bool>,
}

impl VisibilityFeed {
    pub fn subscribe() -> (VisibilitySender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Self {
                rx,
                known: BTreeMap::new(),
            },
        )
    }

    /// Next change that flips a page's visibility. `None` once every sender is gone.
    pub async fn next_change(&mut self) -> Option<VisibilityChange> {
        loop {
            let change = self.rx.recv().await?;
            let was = self
                .known
                .insert(change.page, change.visible)
                .unwrap_or(false);
            if was != change.visible {
                return Some(change);
            }
            tracing::trace!(
                page = %change.page,
                visible = change.visible,
                "repeated visibility report"
            );
        }
    }

    /// Last known visibility of `page`.
    pub fn is_visible(&self, page: PageNumber) -> bool {
        self.known.get(&page).copied().unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/feed.rs"]
mod tests;
