use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::core::PageNumber;

/// Records that belong to a single page.
pub trait PageScoped {
    fn page(&self) -> PageNumber;
}

/// Validated records grouped by page number.
///
/// Built once from parser output; overlays keep `Arc` back-references into it.
#[derive(Clone, Debug)]
pub struct PageIndex<T> {
    by_page: BTreeMap<PageNumber, Vec<Arc<T>>>,
    len: usize,
}

impl<T> Default for PageIndex<T> {
    fn default() -> Self {
        Self {
            by_page: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T: PageScoped> PageIndex<T> {
    /// Group `records` by page, preserving source order within each page.
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut out = Self::default();
        for r in records {
            out.by_page.entry(r.page()).or_default().push(Arc::new(r));
            out.len += 1;
        }
        out
    }
}

impl<T> PageIndex<T> {
    /// Records for `page` (empty when the page has none).
    pub fn for_page(&self, page: PageNumber) -> &[Arc<T>] {
        self.by_page.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total record count.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/index.rs"]
mod tests;
