use crate::foundation::error::{GalleryError, GalleryResult};

pub use kurbo::{Point, Rect, Size};

/// 1-based page number in the discovered sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page of every gallery.
    pub const FIRST: Self = Self(1);

    /// Create a validated page number (`n >= 1`).
    pub fn new(n: u32) -> GalleryResult<Self> {
        if n == 0 {
            return Err(GalleryError::validation("page numbers start at 1"));
        }
        Ok(Self(n))
    }

    /// Raw 1-based value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The page after this one, `None` past `u32::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = GalleryError;

    fn try_from(n: u32) -> GalleryResult<Self> {
        Self::new(n)
    }
}

impl From<PageNumber> for u32 {
    fn from(p: PageNumber) -> Self {
        p.0
    }
}

impl std::fmt::Display for PageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Current viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport of `width x height` pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Natural (decoded) and rendered (laid out) size of a page image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageMetrics {
    /// Intrinsic pixel size of the decoded image.
    pub natural: Size,
    /// Size of the image box as currently laid out.
    pub rendered: Size,
}

impl ImageMetrics {
    /// Return `true` when both sizes are finite and non-degenerate.
    pub fn is_measurable(&self) -> bool {
        fn ok(s: Size) -> bool {
            s.width.is_finite() && s.height.is_finite() && s.width > 0.0 && s.height > 0.0
        }
        ok(self.natural) && ok(self.rendered)
    }
}

/// Box expressed in percent of an image box, measured from its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentBox {
    /// Distance from the left edge, in percent of the image width.
    pub left: f64,
    /// Distance from the top edge, in percent of the image height.
    pub top: f64,
    /// Width in percent of the image width.
    pub width: f64,
    /// Height in percent of the image height.
    pub height: f64,
}

impl PercentBox {
    /// Resolve against an image box of `size` pixels.
    pub fn to_rect(self, size: Size) -> Rect {
        let x0 = self.left / 100.0 * size.width;
        let y0 = self.top / 100.0 * size.height;
        Rect::new(
            x0,
            y0,
            x0 + self.width / 100.0 * size.width,
            y0 + self.height / 100.0 * size.height,
        )
    }

    /// Express a pixel rect relative to an image box of `size` pixels.
    pub fn from_rect(rect: Rect, size: Size) -> Self {
        Self {
            left: rect.x0 / size.width * 100.0,
            top: rect.y0 / size.height * 100.0,
            width: rect.width() / size.width * 100.0,
            height: rect.height() / size.height * 100.0,
        }
    }

    /// Return `true` when the percent point `(x, y)` lies inside the box.
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
