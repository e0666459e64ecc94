//! Pure coordinate math for page overlays.
//!
//! Configuration boxes are authored in percent of the natural image with a bottom-up vertical
//! axis. Overlays are laid out in percent of the rendered image box, top-down. On mobile the
//! conversion goes through rendered pixels so small hotspots can be inflated to a usable touch
//! size.

use crate::foundation::core::{ImageMetrics, PercentBox, Point, Rect, Size};

/// Layout regime chosen from the current viewport width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Viewports strictly narrower than `breakpoint_px` are mobile.
    ///
    /// This is the single classification rule used everywhere in the crate.
    pub fn classify(viewport_width: f64, breakpoint_px: f64) -> Self {
        if viewport_width < breakpoint_px {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Box in percent of the natural image, measured from its bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuthoredBox {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AuthoredBox {
    /// Same box measured from the top edge.
    pub fn top(&self) -> f64 {
        100.0 - self.bottom - self.height
    }

    /// Box in natural-image pixels, top-down.
    pub fn natural_rect(&self, natural: Size) -> Rect {
        let x0 = self.left / 100.0 * natural.width;
        let y0 = self.top() / 100.0 * natural.height;
        Rect::new(
            x0,
            y0,
            x0 + self.width / 100.0 * natural.width,
            y0 + self.height / 100.0 * natural.height,
        )
    }
}

/// Minimum touch-target rule: `max(min_px, shorter rendered image side * min_scale)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchTarget {
    pub min_px: f64,
    pub min_scale: f64,
}

impl TouchTarget {
    pub fn min_side(&self, rendered: Size) -> f64 {
        self.min_px
            .max(rendered.width.min(rendered.height) * self.min_scale)
    }
}

/// Computed overlay box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Box in percent of the rendered image.
    pub bounds: PercentBox,
    /// Uniform inflation applied for touch (1.0 when untouched).
    pub touch_scale: f64,
    pub device: DeviceClass,
}

/// Desktop transform: percentages pass through, bottom flipped to top.
pub fn desktop_box(b: AuthoredBox) -> PercentBox {
    PercentBox {
        left: b.left,
        top: b.top(),
        width: b.width,
        height: b.height,
    }
}

/// Mobile transform: natural px → rendered px → touch inflation → clamp → percent.
///
/// Degenerate metrics fall back to the desktop transform.
pub fn mobile_box(b: AuthoredBox, metrics: ImageMetrics, touch: TouchTarget) -> (PercentBox, f64) {
    if !metrics.is_measurable() {
        return (desktop_box(b), 1.0);
    }
    let rendered = metrics.rendered;
    let sx = rendered.width / metrics.natural.width;
    let sy = rendered.height / metrics.natural.height;
    let nat = b.natural_rect(metrics.natural);
    let scaled = Rect::new(nat.x0 * sx, nat.y0 * sy, nat.x1 * sx, nat.y1 * sy);

    let (inflated, scale) = inflate_to_min(scaled, touch.min_side(rendered));
    let clamped = clamp_inside(inflated, rendered);
    (PercentBox::from_rect(clamped, rendered), scale)
}

/// Scale `rect` uniformly about its center so its shorter side is at least `min_side`.
///
/// Returns the new rect and the applied scale (1.0 when the rect was already large enough).
pub fn inflate_to_min(rect: Rect, min_side: f64) -> (Rect, f64) {
    let shorter = rect.width().min(rect.height());
    if shorter <= 0.0 || shorter >= min_side {
        return (rect, 1.0);
    }
    let scale = min_side / shorter;
    let size = Size::new(rect.width() * scale, rect.height() * scale);
    (Rect::from_center_size(rect.center(), size), scale)
}

/// Move (and if needed shrink) `rect` so it lies within `[0, bounds]`.
pub fn clamp_inside(rect: Rect, bounds: Size) -> Rect {
    let w = rect.width().min(bounds.width);
    let h = rect.height().min(bounds.height);
    let x0 = rect.x0.clamp(0.0, bounds.width - w);
    let y0 = rect.y0.clamp(0.0, bounds.height - h);
    Rect::from_origin_size(Point::new(x0, y0), Size::new(w, h))
}

/// Place an authored box for the current device class.
pub fn place_hotspot(
    b: AuthoredBox,
    metrics: ImageMetrics,
    device: DeviceClass,
    touch: TouchTarget,
) -> Placement {
    match device {
        DeviceClass::Desktop => Placement {
            bounds: desktop_box(b),
            touch_scale: 1.0,
            device,
        },
        DeviceClass::Mobile => {
            let (bounds, touch_scale) = mobile_box(b, metrics, touch);
            Placement {
                bounds,
                touch_scale,
                device,
            }
        }
    }
}

/// Stroke dash pattern for an outline that draws itself around the box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutlineDash {
    /// Rendered perimeter in pixels.
    pub perimeter: f64,
    /// Dash length; equals the perimeter.
    pub dash_array: f64,
    /// Initial dash offset; equals the perimeter (outline fully hidden).
    pub dash_offset: f64,
}

pub fn outline_dash(bounds: PercentBox, rendered: Size) -> OutlineDash {
    let r = bounds.to_rect(rendered);
    let perimeter = 2.0 * (r.width() + r.height());
    OutlineDash {
        perimeter,
        dash_array: perimeter,
        dash_offset: perimeter,
    }
}

/// Square animation box centered at `(center_x, center_y)` percent.
///
/// `size` is the side length in percent of the rendered width; the height percentage is derived
/// so the box stays square in pixels.
pub fn animation_box(center_x: f64, center_y: f64, size: f64, rendered: Size) -> PercentBox {
    let side_px = size / 100.0 * rendered.width;
    let height = if rendered.height > 0.0 {
        side_px / rendered.height * 100.0
    } else {
        size
    };
    PercentBox {
        left: center_x - size / 2.0,
        top: center_y - height / 2.0,
        width: size,
        height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
