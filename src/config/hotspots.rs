use std::path::Path;

use crate::config::index::PageScoped;
use crate::config::{ParseReport, SkippedLine, data_lines, parse_page, parse_percent, read_text};
use crate::foundation::core::PageNumber;
use crate::foundation::error::GalleryResult;
use crate::geometry::AuthoredBox;

/// Opaque reference handed to the external viewer when a hotspot is activated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TargetRef(String);

impl TargetRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract a video id from the common `watch?v=`, `youtu.be/` and `embed/` URL shapes.
    ///
    /// Anything else is assumed to already be an id.
    pub fn video_id(&self) -> &str {
        let s = self.0.as_str();
        if let Some((_, rest)) = s.split_once("v=") {
            return rest.split(['&', '#']).next().unwrap_or(rest);
        }
        for marker in ["youtu.be/", "/embed/"] {
            if let Some((_, rest)) = s.split_once(marker) {
                return rest.split(['?', '&', '#', '/']).next().unwrap_or(rest);
            }
        }
        s
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One interactive region, in percent of the natural image.
///
/// Authored bottom-up: `bottom` is the distance from the image's bottom edge.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HotspotConfig {
    pub page: PageNumber,
    pub target: TargetRef,
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl HotspotConfig {
    /// Geometry of the region, still bottom-up and relative to the natural image.
    pub fn authored_box(&self) -> AuthoredBox {
        AuthoredBox {
            left: self.left,
            bottom: self.bottom,
            width: self.width,
            height: self.height,
        }
    }
}

impl PageScoped for HotspotConfig {
    fn page(&self) -> PageNumber {
        self.page
    }
}

const EPS: f64 = 1e-9;

/// Parse hotspot records: `page, target, left%, bottom%, width%, height%`.
pub fn parse_hotspots(text: &str) -> ParseReport<HotspotConfig> {
    let mut report = ParseReport::default();
    for (line, fields) in data_lines(text) {
        match parse_line(&fields) {
            Ok(cfg) => report.records.push(cfg),
            Err(reason) => {
                tracing::warn!(line, %reason, "skipping hotspot line");
                report.skipped.push(SkippedLine { line, reason });
            }
        }
    }
    report
}

/// Read and parse a hotspot file. Only I/O failures are errors.
pub fn load_hotspots(path: impl AsRef<Path>) -> GalleryResult<ParseReport<HotspotConfig>> {
    Ok(parse_hotspots(&read_text(path.as_ref())?))
}

fn parse_line(fields: &[&str]) -> Result<HotspotConfig, String> {
    let [page, target, left, bottom, width, height] = fields else {
        return Err(format!("expected 6 fields, found {}", fields.len()));
    };
    let page = parse_page(page)?;
    if target.is_empty() {
        return Err("target reference is empty".to_owned());
    }
    let left = parse_percent(left, "left")?;
    let bottom = parse_percent(bottom, "bottom")?;
    let width = parse_percent(width, "width")?;
    let height = parse_percent(height, "height")?;
    if width <= 0.0 || height <= 0.0 {
        return Err("width and height must be > 0".to_owned());
    }
    if left + width > 100.0 + EPS || bottom + height > 100.0 + EPS {
        return Err("hotspot extends past the image edge".to_owned());
    }
    Ok(HotspotConfig {
        page,
        target: TargetRef::new(*target),
        left,
        bottom,
        width,
        height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/config/hotspots.rs"]
mod tests;
