use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::discovery::format::PageFormat;
use crate::foundation::error::{GalleryError, GalleryResult};

pub mod animations;
pub mod hotspots;
pub mod index;

/// Gallery-wide settings.
///
/// Loaded from JSON; every field has a default so a config file only needs to name what it
/// overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Root of the asset tree (`{base}/{format}/{prefix}{page}.{ext}`).
    pub base: String,
    /// File name prefix placed before the zero-padded page number.
    pub prefix: String,
    /// Zero-padding width of the page number.
    pub pad_width: usize,
    /// Encodings in probe priority order.
    pub formats: Vec<PageFormat>,
    /// Per-attempt fetch timeout.
    pub fetch_timeout_ms: u64,
    /// Consecutive fully-absent pages that end discovery once content was found.
    pub consecutive_failure_threshold: u32,
    /// Hard ceiling on probed page numbers.
    pub max_pages: u32,
    /// Viewports narrower than this are classified as mobile.
    pub mobile_breakpoint_px: f64,
    /// Minimum touch-target side in pixels.
    pub min_touch_px: f64,
    /// Minimum touch-target side as a fraction of the image's shorter rendered side.
    pub min_touch_scale: f64,
    /// Quiet window before a burst of resize events is applied.
    pub resize_debounce_ms: u64,
    /// Fade-in time of an animation entering view.
    pub entrance_ms: u64,
    /// Fixed exit window at the end of every animation timeline.
    pub exit_ms: u64,
    /// Fade-out time of an explicit hide request.
    pub hide_fade_ms: u64,
    /// Period of one pulse cycle.
    pub pulse_period_ms: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base: "pages".to_owned(),
            prefix: "page-".to_owned(),
            pad_width: 3,
            formats: vec![PageFormat::Avif, PageFormat::Webp, PageFormat::Png],
            fetch_timeout_ms: 8_000,
            consecutive_failure_threshold: 5,
            max_pages: 500,
            mobile_breakpoint_px: 768.0,
            min_touch_px: 44.0,
            min_touch_scale: 0.08,
            resize_debounce_ms: 150,
            entrance_ms: 400,
            exit_ms: 600,
            hide_fade_ms: 300,
            pulse_period_ms: 1_200,
        }
    }
}

impl GalleryConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GalleryResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| GalleryError::config(format!("parse gallery config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GalleryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GalleryError::config(format!("open gallery config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> GalleryResult<()> {
        if self.formats.is_empty() {
            return Err(GalleryError::config("formats must name at least one encoding"));
        }
        for (i, f) in self.formats.iter().enumerate() {
            if self.formats[..i].contains(f) {
                return Err(GalleryError::config(format!(
                    "format '{f}' is listed more than once"
                )));
            }
        }
        if !(1..=10).contains(&self.pad_width) {
            return Err(GalleryError::config("pad_width must be in 1..=10"));
        }
        if self.consecutive_failure_threshold == 0 {
            return Err(GalleryError::config(
                "consecutive_failure_threshold must be >= 1",
            ));
        }
        if self.max_pages == 0 {
            return Err(GalleryError::config("max_pages must be >= 1"));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(GalleryError::config("fetch_timeout_ms must be > 0"));
        }
        if !self.mobile_breakpoint_px.is_finite() || self.mobile_breakpoint_px <= 0.0 {
            return Err(GalleryError::config(
                "mobile_breakpoint_px must be finite and > 0",
            ));
        }
        if !self.min_touch_px.is_finite() || self.min_touch_px < 0.0 {
            return Err(GalleryError::config("min_touch_px must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.min_touch_scale) {
            return Err(GalleryError::config("min_touch_scale must be in [0, 1]"));
        }
        if self.pulse_period_ms == 0 {
            return Err(GalleryError::config("pulse_period_ms must be > 0"));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// A config line that was skipped during parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of parsing a line-oriented config text.
///
/// Malformed lines never fail the whole parse; they are reported in `skipped`.
#[derive(Clone, Debug)]
pub struct ParseReport<T> {
    /// Valid records in source order.
    pub records: Vec<T>,
    /// Lines that were rejected.
    pub skipped: Vec<SkippedLine>,
}

impl<T> Default for ParseReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Iterate the meaningful lines of a config text as `(line_no, fields)`.
///
/// Blank lines and `#` comments are dropped; fields are comma-separated and trimmed.
pub(crate) fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some((i + 1, line.split(',').map(str::trim).collect()))
    })
}

/// Parse a percentage field, tolerating a trailing `%`.
pub(crate) fn parse_percent(field: &str, name: &str) -> Result<f64, String> {
    let v: f64 = field
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| format!("{name} '{field}' is not a number"))?;
    if !v.is_finite() || !(0.0..=100.0).contains(&v) {
        return Err(format!("{name} {v} is outside 0..=100"));
    }
    Ok(v)
}

pub(crate) fn parse_page(field: &str) -> Result<crate::PageNumber, String> {
    let n: u32 = field
        .parse()
        .map_err(|_| format!("page number '{field}' is not a positive integer"))?;
    crate::PageNumber::new(n).map_err(|e| e.to_string())
}

pub(crate) fn read_text(path: &Path) -> GalleryResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| GalleryError::config(format!("read '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/config/gallery.rs"]
mod tests;
