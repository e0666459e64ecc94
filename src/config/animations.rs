use std::path::Path;

use crate::config::index::PageScoped;
use crate::config::{ParseReport, SkippedLine, data_lines, parse_page, parse_percent, read_text};
use crate::foundation::core::PageNumber;
use crate::foundation::error::GalleryResult;

/// Event that starts an animation's timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Pointer enters the page while it is in view.
    Hover,
    /// Page enters the viewport for the first time.
    #[default]
    Visible,
}

impl TriggerKind {
    /// Parse a trigger name; unknown names fall back to [`TriggerKind::Visible`].
    pub fn parse_lenient(raw: &str) -> (Self, bool) {
        match raw.to_ascii_lowercase().as_str() {
            "hover" => (Self::Hover, true),
            "visible" | "" => (Self::Visible, true),
            _ => (Self::Visible, false),
        }
    }
}

/// One decorative animation placed on a page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AnimationConfig {
    pub page: PageNumber,
    /// Icon asset reference.
    pub icon: String,
    /// Horizontal center, percent of the image width.
    pub center_x: f64,
    /// Vertical center, percent of the image height, measured from the top.
    pub center_y: f64,
    /// Side length, percent of the rendered image width.
    pub size: f64,
    pub duration_ms: u64,
    pub delay_ms: u64,
    pub trigger: TriggerKind,
}

impl PageScoped for AnimationConfig {
    fn page(&self) -> PageNumber {
        self.page
    }
}

/// Parse animation records:
/// `page, icon, centerX%, centerY%, size%, durationMs[, delayMs[, trigger]]`.
pub fn parse_animations(text: &str) -> ParseReport<AnimationConfig> {
    let mut report = ParseReport::default();
    for (line, fields) in data_lines(text) {
        match parse_line(&fields) {
            Ok((cfg, trigger_known)) => {
                if !trigger_known {
                    tracing::warn!(
                        line,
                        trigger = fields.get(7).copied().unwrap_or_default(),
                        "unknown trigger type, using 'visible'"
                    );
                }
                report.records.push(cfg);
            }
            Err(reason) => {
                tracing::warn!(line, %reason, "skipping animation line");
                report.skipped.push(SkippedLine { line, reason });
            }
        }
    }
    report
}

/// Read and parse an animation file. Only I/O failures are errors.
pub fn load_animations(path: impl AsRef<Path>) -> GalleryResult<ParseReport<AnimationConfig>> {
    Ok(parse_animations(&read_text(path.as_ref())?))
}

fn parse_ms(field: &str, name: &str) -> Result<u64, String> {
    field
        .parse()
        .map_err(|_| format!("{name} '{field}' is not a non-negative integer"))
}

fn parse_line(fields: &[&str]) -> Result<(AnimationConfig, bool), String> {
    if !(6..=8).contains(&fields.len()) {
        return Err(format!("expected 6 to 8 fields, found {}", fields.len()));
    }
    let page = parse_page(fields[0])?;
    let icon = fields[1];
    if icon.is_empty() {
        return Err("icon reference is empty".to_owned());
    }
    let center_x = parse_percent(fields[2], "centerX")?;
    let center_y = parse_percent(fields[3], "centerY")?;
    let size = parse_percent(fields[4], "size")?;
    if size <= 0.0 {
        return Err("size must be > 0".to_owned());
    }
    let duration_ms = parse_ms(fields[5], "duration")?;
    if duration_ms == 0 {
        return Err("duration must be > 0".to_owned());
    }
    let delay_ms = match fields.get(6) {
        Some(f) if !f.is_empty() => parse_ms(f, "delay")?,
        _ => 0,
    };
    let (trigger, known) = fields
        .get(7)
        .map(|f| TriggerKind::parse_lenient(f))
        .unwrap_or((TriggerKind::Visible, true));

    Ok((
        AnimationConfig {
            page,
            icon: icon.to_owned(),
            center_x,
            center_y,
            size,
            duration_ms,
            delay_ms,
            trigger,
        },
        known,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/config/animations.rs"]
mod tests;
