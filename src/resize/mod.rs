use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::GalleryConfig;
use crate::foundation::core::Viewport;

/// Sending half handed to whatever observes the window size.
pub type ViewportSender = mpsc::UnboundedSender<Viewport>;

/// Collapses bursts of viewport changes into one settled viewport.
#[derive(Debug)]
pub struct ResizeDebouncer {
    rx: mpsc::UnboundedReceiver<Viewport>,
    window: Duration,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> (ViewportSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx, window })
    }

    pub fn from_config(cfg: &GalleryConfig) -> (ViewportSender, Self) {
        Self::new(cfg.resize_debounce())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait for a change, then absorb further changes until the window passes quietly.
    ///
    /// Yields only the latest viewport of the burst. `None` once every sender is gone and
    /// nothing is queued.
    pub async fn next_settled(&mut self) -> Option<Viewport> {
        let mut latest = self.rx.recv().await?;
        let mut absorbed = 0usize;
        loop {
            match tokio::time::timeout(self.window, self.rx.recv()).await {
                Ok(Some(v)) => {
                    latest = v;
                    absorbed += 1;
                }
                // Closed mid-burst: the last value is final.
                Ok(None) => break,
                Err(_) => break,
            }
        }
        tracing::debug!(
            width = latest.width,
            height = latest.height,
            absorbed,
            "viewport settled"
        );
        Some(latest)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resize/debounce.rs"]
mod tests;
