use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::GalleryConfig;
use crate::discovery::decode::{DecodedPage, ImageCrateDecoder, PageDecoder};
use crate::discovery::fetch::{FetchError, PageFetcher};
use crate::discovery::format::{AssetLayout, PageFormat};
use crate::events::{Events, GalleryEvent, ProbeFailure};
use crate::foundation::core::PageNumber;

/// A page that was found and decoded.
#[derive(Clone, Debug)]
pub struct ImageCandidate {
    pub page: PageNumber,
    /// Asset path the payload was fetched from.
    pub path: String,
    pub format: PageFormat,
    pub image: DecodedPage,
}

/// Why discovery stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The consecutive-absence threshold was reached after content was found.
    Exhausted,
    /// The page ceiling was reached after content was found.
    PageLimit,
    /// The page ceiling was reached without finding any page.
    NoContent,
}

/// Result of one discovery step.
#[derive(Clone, Debug)]
pub enum Discovery {
    Found(ImageCandidate),
    End(EndReason),
}

/// Counters describing discovery progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Pages that produced a candidate.
    pub pages_found: u32,
    /// Highest page number probed so far.
    pub last_probed: Option<PageNumber>,
    /// Individual `(page, format)` attempts.
    pub attempts: u64,
    /// Failed attempts per format.
    pub failures_by_format: BTreeMap<PageFormat, u64>,
}

/// Probes `1, 2, 3, ...` against the configured encodings.
///
/// The loader is single-consumer: `next` takes `&mut self`, so pages are discovered strictly one
/// at a time and never re-probed.
pub struct DiscoveryLoader<F, D = ImageCrateDecoder> {
    fetcher: F,
    decoder: D,
    layout: AssetLayout,
    formats: Vec<PageFormat>,
    timeout: Duration,
    failure_threshold: u32,
    max_pages: u32,

    /// `None` once the page numbers ran out.
    next_page: Option<PageNumber>,
    preferred: Option<PageFormat>,
    consecutive_failures: u32,
    ended: Option<EndReason>,
    stats: DiscoveryStats,
    events: Events,
}

impl<F: PageFetcher> DiscoveryLoader<F, ImageCrateDecoder> {
    /// Loader using the `image` crate decoder.
    pub fn new(cfg: &GalleryConfig, fetcher: F) -> Self {
        Self::with_decoder(cfg, fetcher, ImageCrateDecoder)
    }
}

impl<F: PageFetcher, D: PageDecoder> DiscoveryLoader<F, D> {
    pub fn with_decoder(cfg: &GalleryConfig, fetcher: F, decoder: D) -> Self {
        Self {
            fetcher,
            decoder,
            layout: AssetLayout::from_config(cfg),
            formats: cfg.formats.clone(),
            timeout: cfg.fetch_timeout(),
            failure_threshold: cfg.consecutive_failure_threshold.max(1),
            max_pages: cfg.max_pages,
            next_page: Some(PageNumber::FIRST),
            preferred: None,
            consecutive_failures: 0,
            ended: None,
            stats: DiscoveryStats::default(),
            events: Events::none(),
        }
    }

    /// Attach an observability sink.
    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    /// Most recently successful encoding.
    pub fn preferred_format(&self) -> Option<PageFormat> {
        self.preferred
    }

    pub fn stats(&self) -> &DiscoveryStats {
        &self.stats
    }

    /// Terminal reason once discovery has ended.
    pub fn ended(&self) -> Option<EndReason> {
        self.ended
    }

    /// Formats in the order the next page will try them.
    pub fn probe_order(&self) -> Vec<PageFormat> {
        let mut order = Vec::with_capacity(self.formats.len());
        if let Some(p) = self.preferred {
            order.push(p);
        }
        order.extend(
            self.formats
                .iter()
                .copied()
                .filter(|f| Some(*f) != self.preferred),
        );
        order
    }

    /// Discover the next page, or report why discovery is over.
    ///
    /// Once an [`EndReason`] was returned every later call returns it again without probing.
    pub async fn next(&mut self) -> Discovery {
        if let Some(end) = self.ended {
            return Discovery::End(end);
        }

        loop {
            let Some(page) = self.next_page.filter(|p| p.get() <= self.max_pages) else {
                let reason = if self.stats.pages_found == 0 {
                    EndReason::NoContent
                } else {
                    EndReason::PageLimit
                };
                return self.finish(reason);
            };
            self.next_page = page.next();
            self.stats.last_probed = Some(page);

            if let Some(candidate) = self.probe_page(page).await {
                self.consecutive_failures = 0;
                self.stats.pages_found += 1;
                self.events.emit(GalleryEvent::PageDiscovered {
                    page,
                    format: candidate.format,
                });
                return Discovery::Found(candidate);
            }

            self.consecutive_failures += 1;
            tracing::debug!(
                %page,
                consecutive = self.consecutive_failures,
                "page absent in every format"
            );
            if self.stats.pages_found > 0 && self.consecutive_failures >= self.failure_threshold {
                return self.finish(EndReason::Exhausted);
            }
        }
    }

    fn finish(&mut self, reason: EndReason) -> Discovery {
        tracing::info!(
            ?reason,
            pages_found = self.stats.pages_found,
            "discovery finished"
        );
        self.ended = Some(reason);
        self.events.emit(GalleryEvent::DiscoveryEnded {
            reason,
            pages_found: self.stats.pages_found,
        });
        Discovery::End(reason)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(page = %page))]
    async fn probe_page(&mut self, page: PageNumber) -> Option<ImageCandidate> {
        for format in self.probe_order() {
            let path = self.layout.path(page, format);
            self.stats.attempts += 1;
            self.events
                .emit(GalleryEvent::ProbeStarted { page, format });

            match self.attempt(&path, format).await {
                Ok(image) => {
                    if self.preferred != Some(format) {
                        tracing::debug!(%format, "preferred format changed");
                    }
                    self.preferred = Some(format);
                    return Some(ImageCandidate {
                        page,
                        path,
                        format,
                        image,
                    });
                }
                Err(failure) => {
                    *self.stats.failures_by_format.entry(format).or_default() += 1;
                    self.events.emit(GalleryEvent::ProbeFailed {
                        page,
                        format,
                        failure,
                    });
                }
            }
        }
        None
    }

    async fn attempt(&self, path: &str, format: PageFormat) -> Result<DecodedPage, ProbeFailure> {
        let bytes = match tokio::time::timeout(self.timeout, self.fetcher.fetch(path)).await {
            Err(_) => {
                tracing::warn!(path, timeout_ms = self.timeout.as_millis() as u64, "fetch timed out");
                return Err(ProbeFailure::Timeout);
            }
            Ok(Err(FetchError::NotFound)) => {
                tracing::debug!(path, "not found");
                return Err(ProbeFailure::NotFound);
            }
            Ok(Err(FetchError::Server(status))) => {
                tracing::warn!(path, status, "server error, trying next format");
                return Err(ProbeFailure::Server(status));
            }
            Ok(Err(FetchError::Network(msg))) => {
                tracing::warn!(path, error = %msg, "network error, trying next format");
                return Err(ProbeFailure::Network(msg));
            }
            Ok(Ok(bytes)) => bytes,
        };

        self.decoder.decode(&bytes, format).map_err(|e| {
            tracing::warn!(path, error = %e, "payload not decodable, trying next format");
            ProbeFailure::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/discovery/loader.rs"]
mod tests;
