//! Scrollbook renders a long, scrollable gallery of page images whose count is not known up
//! front.
//!
//! - Pages are discovered by probing `1, 2, 3, ...` across several encodings
//! - Each discovered page is rendered into a [`PageView`] as soon as it arrives
//! - Navigation to a page that has not arrived yet waits for it
//! - Hotspot overlays and timed animation overlays are attached to rendered pages
//! - Animations are triggered from a feed of page visibility changes
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod config;
pub mod discovery;
pub mod events;
pub mod gallery;
pub mod geometry;
pub mod hotspots;
pub mod navigation;
pub mod pipeline;
pub mod resize;
pub mod state;
pub mod view;
pub mod visibility;

pub use crate::foundation::core::{
    ImageMetrics, PageNumber, PercentBox, Point, Rect, Size, Viewport,
};
pub use crate::foundation::error::{GalleryError, GalleryResult};

pub use crate::animation::{AnimationPhase, AnimationTimingEngine, HideOutcome, TimelinePlan};
pub use crate::config::GalleryConfig;
pub use crate::config::animations::{AnimationConfig, TriggerKind, load_animations, parse_animations};
pub use crate::config::hotspots::{HotspotConfig, TargetRef, load_hotspots, parse_hotspots};
pub use crate::discovery::{
    DirFetcher, Discovery, DiscoveryLoader, EndReason, FetchError, ImageCandidate,
    MemoryFetcher, PageFetcher, PageFormat,
};
pub use crate::events::{EventSink, Events, GalleryEvent, RecordingSink, TracingSink};
pub use crate::gallery::{Gallery, OverlayConfigs};
pub use crate::hotspots::HotspotGeometryEngine;
pub use crate::navigation::{NavigationOutcome, NavigationSynchronizer, parse_deep_link};
pub use crate::pipeline::{PageRenderPipeline, PipelineSummary, RenderOutcome};
pub use crate::resize::ResizeDebouncer;
pub use crate::state::{GalleryState, PageHandle, RenderState};
pub use crate::view::{InMemoryView, LoadingSource, PageView};
pub use crate::visibility::{VisibilityChange, VisibilityFeed, VisibilitySender};
