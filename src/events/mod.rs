//! Optional observability sink.
//!
//! Components report notable transitions through [`Events`]. Nothing in the core reads events
//! back, so a gallery behaves identically with or without a sink attached.

use std::cell::RefCell;
use std::rc::Rc;

use crate::discovery::format::PageFormat;
use crate::discovery::loader::EndReason;
use crate::foundation::core::PageNumber;

/// Why one format attempt for a page produced nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeFailure {
    NotFound,
    Server(u16),
    Network(String),
    Timeout,
    Decode(String),
}

/// Notable gallery transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum GalleryEvent {
    ProbeStarted {
        page: PageNumber,
        format: PageFormat,
    },
    ProbeFailed {
        page: PageNumber,
        format: PageFormat,
        failure: ProbeFailure,
    },
    PageDiscovered {
        page: PageNumber,
        format: PageFormat,
    },
    DiscoveryEnded {
        reason: EndReason,
        pages_found: u32,
    },
    RenderStarted {
        page: PageNumber,
    },
    /// A render was requested for a page that is in flight or already has a slot.
    DuplicateRenderSkipped {
        page: PageNumber,
    },
    PageReady {
        page: PageNumber,
    },
    PageFailed {
        page: PageNumber,
        reason: String,
    },
    WaiterRegistered {
        page: PageNumber,
    },
    WaitersResolved {
        page: Option<PageNumber>,
        count: usize,
    },
    HotspotsPositioned {
        page: PageNumber,
        count: usize,
        mobile: bool,
    },
    AnimationTriggered {
        page: PageNumber,
        index: usize,
    },
    AnimationHidden {
        page: PageNumber,
        index: usize,
    },
}

/// Receiver of gallery events.
pub trait EventSink {
    fn emit(&self, event: &GalleryEvent);
}

/// Forwards events to `tracing` at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GalleryEvent) {
        tracing::trace!(?event, "gallery event");
    }
}

/// Keeps every event in memory. Intended for tests and debugging.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<GalleryEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events in emission order.
    pub fn events(&self) -> Vec<GalleryEvent> {
        self.events.borrow().clone()
    }

    /// Count events matching `pred`.
    pub fn count(&self, pred: impl Fn(&GalleryEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &GalleryEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Cheap, cloneable handle to an optional sink.
#[derive(Clone, Default)]
pub struct Events(Option<Rc<dyn EventSink>>);

impl Events {
    /// Handle that drops every event.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self(Some(sink))
    }

    pub fn emit(&self, event: GalleryEvent) {
        if let Some(sink) = &self.0 {
            sink.emit(&event);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for Events {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Events")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/sink.rs"]
mod tests;
